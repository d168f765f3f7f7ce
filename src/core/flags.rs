// src/core/flags.rs

use crate::{
    core::{action::Action, invoked::InvokedAction},
    models::{Command, CompletionOptions, Flag, RawValue},
};
use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // A single dash followed by shorthand letters, e.g. `-vx`.
    static ref SHORTHAND_SERIES_RE: Regex =
        Regex::new(r"^-(?P<shorthand>[^-=]+)$").expect("shorthand regex is valid");
}

/// Completes the visible subcommands of `cmd`, aliases included.
pub fn action_subcommands(cmd: &Command) -> Action {
    let mut values = Vec::new();
    for subcommand in cmd
        .children
        .iter()
        .filter(|c| !c.hidden && c.deprecated.is_none())
    {
        values.push(RawValue::new(&subcommand.name, &subcommand.short));
        for alias in &subcommand.aliases {
            values.push(RawValue::new(alias, &subcommand.short));
        }
    }
    Action::raw_values(values)
}

/// Completes the flags of `cmd`.
///
/// A word like `-vx` continues a shorthand series: only shorthand flags
/// that take no argument and were not consumed yet are offered, prefixed
/// with the typed series. A series already containing a flag that requires
/// an argument offers nothing.
pub fn action_flags(cmd: &Command, options: &CompletionOptions) -> Action {
    let cmd = cmd.clone();
    let options = options.clone();
    Action::callback(move |c| {
        if let Some(captures) = SHORTHAND_SERIES_RE.captures(&c.callback_value) {
            let typed = captures
                .name("shorthand")
                .map(|m| m.as_str())
                .unwrap_or_default();
            return Ok(shorthand_series(&cmd, typed)
                .prefix(&c.callback_value)
                .into_action()
                .no_space());
        }
        Ok(Action::raw_values(long_and_short_flags(&cmd, &options)))
    })
}

fn shorthand_series(cmd: &Command, typed: &str) -> InvokedAction {
    for letter in typed.chars() {
        if cmd
            .lookup_shorthand(letter)
            .is_some_and(Flag::requires_argument)
        {
            // A flag requiring an argument ends the series.
            return InvokedAction::default();
        }
    }

    let values = cmd
        .flags
        .iter()
        .filter(|f| f.deprecated.is_none() && !f.hidden && !f.requires_argument())
        .filter(|f| f.is_repeatable() || !f.changed)
        .filter_map(|f| f.usable_shorthand().map(|s| (f, s)))
        .filter(|(f, s)| f.is_repeatable() || !typed.contains(*s))
        .map(|(f, s)| RawValue::new(s.to_string(), &f.usage))
        .collect();
    InvokedAction::new(values, false, false)
}

fn long_and_short_flags(cmd: &Command, options: &CompletionOptions) -> Vec<RawValue> {
    let mut values = Vec::new();
    for flag in cmd.flags.iter().filter(|f| f.deprecated.is_none() && !f.hidden) {
        if flag.changed && !flag.is_repeatable() {
            // Already supplied.
            continue;
        }
        if !flag.shorthand_only {
            let dashes = if options.long_shorthand { "-" } else { "--" };
            values.push(RawValue::new(format!("{dashes}{}", flag.name), &flag.usage));
        }
        if let Some(shorthand) = flag.usable_shorthand() {
            values.push(RawValue::new(format!("-{shorthand}"), &flag.usage));
        }
    }
    values
}
