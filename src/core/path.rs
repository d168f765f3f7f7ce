// src/core/path.rs

//! Filesystem path completion.
//!
//! Candidates are read from the directory part of the current word. Values
//! keep the typed directory prefix (including an unexpanded `~`) while the
//! menu only displays the last path segment.

use crate::{
    constants::PATH_SEPARATOR,
    core::action::Action,
    models::{Context, RawValue},
};
use std::{fs, path::PathBuf};

/// Completes directories.
pub fn action_directories() -> Action {
    Action::callback(|c| {
        Ok(action_path(Vec::new(), true)
            .invoke(c)?
            .to_multi_parts(PATH_SEPARATOR)
            .into_action()
            .no_space())
    })
}

/// Completes files, optionally filtered by suffix, and directories.
pub fn action_files<I, S>(suffixes: I) -> Action
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let suffixes: Vec<String> = suffixes.into_iter().map(Into::into).collect();
    Action::callback(move |c| {
        Ok(action_path(suffixes.clone(), false)
            .invoke(c)?
            .to_multi_parts(PATH_SEPARATOR)
            .into_action()
            .no_space())
    })
}

/// Lists the entries of the directory the current word points into.
///
/// Read failures are reported as a message carrying the error text.
pub fn action_path(suffixes: Vec<String>, directories_only: bool) -> Action {
    Action::callback(move |c| {
        let prefix = directory_prefix(home_as_directory(&c.callback_value));
        let folder = match expand_home(prefix) {
            Ok(expanded) if expanded.is_empty() => c.resolve(&PathBuf::from(".")),
            Ok(expanded) => c.resolve(&PathBuf::from(expanded)),
            Err(message) => return Ok(Action::message(message)),
        };

        let entries = match fs::read_dir(&folder) {
            Ok(entries) => entries,
            Err(e) => {
                log::debug!("Could not read '{}': {}", folder.display(), e);
                return Ok(Action::message(e.to_string()));
            }
        };

        let show_hidden = c
            .callback_value
            .rsplit(PATH_SEPARATOR)
            .next()
            .is_some_and(|last| last.starts_with('.'));

        let mut names: Vec<(String, bool)> = entries
            .filter_map(|entry| entry.ok())
            .map(|entry| {
                let name = entry.file_name().to_string_lossy().into_owned();
                // Follows symlinks so linked directories complete as directories.
                let is_dir = entry.path().is_dir();
                (name, is_dir)
            })
            .filter(|(name, _)| show_hidden || !name.starts_with('.'))
            .collect();
        names.sort();

        let values = names
            .into_iter()
            .filter_map(|(name, is_dir)| {
                if is_dir {
                    Some(format!("{prefix}{name}{PATH_SEPARATOR}"))
                } else if !directories_only && matches_suffix(&name, &suffixes) {
                    Some(format!("{prefix}{name}"))
                } else {
                    None
                }
            })
            .map(|value| RawValue::new(value, ""))
            .collect();
        Ok(Action::raw_values(values))
    })
}

/// A bare `~` lists the home directory.
fn home_as_directory(value: &str) -> &str {
    if value == "~" { "~/" } else { value }
}

/// Everything up to and including the last separator.
fn directory_prefix(value: &str) -> &str {
    match value.rfind(PATH_SEPARATOR) {
        Some(index) => value.split_at(index + PATH_SEPARATOR.len()).0,
        None => "",
    }
}

fn expand_home(prefix: &str) -> Result<String, String> {
    if !prefix.starts_with('~') {
        return Ok(prefix.to_string());
    }
    let home = dirs::home_dir().ok_or_else(|| "Could not find home directory".to_string())?;
    Ok(shellexpand::tilde_with_context(prefix, || Some(home.to_string_lossy().into_owned())).into_owned())
}

fn matches_suffix(name: &str, suffixes: &[String]) -> bool {
    suffixes.is_empty() || suffixes.iter().any(|s| name.ends_with(s.as_str()))
}
