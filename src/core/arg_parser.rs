// src/core/arg_parser.rs

use crate::models::Command;

/// The state of a partially typed command line, walked against the host
/// command tree.
///
/// Flags that were supplied are marked `changed` on the (cloned) command so
/// flag completion does not offer them again.
#[derive(Debug, Clone)]
pub struct TypedArgs {
    /// Names from the root to the command being completed.
    pub path: Vec<String>,
    /// The command being completed, with supplied flags marked.
    pub command: Command,
    /// Positional arguments typed before the current word.
    pub positional: Vec<String>,
    /// A flag still waiting for its value; the current word is that value.
    pub pending_flag: Option<String>,
    /// `--` was typed, everything after it is positional.
    pub flags_terminated: bool,
    /// The word being completed.
    pub current: String,
}

impl TypedArgs {
    /// Parses the typed arguments (program name excluded). The last argument
    /// is the word being completed.
    ///
    /// # Logic:
    /// - `--name` and `--name=value` mark a long flag; without an inline
    ///   value, a flag requiring an argument consumes the next token.
    /// - `-abc` marks each shorthand; a shorthand requiring an argument ends
    ///   the series and takes the rest of the token, or the next token.
    /// - The first non-flag token naming a child descends into it, anything
    ///   else is positional.
    pub fn parse(root: &Command, args: &[String], long_shorthand: bool) -> Self {
        let (current, preceding) = match args.split_last() {
            Some((current, preceding)) => (current.clone(), preceding),
            None => (String::new(), args),
        };

        let mut command = root.clone();
        let mut path = vec![root.name.clone()];
        let mut positional = Vec::new();
        let mut awaiting: Option<String> = None;
        let mut flags_terminated = false;

        for token in preceding {
            if awaiting.take().is_some() {
                // The token is the value of the previous flag.
                continue;
            }
            if flags_terminated {
                positional.push(token.clone());
                continue;
            }
            if token == "--" {
                flags_terminated = true;
                continue;
            }

            if let Some(long) = token.strip_prefix("--") {
                awaiting = mark_long(&mut command, long);
                continue;
            }
            if let Some(series) = token.strip_prefix('-')
                && !series.is_empty()
            {
                let long_name = series.split_once('=').map_or(series, |(name, _)| name);
                awaiting = if long_shorthand && command.lookup_flag(long_name).is_some() {
                    mark_long(&mut command, series)
                } else {
                    mark_shorthand_series(&mut command, series)
                };
                continue;
            }

            if positional.is_empty()
                && let Some(child) = command.find_child(token)
            {
                log::debug!("Descending into subcommand '{}'", child.name);
                path.push(child.name.clone());
                command = child.clone();
                continue;
            }
            positional.push(token.clone());
        }

        Self {
            path,
            command,
            positional,
            pending_flag: awaiting,
            flags_terminated,
            current,
        }
    }
}

/// Marks `name[=value]` as changed. Returns the flag name if it still waits
/// for a value.
fn mark_long(command: &mut Command, long: &str) -> Option<String> {
    let (name, inline_value) = match long.split_once('=') {
        Some((name, value)) => (name, Some(value)),
        None => (long, None),
    };
    match command.lookup_flag_mut(name) {
        Some(flag) => {
            flag.changed = true;
            (inline_value.is_none() && flag.requires_argument()).then(|| flag.name.clone())
        }
        None => {
            log::debug!("Unknown flag '--{}' on '{}'", name, command.name);
            None
        }
    }
}

fn mark_shorthand_series(command: &mut Command, series: &str) -> Option<String> {
    for (index, letter) in series.char_indices() {
        let Some(flag) = command.lookup_shorthand_mut(letter) else {
            log::debug!("Unknown shorthand '-{}' on '{}'", letter, command.name);
            return None;
        };
        flag.changed = true;
        if flag.requires_argument() {
            let rest = series.get(index + letter.len_utf8()..).unwrap_or_default();
            return rest.is_empty().then(|| flag.name.clone());
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Flag;

    // --- Helper to create a Vec<String> from &str slices ---
    fn to_cli_params(params: &[&str]) -> Vec<String> {
        params.iter().map(|s| s.to_string()).collect()
    }

    fn root() -> Command {
        Command::new("example")
            .with_flag(Flag::bool("global").with_shorthand('g'))
            .with_subcommand(
                Command::new("action")
                    .with_alias("alias")
                    .with_flag(Flag::bool("verbose").with_shorthand('v'))
                    .with_flag(Flag::string("output").with_shorthand('o'))
                    .with_flag(Flag::list("tag").with_shorthand('t'))
                    .with_flag(Flag::string("color").with_no_opt_default("auto")),
            )
    }

    fn changed(args: &TypedArgs) -> Vec<&str> {
        args.command
            .flags
            .iter()
            .filter(|f| f.changed)
            .map(|f| f.name.as_str())
            .collect()
    }

    #[test]
    fn test_descends_into_subcommand_by_alias() {
        let args = TypedArgs::parse(&root(), &to_cli_params(&["alias", "pos0", ""]), false);
        assert_eq!(args.path, vec!["example", "action"]);
        assert_eq!(args.positional, vec!["pos0"]);
        assert_eq!(args.current, "");
        assert!(args.pending_flag.is_none());
    }

    #[test]
    fn test_marks_long_and_shorthand_flags() {
        let args = TypedArgs::parse(
            &root(),
            &to_cli_params(&["action", "-v", "--tag=a", "--color", "pos0", "-"]),
            false,
        );
        assert_eq!(changed(&args), vec!["verbose", "tag", "color"]);
        assert_eq!(args.positional, vec!["pos0"]);
        assert_eq!(args.current, "-");
    }

    #[test]
    fn test_flag_value_is_not_positional() {
        let args = TypedArgs::parse(
            &root(),
            &to_cli_params(&["action", "--output", "file.txt", "pos0", "x"]),
            false,
        );
        assert_eq!(args.positional, vec!["pos0"]);
        assert!(args.pending_flag.is_none());
    }

    #[test]
    fn test_pending_flag_value() {
        let args = TypedArgs::parse(&root(), &to_cli_params(&["action", "--output", "fi"]), false);
        assert_eq!(args.pending_flag.as_deref(), Some("output"));

        let series = TypedArgs::parse(&root(), &to_cli_params(&["action", "-vo", ""]), false);
        assert_eq!(series.pending_flag.as_deref(), Some("output"));
        assert_eq!(changed(&series), vec!["verbose", "output"]);

        let attached = TypedArgs::parse(&root(), &to_cli_params(&["action", "-ofile", ""]), false);
        assert!(attached.pending_flag.is_none());
    }

    #[test]
    fn test_double_dash_terminates_flags() {
        let args = TypedArgs::parse(
            &root(),
            &to_cli_params(&["action", "--", "-v", "action", ""]),
            false,
        );
        assert!(args.flags_terminated);
        assert_eq!(args.positional, vec!["-v", "action"]);
        assert!(changed(&args).is_empty());
    }

    #[test]
    fn test_long_shorthand_style() {
        let args = TypedArgs::parse(&root(), &to_cli_params(&["action", "-output", ""]), true);
        assert_eq!(args.pending_flag.as_deref(), Some("output"));
    }

    #[test]
    fn test_empty_args() {
        let args = TypedArgs::parse(&root(), &[], false);
        assert_eq!(args.path, vec!["example"]);
        assert_eq!(args.current, "");
    }
}
