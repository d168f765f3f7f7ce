// src/core/uid.rs

//! # Dispatch addressing
//!
//! A UID identifies one registered action inside the host command tree so a
//! re-invoked process can route a completion request without walking the
//! application setup again.
//!
//! Format: `_root__child` for a command, `_root__child##flag` for a flag and
//! `_root__child#0` for a positional slot.

use crate::{
    constants::{UID_FLAG_MARKER, UID_MARKER, UID_PATH_SEPARATOR, UID_POSITIONAL_MARKER},
    models::Command,
};
use std::{fmt, str::FromStr};
use thiserror::Error;

/// Errors raised while parsing or resolving a UID.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum UidError {
    /// The UID is an empty string.
    #[error("UID must not be empty.")]
    Empty,
    /// The UID lacks its leading marker.
    #[error("UID '{0}' does not start with '{marker}'.", marker = UID_MARKER)]
    MissingMarker(String),
    /// Two path separators follow each other.
    #[error("UID '{0}' has an empty command path segment.")]
    EmptySegment(String),
    /// The positional index is not a number.
    #[error("UID '{uid}' has an invalid positional index: {reason}")]
    InvalidPosition {
        /// The rejected UID.
        uid: String,
        /// Why the index could not be parsed.
        reason: String,
    },
    /// The first segment is not the root command.
    #[error("UID '{uid}' does not address root command '{root}'.")]
    RootMismatch {
        /// The rejected UID.
        uid: String,
        /// Name of the actual root command.
        root: String,
    },
    /// A segment names no child command.
    #[error("Command '{command}' not found for UID '{uid}'.")]
    CommandNotFound {
        /// The rejected UID.
        uid: String,
        /// The segment that matched no child.
        command: String,
    },
    /// The addressed flag is not defined.
    #[error("Flag '{flag}' is not defined on command '{command}'.")]
    FlagNotFound {
        /// The command searched.
        command: String,
        /// The missing flag.
        flag: String,
    },
    /// A command name would not survive a render and parse round trip.
    #[error(
        "Command name '{0}' cannot be addressed by a UID: it must not contain '{path}' or '{position}' nor end with '{marker}'.",
        path = UID_PATH_SEPARATOR,
        position = UID_POSITIONAL_MARKER,
        marker = UID_MARKER
    )]
    UnaddressableName(String),
}

/// What a UID points at on its command.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Target {
    /// The command itself.
    Command,
    /// A flag of the command, by name.
    Flag(String),
    /// A positional slot of the command, zero-based.
    Positional(usize),
}

/// A parsed UID: the command path from the root plus the addressed target.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Uid {
    /// Command names from the root.
    pub path: Vec<String>,
    /// What the UID addresses on that command.
    pub target: Target,
}

impl Uid {
    /// Addresses the command at `path`.
    pub fn command<S: AsRef<str>>(path: &[S]) -> Self {
        Self {
            path: path.iter().map(|s| s.as_ref().to_string()).collect(),
            target: Target::Command,
        }
    }

    /// Addresses `flag` on the command at `path`.
    pub fn flag<S: AsRef<str>>(path: &[S], flag: &str) -> Self {
        Self {
            target: Target::Flag(flag.to_string()),
            ..Self::command(path)
        }
    }

    /// Addresses positional slot `position` on the command at `path`.
    pub fn positional<S: AsRef<str>>(path: &[S], position: usize) -> Self {
        Self {
            target: Target::Positional(position),
            ..Self::command(path)
        }
    }
}

impl fmt::Display for Uid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", UID_MARKER, self.path.join(UID_PATH_SEPARATOR))?;
        match &self.target {
            Target::Command => Ok(()),
            Target::Flag(name) => write!(f, "{UID_FLAG_MARKER}{name}"),
            Target::Positional(position) => write!(f, "{UID_POSITIONAL_MARKER}{position}"),
        }
    }
}

impl FromStr for Uid {
    type Err = UidError;

    fn from_str(uid: &str) -> Result<Self, Self::Err> {
        if uid.is_empty() {
            return Err(UidError::Empty);
        }
        let body = uid
            .strip_prefix(UID_MARKER)
            .ok_or_else(|| UidError::MissingMarker(uid.to_string()))?;

        let (command_part, target) = if let Some((command, flag)) = body.split_once(UID_FLAG_MARKER)
        {
            (command, Target::Flag(flag.to_string()))
        } else if let Some((command, position)) = body.split_once(UID_POSITIONAL_MARKER) {
            let position = position.parse().map_err(|e: std::num::ParseIntError| {
                UidError::InvalidPosition {
                    uid: uid.to_string(),
                    reason: e.to_string(),
                }
            })?;
            (command, Target::Positional(position))
        } else {
            (body, Target::Command)
        };

        let path: Vec<String> = command_part
            .split(UID_PATH_SEPARATOR)
            .map(str::to_string)
            .collect();
        if path.iter().any(String::is_empty) {
            return Err(UidError::EmptySegment(uid.to_string()));
        }
        Ok(Self { path, target })
    }
}

/// Checks that every command name of `uid` survives a render and parse
/// round trip.
pub fn check_addressable(uid: &Uid) -> Result<(), UidError> {
    match uid.path.iter().find(|name| !is_addressable(name)) {
        Some(name) => Err(UidError::UnaddressableName(name.clone())),
        None => Ok(()),
    }
}

fn is_addressable(name: &str) -> bool {
    !name.is_empty()
        && !name.contains(UID_PATH_SEPARATOR)
        && !name.contains(UID_POSITIONAL_MARKER)
        && !name.ends_with(UID_MARKER)
}

/// UID of a command.
pub fn uid_command<S: AsRef<str>>(path: &[S]) -> String {
    Uid::command(path).to_string()
}

/// UID of a flag on a command.
pub fn uid_flag<S: AsRef<str>>(path: &[S], flag: &str) -> String {
    Uid::flag(path, flag).to_string()
}

/// UID of a positional slot on a command.
pub fn uid_positional<S: AsRef<str>>(path: &[S], position: usize) -> String {
    Uid::positional(path, position).to_string()
}

/// Locates the command a UID addresses, starting at `root`.
///
/// Flag UIDs are also checked against the command's flags.
pub fn find<'a>(root: &'a Command, uid: &Uid) -> Result<&'a Command, UidError> {
    let mut segments = uid.path.iter();
    match segments.next() {
        Some(name) if *name == root.name => {}
        _ => {
            return Err(UidError::RootMismatch {
                uid: uid.to_string(),
                root: root.name.clone(),
            });
        }
    }

    let mut current = root;
    for segment in segments {
        current = current
            .children
            .iter()
            .find(|c| c.name == *segment)
            .ok_or_else(|| UidError::CommandNotFound {
                uid: uid.to_string(),
                command: segment.clone(),
            })?;
    }

    if let Target::Flag(flag) = &uid.target
        && current.lookup_flag(flag).is_none()
    {
        return Err(UidError::FlagNotFound {
            command: current.name.clone(),
            flag: flag.clone(),
        });
    }
    Ok(current)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Flag;

    fn tree() -> Command {
        Command::new("example").with_subcommand(
            Command::new("action")
                .with_alias("alias")
                .with_flag(Flag::string("files").with_shorthand('f'))
                .with_subcommand(Command::new("sub-cmd")),
        )
    }

    #[test]
    fn test_format() {
        assert_eq!(uid_command(&["example"]), "_example");
        assert_eq!(uid_command(&["example", "action"]), "_example__action");
        assert_eq!(
            uid_flag(&["example", "action"], "files"),
            "_example__action##files"
        );
        assert_eq!(uid_positional(&["example", "action"], 1), "_example__action#1");
    }

    #[test]
    fn test_parse() {
        let uid: Uid = "_example__action##files".parse().unwrap();
        assert_eq!(uid.path, vec!["example", "action"]);
        assert_eq!(uid.target, Target::Flag("files".into()));

        let uid: Uid = "_example__action#2".parse().unwrap();
        assert_eq!(uid.target, Target::Positional(2));

        for text in ["_example", "_example__action__sub-cmd", "_example##with#hash"] {
            assert_eq!(text.parse::<Uid>().unwrap().to_string(), text);
        }
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!("".parse::<Uid>(), Err(UidError::Empty));
        assert!(matches!(
            "example".parse::<Uid>(),
            Err(UidError::MissingMarker(_))
        ));
        assert!(matches!(
            "_example____action".parse::<Uid>(),
            Err(UidError::EmptySegment(_))
        ));
        assert!(matches!(
            "_example#x".parse::<Uid>(),
            Err(UidError::InvalidPosition { .. })
        ));
    }

    #[test]
    fn test_find() {
        let root = tree();
        let found = find(&root, &"_example__action__sub-cmd".parse().unwrap()).unwrap();
        assert_eq!(found.name, "sub-cmd");

        let found = find(&root, &"_example__action##files".parse().unwrap()).unwrap();
        assert_eq!(found.name, "action");

        assert!(matches!(
            find(&root, &"_example__missing".parse().unwrap()),
            Err(UidError::CommandNotFound { .. })
        ));
        assert!(matches!(
            find(&root, &"_example__action##nope".parse().unwrap()),
            Err(UidError::FlagNotFound { .. })
        ));
        assert!(matches!(
            find(&root, &"_other".parse().unwrap()),
            Err(UidError::RootMismatch { .. })
        ));
    }

    #[test]
    fn test_unaddressable_names() {
        for name in ["cmd_", "a__b", "a#b", ""] {
            let uid = Uid::command(&["example", name, "child"]);
            assert_eq!(
                check_addressable(&uid),
                Err(UidError::UnaddressableName(name.to_string()))
            );
        }
    }

    #[test]
    fn test_addressable_names_round_trip() {
        for path in [
            vec!["example", "_leading", "child"],
            vec!["example", "sub-cmd", "with_underscore"],
            vec!["_root", "child"],
        ] {
            let uid = Uid::flag(&path, "flag#with##hashes");
            assert_eq!(check_addressable(&uid), Ok(()));
            assert_eq!(uid.to_string().parse::<Uid>().unwrap(), uid);
        }
    }
}
