// src/constants.rs

/// Leading marker character of every UID.
pub const UID_MARKER: &str = "_";

/// Separator between command path segments inside a UID.
pub const UID_PATH_SEPARATOR: &str = "__";

/// Suffix marker addressing a flag (`##name`).
pub const UID_FLAG_MARKER: &str = "##";

/// Suffix marker addressing a positional slot (`#N`).
pub const UID_POSITIONAL_MARKER: &str = "#";

/// UID placeholder asking the dispatcher to derive the target from the typed arguments.
pub const UID_TRAVERSE: &str = "_";

/// Hidden subcommand the completed program is re-invoked with.
pub const COMPLETE_SUBCOMMAND: &str = "_complete";

/// Maximum number of callbacks unwrapped by a single `Action::invoke`.
pub const MAX_CALLBACK_DEPTH: usize = 32;

/// Display of the candidate carrying a message text.
pub const MESSAGE_MARKER: &str = "ERR";

/// Path separator used by path completion and its multi-part display.
pub const PATH_SEPARATOR: &str = "/";

/// Environment variable selecting `-name` instead of `--name` for long flags.
pub const LONG_SHORTHAND_ENV: &str = "TABWRIGHT_LONG_SHORTHAND";
