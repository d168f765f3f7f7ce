// src/models.rs

use serde::Serialize;
use std::path::{Path, PathBuf};

// --- COMPLETION CANDIDATES ---

/// A single completion candidate.
///
/// `value` is what gets inserted into the command line, `display` is what the
/// shell shows in its menu and `description` is optional help text (empty
/// means "no description").
#[derive(Serialize, Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "PascalCase")]
pub struct RawValue {
    /// Inserted into the command line.
    pub value: String,
    /// Shown in the completion menu.
    pub display: String,
    /// Help text, empty when there is none.
    pub description: String,
}

impl RawValue {
    /// Creates a candidate whose display equals its value.
    pub fn new(value: impl Into<String>, description: impl Into<String>) -> Self {
        let value = value.into();
        Self {
            display: value.clone(),
            value,
            description: description.into(),
        }
    }

    /// Creates a candidate with a display differing from its value.
    pub fn with_display(
        value: impl Into<String>,
        display: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            value: value.into(),
            display: display.into(),
            description: description.into(),
        }
    }
}

/// Builds undescribed candidates from plain values.
pub fn raw_values_from<S: AsRef<str>>(values: &[S]) -> Vec<RawValue> {
    values
        .iter()
        .map(|v| RawValue::new(v.as_ref(), ""))
        .collect()
}

// --- REQUEST CONTEXT ---

/// Request-time state threaded through every resolution step.
///
/// A `Context` is never mutated while resolving: narrowing (multi-part
/// completion, `chdir`) always produces a new value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Context {
    /// Literal text of the word (or segment) being completed.
    pub callback_value: String,
    /// Already typed segments of a multi-part value.
    pub parts: Vec<String>,
    /// Positional arguments typed before the current word.
    pub args: Vec<String>,
    /// Working directory for filesystem and process access. `None` means the
    /// process working directory.
    pub dir: Option<PathBuf>,
    /// Callbacks unwrapped so far in this request, nested invocations included.
    pub(crate) depth: usize,
}

impl Context {
    /// Creates a context completing `callback_value`.
    pub fn new(callback_value: impl Into<String>) -> Self {
        Self {
            callback_value: callback_value.into(),
            ..Default::default()
        }
    }

    /// Sets the positional arguments typed before the current word.
    pub fn with_args(mut self, args: Vec<String>) -> Self {
        self.args = args;
        self
    }

    /// Sets the working directory used by filesystem and process producers.
    pub fn with_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.dir = Some(dir.into());
        self
    }

    /// Returns a copy narrowed to one segment of a multi-part value.
    pub fn narrowed(&self, callback_value: impl Into<String>, parts: Vec<String>) -> Self {
        Self {
            callback_value: callback_value.into(),
            parts,
            args: self.args.clone(),
            dir: self.dir.clone(),
            depth: self.depth,
        }
    }

    /// Resolves `path` against the context directory.
    pub fn resolve(&self, path: &Path) -> PathBuf {
        match &self.dir {
            Some(dir) if path.is_relative() => dir.join(path),
            _ => path.to_path_buf(),
        }
    }
}

// --- HOST COMMAND TREE ---

/// The value kind of a flag, as far as completion cares about it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlagKind {
    /// Takes no argument.
    Bool,
    /// Takes no argument and counts repetitions.
    Count,
    /// Takes a single argument.
    String,
    /// Slice or array flags that may be supplied repeatedly.
    List,
}

/// A flag registered on a command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Flag {
    /// Long name, used as `--name`.
    pub name: String,
    /// Single-letter form, used as `-s`.
    pub shorthand: Option<char>,
    /// Help text, offered as candidate description.
    pub usage: String,
    /// How the flag consumes arguments.
    pub kind: FlagKind,
    /// Deprecation notice. Deprecated flags are not offered.
    pub deprecated: Option<String>,
    /// Deprecation notice of the shorthand alone.
    pub shorthand_deprecated: Option<String>,
    /// Hidden flags are not offered.
    pub hidden: bool,
    /// The flag has no long form; `name` only identifies it.
    pub shorthand_only: bool,
    /// Value used when the flag is supplied without an argument.
    pub no_opt_default: Option<String>,
    /// Already supplied on the command line.
    pub changed: bool,
}

impl Flag {
    /// Creates a flag of the given kind with no shorthand or usage.
    pub fn new(name: impl Into<String>, kind: FlagKind) -> Self {
        Self {
            name: name.into(),
            shorthand: None,
            usage: String::new(),
            kind,
            deprecated: None,
            shorthand_deprecated: None,
            hidden: false,
            shorthand_only: false,
            no_opt_default: None,
            changed: false,
        }
    }

    /// A flag taking no argument.
    pub fn bool(name: impl Into<String>) -> Self {
        Self::new(name, FlagKind::Bool)
    }

    /// A repeatable flag taking no argument.
    pub fn count(name: impl Into<String>) -> Self {
        Self::new(name, FlagKind::Count)
    }

    /// A flag taking one argument.
    pub fn string(name: impl Into<String>) -> Self {
        Self::new(name, FlagKind::String)
    }

    /// A repeatable flag taking one argument per use.
    pub fn list(name: impl Into<String>) -> Self {
        Self::new(name, FlagKind::List)
    }

    /// Sets the single-letter form.
    pub fn with_shorthand(mut self, shorthand: char) -> Self {
        self.shorthand = Some(shorthand);
        self
    }

    /// Sets the help text.
    pub fn with_usage(mut self, usage: impl Into<String>) -> Self {
        self.usage = usage.into();
        self
    }

    /// Lets the flag be supplied without an argument, meaning `value`.
    pub fn with_no_opt_default(mut self, value: impl Into<String>) -> Self {
        self.no_opt_default = Some(value.into());
        self
    }

    /// Marks the flag deprecated.
    pub fn deprecated(mut self, message: impl Into<String>) -> Self {
        self.deprecated = Some(message.into());
        self
    }

    /// Marks the shorthand deprecated, the long form stays usable.
    pub fn shorthand_deprecated(mut self, message: impl Into<String>) -> Self {
        self.shorthand_deprecated = Some(message.into());
        self
    }

    /// Hides the flag from completion.
    pub fn hidden(mut self) -> Self {
        self.hidden = true;
        self
    }

    /// Drops the long form from completion.
    pub fn shorthand_only(mut self) -> Self {
        self.shorthand_only = true;
        self
    }

    /// A flag requires an explicit argument unless it is a bool or counter
    /// or carries a value for bare use.
    pub fn requires_argument(&self) -> bool {
        !matches!(self.kind, FlagKind::Bool | FlagKind::Count) && self.no_opt_default.is_none()
    }

    /// Lists and counters may be supplied more than once.
    pub fn is_repeatable(&self) -> bool {
        matches!(self.kind, FlagKind::List | FlagKind::Count)
    }

    /// The shorthand, unless it is missing or deprecated.
    pub fn usable_shorthand(&self) -> Option<char> {
        self.shorthand.filter(|_| self.shorthand_deprecated.is_none())
    }
}

/// A command of the host program: its names, description, flags and children.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Command {
    /// Name typed to invoke the command.
    pub name: String,
    /// Alternative names, completed alongside the name.
    pub aliases: Vec<String>,
    /// One-line description.
    pub short: String,
    /// Hidden commands are not offered.
    pub hidden: bool,
    /// Deprecation notice. Deprecated commands are not offered.
    pub deprecated: Option<String>,
    /// Flags defined on this command.
    pub flags: Vec<Flag>,
    /// Subcommands.
    pub children: Vec<Command>,
}

impl Command {
    /// Creates a command with no flags or subcommands.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Sets the one-line description.
    pub fn with_short(mut self, short: impl Into<String>) -> Self {
        self.short = short.into();
        self
    }

    /// Adds an alternative name.
    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.aliases.push(alias.into());
        self
    }

    /// Adds a flag.
    pub fn with_flag(mut self, flag: Flag) -> Self {
        self.flags.push(flag);
        self
    }

    /// Adds a subcommand.
    pub fn with_subcommand(mut self, child: Self) -> Self {
        self.children.push(child);
        self
    }

    /// Hides the command from completion.
    pub fn hidden(mut self) -> Self {
        self.hidden = true;
        self
    }

    /// Marks the command deprecated.
    pub fn deprecated(mut self, message: impl Into<String>) -> Self {
        self.deprecated = Some(message.into());
        self
    }

    /// Finds a direct child by name or alias.
    pub fn find_child(&self, name: &str) -> Option<&Self> {
        self.children
            .iter()
            .find(|c| c.name == name || c.aliases.iter().any(|a| a == name))
    }

    /// Finds a direct child by name or alias, mutably.
    pub fn find_child_mut(&mut self, name: &str) -> Option<&mut Self> {
        self.children
            .iter_mut()
            .find(|c| c.name == name || c.aliases.iter().any(|a| a == name))
    }

    /// Finds a flag by long name.
    pub fn lookup_flag(&self, name: &str) -> Option<&Flag> {
        self.flags.iter().find(|f| f.name == name)
    }

    /// Finds a flag by long name, mutably.
    pub fn lookup_flag_mut(&mut self, name: &str) -> Option<&mut Flag> {
        self.flags.iter_mut().find(|f| f.name == name)
    }

    /// Finds a flag by shorthand.
    pub fn lookup_shorthand(&self, shorthand: char) -> Option<&Flag> {
        self.flags.iter().find(|f| f.shorthand == Some(shorthand))
    }

    /// Finds a flag by shorthand, mutably.
    pub fn lookup_shorthand_mut(&mut self, shorthand: char) -> Option<&mut Flag> {
        self.flags.iter_mut().find(|f| f.shorthand == Some(shorthand))
    }
}

// --- CONFIGURATION ---

/// Options influencing how candidates are rendered.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompletionOptions {
    /// Offer long flags with a single dash (`-name`).
    pub long_shorthand: bool,
}

impl CompletionOptions {
    /// Reads the options from the environment.
    pub fn from_env() -> Self {
        let long_shorthand = std::env::var(crate::constants::LONG_SHORTHAND_ENV)
            .map(|v| matches!(v.trim().to_lowercase().as_str(), "1" | "true" | "yes"))
            .unwrap_or(false);
        Self { long_shorthand }
    }
}
