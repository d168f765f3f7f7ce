// src/cli/args.rs
use clap::Parser;

/// Arguments of a `_complete` request.
#[derive(Parser, Debug, Default)]
#[command(no_binary_name = true)] // Parsed from the words after `_complete`.
pub struct CompleteArgs {
    /// The shell the candidates are rendered for (bash, elvish, fish, powershell, xonsh, zsh).
    pub shell: String,

    /// The UID of the action to resolve, or `_` to derive it from the arguments.
    pub uid: String,

    /// The words typed so far. The last one is the word being completed.
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    pub args: Vec<String>,
}
