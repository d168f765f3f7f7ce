use clap::Parser;

/// Argument structs of the hidden subcommands.
pub mod args;
/// Registration and routing of completion requests.
pub mod dispatcher;

/// tabwright: dynamic shell completion for command trees.
///
/// Shells call `tabwright _complete <shell> <uid> <words...>` and read the
/// candidates from stdout.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
#[command(disable_help_subcommand = true)]
#[command(trailing_var_arg = true)]
pub struct Cli {
    /// The words passed to the program. `_complete` as the first word starts a
    /// completion request.
    #[arg(allow_hyphen_values = true)]
    pub args: Vec<String>,
}
