// src/bin/tabwright.rs

use anyhow::{Context as _, Result};
use clap::Parser;
use colored::*;
use std::path::Path;
use tabwright::{
    cli::{
        Cli,
        args::CompleteArgs,
        dispatcher::{ActionMap, Registry},
    },
    constants::COMPLETE_SUBCOMMAND,
    core::{
        action::Action,
        arg_parser::TypedArgs,
        exec::action_execute,
        multi_parts::multi_parts,
        os::{
            action_bool, action_groups, action_hosts, action_kill_signals, action_net_interfaces,
            action_user_group, action_users,
        },
        path::{action_directories, action_files},
    },
    models::{Command, CompletionOptions, Flag},
};

// --- Command Tree ---

/// The command tree this binary completes for itself.
fn command_tree() -> Command {
    Command::new("tabwright")
        .with_short("dynamic shell completion")
        .with_subcommand(
            Command::new("action")
                .with_short("action example")
                .with_alias("alias")
                .with_flag(Flag::string("files").with_shorthand('f').with_usage("files flag"))
                .with_flag(Flag::string("directories").with_usage("directories flag"))
                .with_flag(Flag::string("groups").with_shorthand('g').with_usage("groups flag"))
                .with_flag(Flag::string("hosts").with_usage("hosts flag"))
                .with_flag(Flag::string("message").with_shorthand('m').with_usage("message flag"))
                .with_flag(
                    Flag::string("net_interfaces")
                        .with_shorthand('n')
                        .with_usage("net_interfaces flag"),
                )
                .with_flag(Flag::string("kill").with_shorthand('k').with_usage("kill signals"))
                .with_flag(Flag::string("usergroup").with_usage("user:group flag"))
                .with_flag(Flag::string("users").with_shorthand('u').with_usage("users flag"))
                .with_flag(Flag::string("values").with_shorthand('v').with_usage("values flag"))
                .with_flag(
                    Flag::string("values_described")
                        .with_shorthand('d')
                        .with_usage("values with description flag"),
                )
                .with_flag(
                    Flag::string("optarg")
                        .with_shorthand('o')
                        .with_no_opt_default("blue")
                        .with_usage("optional arg with default value blue"),
                )
                .with_flag(Flag::bool("verbose").with_shorthand('V').with_usage("verbose output")),
        )
        .with_subcommand(
            Command::new("multiparts")
                .with_short("multiparts example")
                .with_flag(Flag::bool("enabled").with_shorthand('e').with_usage("enabled flag")),
        )
        .with_subcommand(Command::new("exec").with_short("command output example"))
}

/// Registers every completion of the command tree.
fn build_registry(options: CompletionOptions) -> Result<Registry> {
    let mut registry = Registry::new(command_tree()).with_options(options);

    registry.flag_completion(
        &["tabwright", "action"],
        ActionMap::from([
            ("files".to_string(), action_files([".rs"])),
            ("directories".to_string(), action_directories()),
            ("groups".to_string(), action_groups()),
            ("hosts".to_string(), action_hosts()),
            ("message".to_string(), Action::message("message example")),
            ("net_interfaces".to_string(), action_net_interfaces()),
            ("kill".to_string(), action_kill_signals()),
            ("usergroup".to_string(), action_user_group()),
            ("users".to_string(), action_users()),
            ("values".to_string(), Action::values(["values", "example"])),
            (
                "values_described".to_string(),
                Action::values_described([
                    ("values", "valueDescription"),
                    ("example", "exampleDescription"),
                ]),
            ),
            (
                "optarg".to_string(),
                Action::values(["blue", "red", "green", "yellow"]),
            ),
        ]),
    )?;
    registry.positional_completion(
        &["tabwright", "action"],
        vec![
            Action::values(["positional1", "p1"]),
            Action::values(["positional2", "p2"]),
        ],
    )?;

    registry.positional_completion(
        &["tabwright", "multiparts"],
        vec![multi_parts(",", |_| {
            Ok(multi_parts("=", |c| {
                Ok(match c.parts.len() {
                    0 => Action::values(["FILE=", "DIRECTORY=", "BOOL=", "VALUE="]),
                    1 => match c.parts.first().map(String::as_str) {
                        Some("FILE") => action_files(Vec::<String>::new()),
                        Some("DIRECTORY") => action_directories(),
                        Some("BOOL") => action_bool(),
                        _ => Action::values(["one", "two", "three"]),
                    },
                    _ => Action::default(),
                })
            }))
        })],
    )?;

    registry.positional_completion(
        &["tabwright", "exec"],
        vec![action_execute("git branch --format=%(refname:short)")],
    )?;

    Ok(registry)
}

/// Drops the program name when the shell passes the full command line.
fn strip_program_name<'a>(root: &Command, words: &'a [String]) -> &'a [String] {
    match words.split_first() {
        Some((first, rest))
            if Path::new(first)
                .file_name()
                .is_some_and(|name| name == root.name.as_str()) =>
        {
            rest
        }
        _ => words,
    }
}

/// The main entry point of the `tabwright` application.
/// It sets up logging, parses arguments and performs centralized error handling.
fn main() {
    env_logger::init();

    if let Err(e) = run_cli(Cli::parse()) {
        // stdout stays empty, the shell shows no candidates.
        eprintln!("{}: {:#}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

fn run_cli(cli: Cli) -> Result<()> {
    log::debug!("CLI args parsed: {:?}", cli);

    match cli.args.split_first() {
        Some((first, rest)) if first == COMPLETE_SUBCOMMAND => {
            let args = CompleteArgs::try_parse_from(rest)
                .context("Invalid completion request")?;
            let registry = build_registry(CompletionOptions::from_env())?;
            let words = strip_program_name(registry.root(), &args.args);
            let output = registry.complete(&args.shell, &args.uid, words)?;
            println!("{}", output);
        }
        _ => {
            // Nothing to run: show how the words would be read.
            let mut words = cli.args.clone();
            words.push(String::new());
            let typed = TypedArgs::parse(&command_tree(), &words, false);
            println!("{} {}", "command:".bold(), typed.path.join(" "));
            println!("{} {:?}", "positional:".bold(), typed.positional);
            let changed: Vec<&str> = typed
                .command
                .flags
                .iter()
                .filter(|f| f.changed)
                .map(|f| f.name.as_str())
                .collect();
            println!("{} {:?}", "flags:".bold(), changed);
            println!(
                "\nRun `{} {} <shell> _ <words...>` to complete.",
                typed.path.first().map(String::as_str).unwrap_or_default(),
                COMPLETE_SUBCOMMAND
            );
        }
    }
    Ok(())
}
