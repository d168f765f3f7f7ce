// src/core/mod.rs

/// Actions and their resolution.
pub mod action;
/// Scanning of the words typed so far.
pub mod arg_parser;
/// Candidates built from external command output.
pub mod exec;
/// Subcommand and flag completion.
pub mod flags;
/// Resolved candidates and their transformations.
pub mod invoked;
/// Completion of divider-separated values.
pub mod multi_parts;
/// Users, groups, hosts, signals and network interfaces.
pub mod os;
/// Filesystem path completion.
pub mod path;
/// Addressing of registered actions.
pub mod uid;
