//! Dynamic shell completion for command-line programs.
//!
//! Completions are described as [`core::action::Action`]s, registered against
//! the host command tree in a [`cli::dispatcher::Registry`] and rendered per
//! shell by [`system::shell`].

/// Command-line parsing and request dispatch.
pub mod cli;
/// Shared constants.
pub mod constants;
/// The completion engine and its producers.
pub mod core;
/// Candidates, request context and the host command tree.
pub mod models;
/// Process execution and shell output.
pub mod system;
