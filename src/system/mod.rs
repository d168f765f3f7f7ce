//! # System Interaction Layer
//!
//! The boundary between the completion engine and the outside world.
//!
//! ## Modules
//!
//! - **`executor`**: Spawns external programs with captured output for
//!   completions built from command output.
//! - **`shell`**: Renders resolved candidates in the format each supported
//!   shell reads back.

/// External program execution.
pub mod executor;
/// Per-shell candidate rendering.
pub mod shell;
