// src/core/exec.rs

use crate::{
    core::action::Action,
    system::executor::{self, ExecutionError},
};
use lazy_static::lazy_static;
use regex::Regex;
use std::sync::Arc;

lazy_static! {
    // ANSI color and cursor escape sequences.
    static ref ANSI_RE: Regex = Regex::new(
        "[\u{001B}\u{009B}][\\[\\]()#;?]*(?:(?:(?:[a-zA-Z\\d]*(?:;[a-zA-Z\\d]*)*)?\u{0007})|(?:(?:\\d{1,4}(?:;\\d{0,4})*)?[\\dA-PRZcf-ntqry=><~]))"
    )
    .expect("ANSI escape regex is valid");
}

/// Removes ANSI escape codes from `text`.
pub fn strip_ansi(text: &str) -> String {
    ANSI_RE.replace_all(text, "").into_owned()
}

/// An external command whose output is turned into an action.
#[derive(Debug, Clone)]
pub struct ExecCommand {
    program: String,
    args: Vec<String>,
}

/// Invokes `program` with `args` at completion time.
///
/// ```no_run
/// use tabwright::core::{action::Action, exec::action_exec_command};
///
/// let remotes = action_exec_command("git", ["remote"]).transform(|output| {
///     Action::values(String::from_utf8_lossy(output).lines().map(str::to_string))
/// });
/// # let _ = remotes;
/// ```
pub fn action_exec_command<I, S>(program: impl Into<String>, args: I) -> ExecCommand
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    ExecCommand {
        program: program.into(),
        args: args.into_iter().map(Into::into).collect(),
    }
}

impl ExecCommand {
    /// Runs the command when invoked and passes its stdout to `transform`.
    ///
    /// On failure the first stderr line becomes a message, or the generic
    /// execution error when stderr is blank.
    pub fn transform<F>(self, transform: F) -> Action
    where
        F: Fn(&[u8]) -> Action + Send + Sync + 'static,
    {
        let transform = Arc::new(transform);
        Action::callback(move |c| {
            match executor::execute_and_capture_output(&self.program, &self.args, c.dir.as_deref())
            {
                Ok(stdout) => Ok(transform(&stdout)),
                Err(e) => Ok(Action::message(failure_message(&e))),
            }
        })
    }
}

fn failure_message(error: &ExecutionError) -> String {
    let stderr = String::from_utf8_lossy(error.stderr());
    let first_line = strip_ansi(stderr.lines().next().unwrap_or_default());
    if first_line.trim().is_empty() {
        error.to_string()
    } else {
        first_line
    }
}

/// Runs a command line (split without a shell) and completes each non-empty
/// output line as a value.
pub fn action_execute(command_line: impl Into<String>) -> Action {
    let command_line = command_line.into();
    Action::callback(move |_| match executor::split_command_line(&command_line) {
        Ok((program, args)) => Ok(action_exec_command(program, args).transform(|output| {
            Action::values(
                String::from_utf8_lossy(output)
                    .lines()
                    .filter(|line| !line.trim().is_empty())
                    .map(str::to_string)
                    .collect::<Vec<_>>(),
            )
        })),
        Err(e) => Ok(Action::message(e.to_string())),
    })
}
