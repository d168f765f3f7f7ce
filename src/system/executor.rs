// src/system/executor.rs

use std::path::Path;
use std::process::{Command as StdCommand, Stdio};
use thiserror::Error;

/// Failures of running an external program.
#[derive(Error, Debug)]
pub enum ExecutionError {
    /// The command line has unbalanced quotes.
    #[error("Command could not be parsed: {0}")]
    CommandParse(String),
    /// The command line is blank.
    #[error("No command specified to run.")]
    EmptyCommand,
    /// The program could not be spawned.
    #[error("Command '{0}' could not be executed: {1}")]
    CommandFailed(String, std::io::Error),
    /// The program ran and failed.
    #[error("Command '{command}' exited with a non-zero error code.")]
    NonZeroExitStatus {
        /// The program that failed.
        command: String,
        /// Standard error captured from the failed process.
        stderr: Vec<u8>,
    },
}

impl ExecutionError {
    /// Standard error of a process that ran but failed.
    pub fn stderr(&self) -> &[u8] {
        match self {
            Self::NonZeroExitStatus { stderr, .. } => stderr,
            _ => &[],
        }
    }
}

/// Splits a command line into program and arguments without involving a shell.
pub fn split_command_line(command_line: &str) -> Result<(String, Vec<String>), ExecutionError> {
    let trimmed_command = command_line.trim();
    let mut parts = shlex::split(trimmed_command)
        .ok_or_else(|| ExecutionError::CommandParse(trimmed_command.to_string()))?
        .into_iter();
    let program = parts.next().ok_or(ExecutionError::EmptyCommand)?;
    Ok((program, parts.collect()))
}

/// Runs `program` with `args` and captures its standard output.
///
/// No shell is involved, so metacharacters reach the program verbatim. Stdin
/// is closed. This operation is blocking. On a non-zero exit the captured
/// standard error is carried by the error.
pub fn execute_and_capture_output(
    program: &str,
    args: &[String],
    cwd: Option<&Path>,
) -> Result<Vec<u8>, ExecutionError> {
    if program.trim().is_empty() {
        return Err(ExecutionError::EmptyCommand);
    }
    let command_line = std::iter::once(program)
        .chain(args.iter().map(String::as_str))
        .collect::<Vec<_>>()
        .join(" ");

    let mut command = StdCommand::new(program);
    command
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());
    if let Some(dir) = cwd {
        command.current_dir(dunce::simplified(dir));
    }

    log::debug!("Executing '{}' for completion", command_line);
    let command_output = command
        .output()
        .map_err(|e| ExecutionError::CommandFailed(command_line.clone(), e))?;

    if !command_output.status.success() {
        log::debug!(
            "'{}' exited with status {:?}",
            command_line,
            command_output.status.code()
        );
        return Err(ExecutionError::NonZeroExitStatus {
            command: command_line,
            stderr: command_output.stderr,
        });
    }

    Ok(command_output.stdout)
}
