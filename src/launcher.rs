//! Child process launching
//!
//! The command arrives as one command-line string. On Windows it is handed to
//! the OS the way CreateProcess expects: the first token names the program
//! and the remainder is passed through untouched. Elsewhere it runs under
//! `sh -c`.

use std::process::Command;

use crate::error::RunresError;

/// Runs a command line to completion
pub trait ProcessLauncher {
    /// Block until the command exits and return its exit code.
    ///
    /// Failing to start, or terminating without an exit code, is an error.
    fn launch(&self, command: &str) -> Result<i32, RunresError>;
}

impl<T: ProcessLauncher + ?Sized> ProcessLauncher for &T {
    fn launch(&self, command: &str) -> Result<i32, RunresError> {
        (**self).launch(command)
    }
}

/// Launches real OS processes with inherited stdio
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemLauncher;

impl ProcessLauncher for SystemLauncher {
    fn launch(&self, command: &str) -> Result<i32, RunresError> {
        let mut child = build_command(command)?;

        tracing::debug!(command, "Spawning child process");
        let status = child
            .status()
            .map_err(|e| RunresError::child(command, e.to_string()))?;

        match status.code() {
            Some(code) => {
                tracing::info!(command, exit_code = code, "Child process exited");
                Ok(code)
            }
            None => Err(RunresError::child(
                command,
                format!("terminated abnormally ({})", status),
            )),
        }
    }
}

/// Split a Windows command line into the program and the verbatim remainder.
///
/// A program path may be wrapped in double quotes. Returns `None` for a blank line.
pub fn split_program(command_line: &str) -> Option<(&str, &str)> {
    let line = command_line.trim_start();
    if line.is_empty() {
        return None;
    }

    let (program, rest) = if let Some(quoted) = line.strip_prefix('"') {
        match quoted.find('"') {
            Some(end) => (&quoted[..end], &quoted[end + 1..]),
            None => (quoted, ""),
        }
    } else {
        match line.find(char::is_whitespace) {
            Some(end) => (&line[..end], &line[end..]),
            None => (line, ""),
        }
    };

    if program.is_empty() {
        return None;
    }
    Some((program, rest.trim_start()))
}

#[cfg(windows)]
fn build_command(command_line: &str) -> Result<Command, RunresError> {
    use std::os::windows::process::CommandExt;

    let (program, args) =
        split_program(command_line).ok_or_else(|| RunresError::child(command_line, "empty command"))?;

    let mut command = Command::new(program);
    if !args.is_empty() {
        command.raw_arg(args);
    }
    Ok(command)
}

#[cfg(not(windows))]
fn build_command(command_line: &str) -> Result<Command, RunresError> {
    if command_line.trim().is_empty() {
        return Err(RunresError::child(command_line, "empty command"));
    }

    let mut command = Command::new("sh");
    command.arg("-c").arg(command_line);
    Ok(command)
}
