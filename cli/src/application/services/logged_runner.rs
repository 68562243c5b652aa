//! Application service: run a command line and record it in the transcript.
//!
//! Imports only from `crate::domain` and `crate::application::ports`.

use anyhow::{Context, Result};

use crate::application::ports::{CommandRunner, Transcript};
use crate::domain::command::{self, CommandResult};

/// Runs shell-style command lines through a [`CommandRunner`] and appends
/// every invocation to a [`Transcript`] before returning.
pub struct LoggedRunner<'a, R: CommandRunner, T: Transcript> {
    runner: &'a R,
    transcript: &'a T,
}

impl<'a, R: CommandRunner, T: Transcript> LoggedRunner<'a, R, T> {
    #[must_use]
    pub fn new(runner: &'a R, transcript: &'a T) -> Self {
        Self { runner, transcript }
    }

    /// Tokenize, execute and classify `command_line`.
    ///
    /// Spawn failures and timeouts are reported as [`Outcome::Failure`](crate::domain::command::Outcome::Failure), the
    /// same as a non-zero exit.
    ///
    /// # Errors
    ///
    /// Returns an error if the line cannot be tokenized (nothing is spawned)
    /// or the transcript cannot be written.
    pub async fn run(&self, command_line: &str) -> Result<CommandResult> {
        let words = match command::tokenize(command_line) {
            Ok(words) => words,
            Err(e) => {
                self.record(command_line, &command::failure_text("", &e.to_string()))?;
                return Err(e);
            }
        };
        let (program, args) = words
            .split_first()
            .context("tokenize returned no words")?;
        let args: Vec<&str> = args.iter().map(String::as_str).collect();

        tracing::debug!(command = command_line, "running");
        let result = match self.runner.run(program, &args).await {
            Ok(output) => CommandResult::from_exit(
                command_line,
                output.status.code(),
                String::from_utf8_lossy(&output.stdout).into_owned(),
                String::from_utf8_lossy(&output.stderr).into_owned(),
            ),
            Err(e) => CommandResult::not_run(command_line, &format!("{e:#}")),
        };
        tracing::debug!(
            command = command_line,
            exit_code = ?result.exit_code,
            success = result.is_success(),
            "finished"
        );

        self.record(command_line, result.legacy_string())?;
        Ok(result)
    }

    /// Append a free-form line to the transcript.
    ///
    /// # Errors
    ///
    /// Returns an error if the transcript cannot be written.
    pub fn note(&self, message: &str) -> Result<()> {
        tracing::info!("{message}");
        self.transcript.record(message).context("writing transcript entry")
    }

    fn record(&self, command_line: &str, body: &str) -> Result<()> {
        let entry = if body.is_empty() {
            format!("$ {command_line}")
        } else {
            format!("$ {command_line}\n{body}")
        };
        self.transcript
            .record(&entry)
            .context("writing transcript entry")
    }
}
