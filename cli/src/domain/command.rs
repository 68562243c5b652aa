//! Command lines and their classified results.
//!
//! Pure functions only: process execution lives in `crate::infra`.

use anyhow::Result;
use serde::Serialize;

use crate::domain::error::CommandError;

/// Marker that starts the legacy rendering of a failed command.
pub const FAIL_MARKER: &str = "FAIL";

/// Splits a shell-style command line into program and arguments.
///
/// Quoting follows POSIX shell rules; no expansion is performed.
///
/// # Errors
///
/// Returns [`CommandError::Tokenize`] on unbalanced quotes and
/// [`CommandError::Empty`] when the line has no words.
pub fn tokenize(command_line: &str) -> Result<Vec<String>> {
    let words = shlex::split(command_line)
        .ok_or_else(|| CommandError::Tokenize(command_line.to_string()))?;
    if words.is_empty() {
        return Err(CommandError::Empty.into());
    }
    Ok(words)
}

/// Success/failure tag of a finished command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "detail", rename_all = "lowercase")]
pub enum Outcome {
    /// Exit code 0; carries stdout with trailing whitespace removed.
    Success(String),
    /// Anything else; carries the legacy `FAIL: {stdout}{stderr}` text.
    Failure(String),
}

/// Everything known about one command invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommandResult {
    pub command_line: String,
    pub stdout: String,
    pub stderr: String,
    /// `None` when the process never started, timed out, or died by signal.
    pub exit_code: Option<i32>,
    pub outcome: Outcome,
}

impl CommandResult {
    /// Classifies captured output by exit code.
    #[must_use]
    pub fn from_exit(command_line: &str, exit_code: Option<i32>, stdout: String, stderr: String) -> Self {
        let outcome = if exit_code == Some(0) {
            Outcome::Success(stdout.trim_end().to_string())
        } else {
            Outcome::Failure(failure_text(&stdout, &stderr))
        };
        Self {
            command_line: command_line.to_string(),
            stdout,
            stderr,
            exit_code,
            outcome,
        }
    }

    /// Result for a command whose process could not be run to completion.
    #[must_use]
    pub fn not_run(command_line: &str, reason: &str) -> Self {
        Self::from_exit(command_line, None, String::new(), reason.to_string())
    }

    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self.outcome, Outcome::Success(_))
    }

    /// Trimmed stdout on success.
    #[must_use]
    pub fn output(&self) -> Option<&str> {
        match &self.outcome {
            Outcome::Success(out) => Some(out),
            Outcome::Failure(_) => None,
        }
    }

    /// Single-string rendering: trimmed stdout, or the `FAIL: ...` text.
    #[must_use]
    pub fn legacy_string(&self) -> &str {
        match &self.outcome {
            Outcome::Success(out) | Outcome::Failure(out) => out,
        }
    }

    /// Failure text, or `None` on success.
    #[must_use]
    pub fn failure(&self) -> Option<&str> {
        match &self.outcome {
            Outcome::Success(_) => None,
            Outcome::Failure(text) => Some(text),
        }
    }
}

/// Text recorded for a failed command.
#[must_use]
pub fn failure_text(stdout: &str, stderr: &str) -> String {
    format!("{FAIL_MARKER}: {stdout}{stderr}")
}

// ── Unit tests ───────────────────────────────────────────────────────────────
