//! Port trait definitions for the Application layer.
//!
//! Ports are the interfaces (contracts) that infrastructure must fulfill.
//! This file imports only from `crate::domain` and never from `crate::infra`,
//! `crate::commands`, or `crate::output`.

use std::path::{Path, PathBuf};
use std::process::Output;

use anyhow::Result;

// ── Command Runner Port ───────────────────────────────────────────────────────

/// Abstracts process execution so infrastructure can be swapped or mocked.
#[allow(async_fn_in_trait)]
pub trait CommandRunner {
    /// Run a program and capture its output.
    ///
    /// Implementations apply their configured default timeout, if any.
    async fn run(&self, program: &str, args: &[&str]) -> Result<Output>;
}

// ── Transcript Port ───────────────────────────────────────────────────────────

/// Append-only log sink recording every command and its output.
pub trait Transcript {
    /// Append one entry. Entries are flushed before this returns.
    fn record(&self, entry: &str) -> Result<()>;
    /// Where the transcript lives, if it is backed by a file.
    fn location(&self) -> Option<&Path>;
}

// ── File Staging Port ─────────────────────────────────────────────────────────

/// Writes generated files to a local staging area before they are copied
/// into place with elevated privileges.
pub trait FileStager {
    /// Write `contents` to a new staged file whose name starts with `name`.
    fn stage(&self, name: &str, contents: &str) -> Result<PathBuf>;
    /// Remove a staged file.
    fn discard(&self, path: &Path) -> Result<()>;
}

// ── Progress Reporting Port ───────────────────────────────────────────────────

/// Abstracts progress reporting so services can emit events without
/// depending on the Presentation layer. Sync trait, no async needed.
pub trait ProgressReporter {
    /// Emit an in-progress step message.
    fn step(&self, message: &str);
    /// Emit a success message.
    fn success(&self, message: &str);
    /// Emit a warning message.
    fn warn(&self, message: &str);
}
