//! File-backed implementation of the `Transcript` port.

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{Local, Timelike};

use crate::application::ports::Transcript;

/// Base name of the transcript file; a `.H_M_S` suffix is appended per run.
pub const TRANSCRIPT_BASENAME: &str = "puppet_agent_install.log";

/// Appends entries to a timestamped file opened once per run.
pub struct FileTranscript {
    path: PathBuf,
    file: File,
}

impl FileTranscript {
    /// Create `<dir>/puppet_agent_install.log.<H>_<M>_<S>` for this run.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory or file cannot be created.
    pub fn create(dir: &Path) -> Result<Self> {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("cannot create log directory {}", dir.display()))?;
        Self::open(dir.join(transcript_name(&Local::now())))
    }

    /// Open (or create) `path` for appending.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened.
    pub fn open(path: PathBuf) -> Result<Self> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .with_context(|| format!("cannot open transcript {}", path.display()))?;
        Ok(Self { path, file })
    }
}

impl Transcript for FileTranscript {
    fn record(&self, entry: &str) -> Result<()> {
        let mut file = &self.file;
        writeln!(file, "{entry}")
            .and_then(|()| file.flush())
            .with_context(|| format!("cannot write transcript {}", self.path.display()))
    }

    fn location(&self) -> Option<&Path> {
        Some(&self.path)
    }
}

/// `puppet_agent_install.log.<H>_<M>_<S>`, without zero padding.
#[must_use]
pub fn transcript_name(at: &impl Timelike) -> String {
    format!(
        "{TRANSCRIPT_BASENAME}.{}_{}_{}",
        at.hour(),
        at.minute(),
        at.second()
    )
}
