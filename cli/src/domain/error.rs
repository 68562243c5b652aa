//! Typed domain error enums.
//!
//! This module has zero imports from `crate::infra`, `crate::commands`,
//! `crate::application`, `tokio`, `std::fs`, or `std::process`.
//! All error types implement `thiserror::Error` and convert to `anyhow::Error`
//! via the `?` operator.

use thiserror::Error;

use crate::domain::step::Step;

// ── Config errors ─────────────────────────────────────────────────────────────

/// Errors raised while building the bootstrap configuration at startup.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Missing required setting(s): {}\n\nExport them before running, e.g. DOMAIN=example.com", .0.join(", "))]
    MissingSettings(Vec<String>),

    #[error("Unknown setting: {key}\n\nValid settings: {valid}")]
    UnknownSetting { key: String, valid: String },

    #[error("Invalid target '{0}': expected 'native' or 'guestshell'")]
    InvalidTarget(String),
}

// ── Command errors ────────────────────────────────────────────────────────────

/// Errors raised before a command line reaches the process runner.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CommandError {
    #[error("Empty command line")]
    Empty,

    #[error("Cannot tokenize command line (unbalanced quotes?): {0}")]
    Tokenize(String),
}

// ── Provisioning errors ───────────────────────────────────────────────────────

/// Errors that stop the provisioning pipeline.
#[derive(Debug, Error)]
pub enum ProvisionError {
    /// A reachability check failed. The run ends early but is not fatal.
    #[error("{message}")]
    Unreachable {
        target: String,
        message: String,
        /// Steps that finished before the check failed.
        completed: Vec<Step>,
    },

    /// A step whose success later steps depend on failed.
    #[error("Step '{step}' failed: {detail}")]
    StepFailed { step: String, detail: String },
}
