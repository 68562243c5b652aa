//! JSON output helpers for `--json` mode.

use std::path::Path;

use anyhow::{Context, Result};

use crate::application::services::provision::ProvisionReport;
use crate::domain::error::{CommandError, ConfigError, ProvisionError};
use crate::domain::step::Step;

/// Format a JSON error object.
///
/// Output (pretty-printed):
/// ```json
/// {
///   "error": true,
///   "message": "...",
///   "code": "..."
/// }
/// ```
///
/// # Errors
///
/// Returns an error if JSON serialization fails.
pub fn format_error(message: &str, code: &str) -> Result<String> {
    let obj = serde_json::json!({
        "error": true,
        "message": message,
        "code": code,
    });
    serde_json::to_string_pretty(&obj).context("JSON serialization failed")
}

/// Machine-readable `code` for a top-level error.
#[must_use]
pub fn error_code(e: &anyhow::Error) -> &'static str {
    if e.downcast_ref::<ConfigError>().is_some() {
        "config"
    } else if e.downcast_ref::<CommandError>().is_some() {
        "command"
    } else if e.downcast_ref::<ProvisionError>().is_some() {
        "provision"
    } else {
        "internal"
    }
}

/// Summary object printed by `run --json` after a completed run.
///
/// # Errors
///
/// Returns an error if JSON serialization fails.
pub fn format_run_summary(report: &ProvisionReport, transcript: Option<&Path>) -> Result<String> {
    let obj = serde_json::json!({
        "status": "provisioned",
        "completed": report.completed,
        "warnings": report.warnings,
        "transcript": transcript.map(|p| p.display().to_string()),
    });
    serde_json::to_string_pretty(&obj).context("JSON serialization failed")
}

/// Summary object printed by `run --json` when a reachability check ends the
/// run early. `completed` lists the steps that ran before the check.
///
/// # Errors
///
/// Returns an error if JSON serialization fails.
pub fn format_unreachable_summary(
    target: &str,
    message: &str,
    completed: &[Step],
    transcript: Option<&Path>,
) -> Result<String> {
    let obj = serde_json::json!({
        "status": "unreachable",
        "target": target,
        "message": message,
        "completed": completed,
        "transcript": transcript.map(|p| p.display().to_string()),
    });
    serde_json::to_string_pretty(&obj).context("JSON serialization failed")
}

/// Pretty-print any serializable value.
///
/// # Errors
///
/// Returns an error if JSON serialization fails.
pub fn to_pretty<T: serde::Serialize>(value: &T) -> Result<String> {
    serde_json::to_string_pretty(value).context("JSON serialization failed")
}
