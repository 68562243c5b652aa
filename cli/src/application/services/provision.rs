//! Application service: the agent provisioning pipeline.
//!
//! Imports only from `crate::domain` and `crate::application::ports`.
//! Every external command goes through [`LoggedRunner`], so each step lands in
//! the transcript. Steps run strictly in order and nothing is retried.

use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;

use crate::application::ports::{CommandRunner, FileStager, ProgressReporter, Transcript};
use crate::application::services::logged_runner::LoggedRunner;
use crate::domain::command::CommandResult;
use crate::domain::config::BootstrapConfig;
use crate::domain::error::ProvisionError;
use crate::domain::render::{self, PUPPET_SYMLINK, RESOLV_CONF_PATH};
pub use crate::domain::step::Step;

/// Agent exit codes treated as a successful first run (`--detailed-exitcodes`
/// reports 2 when changes were applied).
const AGENT_OK_CODES: &[i32] = &[0, 2];

/// What a finished run did.
#[derive(Debug, Default, Serialize)]
pub struct ProvisionReport {
    /// Steps that ran, in order. Skipped steps are absent.
    pub completed: Vec<Step>,
    /// Non-fatal problems encountered along the way.
    pub warnings: Vec<String>,
}

/// Run the full pipeline.
///
/// # Errors
///
/// Returns [`ProvisionError::Unreachable`] when a reachability check fails,
/// [`ProvisionError::StepFailed`] when a step later steps depend on fails,
/// and I/O errors from staging or the transcript.
pub async fn provision<R: CommandRunner, T: Transcript>(
    config: &BootstrapConfig,
    runner: &LoggedRunner<'_, R, T>,
    stager: &impl FileStager,
    reporter: &impl ProgressReporter,
) -> Result<ProvisionReport> {
    let mut report = ProvisionReport::default();

    reporter.step("configuring DNS resolver...");
    if configure_resolver(config, runner, stager).await? {
        report.completed.push(Step::Resolver);
    }

    reporter.step(&format!("verifying reachability of {}...", config.master));
    verify_network(config, runner, &report.completed).await?;
    report.completed.push(Step::Reachability);

    if let Some(key) = config.gpg_key.as_deref() {
        reporter.step("importing package signing key...");
        if let Some(warning) = import_gpg_key(config, runner, key).await? {
            reporter.warn(&warning);
            report.warnings.push(warning);
        }
        report.completed.push(Step::GpgKey);
    }

    reporter.step(&format!("installing {}...", config.package_name));
    install_agent(config, runner).await?;
    report.completed.push(Step::Install);

    reporter.step("writing agent configuration...");
    if let Some(warning) = configure_agent(config, runner, stager).await? {
        reporter.warn(&warning);
        report.warnings.push(warning);
    }
    report.completed.push(Step::Configure);

    reporter.step("starting agent...");
    if let Some(warning) = kickstart_agent(config, runner).await? {
        reporter.warn(&warning);
        report.warnings.push(warning);
    }
    report.completed.push(Step::Kickstart);

    reporter.success("agent provisioned");
    Ok(report)
}

/// Replace `/etc/resolv.conf`. Returns `false`, leaving the existing file in
/// place, when no nameservers are configured.
///
/// # Errors
///
/// Returns [`ProvisionError::StepFailed`] if the staged file cannot be copied
/// into place.
pub async fn configure_resolver<R: CommandRunner, T: Transcript>(
    config: &BootstrapConfig,
    runner: &LoggedRunner<'_, R, T>,
    stager: &impl FileStager,
) -> Result<bool> {
    let Some(contents) = render::resolv_conf(config) else {
        runner.note("No nameservers configured; leaving /etc/resolv.conf untouched")?;
        return Ok(false);
    };

    // A missing file is fine here.
    runner.run(&format!("sudo rm -f {RESOLV_CONF_PATH}")).await?;
    install_file(runner, stager, Step::Resolver, "resolv.conf", &contents, RESOLV_CONF_PATH).await?;
    Ok(true)
}

/// Check the master and the package repository. `completed` is carried in
/// the error so callers can report how far the run got.
///
/// # Errors
///
/// Returns [`ProvisionError::Unreachable`] on the first failed check.
pub async fn verify_network<R: CommandRunner, T: Transcript>(
    config: &BootstrapConfig,
    runner: &LoggedRunner<'_, R, T>,
    completed: &[Step],
) -> Result<()> {
    let ping = runner
        .run(&config.prefixed(&format!("ping -c 5 {}", config.master)))
        .await?;
    if !ping.is_success() {
        return Err(unreachable_target(
            runner,
            &config.master,
            "Failed to ping puppet master",
            completed,
        )?);
    }

    let fetch = runner
        .run(&config.prefixed(&format!("wget -q -O /dev/null {}", config.package_uri)))
        .await?;
    if !fetch.is_success() {
        return Err(unreachable_target(
            runner,
            &config.package_uri,
            "Failed to contact RPM repo",
            completed,
        )?);
    }
    Ok(())
}

/// Import the package signing key. Returns a warning when the import fails.
///
/// # Errors
///
/// Returns an error only if the transcript cannot be written.
pub async fn import_gpg_key<R: CommandRunner, T: Transcript>(
    config: &BootstrapConfig,
    runner: &LoggedRunner<'_, R, T>,
    key: &str,
) -> Result<Option<String>> {
    let result = runner.run(&config.prefixed(&format!("rpm --import {key}"))).await?;
    Ok((!result.is_success()).then(|| format!("could not import GPG key {key}")))
}

/// Install the agent package.
///
/// # Errors
///
/// Returns [`ProvisionError::StepFailed`] if the package manager fails.
pub async fn install_agent<R: CommandRunner, T: Transcript>(
    config: &BootstrapConfig,
    runner: &LoggedRunner<'_, R, T>,
) -> Result<()> {
    let result = runner
        .run(&config.prefixed(&format!("yum install -y {}", config.package_url())))
        .await?;
    require(&result, Step::Install)?;
    Ok(())
}

/// Write the agent configuration and link the agent binary onto `PATH`.
/// Returns a warning when the link cannot be created.
///
/// # Errors
///
/// Returns [`ProvisionError::StepFailed`] if the config path or host name
/// cannot be determined, or the staged config cannot be copied into place.
pub async fn configure_agent<R: CommandRunner, T: Transcript>(
    config: &BootstrapConfig,
    runner: &LoggedRunner<'_, R, T>,
    stager: &impl FileStager,
) -> Result<Option<String>> {
    let config_path = runner
        .run(&format!("sudo {} agent --configprint config", config.puppet_binary))
        .await?;
    let config_path = require(&config_path, Step::Configure)?.to_string();

    let hostname = runner.run("hostname").await?;
    let hostname = require(&hostname, Step::Configure)?.to_string();

    let contents = render::agent_conf(config, &hostname);
    install_file(runner, stager, Step::Configure, "puppet.conf", &contents, &config_path).await?;

    let link = runner
        .run(&format!("sudo ln -sf {} {PUPPET_SYMLINK}", config.puppet_binary))
        .await?;
    Ok((!link.is_success()).then(|| format!("could not link {PUPPET_SYMLINK}")))
}

/// Run the agent once so it registers with the master. Returns a warning
/// when the agent reports failures.
///
/// # Errors
///
/// Returns an error only if the transcript cannot be written.
pub async fn kickstart_agent<R: CommandRunner, T: Transcript>(
    config: &BootstrapConfig,
    runner: &LoggedRunner<'_, R, T>,
) -> Result<Option<String>> {
    let result = runner
        .run(&config.prefixed(&format!("{} agent -t", config.puppet_binary)))
        .await?;
    let started = result
        .exit_code
        .is_some_and(|code| AGENT_OK_CODES.contains(&code));
    if started {
        return Ok(None);
    }
    let warning = "Agent did not start properly. Check the transcript for details".to_string();
    runner.note(&warning)?;
    Ok(Some(warning))
}

// ── Helpers ───────────────────────────────────────────────────────────────────

/// Stage `contents`, copy it to `target` with sudo, then drop the staged copy.
/// A failed copy is reported ahead of a failed discard.
async fn install_file<R: CommandRunner, T: Transcript>(
    runner: &LoggedRunner<'_, R, T>,
    stager: &impl FileStager,
    step: Step,
    name: &str,
    contents: &str,
    target: &str,
) -> Result<()> {
    let staged = stager
        .stage(name, contents)
        .with_context(|| format!("staging {name}"))?;
    let copy = runner
        .run(&format!("sudo cp {} {target}", shell_path(&staged)))
        .await;
    let discarded = stager.discard(&staged);
    require(&copy?, step)?;
    discarded
}

fn shell_path(path: &Path) -> String {
    shlex::try_quote(&path.to_string_lossy())
        .map_or_else(|_| path.display().to_string(), std::borrow::Cow::into_owned)
}

fn require(result: &CommandResult, step: Step) -> Result<&str, ProvisionError> {
    match result.output() {
        Some(out) => Ok(out),
        None => Err(ProvisionError::StepFailed {
            step: step.to_string(),
            detail: result.legacy_string().to_string(),
        }),
    }
}

fn unreachable_target<R: CommandRunner, T: Transcript>(
    runner: &LoggedRunner<'_, R, T>,
    target: &str,
    message: &str,
    completed: &[Step],
) -> Result<anyhow::Error> {
    runner.note(message)?;
    Ok(ProvisionError::Unreachable {
        target: target.to_string(),
        message: message.to_string(),
        completed: completed.to_vec(),
    }
    .into())
}
