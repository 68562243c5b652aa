//! `nxbootstrap run`: provision the Puppet agent on this device.

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use anyhow::Result;
use clap::Args;

use crate::app::AppContext;
use crate::application::ports::Transcript;
use crate::application::services::logged_runner::LoggedRunner;
use crate::application::services::provision;
use crate::domain::config::{
    BootstrapConfig, DEFAULT_LOG_DIR, DEFAULT_STAGING_DIR, RunOptions, Target,
};
use crate::domain::error::ProvisionError;
use crate::infra::command_runner::TokioCommandRunner;
use crate::infra::env::ProcessEnv;
use crate::infra::fs::StagingDir;
use crate::infra::transcript::FileTranscript;
use crate::output::{OutputContext, json};

/// Arguments for the run command.
#[derive(Args)]
pub struct RunArgs {
    /// Where agent commands execute: native or guestshell
    #[arg(long, default_value = "native", env = "NXBOOTSTRAP_TARGET")]
    pub target: Target,

    /// Directory for staged copies of generated files
    #[arg(long, default_value = DEFAULT_STAGING_DIR, env = "NXBOOTSTRAP_STAGING_DIR")]
    pub staging_dir: PathBuf,

    /// Directory for the run transcript
    #[arg(long, default_value = DEFAULT_LOG_DIR, env = "NXBOOTSTRAP_LOG_DIR")]
    pub log_dir: PathBuf,

    /// Kill any single command after this many seconds [default: no limit]
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Run privileged commands outside any VRF, ignoring the VRF setting
    #[arg(long)]
    pub no_vrf: bool,
}

/// Run `nxbootstrap run`.
///
/// An unreachable master or package repository ends the run early with a
/// warning and a zero exit code.
///
/// # Errors
///
/// Returns an error if required settings are missing, the transcript cannot
/// be created, or a step the rest of the pipeline depends on fails.
pub async fn run(args: &RunArgs, app: &AppContext) -> Result<ExitCode> {
    let transcript = FileTranscript::create(&args.log_dir)?;

    let options = RunOptions {
        target: args.target,
        staging_dir: args.staging_dir.clone(),
        timeout: args.timeout.map(Duration::from_secs),
        no_vrf: args.no_vrf,
    };
    let config = match BootstrapConfig::from_env(&ProcessEnv, options) {
        Ok(config) => config,
        Err(e) => {
            // The configuration error is what gets reported; a failed write is not.
            let _ = transcript.record(&format!("Configuration error: {e:#}"));
            if !app.is_json() {
                print_transcript_location(&transcript, &app.output);
            }
            return Err(e);
        }
    };

    let prompt = format!(
        "Install {} and register with {}?",
        config.package_name, config.master
    );
    if !app.confirm(&prompt, true)? {
        transcript.record("Aborted by operator")?;
        app.output.info("Aborted.");
        return Ok(ExitCode::SUCCESS);
    }

    let runner = TokioCommandRunner::new(config.timeout, config.child_env());
    let logged = LoggedRunner::new(&runner, &transcript);
    let stager = StagingDir::new(&config.staging_dir);
    let reporter = app.terminal_reporter();

    tracing::info!(master = %config.master, target = ?config.target, "starting provisioning");
    match provision::provision(&config, &logged, &stager, &reporter).await {
        Ok(report) => {
            if app.is_json() {
                println!("{}", json::format_run_summary(&report, transcript.location())?);
            } else {
                print_transcript_location(&transcript, &app.output);
            }
            Ok(ExitCode::SUCCESS)
        }
        Err(e) => match e.downcast_ref::<ProvisionError>() {
            Some(ProvisionError::Unreachable {
                target,
                message,
                completed,
            }) => {
                if app.is_json() {
                    let summary = json::format_unreachable_summary(
                        target,
                        message,
                        completed,
                        transcript.location(),
                    )?;
                    println!("{summary}");
                } else {
                    app.output.warn(message);
                    app.output.kv("Unreachable", target);
                    print_transcript_location(&transcript, &app.output);
                }
                Ok(ExitCode::SUCCESS)
            }
            _ => {
                // The transcript write may be what failed.
                let _ = logged.note(&format!("Provisioning aborted: {e:#}"));
                if !app.is_json() {
                    print_transcript_location(&transcript, &app.output);
                }
                Err(e)
            }
        },
    }
}

fn print_transcript_location(transcript: &impl Transcript, ctx: &OutputContext) {
    if let Some(path) = transcript.location() {
        ctx.transcript(path);
    }
}
