//! `nxbootstrap exec`: run a single command line the way the pipeline does.

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use anyhow::Result;
use clap::Args;

use crate::app::AppContext;
use crate::application::services::logged_runner::LoggedRunner;
use crate::domain::settings;
use crate::infra::command_runner::TokioCommandRunner;
use crate::infra::env::ProcessEnv;
use crate::infra::transcript::FileTranscript;
use crate::output::{json, progress};

/// Arguments for the exec command.
#[derive(Args)]
pub struct ExecArgs {
    /// Command line to run, e.g. "ping -c 5 pm.example.com"
    pub command_line: String,

    /// Directory for the transcript [default: system temp dir]
    #[arg(long, env = "NXBOOTSTRAP_LOG_DIR")]
    pub log_dir: Option<PathBuf>,

    /// Kill the command after this many seconds
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,
}

/// Run `nxbootstrap exec`.
///
/// Prints the command's output on success, or the `FAIL: ...` text on failure.
///
/// # Errors
///
/// Returns an error if the command line cannot be tokenized or the
/// transcript cannot be written.
pub async fn run(args: &ExecArgs, app: &AppContext) -> Result<ExitCode> {
    let log_dir = args.log_dir.clone().unwrap_or_else(std::env::temp_dir);
    let transcript = FileTranscript::create(&log_dir)?;
    let runner = TokioCommandRunner::new(
        args.timeout.map(Duration::from_secs),
        settings::exports(&ProcessEnv),
    );
    let logged = LoggedRunner::new(&runner, &transcript);

    let pb = app
        .output
        .show_progress()
        .then(|| progress::spinner(&format!("running {}", args.command_line)));
    let result = logged.run(&args.command_line).await;
    if let Some(pb) = &pb {
        match &result {
            Ok(r) if r.is_success() => progress::finish_ok(pb, &args.command_line),
            _ => progress::finish_error(pb, &args.command_line),
        }
    }
    let result = result?;

    if app.is_json() {
        println!("{}", json::to_pretty(&result)?);
    } else {
        app.output.command_result(&result);
    }

    Ok(if result.is_success() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
