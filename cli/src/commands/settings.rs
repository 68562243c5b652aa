//! `nxbootstrap settings`: show effective settings and their provenance.

use std::process::ExitCode;

use anyhow::Result;
use clap::Args;

use crate::app::AppContext;
use crate::domain::settings;
use crate::infra::env::ProcessEnv;
use crate::output::json;

/// Arguments for the settings command.
#[derive(Args, Default)]
pub struct SettingsArgs {
    /// Show a single setting (e.g. `PUPPET_MASTER`)
    pub name: Option<String>,
}

/// Run `nxbootstrap settings`.
///
/// # Errors
///
/// Returns an error if `name` is not a known setting.
pub fn run(args: &SettingsArgs, app: &AppContext) -> Result<ExitCode> {
    let effective = match args.name.as_deref() {
        Some(name) => vec![settings::resolve_spec(settings::lookup(name)?, &ProcessEnv)],
        None => settings::resolve_all(&ProcessEnv),
    };

    if app.is_json() {
        println!("{}", json::to_pretty(&effective)?);
        return Ok(ExitCode::SUCCESS);
    }

    let width = effective.iter().map(|s| s.name.len()).max().unwrap_or(0);
    for setting in &effective {
        app.output.setting(setting, width);
    }
    Ok(ExitCode::SUCCESS)
}
