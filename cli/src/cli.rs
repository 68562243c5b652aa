//! CLI argument parsing with clap derive

use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::app::{AppContext, AppFlags};
use crate::commands;
use crate::output::json;

/// Provision and register a Puppet agent on network devices
#[derive(Parser)]
#[command(
    name = "nxbootstrap",
    version,
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    /// Output in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress non-error output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true, env = "NO_COLOR")]
    pub no_color: bool,

    /// Skip confirmation prompts
    #[arg(short, long, global = true)]
    pub yes: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Configure DNS, install the agent and register it with the master
    Run(commands::run::RunArgs),

    /// Show effective settings and where each value came from
    Settings(commands::settings::SettingsArgs),

    /// Run one command line and print its result
    Exec(commands::exec::ExecArgs),

    /// Show version
    Version,
}

impl Cli {
    /// Execute the CLI command.
    ///
    /// # Errors
    ///
    /// Returns an error if the command fails.
    pub async fn run(self) -> Result<ExitCode> {
        let Cli {
            json,
            quiet,
            no_color,
            yes,
            command,
        } = self;
        let app = AppContext::new(&AppFlags {
            no_color,
            quiet,
            json,
            yes,
        });
        let result = match command {
            Command::Run(args) => commands::run::run(&args, &app).await,
            Command::Settings(args) => commands::settings::run(&args, &app),
            Command::Exec(args) => commands::exec::run(&args, &app).await,
            Command::Version => {
                commands::version::run(app.is_json());
                Ok(ExitCode::SUCCESS)
            }
        };
        match result {
            Err(e) if app.is_json() => {
                println!("{}", json::format_error(&format!("{e:#}"), json::error_code(&e))?);
                Ok(ExitCode::FAILURE)
            }
            other => other,
        }
    }
}
