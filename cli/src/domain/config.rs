//! Bootstrap configuration, built once at startup and passed to every step.
//!
//! Pure functions only: no I/O, no async, no filesystem access.

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use anyhow::Result;
use serde::Serialize;

use crate::domain::error::ConfigError;
use crate::domain::settings::{self, EffectiveSetting, EnvSource};

// ── Constants ────────────────────────────────────────────────────────────────

pub const DEFAULT_STAGING_DIR: &str = "/bootflash";
pub const DEFAULT_LOG_DIR: &str = "/bootflash";
pub const GUESTSHELL_UTILITY: &str = "/isan/bin/guestshell";

// ── Execution target ─────────────────────────────────────────────────────────

/// Where agent commands execute on the device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Target {
    /// The device's native shell.
    #[default]
    Native,
    /// The isolated guestshell container.
    Guestshell,
}

impl FromStr for Target {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "native" => Ok(Self::Native),
            "guestshell" => Ok(Self::Guestshell),
            other => Err(ConfigError::InvalidTarget(other.to_string())),
        }
    }
}

// ── Run-time options ─────────────────────────────────────────────────────────

/// Knobs that come from CLI flags rather than named settings.
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub target: Target,
    /// Directory for staged copies of generated files.
    pub staging_dir: PathBuf,
    /// Per-command timeout. `None` waits for the child indefinitely.
    pub timeout: Option<Duration>,
    /// Run privileged commands outside any VRF, ignoring the `VRF` setting.
    pub no_vrf: bool,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            target: Target::Native,
            staging_dir: PathBuf::from(DEFAULT_STAGING_DIR),
            timeout: None,
            no_vrf: false,
        }
    }
}

// ── Config ───────────────────────────────────────────────────────────────────

/// Effective configuration for one bootstrap run.
#[derive(Debug, Clone)]
pub struct BootstrapConfig {
    pub domain: String,
    pub package_uri: String,
    pub package_name: String,
    /// Fully qualified master host.
    pub master: String,
    pub vrf: Option<String>,
    pub http_proxy: Option<String>,
    pub https_proxy: Option<String>,
    pub nameservers: Vec<String>,
    pub gpg_key: Option<String>,
    pub puppet_binary: String,
    pub target: Target,
    pub staging_dir: PathBuf,
    pub timeout: Option<Duration>,
}

impl BootstrapConfig {
    /// Resolves every setting against `env` and validates required ones.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingSettings`] listing every required
    /// setting that resolved to unset.
    pub fn from_env(env: &impl EnvSource, opts: RunOptions) -> Result<Self> {
        let resolved = settings::resolve_all(env);

        let missing: Vec<String> = settings::SETTINGS
            .iter()
            .zip(&resolved)
            .filter(|(spec, eff)| spec.required && eff.value.is_none())
            .map(|(spec, _)| spec.name.to_string())
            .collect();
        if !missing.is_empty() {
            return Err(ConfigError::MissingSettings(missing).into());
        }

        let get = |name: &str| -> Option<String> {
            resolved
                .iter()
                .find(|s| s.name == name)
                .and_then(|s: &EffectiveSetting| s.value.clone())
        };
        let required = |name: &str| get(name).unwrap_or_default();

        let domain = required(settings::DOMAIN);
        let master = qualify_host(&required(settings::PUPPET_MASTER), &domain);

        Ok(Self {
            package_uri: required(settings::RPM_URI),
            package_name: required(settings::RPM_NAME),
            master,
            vrf: if opts.no_vrf { None } else { get(settings::VRF) },
            http_proxy: get(settings::PROXY),
            https_proxy: get(settings::PROXY_SECURE),
            nameservers: get(settings::DNS).map(|v| parse_nameservers(&v)).unwrap_or_default(),
            gpg_key: get(settings::RPM_GPG_KEY),
            puppet_binary: get(settings::PUPPET_BINARY)
                .unwrap_or_else(|| settings::DEFAULT_PUPPET_BINARY.to_string()),
            domain,
            target: opts.target,
            staging_dir: opts.staging_dir,
            timeout: opts.timeout,
        })
    }

    /// Full URL of the agent package.
    #[must_use]
    pub fn package_url(&self) -> String {
        format!("{}{}", self.package_uri, self.package_name)
    }

    /// Prefix for privileged commands that must run inside the VRF.
    #[must_use]
    pub fn command_prefix(&self) -> String {
        let vrf = self.vrf.as_deref().filter(|v| !v.is_empty());
        match (self.target, vrf) {
            (Target::Native, None) => "sudo".to_string(),
            (Target::Native, Some(vrf)) => format!("sudo ip netns exec {vrf}"),
            (Target::Guestshell, None) => format!("sudo {GUESTSHELL_UTILITY} sudo"),
            (Target::Guestshell, Some(vrf)) => {
                format!("sudo {GUESTSHELL_UTILITY} sudo chvrf {vrf}")
            }
        }
    }

    /// `command` with [`Self::command_prefix`] in front.
    #[must_use]
    pub fn prefixed(&self, command: &str) -> String {
        format!("{} {command}", self.command_prefix())
    }

    /// Environment variables every child process receives.
    #[must_use]
    pub fn child_env(&self) -> Vec<(String, String)> {
        settings::SETTINGS
            .iter()
            .filter_map(|spec| {
                let var = spec.export_as?;
                let value = match spec.name {
                    settings::PROXY => self.http_proxy.as_ref(),
                    settings::PROXY_SECURE => self.https_proxy.as_ref(),
                    _ => None,
                }?;
                Some((var.to_string(), value.clone()))
            })
            .collect()
    }
}

/// Appends `.domain` to a bare host name.
#[must_use]
pub fn qualify_host(host: &str, domain: &str) -> String {
    if host.contains('.') || domain.is_empty() {
        host.to_string()
    } else {
        format!("{host}.{domain}")
    }
}

/// Splits a nameserver list on commas and whitespace.
#[must_use]
pub fn parse_nameservers(value: &str) -> Vec<String> {
    value
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

// ── Unit tests ───────────────────────────────────────────────────────────────
