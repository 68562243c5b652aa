//! Setting definitions and the environment-over-default resolver.
//!
//! Pure functions only: no I/O. Environment access goes through the
//! [`EnvSource`] trait so the process environment can be swapped for a map.

use std::collections::HashMap;

use anyhow::Result;
use serde::Serialize;

use crate::domain::error::ConfigError;

// ── Setting table ────────────────────────────────────────────────────────────

/// Static description of one named setting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SettingSpec {
    /// Setting name, also the environment variable consulted.
    pub name: &'static str,
    /// Built-in default used when the environment does not provide a value.
    pub default: Option<&'static str>,
    /// Whether startup fails when the setting resolves to unset.
    pub required: bool,
    /// Child-process environment variable the resolved value is exported as.
    pub export_as: Option<&'static str>,
}

pub const DOMAIN: &str = "DOMAIN";
pub const RPM_URI: &str = "RPM_URI";
pub const RPM_NAME: &str = "RPM_NAME";
pub const PUPPET_MASTER: &str = "PUPPET_MASTER";
pub const VRF: &str = "VRF";
pub const PROXY: &str = "PROXY";
pub const PROXY_SECURE: &str = "PROXY_SECURE";
pub const DNS: &str = "DNS";
pub const RPM_GPG_KEY: &str = "RPM_GPG_KEY";
pub const PUPPET_BINARY: &str = "PUPPET_BINARY";

pub const DEFAULT_VRF: &str = "management";
pub const DEFAULT_PUPPET_BINARY: &str = "/opt/puppetlabs/puppet/bin/puppet";

/// Every setting the bootstrap understands, in display order.
pub const SETTINGS: &[SettingSpec] = &[
    SettingSpec { name: DOMAIN, default: None, required: true, export_as: None },
    SettingSpec { name: RPM_URI, default: None, required: true, export_as: None },
    SettingSpec { name: RPM_NAME, default: None, required: true, export_as: None },
    SettingSpec { name: PUPPET_MASTER, default: None, required: true, export_as: None },
    SettingSpec { name: VRF, default: Some(DEFAULT_VRF), required: false, export_as: None },
    SettingSpec { name: PROXY, default: None, required: false, export_as: Some("http_proxy") },
    SettingSpec {
        name: PROXY_SECURE,
        default: None,
        required: false,
        export_as: Some("https_proxy"),
    },
    SettingSpec { name: DNS, default: None, required: false, export_as: None },
    SettingSpec { name: RPM_GPG_KEY, default: None, required: false, export_as: None },
    SettingSpec {
        name: PUPPET_BINARY,
        default: Some(DEFAULT_PUPPET_BINARY),
        required: false,
        export_as: None,
    },
];

/// Looks up a setting by name.
///
/// # Errors
///
/// Returns [`ConfigError::UnknownSetting`] if the name is not in [`SETTINGS`].
pub fn lookup(name: &str) -> Result<&'static SettingSpec> {
    SETTINGS.iter().find(|s| s.name == name).ok_or_else(|| {
        ConfigError::UnknownSetting {
            key: name.to_string(),
            valid: SETTINGS.iter().map(|s| s.name).collect::<Vec<_>>().join(", "),
        }
        .into()
    })
}

// ── Environment source ───────────────────────────────────────────────────────

/// Read-only view of an environment.
pub trait EnvSource {
    /// Value of `name`, or `None` if it is not set.
    fn var(&self, name: &str) -> Option<String>;
}

impl EnvSource for HashMap<String, String> {
    fn var(&self, name: &str) -> Option<String> {
        self.get(name).cloned()
    }
}

impl EnvSource for HashMap<&str, &str> {
    fn var(&self, name: &str) -> Option<String> {
        self.get(name).map(|v| (*v).to_string())
    }
}

// ── Resolution ───────────────────────────────────────────────────────────────

/// Where an effective value came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Provenance {
    Env,
    Default,
    Unset,
}

/// A setting after precedence resolution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EffectiveSetting {
    pub name: String,
    pub value: Option<String>,
    pub source: Provenance,
}

/// Resolves one setting: a non-empty override wins, then a non-empty default,
/// otherwise the setting is unset.
#[must_use]
pub fn resolve(name: &str, override_value: Option<&str>, default: Option<&str>) -> EffectiveSetting {
    let (value, source) = match (non_empty(override_value), non_empty(default)) {
        (Some(v), _) => (Some(v.to_string()), Provenance::Env),
        (None, Some(d)) => (Some(d.to_string()), Provenance::Default),
        (None, None) => (None, Provenance::Unset),
    };
    EffectiveSetting { name: name.to_string(), value, source }
}

/// Resolves a table entry against an environment.
#[must_use]
pub fn resolve_spec(spec: &SettingSpec, env: &impl EnvSource) -> EffectiveSetting {
    resolve(spec.name, env.var(spec.name).as_deref(), spec.default)
}

/// Resolves every entry of [`SETTINGS`], in table order.
#[must_use]
pub fn resolve_all(env: &impl EnvSource) -> Vec<EffectiveSetting> {
    SETTINGS.iter().map(|spec| resolve_spec(spec, env)).collect()
}

/// Child-process variables for every exported setting that resolves to a value.
#[must_use]
pub fn exports(env: &impl EnvSource) -> Vec<(String, String)> {
    SETTINGS
        .iter()
        .filter_map(|spec| {
            let var = spec.export_as?;
            let value = resolve_spec(spec, env).value?;
            Some((var.to_string(), value))
        })
        .collect()
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

// ── Unit tests ───────────────────────────────────────────────────────────────
