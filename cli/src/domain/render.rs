//! Renderers for the files written on the device.

use crate::domain::config::BootstrapConfig;

pub const RESOLV_CONF_PATH: &str = "/etc/resolv.conf";
pub const PUPPET_SYMLINK: &str = "/usr/bin/puppet";

/// Contents of `/etc/resolv.conf`, or `None` when no nameservers are
/// configured.
#[must_use]
pub fn resolv_conf(config: &BootstrapConfig) -> Option<String> {
    if config.nameservers.is_empty() {
        return None;
    }
    let mut out = String::new();
    for ns in &config.nameservers {
        out.push_str(&format!("nameserver {ns}\n"));
    }
    if !config.domain.is_empty() {
        out.push_str(&format!("domain {}\n", config.domain));
        out.push_str(&format!("search {}\n", config.domain));
    }
    Some(out)
}

/// Contents of the agent's `puppet.conf`.
#[must_use]
pub fn agent_conf(config: &BootstrapConfig, hostname: &str) -> String {
    format!(
        "[main]\ncertname={}\nserver={}\n",
        certname(hostname, &config.domain),
        config.master
    )
}

/// Agent certificate name: the host name qualified with the domain.
#[must_use]
pub fn certname(hostname: &str, domain: &str) -> String {
    let host = hostname.trim();
    if domain.is_empty() || host.ends_with(&format!(".{domain}")) {
        host.to_string()
    } else {
        format!("{host}.{domain}")
    }
}
