//! Stages of the provisioning pipeline.

use std::fmt;

use serde::Serialize;

/// One stage of the pipeline, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    Resolver,
    Reachability,
    GpgKey,
    Install,
    Configure,
    Kickstart,
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Resolver => "configure resolver",
            Self::Reachability => "verify network",
            Self::GpgKey => "import gpg key",
            Self::Install => "install agent",
            Self::Configure => "configure agent",
            Self::Kickstart => "start agent",
        };
        f.write_str(name)
    }
}
