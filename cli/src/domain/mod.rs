//! Domain layer: pure business logic, types, and validation.
//!
//! This module has zero imports from `crate::infra`, `crate::commands`,
//! `crate::application`, `tokio`, `std::fs`, or `std::process`.
//! All functions are synchronous and take data in, returning data out.

pub mod command;
pub mod config;
pub mod error;
pub mod render;
pub mod settings;
pub mod step;

pub use command::{CommandResult, Outcome};
pub use config::{BootstrapConfig, RunOptions, Target};
pub use error::{CommandError, ConfigError, ProvisionError};
pub use settings::{EffectiveSetting, EnvSource, Provenance};
pub use step::Step;
