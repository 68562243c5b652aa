//! Process environment implementation of `EnvSource`.

use crate::domain::settings::EnvSource;

/// Reads the current process environment. Non-UTF-8 values count as unset.
pub struct ProcessEnv;

impl EnvSource for ProcessEnv {
    fn var(&self, name: &str) -> Option<String> {
        std::env::var(name).ok()
    }
}
