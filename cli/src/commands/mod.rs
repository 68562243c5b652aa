//! Command implementations

pub mod exec;
pub mod run;
pub mod settings;
pub mod version;
