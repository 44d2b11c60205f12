//! CLI command implementations

pub mod config;
pub mod doctor;
pub mod keys;
pub mod providers;
pub mod results;
pub mod run;

use anyhow::{Context, Result};
use scrim_core::ScrimSettings;
use std::path::Path;

/// Settings file plus `SCRIM_*` overrides
pub(crate) fn load_settings(path: &Path) -> Result<ScrimSettings> {
    ScrimSettings::resolve(path)
        .with_context(|| format!("Failed to load settings from {}", path.display()))
}
