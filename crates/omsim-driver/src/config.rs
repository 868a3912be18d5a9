//! Configuration loading.

use std::path::Path;

use tracing::warn;

use crate::error::AppResult;
use omsim_core::SimConfig;

/// Default config location, relative to the working directory.
pub const DEFAULT_CONFIG_PATH: &str = "config/default.toml";

/// Load the simulation config.
///
/// Resolution order: explicit path, `OMSIM_CONFIG` env var, the default
/// location. A missing file falls back to built-in defaults with a
/// warning; a malformed or invalid file is an error.
pub fn load(path: Option<&str>) -> AppResult<SimConfig> {
    let path = path
        .map(str::to_string)
        .or_else(|| std::env::var("OMSIM_CONFIG").ok())
        .unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string());

    let config = if Path::new(&path).exists() {
        from_file(&path)?
    } else {
        warn!(path = %path, "config file not found, using defaults");
        SimConfig::default()
    };
    config.validate()?;
    Ok(config)
}

/// Load the simulation config from a specific file.
pub fn from_file(path: &str) -> AppResult<SimConfig> {
    let raw = std::fs::read_to_string(path)?;
    let config = toml::from_str(&raw)?;
    Ok(config)
}
