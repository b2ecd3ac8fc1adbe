//! Configuration loading
//!
//! The configuration is read once at startup. JSON (`{"interface": "can0"}`)
//! is the default format; files ending in `.toml` are parsed as TOML.

use anyhow::{Context, Result};
use can_drive_core::ControlConfig;
use std::fs;
use std::path::Path;

/// Configuration file looked up when none is given
pub const DEFAULT_CONFIG_FILE: &str = "can_config.json";

/// Load configuration from a JSON or TOML file
pub fn load_config(path: &Path) -> Result<ControlConfig> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;

    let is_toml = path
        .extension()
        .and_then(|s| s.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("toml"));

    let config: ControlConfig = if is_toml {
        toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {:?}", path))?
    } else {
        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {:?}", path))?
    };

    Ok(config)
}

/// Load configuration, falling back to defaults if the file is absent or unreadable
pub fn load_config_or_default(path: &Path) -> ControlConfig {
    match load_config(path) {
        Ok(config) => {
            log::debug!("Configuration loaded from {:?}", path);
            config
        }
        Err(e) => {
            let config = ControlConfig::default();
            log::warn!("{:#}; using defaults (interface '{}')", e, config.interface);
            config
        }
    }
}
