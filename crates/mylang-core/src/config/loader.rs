//! Configuration file loading

use std::fs;
use std::path::Path;

use super::Config;
use crate::{MylangError, Result};

/// Environment variable naming a configuration file
pub const CONFIG_ENV: &str = "MYLANG_CONFIG";

/// Loads [`Config`] values from files
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from a specific file
    ///
    /// Supports TOML (.toml) and JSON (.json) formats. The result is
    /// validated before it is returned.
    pub fn load_from_file(path: &Path) -> Result<Config> {
        let content =
            fs::read_to_string(path).map_err(|err| MylangError::io_error(path, err))?;

        let config: Config = match path.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => toml::from_str(&content).map_err(|e| {
                MylangError::config_error(format!(
                    "Failed to load config from '{}': {e}",
                    path.display()
                ))
            })?,
            Some("json") => serde_json::from_str(&content).map_err(|e| {
                MylangError::config_error(format!(
                    "Failed to load config from '{}': {e}",
                    path.display()
                ))
            })?,
            _ => {
                return Err(MylangError::config_error(format!(
                    "Unsupported config file '{}' (expected .toml or .json)",
                    path.display()
                )));
            }
        };

        config.validate()?;
        tracing::debug!("Loaded config: {}", path.display());
        Ok(config)
    }

    /// Load from `custom_path` if given, defaults otherwise
    pub fn load(custom_path: Option<&Path>) -> Result<Config> {
        match custom_path {
            Some(path) => Self::load_from_file(path),
            None => Ok(Config::default()),
        }
    }
}
