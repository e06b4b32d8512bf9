//! Configuration for mylang serialization runs
//!
//! Every field has a default, so an empty file (or no file at all) is a
//! valid configuration. Files are TOML or JSON:
//!
//! ```toml
//! [parser]
//! allow_errors = false
//!
//! [serializer]
//! text_policy = "cleaned"   # or "raw"
//! max_depth = 1024
//!
//! [output]
//! pretty = true
//! ```
//!
//! Command line flags are applied on top of the loaded values.

mod loader;

pub use loader::{CONFIG_ENV, ConfigLoader};

use serde::{Deserialize, Serialize};

use crate::parser::ParserConfig;
use crate::serializer::{DEFAULT_MAX_DEPTH, TextPolicy, TreeSerializer};
use crate::{MylangError, Result};

/// Upper bound accepted for `serializer.max_depth`
pub const MAX_DEPTH_CEILING: usize = 4096;

/// Complete run configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub parser: ParserConfig,
    pub serializer: SerializerConfig,
    pub output: OutputConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SerializerConfig {
    pub text_policy: TextPolicy,
    pub max_depth: usize,
}

impl Default for SerializerConfig {
    fn default() -> Self {
        Self {
            text_policy: TextPolicy::default(),
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl SerializerConfig {
    pub fn build(&self) -> TreeSerializer {
        TreeSerializer::new(self.text_policy).with_max_depth(self.max_depth)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OutputConfig {
    /// Pretty-print the JSON document
    pub pretty: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self { pretty: true }
    }
}

impl Config {
    /// Check value ranges that serde cannot express
    pub fn validate(&self) -> Result<()> {
        let depth = self.serializer.max_depth;
        if depth == 0 || depth > MAX_DEPTH_CEILING {
            return Err(MylangError::config_error(format!(
                "serializer.max_depth must be between 1 and {MAX_DEPTH_CEILING}, got {depth}"
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert!(!config.parser.allow_errors);
        assert_eq!(config.serializer.text_policy, TextPolicy::Cleaned);
        assert_eq!(config.serializer.max_depth, 1024);
        assert!(config.output.pretty);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_keeps_other_defaults() {
        let config: Config = toml::from_str("[serializer]\ntext_policy = \"raw\"\n").unwrap();
        assert_eq!(config.serializer.text_policy, TextPolicy::Raw);
        assert_eq!(config.serializer.max_depth, DEFAULT_MAX_DEPTH);
        assert!(config.output.pretty);
    }

    #[test]
    fn test_unknown_keys_are_rejected() {
        assert!(toml::from_str::<Config>("[serializer]\npolicy = \"raw\"\n").is_err());
        assert!(toml::from_str::<Config>("[writer]\n").is_err());
    }

    #[test]
    fn test_validate_depth_range() {
        let mut config = Config::default();
        config.serializer.max_depth = 0;
        assert!(config.validate().is_err());

        config.serializer.max_depth = MAX_DEPTH_CEILING + 1;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("serializer.max_depth"));

        config.serializer.max_depth = MAX_DEPTH_CEILING;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_build_serializer() {
        let serializer = SerializerConfig {
            text_policy: TextPolicy::Raw,
            max_depth: 7,
        }
        .build();
        assert_eq!(serializer.policy(), TextPolicy::Raw);
        assert_eq!(serializer.max_depth(), 7);
    }
}
