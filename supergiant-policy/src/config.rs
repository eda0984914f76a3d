//! Engine settings, read from a TOML file such as:
//!
//! ```toml
//! [engine]
//! unknown_fields = "reject"
//!
//! [codec]
//! max_blob_bytes = 65536
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use supergiant_codec::CodecConfig;
use tracing::{info, warn};

use crate::error::ConfigError;

/// What to do with candidate keys the entity type does not declare.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnknownFields {
    /// Report an `unknown_field` policy violation.
    #[default]
    Reject,
    /// Drop the key and log it at debug level.
    Ignore,
}

/// Evaluator settings, the `[engine]` table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EvaluatorConfig {
    pub unknown_fields: UnknownFields,
}

/// Complete engine configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub engine: EvaluatorConfig,
    pub codec: CodecConfig,
}

impl EngineConfig {
    /// Parses a config document. Missing tables and keys take defaults;
    /// unknown values are errors.
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(contents)?)
    }

    /// Reads and parses a config file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&contents)
    }

    /// Loads config from `path`, falling back to defaults when the file is
    /// missing or unusable.
    pub fn load_from(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        if !path.exists() {
            info!("No engine config found at {:?}, using defaults", path);
            return Self::default();
        }

        match Self::from_file(path) {
            Ok(config) => {
                info!("Loaded engine config from {:?}", path);
                config
            }
            Err(e) => {
                warn!("{}. Falling back to default engine config.", e);
                Self::default()
            }
        }
    }
}
