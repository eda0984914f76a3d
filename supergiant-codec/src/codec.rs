//! JSON blob encoding for mirrored fields and config variants.
//!
//! The blob alone does not say which variant it holds. The variant is
//! tracked out of band by a discriminator and passed back in on decode.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use supergiant_model::{ConfigVariant, Violations, missing_required, validate_object};

use crate::error::{CodecError, CodecResult};

/// Default upper bound for a single stored blob.
pub const DEFAULT_MAX_BLOB_BYTES: usize = 64 * 1024;

/// Codec settings, usually read from the `[codec]` table of the engine config.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CodecConfig {
    pub max_blob_bytes: usize,
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            max_blob_bytes: DEFAULT_MAX_BLOB_BYTES,
        }
    }
}

/// Encodes and decodes stored blobs.
#[derive(Debug, Clone, Default)]
pub struct ConfigCodec {
    config: CodecConfig,
}

impl ConfigCodec {
    pub fn new(config: CodecConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &CodecConfig {
        &self.config
    }

    /// Serializes a value into its stored form.
    pub fn encode(&self, value: &Value) -> CodecResult<Vec<u8>> {
        let blob = serde_json::to_vec(value)?;
        self.check_size(blob.len())?;
        Ok(blob)
    }

    /// Parses a stored blob back into a value.
    pub fn decode(&self, blob: &[u8]) -> CodecResult<Value> {
        self.check_size(blob.len())?;
        Ok(serde_json::from_slice(blob)?)
    }

    /// Encodes a config variant. The value must be a JSON object.
    pub fn encode_variant(&self, value: &Value) -> CodecResult<Vec<u8>> {
        if !value.is_object() {
            return Err(CodecError::NotAnObject);
        }
        self.encode(value)
    }

    /// Decodes the blob of a known variant and checks it against the
    /// variant's own schema.
    pub fn decode_variant(
        &self,
        blob: &[u8],
        variant: &ConfigVariant,
    ) -> CodecResult<Map<String, Value>> {
        let Value::Object(data) = self.decode(blob)? else {
            return Err(CodecError::NotAnObject);
        };

        let mut violations = missing_required(&variant.schema, &data, "");
        violations.extend(validate_object(&variant.schema, &data, ""));
        if !violations.is_empty() {
            return Err(CodecError::InvalidVariant {
                variant: variant.variant.clone(),
                violations: Violations::from(violations),
            });
        }
        Ok(data)
    }

    fn check_size(&self, size: usize) -> CodecResult<()> {
        let limit = self.config.max_blob_bytes;
        if size > limit {
            return Err(CodecError::TooLarge { size, limit });
        }
        Ok(())
    }
}
