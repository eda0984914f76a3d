//! Storage encoding for Supergiant entities.
//!
//! Fields declared with `store_as_json_in` are persisted as JSON blobs in
//! their mirror column. A config group (several mutually exclusive variant
//! fields) persists the selected variant's blob plus a discriminator naming
//! that variant, so the typed variant can be recovered on read even though
//! the blob itself carries no type information.
//!
//! - [`ConfigCodec`]: encode/decode of single blobs and config variants
//! - [`StoredEntity`]: the persisted representation of an entity
//! - [`select`]: which variant of a group an entity has populated

mod codec;
mod discriminator;
mod error;
mod stored;

pub use codec::{CodecConfig, ConfigCodec, DEFAULT_MAX_BLOB_BYTES};
pub use discriminator::{Selection, select, variant_names};
pub use error::{CodecError, CodecResult};
pub use stored::{Loaded, StoredEntity};
