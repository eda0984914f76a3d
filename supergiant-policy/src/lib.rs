//! Mutation policy and the prepare facade for Supergiant entities.
//!
//! [`Engine`] composes the pieces for each write:
//!
//! 1. describe the entity type through the shared [`SchemaRegistry`](supergiant_model::SchemaRegistry)
//! 2. apply create or update policy ([`Evaluator`])
//! 3. check format rules, unless policy already refused the write
//! 4. split the result into its [`StoredEntity`](supergiant_codec::StoredEntity)
//!
//! Every violation from every field is returned together.

mod config;
mod engine;
mod error;
mod evaluator;

pub use config::{EngineConfig, EvaluatorConfig, UnknownFields};
pub use engine::{Engine, Prepared};
pub use error::{ConfigError, PrepareError, PrepareResult};
pub use evaluator::{Evaluation, Evaluator};
