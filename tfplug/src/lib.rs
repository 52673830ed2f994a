//! tfplug - Terraform Plugin Framework for Rust
//!
//! Value model, schemas, handler traits and an in-process host for building
//! Terraform providers in Rust. The plugin wire protocol lives outside this
//! crate; it drives providers through `Registry` and `Host`.

// Core modules
pub mod context;
pub mod error;
pub mod schema;
pub mod types;

// Provider API modules
pub mod data_source;
pub mod provider;
pub mod resource;

// Helper modules
pub mod host;
pub mod import;
pub mod validator;

// Re-exports for convenience
pub use context::Context;
pub use data_source::DataSource;
pub use error::{Result, TfplugError};
pub use host::Host;
pub use import::{import_state_composite_id, import_state_passthrough_id};
pub use provider::{Provider, Registry, RegistryBuilder};
pub use resource::Resource;
pub use schema::{AttributeBuilder, AttributeType, BlockBuilder, NestedBlock, Schema, SchemaBuilder};
pub use types::{AttributePath, Diagnostic, DiagnosticSeverity, Dynamic, DynamicValue};
