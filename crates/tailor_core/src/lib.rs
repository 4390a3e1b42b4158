//! tailor_core - OpenAPI 3.0 document model
//!
//! Plain serializable structures for the document `tailor` emits. Field
//! declaration order is the emitted key order, so reordering fields here changes
//! the generated YAML.

pub mod openapi;
pub mod route;
pub mod schema;

pub use openapi::OpenApi;
pub use schema::{Attributes, Schema};
