//! Tailor - OpenAPI 3.0 documents from Rust types
//!
//! Describe endpoints with [`Operation`], using the same structs the service
//! serializes, collect them in a [`Document`], and emit YAML. Structs opt in
//! with `#[derive(Describe)]`; `serde` renames, skips and flattens are honored.
//!
//! ```
//! use tailor::{Describe, Document, Operation};
//!
//! #[derive(Describe)]
//! pub struct User {
//!     pub id: i64,
//!     pub name: String,
//! }
//!
//! #[derive(Describe)]
//! pub struct ErrorModel {
//!     pub message: String,
//!     pub code: i32,
//! }
//!
//! let mut doc = Document::new("Users", "", "1.0.0");
//! doc.add(
//!     Operation::get("/users", "List users")
//!         .returns::<Vec<User>>()
//!         .errors::<ErrorModel>(),
//! );
//! let yaml = doc.to_yaml().unwrap();
//! assert!(yaml.find("ErrorModel:").unwrap() < yaml.find("User:").unwrap());
//! ```

// Lets derived impls name `::tailor` from inside this crate's own tests.
extern crate self as tailor;

pub mod collector;
pub mod config;
pub mod descriptor;
pub mod document;
pub mod error;
pub mod operation;
pub mod render;
pub mod rules;
pub mod walker;

// Re-export tailor_core so users don't need to depend on it directly
pub use tailor_core::{openapi, route, schema};

pub use tailor_macro::Describe;

pub use descriptor::{Describe, FieldDef, Kind, TypeDescriptor, TypeInfo};
pub use document::Document;
pub use error::{Error, Result};
pub use operation::{Operation, Response, ResponseCode, Returns};
pub use rules::{Rule, RuleRegistry};
pub use tailor_core::route::HttpMethod;
