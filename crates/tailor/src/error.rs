use crate::descriptor::Kind;
use tailor_core::route::HttpMethod;

/// Appended to errors that point at a defect in tailor rather than in the input.
const REPORT_BUG: &str = "This should not occur in practice. Please report it as a bug, \
    including the definitions of the types involved.";

/// Everything that can stop a document from being generated.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// No rule exists for a scalar-kind type.
    #[error(
        "no rendering rule for kind {kind}, type {type_name}. Change the type, or register \
         a rule for it with Document::define_data_type"
    )]
    Unsupported {
        kind: Kind,
        type_name: &'static str,
    },

    #[error("{} {}", .0, REPORT_BUG)]
    Internal(String),

    /// An inline expansion reached the type it started from.
    #[error(
        "type {type_name} contains itself and cannot be expanded inline; \
         make it a named public component so it can be referenced"
    )]
    RecursiveType { type_name: &'static str },

    #[error("field `{field}` is flattened but {type_name} is not a struct")]
    FlattenNonStruct {
        field: String,
        type_name: &'static str,
    },

    #[error(
        "component name `{name}` is used by both {first} and {second}; \
         rename one with #[describe(name = \"...\")]"
    )]
    SchemaNameCollision {
        name: String,
        first: &'static str,
        second: &'static str,
    },

    #[error("operation {method} {path} is registered more than once")]
    DuplicateOperation { method: HttpMethod, path: String },

    #[error("response {code} is declared more than once for operation {operation_id}")]
    DuplicateResponse { code: String, operation_id: String },

    #[error("failed to serialize YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("failed to serialize JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("failed to write document: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    pub(crate) fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
