use thiserror::Error;

use crate::response::ResponseStrategy;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Invalid regex: {0}")]
    Regex(#[from] regex::Error),

    #[error("Cannot resolve reference '{0}' in the component definitions")]
    UnresolvableReference(String),

    #[error("This schema fragment has no reference")]
    NoReferenceFound,

    #[error("Cannot parse wire type '{0}'")]
    UnsupportedWireType(String),

    #[error("Variable '{name}' must be defined exactly once, found {found} definitions")]
    AmbiguousVariableBinding { name: String, found: usize },

    #[error("Cyclic schema reference '{reference}' (chain: {})", chain.join(" -> "))]
    CyclicSchemaReference {
        reference: String,
        chain: Vec<String>,
    },

    #[error("Cyclic format reference '{name}' (chain: {})", chain.join(" -> "))]
    CyclicFormatReference { name: String, chain: Vec<String> },

    #[error("Cannot find format '{0}' in the template configuration")]
    MissingTemplateFormat(String),

    #[error("Format by data type does not support value type '{0}'")]
    UnsupportedFormatType(String),

    #[error("Invalid format setting at '{key}': {reason}")]
    InvalidFormat { key: String, reason: String },

    #[error("Unsupported OpenAPI version '{0}'")]
    UnsupportedOpenApiVersion(String),

    #[error("Response data shape does not match strategy '{0}'")]
    ResponseShapeMismatch(ResponseStrategy),
}

impl Error {
    pub(crate) fn invalid_format(key: impl Into<String>, reason: impl Into<String>) -> Self {
        Error::InvalidFormat {
            key: key.into(),
            reason: reason.into(),
        }
    }
}
