//! Domain-level errors (no external dependencies besides the JSON model)

use thiserror::Error;

/// The single error kind raised while configuring or building elements.
///
/// Every variant is a configuration error; the variants only carry the
/// context needed to tell the caller which input was malformed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigurationError {
    #[error("configuration error: {context} must be a JSON object, got {found}")]
    NotAnObject { context: String, found: String },

    #[error("configuration error: option '{option}' must be {expected}, got {found}")]
    InvalidOptionType {
        option: String,
        expected: String,
        found: String,
    },

    #[error("configuration error: option 'id' must be a boolean or a string, got {found}")]
    InvalidIdOption { found: String },

    #[error("configuration error: option 'domType' must be a tag name, got {found:?}")]
    InvalidTagName { found: String },

    #[error("configuration error: element {id} belongs to a different UI tree")]
    ForeignElement { id: String },

    #[error("configuration error: adding element {id} would make a group its own descendant")]
    CyclicChild { id: String },

    #[error("configuration error: top-level node must be of type \"group\", got {found}")]
    TopLevelNotGroup { found: String },

    #[error("configuration error: unrecognized node type {found}")]
    UnknownNodeType { found: String },

    #[error("configuration error: document contains no top-level group")]
    EmptyDocument,

    #[error("configuration error: document nesting exceeds maximum depth of {max_depth}")]
    DepthExceeded { max_depth: usize },

    #[error("configuration error: invalid JSON: {message}")]
    Json { message: String },
}

impl From<serde_json::Error> for ConfigurationError {
    fn from(e: serde_json::Error) -> Self {
        Self::Json {
            message: e.to_string(),
        }
    }
}

/// Result type for element construction and document building.
pub type ConfigResult<T> = Result<T, ConfigurationError>;
