//! Domain layer: option model, identifiers and errors
//!
//! This layer is independent of the UI tree (no node creation, no CLI, no config loading).

pub mod error;
pub mod id;
pub mod options;

pub use error::{ConfigResult, ConfigurationError};
pub use id::generate_id;
pub use options::{is_tag_name, validate_options, ElementOptions, IdPolicy, OptionRule, OptionType, ELEMENT_OPTIONS};
