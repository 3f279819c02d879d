//! Shallow option validation over JSON configuration objects.

use std::fmt;

use itertools::Itertools;
use serde_json::Value;

use crate::domain::error::{ConfigResult, ConfigurationError};

/// Runtime type tag of a JSON value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionType {
    String,
    Array,
    Boolean,
    Object,
    Number,
    Null,
}

impl OptionType {
    pub fn of(value: &Value) -> Self {
        match value {
            Value::String(_) => Self::String,
            Value::Array(_) => Self::Array,
            Value::Bool(_) => Self::Boolean,
            Value::Object(_) => Self::Object,
            Value::Number(_) => Self::Number,
            Value::Null => Self::Null,
        }
    }
}

impl fmt::Display for OptionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::String => "string",
            Self::Array => "array",
            Self::Boolean => "boolean",
            Self::Object => "object",
            Self::Number => "number",
            Self::Null => "null",
        };
        f.write_str(name)
    }
}

/// Recognized option name paired with the types it accepts.
pub type OptionRule<'a> = (&'a str, &'a [OptionType]);

/// Option rules shared by every element.
pub const ELEMENT_OPTIONS: &[OptionRule<'static>] = &[
    ("name", &[OptionType::String]),
    ("classes", &[OptionType::Array]),
    ("id", &[OptionType::Boolean, OptionType::String]),
    ("domType", &[OptionType::String]),
    ("text", &[OptionType::String]),
];

/// Check that every recognized option present in `config` has an accepted type.
///
/// Unrecognized keys are ignored. The check does not look inside arrays.
pub fn validate_options(config: &Value, rules: &[OptionRule<'_>]) -> ConfigResult<()> {
    let map = config
        .as_object()
        .ok_or_else(|| ConfigurationError::NotAnObject {
            context: "options".to_string(),
            found: OptionType::of(config).to_string(),
        })?;

    for (option, accepted) in rules {
        if let Some(value) = map.get(*option) {
            let found = OptionType::of(value);
            if !accepted.contains(&found) {
                return Err(ConfigurationError::InvalidOptionType {
                    option: option.to_string(),
                    expected: accepted.iter().join(" or "),
                    found: found.to_string(),
                });
            }
        }
    }
    Ok(())
}

/// Element options after validation, with defaults applied.
#[derive(Debug, Clone, PartialEq)]
pub struct ElementOptions {
    pub name: String,
    pub classes: Vec<String>,
    /// Kept as raw JSON: resolved again when the node is materialized.
    pub id: Value,
    pub dom_type: String,
    pub text: String,
}

impl Default for ElementOptions {
    fn default() -> Self {
        Self {
            name: String::new(),
            classes: Vec::new(),
            id: Value::Bool(false),
            dom_type: "div".to_string(),
            text: String::new(),
        }
    }
}

impl ElementOptions {
    /// Validate `config` and read the recognized options out of it.
    pub fn parse(config: &Value) -> ConfigResult<Self> {
        validate_options(config, ELEMENT_OPTIONS)?;

        let mut options = Self::default();
        if let Some(Value::String(name)) = config.get("name") {
            options.name = name.clone();
        }
        if let Some(Value::Array(classes)) = config.get("classes") {
            options.classes = classes.iter().map(class_token).collect();
        }
        if let Some(id) = config.get("id") {
            options.id = id.clone();
        }
        if let Some(Value::String(dom_type)) = config.get("domType") {
            if !is_tag_name(dom_type) {
                return Err(ConfigurationError::InvalidTagName {
                    found: dom_type.clone(),
                });
            }
            options.dom_type = dom_type.clone();
        }
        if let Some(Value::String(text)) = config.get("text") {
            options.text = text.clone();
        }
        Ok(options)
    }

    /// Space-joined class list, `None` when there are no classes.
    pub fn class_attribute(&self) -> Option<String> {
        if self.classes.is_empty() {
            None
        } else {
            Some(self.classes.join(" "))
        }
    }
}

/// `[A-Za-z][A-Za-z0-9-]*`
pub fn is_tag_name(tag: &str) -> bool {
    let mut chars = tag.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '-')
        }
        _ => false,
    }
}

// classes are checked shallowly, so entries may be any JSON value
fn class_token(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Identifier attribute policy derived from the `id` option.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdPolicy {
    /// No identifier attribute.
    Disabled,
    /// `{name-}{id}`
    Generated,
    /// `{name-}{id}-{suffix}`
    Suffixed(String),
}

impl IdPolicy {
    pub fn resolve(id: &Value) -> ConfigResult<Self> {
        match id {
            Value::Bool(false) => Ok(Self::Disabled),
            Value::Bool(true) => Ok(Self::Generated),
            Value::String(suffix) => Ok(Self::Suffixed(suffix.clone())),
            other => Err(ConfigurationError::InvalidIdOption {
                found: OptionType::of(other).to_string(),
            }),
        }
    }

    /// Identifier attribute for an element called `name` with generated id `id`.
    pub fn attribute(&self, name: &str, id: &str) -> Option<String> {
        let base = if name.is_empty() {
            id.to_string()
        } else {
            format!("{name}-{id}")
        };
        match self {
            Self::Disabled => None,
            Self::Generated => Some(base),
            Self::Suffixed(suffix) => Some(format!("{base}-{suffix}")),
        }
    }
}
