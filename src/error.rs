//! Error types for configuration construction and lookup.

use serde_json::Value;

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// A leaf resolved to null after the environment override was applied.
    #[error("'{path}' must be set!")]
    MissingValue { path: String },

    /// A lookup path does not resolve to a set value.
    #[error("'{path}' is not set!")]
    NotSet { path: String },

    /// A write was attempted against the resolved tree.
    #[error("Cannot change value \"{field}\" to \"{value}\" of an immutable property")]
    ImmutableMutation { field: String, value: String },

    /// A typed read found a value of a different JSON type.
    #[error("'{path}' is not {expected}")]
    WrongType { path: String, expected: &'static str },

    /// Defaults did not serialize to a JSON object.
    #[error("Invalid defaults: {0}")]
    InvalidDefaults(String),

    /// A subtree could not be deserialized into the requested type.
    #[error("'{path}' could not be deserialized: {source}")]
    Deserialize {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

impl ConfigError {
    pub(crate) fn missing(path: impl Into<String>) -> Self {
        Self::MissingValue { path: path.into() }
    }

    pub(crate) fn not_set(path: impl Into<String>) -> Self {
        Self::NotSet { path: path.into() }
    }

    pub(crate) fn immutable(field: impl Into<String>, value: &Value) -> Self {
        // Strings render bare, everything else in its JSON form.
        let value = match value {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        };
        Self::ImmutableMutation {
            field: field.into(),
            value,
        }
    }
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, ConfigError>;
