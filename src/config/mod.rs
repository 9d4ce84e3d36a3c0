//! Resolved, read-only configuration
//!
//! A [`Config`] owns the merged tree behind an `Arc` and only ever hands out
//! shared references, so it can be cloned freely and read from any number of
//! threads. Values are addressed by dotted path (`bar.boo.boo`).

mod builder;
mod redact;

pub use builder::{create_config, create_config_with, ConfigBuilder};

use serde::de::DeserializeOwned;
use serde::{Serialize, Serializer};
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::error::{ConfigError, Result};
use crate::merge::{ConfigOrigin, Resolved};

/// Immutable configuration produced by [`ConfigBuilder::build`].
#[derive(Debug, Clone)]
pub struct Config {
    inner: Arc<Inner>,
}

#[derive(Debug)]
struct Inner {
    /// Always a `Value::Object`
    tree: Value,
    origins: BTreeMap<String, ConfigOrigin>,
}

impl Config {
    pub(crate) fn from_resolved(resolved: Resolved) -> Self {
        Self {
            inner: Arc::new(Inner {
                tree: Value::Object(resolved.tree),
                origins: resolved.origins,
            }),
        }
    }

    /// Get a config value by dotted path.
    ///
    /// Fails with [`ConfigError::NotSet`] when any segment is missing, a
    /// segment walks through a non-object, or the value is null.
    pub fn get(&self, path: &str) -> Result<&Value> {
        self.lookup(path).ok_or_else(|| ConfigError::not_set(path))
    }

    fn lookup(&self, path: &str) -> Option<&Value> {
        let mut current = &self.inner.tree;
        for part in path.split('.') {
            current = current.get(part)?;
        }
        (!current.is_null()).then_some(current)
    }

    /// Whether `path` resolves to a set value
    pub fn contains(&self, path: &str) -> bool {
        self.lookup(path).is_some()
    }

    /// Get a config value as a string slice.
    ///
    /// No coercion: a number stored at `path` is a [`ConfigError::WrongType`].
    pub fn get_str(&self, path: &str) -> Result<&str> {
        self.get(path)?
            .as_str()
            .ok_or_else(|| wrong_type(path, "a string"))
    }

    /// Get a config value as a bool
    pub fn get_bool(&self, path: &str) -> Result<bool> {
        self.get(path)?
            .as_bool()
            .ok_or_else(|| wrong_type(path, "a boolean"))
    }

    /// Get a config value as i64
    pub fn get_i64(&self, path: &str) -> Result<i64> {
        self.get(path)?
            .as_i64()
            .ok_or_else(|| wrong_type(path, "a signed integer"))
    }

    /// Get a config value as u64
    pub fn get_u64(&self, path: &str) -> Result<u64> {
        self.get(path)?
            .as_u64()
            .ok_or_else(|| wrong_type(path, "an unsigned integer"))
    }

    /// Get a config value as f64
    pub fn get_f64(&self, path: &str) -> Result<f64> {
        self.get(path)?
            .as_f64()
            .ok_or_else(|| wrong_type(path, "a number"))
    }

    /// Deserialize the subtree at `path` into `T`.
    pub fn extract<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let value = self.get(path)?;
        T::deserialize(value).map_err(|source| ConfigError::Deserialize {
            path: path.to_string(),
            source,
        })
    }

    /// Deserialize the whole tree into `T`.
    pub fn extract_root<T: DeserializeOwned>(&self) -> Result<T> {
        T::deserialize(&self.inner.tree).map_err(|source| ConfigError::Deserialize {
            path: "(root)".to_string(),
            source,
        })
    }

    /// Attempt to change the value at `path`.
    ///
    /// The resolved tree is frozen, so this always fails: with
    /// [`ConfigError::ImmutableMutation`] when `path` is set, otherwise with
    /// [`ConfigError::NotSet`]. The tree is left untouched either way.
    pub fn set(&self, path: &str, value: impl Into<Value>) -> Result<()> {
        self.get(path)?;
        let field = path.rsplit('.').next().unwrap_or(path);
        Err(ConfigError::immutable(field, &value.into()))
    }

    /// Where the leaf at `path` came from. `None` for branches and unknown paths.
    pub fn origin(&self, path: &str) -> Option<&ConfigOrigin> {
        self.inner.origins.get(path)
    }

    /// Dotted paths whose value was supplied by the environment, sorted.
    pub fn overrides(&self) -> Vec<&str> {
        self.inner
            .origins
            .iter()
            .filter(|(_, origin)| matches!(origin, ConfigOrigin::Env { .. }))
            .map(|(path, _)| path.as_str())
            .collect()
    }

    /// The whole resolved tree
    pub fn as_value(&self) -> &Value {
        &self.inner.tree
    }

    /// Function-valued accessor over a clone of this config.
    pub fn accessor(&self) -> impl Fn(&str) -> Result<Value> + Send + Sync + 'static {
        let config = self.clone();
        move |path: &str| config.get(path).cloned()
    }

    /// Pretty JSON dump with secret-looking leaves replaced by `[REDACTED]`.
    pub fn to_json_redacted(&self) -> std::result::Result<String, serde_json::Error> {
        let mut tree = self.inner.tree.clone();
        let redacted = redact::redact_secrets(&mut tree);
        if !redacted.is_empty() {
            tracing::debug!(count = redacted.len(), "redacted secret config values");
        }
        serde_json::to_string_pretty(&tree)
    }
}

fn wrong_type(path: &str, expected: &'static str) -> ConfigError {
    ConfigError::WrongType {
        path: path.to_string(),
        expected,
    }
}

impl Serialize for Config {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.inner.tree.serialize(serializer)
    }
}
