//! Defaults/environment merge
//!
//! Walks the defaults tree and replaces every leaf whose environment key
//! holds a truthy value:
//! - Objects: recursed into, key by key
//! - Everything else (including arrays): a leaf
//! - Environment key: path segments joined with `_`, uppercased
//! - A leaf that resolves to null fails the whole merge

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::{BTreeMap, HashMap};

use crate::env::EnvSource;
use crate::error::{ConfigError, Result};

/// Where a resolved leaf came from
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase", tag = "origin")]
pub enum ConfigOrigin {
    /// The value from the defaults tree
    Default,
    /// An override read from the environment under `key`
    Env { key: String },
}

/// Output of [`merge`]: the resolved tree plus per-leaf provenance.
#[derive(Debug, Clone, Default)]
pub struct Resolved {
    /// Tree with the same shape as the defaults
    pub tree: Map<String, Value>,

    /// Provenance of every leaf, keyed by dotted path
    pub origins: BTreeMap<String, ConfigOrigin>,
}

/// Loose truthiness used for the override check.
///
/// `null`, `false`, `""` and numeric zero are falsy; everything else,
/// including `"0"`, `"false"` and empty arrays or objects, is truthy.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map_or(true, |f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Merge `defaults` with overrides from `env`.
pub fn merge<E: EnvSource + ?Sized>(
    defaults: &Map<String, Value>,
    env: &E,
    prefix: Option<&str>,
) -> Result<Resolved> {
    let mut merger = Merger {
        env,
        origins: BTreeMap::new(),
        claimed: HashMap::new(),
    };
    let root_key = prefix.unwrap_or_default();
    let tree = merger.merge_object(defaults, "", root_key)?;

    Ok(Resolved {
        tree,
        origins: merger.origins,
    })
}

struct Merger<'e, E: ?Sized> {
    env: &'e E,
    origins: BTreeMap<String, ConfigOrigin>,
    /// Environment key -> dotted path that first claimed it
    claimed: HashMap<String, String>,
}

impl<E: EnvSource + ?Sized> Merger<'_, E> {
    fn merge_object(
        &mut self,
        defaults: &Map<String, Value>,
        parent_path: &str,
        parent_key: &str,
    ) -> Result<Map<String, Value>> {
        let mut ret = Map::new();

        for (key, default) in defaults {
            let path = join(parent_path, '.', key);
            let raw_key = join(parent_key, '_', key);

            let resolved = match default {
                Value::Object(children) => {
                    Value::Object(self.merge_object(children, &path, &raw_key)?)
                }
                leaf => self.resolve_leaf(leaf, &path, &raw_key),
            };

            if resolved.is_null() {
                return Err(ConfigError::missing(reported_path(&raw_key)));
            }

            ret.insert(key.clone(), resolved);
        }

        Ok(ret)
    }

    fn resolve_leaf(&mut self, default: &Value, path: &str, raw_key: &str) -> Value {
        let key = env_key(raw_key);

        match self.claimed.get(&key) {
            Some(first) if first != path => {
                tracing::warn!(
                    env_key = %key,
                    first = %first,
                    second = %path,
                    "two config paths share one environment key"
                );
            }
            Some(_) => {}
            None => {
                self.claimed.insert(key.clone(), path.to_string());
            }
        }

        match self.env.var(&key) {
            Some(value) if is_truthy(&value) => {
                tracing::debug!(env_key = %key, path = %path, "default overridden by environment");
                self.origins
                    .insert(path.to_string(), ConfigOrigin::Env { key });
                value
            }
            _ => {
                self.origins.insert(path.to_string(), ConfigOrigin::Default);
                default.clone()
            }
        }
    }
}

/// Environment key for an `_`-joined key path, e.g. `bar_boo_boo` -> `BAR_BOO_BOO`.
///
/// Dots inside a single key are kept: the key `a.b` reads `A.B`.
fn env_key(raw_key: &str) -> String {
    raw_key.to_uppercase()
}

/// Path reported when a leaf is missing: every `_` becomes `.`, prefix included.
fn reported_path(raw_key: &str) -> String {
    raw_key.replace('_', ".")
}

fn join(parent: &str, sep: char, key: &str) -> String {
    if parent.is_empty() {
        key.to_string()
    } else {
        format!("{}{}{}", parent, sep, key)
    }
}
