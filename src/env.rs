//! Environment sources
//!
//! The merger reads overrides from any flat, string-keyed mapping. The
//! process environment is just one such mapping, captured once by
//! [`ProcessEnv::snapshot`].

use serde_json::{Map, Value};
use std::collections::{BTreeMap, HashMap};
use std::hash::BuildHasher;

/// A flat key/value mapping that can supply override values.
///
/// Values are returned verbatim; the merger never converts them.
pub trait EnvSource {
    /// Look up the value stored under `key`.
    fn var(&self, key: &str) -> Option<Value>;
}

impl<S: EnvSource + ?Sized> EnvSource for &S {
    fn var(&self, key: &str) -> Option<Value> {
        (**self).var(key)
    }
}

impl<H: BuildHasher> EnvSource for HashMap<String, String, H> {
    fn var(&self, key: &str) -> Option<Value> {
        self.get(key).cloned().map(Value::String)
    }
}

impl<H: BuildHasher> EnvSource for HashMap<String, Value, H> {
    fn var(&self, key: &str) -> Option<Value> {
        self.get(key).cloned()
    }
}

impl EnvSource for BTreeMap<String, String> {
    fn var(&self, key: &str) -> Option<Value> {
        self.get(key).cloned().map(Value::String)
    }
}

impl EnvSource for BTreeMap<String, Value> {
    fn var(&self, key: &str) -> Option<Value> {
        self.get(key).cloned()
    }
}

impl EnvSource for Map<String, Value> {
    fn var(&self, key: &str) -> Option<Value> {
        self.get(key).cloned()
    }
}

/// A JSON object used as an environment; any other JSON value is empty.
impl EnvSource for Value {
    fn var(&self, key: &str) -> Option<Value> {
        self.get(key).cloned()
    }
}

/// Snapshot of the process environment.
#[derive(Debug, Clone, Default)]
pub struct ProcessEnv {
    vars: BTreeMap<String, String>,
}

impl ProcessEnv {
    /// Capture the current process environment.
    ///
    /// Variables whose name or value is not valid UTF-8 are skipped.
    pub fn snapshot() -> Self {
        let vars = std::env::vars_os()
            .filter_map(|(k, v)| Some((k.into_string().ok()?, v.into_string().ok()?)))
            .collect();
        Self { vars }
    }

    /// Number of captured variables
    pub fn len(&self) -> usize {
        self.vars.len()
    }

    /// Whether no variables were captured
    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }
}

impl EnvSource for ProcessEnv {
    fn var(&self, key: &str) -> Option<Value> {
        self.vars.var(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_string_maps_yield_strings() {
        let mut env = HashMap::new();
        env.insert("FOO".to_string(), "bar".to_string());
        assert_eq!(env.var("FOO"), Some(json!("bar")));
        assert_eq!(env.var("MISSING"), None);

        let env: BTreeMap<String, String> = [("A".to_string(), "1".to_string())].into();
        assert_eq!(env.var("A"), Some(json!("1")));
    }

    #[test]
    fn test_value_maps_are_verbatim() {
        let env = json!({"PORT": 8080, "DEBUG": true});
        assert_eq!(env.var("PORT"), Some(json!(8080)));
        assert_eq!(env.var("DEBUG"), Some(json!(true)));
    }

    #[test]
    fn test_non_object_value_is_empty() {
        assert_eq!(json!([1, 2]).var("0"), None);
        assert_eq!(Value::Null.var("FOO"), None);
    }

    #[test]
    fn test_reference_delegates() {
        fn lookup(env: impl EnvSource) -> Option<Value> {
            env.var("X")
        }
        let env = json!({"X": "y"});
        assert_eq!(lookup(&env), Some(json!("y")));
    }

    #[test]
    fn test_process_snapshot_sees_set_variable() {
        std::env::set_var("DEO_ENV_SNAPSHOT_TEST", "present");
        let env = ProcessEnv::snapshot();
        assert!(!env.is_empty());
        assert_eq!(env.var("DEO_ENV_SNAPSHOT_TEST"), Some(json!("present")));
    }
}
