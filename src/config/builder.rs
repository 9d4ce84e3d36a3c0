//! Config construction

use serde::Serialize;
use serde_json::{Map, Value};

use super::Config;
use crate::env::{EnvSource, ProcessEnv};
use crate::error::{ConfigError, Result};
use crate::merge::{merge, ConfigOrigin};

/// Builder for [`Config`].
///
/// Without an explicit [`env`](Self::env) source the process environment is
/// captured when [`build`](Self::build) runs.
pub struct ConfigBuilder<'e> {
    defaults: Map<String, Value>,
    env: Option<Box<dyn EnvSource + 'e>>,
    prefix: Option<String>,
}

impl<'e> ConfigBuilder<'e> {
    /// Start from a defaults tree
    pub fn new(defaults: Map<String, Value>) -> Self {
        Self {
            defaults,
            env: None,
            prefix: None,
        }
    }

    /// Start from any value that serializes to a JSON object.
    pub fn from_defaults<T: Serialize + ?Sized>(defaults: &T) -> Result<Self> {
        let value = serde_json::to_value(defaults)
            .map_err(|e| ConfigError::InvalidDefaults(e.to_string()))?;

        match value {
            Value::Object(map) => Ok(Self::new(map)),
            other => Err(ConfigError::InvalidDefaults(format!(
                "expected an object, got {}",
                kind(&other)
            ))),
        }
    }

    /// Read overrides from `env` instead of the process environment.
    pub fn env(mut self, env: impl EnvSource + 'e) -> Self {
        self.env = Some(Box::new(env));
        self
    }

    /// Prepend `prefix` to every environment key (`db.host` -> `APP_DB_HOST`).
    pub fn env_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = Some(prefix.into());
        self
    }

    /// Merge and freeze.
    pub fn build(self) -> Result<Config> {
        let prefix = self.prefix.as_deref();
        let resolved = match &self.env {
            Some(env) => merge(&self.defaults, &**env, prefix)?,
            None => merge(&self.defaults, &ProcessEnv::snapshot(), prefix)?,
        };

        let overridden = resolved
            .origins
            .values()
            .filter(|o| matches!(o, ConfigOrigin::Env { .. }))
            .count();
        tracing::debug!(
            leaves = resolved.origins.len(),
            overrides = overridden,
            "configuration resolved"
        );

        Ok(Config::from_resolved(resolved))
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Build a config from `defaults` and the process environment.
pub fn create_config<T: Serialize + ?Sized>(defaults: &T) -> Result<Config> {
    ConfigBuilder::from_defaults(defaults)?.build()
}

/// Build a config from `defaults` and an explicit environment source.
pub fn create_config_with<T, E>(defaults: &T, env: E) -> Result<Config>
where
    T: Serialize + ?Sized,
    E: EnvSource,
{
    ConfigBuilder::from_defaults(defaults)?.env(env).build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::HashMap;

    #[derive(Serialize)]
    struct ServerDefaults {
        host: String,
        port: u16,
        tls: TlsDefaults,
    }

    #[derive(Serialize)]
    struct TlsDefaults {
        enabled: bool,
    }

    #[test]
    fn test_struct_defaults() {
        let defaults = ServerDefaults {
            host: "127.0.0.1".to_string(),
            port: 8080,
            tls: TlsDefaults { enabled: true },
        };
        let env: HashMap<String, String> =
            [("TLS_ENABLED".to_string(), "no".to_string())].into();

        let config = create_config_with(&defaults, env).unwrap();
        assert_eq!(config.get("port").unwrap(), &json!(8080));
        assert_eq!(config.get("tls.enabled").unwrap(), &json!("no"));
    }

    #[test]
    fn test_non_object_defaults_rejected() {
        let err = ConfigBuilder::from_defaults(&json!([1, 2])).err().unwrap();
        assert!(matches!(err, ConfigError::InvalidDefaults(_)));
        assert!(err.to_string().contains("an array"));

        let err = create_config_with(&42, json!({})).unwrap_err();
        assert!(err.to_string().contains("a number"));
    }

    #[test]
    fn test_prefix_applied() {
        let config = ConfigBuilder::from_defaults(&json!({"log": {"level": "info"}}))
            .unwrap()
            .env(json!({"LOG_LEVEL": "trace", "SVC_LOG_LEVEL": "debug"}))
            .env_prefix("svc")
            .build()
            .unwrap();
        assert_eq!(config.get_str("log.level").unwrap(), "debug");
    }

    #[test]
    fn test_borrowed_env() {
        let env = json!({"NAME": "borrowed"});
        let config = ConfigBuilder::new(Map::new()).env(&env).build().unwrap();
        assert!(config.as_value().as_object().unwrap().is_empty());

        let config = create_config_with(&json!({"name": "x"}), &env).unwrap();
        assert_eq!(config.get_str("name").unwrap(), "borrowed");
    }

    #[test]
    fn test_process_env_default() {
        std::env::set_var("DEO_BUILDER_PROCESS_PORT", "9999");
        let config = ConfigBuilder::from_defaults(&json!({"port": 1}))
            .unwrap()
            .env_prefix("deo_builder_process")
            .build()
            .unwrap();
        assert_eq!(config.get("port").unwrap(), &json!("9999"));
    }
}
