//! Secret redaction for diagnostic dumps

use serde_json::Value;

/// Keys that contain secrets and should be redacted
const SECRET_KEYS: &[&str] = &[
    "password",
    "token",
    "secret",
    "private_key",
    "api_key",
    "credential",
];

/// Replace secret-looking leaves in `value`, returning the redacted paths.
pub(crate) fn redact_secrets(value: &mut Value) -> Vec<String> {
    let mut redactions = Vec::new();
    redact_recursive(value, "", &mut redactions);
    redactions
}

fn redact_recursive(value: &mut Value, path: &str, redactions: &mut Vec<String>) {
    let Value::Object(map) = value else {
        return;
    };

    for (key, val) in map.iter_mut() {
        let current_path = if path.is_empty() {
            key.clone()
        } else {
            format!("{}.{}", path, key)
        };

        let key_lower = key.to_lowercase();
        let is_secret = SECRET_KEYS.iter().any(|s| key_lower.contains(s));

        if is_secret && !val.is_object() {
            *val = Value::String("[REDACTED]".to_string());
            redactions.push(current_path);
        } else {
            redact_recursive(val, &current_path, redactions);
        }
    }
}
