//! `${ENV_VAR}` placeholder resolution and static+file config merging,
//! shared shape with the Gateway Registry's plugin config handling.
//! Grounded in `providers/registry.py`'s `_build_config`/`_resolve_env_vars`.

use std::collections::HashMap;

use regex::Regex;
use serde_json::Value;

/// Recursively resolves `${ENV_VAR}` placeholders in string config values.
/// A placeholder naming an unset variable is left untouched, matching the
/// original's `os.environ.get(name, whole_match)` fallback.
#[must_use]
pub fn resolve_env_vars(value: Value) -> Value {
    let placeholder = Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}").unwrap();
    resolve(value, &placeholder)
}

fn resolve(value: Value, placeholder: &Regex) -> Value {
    match value {
        Value::String(s) => {
            let replaced = placeholder.replace_all(&s, |caps: &regex::Captures| {
                std::env::var(&caps[1]).unwrap_or_else(|_| caps[0].to_string())
            });
            Value::String(replaced.into_owned())
        }
        Value::Object(map) => {
            Value::Object(map.into_iter().map(|(k, v)| (k, resolve(v, placeholder))).collect())
        }
        Value::Array(items) => Value::Array(items.into_iter().map(|v| resolve(v, placeholder)).collect()),
        other => other,
    }
}

/// Merges static (registration-time) config as the base with file-provided
/// config layered on top, then resolves env placeholders.
#[must_use]
pub fn build_config(static_config: &HashMap<String, Value>, file_config: Option<&Value>) -> Value {
    let mut merged: serde_json::Map<String, Value> =
        static_config.iter().map(|(k, v)| (k.clone(), v.clone())).collect();

    if let Some(Value::Object(file_map)) = file_config {
        for (k, v) in file_map {
            merged.insert(k.clone(), v.clone());
        }
    }

    resolve_env_vars(Value::Object(merged))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_known_env_var() {
        std::env::set_var("VB_TEST_KEY", "secret123");
        let out = resolve_env_vars(Value::String("${VB_TEST_KEY}".to_string()));
        assert_eq!(out, Value::String("secret123".to_string()));
    }

    #[test]
    fn leaves_unset_placeholder_untouched() {
        std::env::remove_var("VB_TEST_MISSING");
        let out = resolve_env_vars(Value::String("${VB_TEST_MISSING}".to_string()));
        assert_eq!(out, Value::String("${VB_TEST_MISSING}".to_string()));
    }
}
