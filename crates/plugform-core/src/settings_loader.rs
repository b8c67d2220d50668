//! Settings loading from configuration files.
//!
//! ## Loading Order
//!
//! 1. Start with default settings.
//! 2. Load from a TOML or JSON file (overriding defaults).
//! 3. Apply environment variable overrides (highest priority).
//!
//! ## Environment Variable Mapping
//!
//! | Env Var | Setting |
//! |---|---|
//! | `PLUGFORM_DEBUG` | `debug` |
//! | `PLUGFORM_LOG_LEVEL` | `log_level` |
//! | `PLUGFORM_LANGUAGE_CODE` | `language_code` |
//! | `PLUGFORM_DATABASE_PATH` | `database.path` |
//! | `PLUGFORM_SELECT2_LANGUAGE` | `select2.language` |
//! | `PLUGFORM_SELECT2_PLACEHOLDER` | `select2.placeholder` |
//!
//! ## Examples
//!
//! ```rust,no_run
//! use plugform_core::settings_loader;
//!
//! let settings = settings_loader::from_toml_file_with_env("config/plugform.toml").unwrap();
//! ```

use std::path::Path;

use crate::error::PlugformError;
use crate::settings::Settings;

/// Loads settings from a TOML string.
///
/// Any settings not present in the TOML keep their default values.
///
/// # Errors
///
/// Returns an error if the TOML is malformed or cannot be deserialized.
pub fn from_toml_str(toml_str: &str) -> Result<Settings, PlugformError> {
    // Deserialize into a JSON tree first so that nested tables merge with
    // the defaults instead of replacing them.
    let toml_value: toml::Value = toml::from_str(toml_str)
        .map_err(|e| PlugformError::ConfigurationError(format!("Failed to parse TOML: {e}")))?;

    merge_with_defaults(toml_to_json(toml_value), "TOML")
}

/// Loads settings from a TOML file.
///
/// # Errors
///
/// Returns an error if the file cannot be read or the TOML is malformed.
pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Settings, PlugformError> {
    from_toml_str(&read_config(path.as_ref(), "TOML")?)
}

/// Loads settings from a TOML file and then applies environment variable overrides.
///
/// # Errors
///
/// Returns an error if the file cannot be read or the TOML is malformed.
pub fn from_toml_file_with_env(path: impl AsRef<Path>) -> Result<Settings, PlugformError> {
    let mut settings = from_toml_file(path)?;
    apply_env_overrides(&mut settings);
    Ok(settings)
}

/// Loads settings from a JSON string.
///
/// # Errors
///
/// Returns an error if the JSON is malformed or cannot be deserialized.
pub fn from_json_str(json_str: &str) -> Result<Settings, PlugformError> {
    let json_value: serde_json::Value = serde_json::from_str(json_str)
        .map_err(|e| PlugformError::ConfigurationError(format!("Failed to parse JSON: {e}")))?;

    merge_with_defaults(json_value, "JSON")
}

/// Loads settings from a JSON file.
///
/// # Errors
///
/// Returns an error if the file cannot be read or the JSON is malformed.
pub fn from_json_file(path: impl AsRef<Path>) -> Result<Settings, PlugformError> {
    from_json_str(&read_config(path.as_ref(), "JSON")?)
}

/// Loads settings from just environment variables (starting from defaults).
pub fn from_env() -> Settings {
    let mut settings = Settings::default();
    apply_env_overrides(&mut settings);
    settings
}

/// Applies environment variable overrides to a settings struct.
///
/// `PLUGFORM_DEBUG` accepts "true"/"1"/"yes" as true; anything else is false.
pub fn apply_env_overrides(settings: &mut Settings) {
    apply_overrides(settings, |key| std::env::var(key).ok());
}

fn apply_overrides(settings: &mut Settings, lookup: impl Fn(&str) -> Option<String>) {
    if let Some(val) = lookup("PLUGFORM_DEBUG") {
        settings.debug = matches!(val.to_lowercase().as_str(), "true" | "1" | "yes");
    }

    if let Some(val) = lookup("PLUGFORM_LOG_LEVEL") {
        settings.log_level = val;
    }

    if let Some(val) = lookup("PLUGFORM_LANGUAGE_CODE") {
        settings.language_code = val;
    }

    if let Some(val) = lookup("PLUGFORM_DATABASE_PATH") {
        settings.database.path = val.into();
    }

    if let Some(val) = lookup("PLUGFORM_SELECT2_LANGUAGE") {
        settings.select2.language = val;
    }

    if let Some(val) = lookup("PLUGFORM_SELECT2_PLACEHOLDER") {
        settings.select2.placeholder = val;
    }
}

// ============================================================
// Helpers
// ============================================================

fn read_config(path: &Path, format: &str) -> Result<String, PlugformError> {
    std::fs::read_to_string(path).map_err(|e| {
        PlugformError::ConfigurationError(format!(
            "Failed to read {format} file '{}': {e}",
            path.display()
        ))
    })
}

fn merge_with_defaults(
    value: serde_json::Value,
    format: &str,
) -> Result<Settings, PlugformError> {
    let default_json = serde_json::to_value(Settings::default()).map_err(|e| {
        PlugformError::ConfigurationError(format!("Failed to serialize default settings: {e}"))
    })?;

    let merged = merge_json(default_json, value);
    serde_json::from_value(merged).map_err(|e| {
        PlugformError::ConfigurationError(format!(
            "Failed to deserialize settings from {format}: {e}"
        ))
    })
}

/// Converts a TOML value to a `serde_json::Value`.
fn toml_to_json(value: toml::Value) -> serde_json::Value {
    match value {
        toml::Value::String(s) => serde_json::Value::String(s),
        toml::Value::Integer(i) => serde_json::json!(i),
        toml::Value::Float(f) => serde_json::json!(f),
        toml::Value::Boolean(b) => serde_json::Value::Bool(b),
        toml::Value::Datetime(dt) => serde_json::Value::String(dt.to_string()),
        toml::Value::Array(arr) => {
            serde_json::Value::Array(arr.into_iter().map(toml_to_json).collect())
        }
        toml::Value::Table(table) => {
            let map: serde_json::Map<String, serde_json::Value> = table
                .into_iter()
                .map(|(k, v)| (k, toml_to_json(v)))
                .collect();
            serde_json::Value::Object(map)
        }
    }
}

/// Deep-merges two JSON values. The `override_val` takes precedence.
fn merge_json(base: serde_json::Value, override_val: serde_json::Value) -> serde_json::Value {
    match (base, override_val) {
        (serde_json::Value::Object(mut base_map), serde_json::Value::Object(override_map)) => {
            for (key, override_v) in override_map {
                let merged = if let Some(base_v) = base_map.remove(&key) {
                    merge_json(base_v, override_v)
                } else {
                    override_v
                };
                base_map.insert(key, merged);
            }
            serde_json::Value::Object(base_map)
        }
        (_, override_val) => override_val,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_from_toml_str_basic() {
        let toml = r#"
            debug = false
            log_level = "debug"
            textarea_rows = 8
        "#;

        let settings = from_toml_str(toml).unwrap();
        assert!(!settings.debug);
        assert_eq!(settings.log_level, "debug");
        assert_eq!(settings.textarea_rows, 8);
        // Defaults preserved
        assert_eq!(settings.language_code, "en-us");
    }

    #[test]
    fn test_from_toml_str_nested_select2_keeps_defaults() {
        let toml = r#"
            [select2]
            language = "ru"
            placeholder = "Нажмите для выбора"
        "#;

        let settings = from_toml_str(toml).unwrap();
        assert_eq!(settings.select2.language, "ru");
        assert_eq!(settings.select2.placeholder, "Нажмите для выбора");
        assert_eq!(settings.select2.maximum_input_length, 1000);
        assert!(settings.select2.allow_clear);
    }

    #[test]
    fn test_from_toml_str_malformed() {
        let err = from_toml_str("debug = = true").unwrap_err();
        assert!(err.to_string().contains("Failed to parse TOML"));
    }

    #[test]
    fn test_from_toml_str_wrong_type() {
        let err = from_toml_str("textarea_rows = \"many\"").unwrap_err();
        assert!(matches!(err, PlugformError::ConfigurationError(_)));
    }

    #[test]
    fn test_from_json_str() {
        let json = r#"{"database": {"path": ":memory:"}, "select2": {"allow_clear": false}}"#;
        let settings = from_json_str(json).unwrap();
        assert_eq!(settings.database.path.to_str(), Some(":memory:"));
        assert!(!settings.select2.allow_clear);
        assert_eq!(settings.select2.language, "en");
    }

    #[test]
    fn test_from_toml_file_missing() {
        let err = from_toml_file("/nonexistent/plugform.toml").unwrap_err();
        assert!(err.to_string().contains("Failed to read TOML file"));
    }

    #[test]
    fn test_overrides() {
        let env: HashMap<&str, &str> = [
            ("PLUGFORM_DEBUG", "0"),
            ("PLUGFORM_LOG_LEVEL", "warn"),
            ("PLUGFORM_DATABASE_PATH", "/tmp/forms.db"),
            ("PLUGFORM_SELECT2_LANGUAGE", "de"),
        ]
        .into_iter()
        .collect();

        let mut settings = Settings::default();
        apply_overrides(&mut settings, |key| env.get(key).map(|v| (*v).to_string()));

        assert!(!settings.debug);
        assert_eq!(settings.log_level, "warn");
        assert_eq!(settings.database.path.to_str(), Some("/tmp/forms.db"));
        assert_eq!(settings.select2.language, "de");
        assert_eq!(settings.select2.placeholder, "Click to select");
    }

    #[test]
    fn test_merge_json_deep() {
        let base = serde_json::json!({"a": {"b": 1, "c": 2}});
        let over = serde_json::json!({"a": {"c": 3}});
        assert_eq!(merge_json(base, over), serde_json::json!({"a": {"b": 1, "c": 3}}));
    }
}
