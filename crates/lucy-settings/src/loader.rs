//! Settings loading with deep merge and environment variable overrides.
//!
//! Loading flow:
//! 1. Start with compiled [`LucySettings::default()`]
//! 2. If `~/.lucy/settings.json` exists, deep-merge user values over defaults
//! 3. Apply environment variable overrides (highest priority)
//!
//! Deep merge rules:
//! - Objects are merged recursively (source overrides target per-key)
//! - Arrays and primitives are replaced entirely by source
//! - Null values in source are skipped (preserving target)

use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::debug;

use crate::errors::Result;
use crate::types::{EmbeddingProvider, LogFormat, LogLevel, LucySettings};

fn home_dir() -> String {
    std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string())
}

/// Resolve the path to the settings file (`~/.lucy/settings.json`).
pub fn settings_path() -> PathBuf {
    PathBuf::from(home_dir()).join(".lucy").join("settings.json")
}

/// Expand a leading `~/` to the home directory.
pub fn expand_home(path: &str) -> PathBuf {
    match path.strip_prefix("~/") {
        Some(rest) => PathBuf::from(home_dir()).join(rest),
        None => PathBuf::from(path),
    }
}

/// Load settings from the default path with env var overrides.
pub fn load_settings() -> Result<LucySettings> {
    load_settings_from_path(&settings_path())
}

/// Load settings from a specific path with env var overrides.
///
/// If the file does not exist, returns defaults. If the file contains
/// invalid JSON, returns an error.
pub fn load_settings_from_path(path: &Path) -> Result<LucySettings> {
    let defaults = serde_json::to_value(LucySettings::default())?;

    let merged = if path.exists() {
        debug!(?path, "loading settings from file");
        let content = std::fs::read_to_string(path)?;
        let user: Value = serde_json::from_str(&content)?;
        deep_merge(defaults, user)
    } else {
        debug!(?path, "settings file not found, using defaults");
        defaults
    };

    let mut settings: LucySettings = serde_json::from_value(merged)?;
    apply_env_overrides(&mut settings);
    Ok(settings)
}

/// Recursive deep merge of two JSON values.
///
/// - Objects are merged recursively (source overrides target per-key)
/// - Arrays and primitives are replaced entirely by source
/// - Null values in source are skipped (preserving target)
pub fn deep_merge(target: Value, source: Value) -> Value {
    match (target, source) {
        (Value::Object(mut target_map), Value::Object(source_map)) => {
            for (key, source_val) in source_map {
                if source_val.is_null() {
                    continue;
                }
                let merged = if let Some(target_val) = target_map.remove(&key) {
                    deep_merge(target_val, source_val)
                } else {
                    source_val
                };
                let _ = target_map.insert(key, merged);
            }
            Value::Object(target_map)
        }
        (_, source) => source,
    }
}

/// Apply environment variable overrides to loaded settings.
///
/// Invalid values are ignored with a warning (fall back to file/default).
pub fn apply_env_overrides(settings: &mut LucySettings) {
    // ── Engine ──────────────────────────────────────────────────────
    if let Some(v) = read_env_usize("LUCY_LOOKBACK", 1, 1000) {
        settings.engine.lookback = v;
    }
    if let Some(v) = read_env_f64("LUCY_ALERT_THRESHOLD", 0.0, 1.0) {
        settings.engine.alert_threshold = v;
    }

    // ── Embedding ───────────────────────────────────────────────────
    if let Some(v) = read_env_parsed("LUCY_EMBEDDING_PROVIDER", EmbeddingProvider::parse) {
        settings.embedding.provider = v;
    }
    if let Some(v) = read_env_string("LUCY_EMBEDDING_MODEL") {
        settings.embedding.model = v;
    }
    if let Some(v) = read_env_usize("LUCY_EMBEDDING_DIMENSIONS", 1, 8192) {
        settings.embedding.dimensions = v;
    }
    if let Some(v) = read_env_string("LUCY_MODEL_CACHE_DIR") {
        settings.embedding.cache_dir = v;
    }

    // ── Storage ─────────────────────────────────────────────────────
    if let Some(v) = read_env_string("LUCY_DB_PATH") {
        settings.storage.db_path = v;
    }
    if let Some(v) = read_env_parsed("LUCY_POOL_SIZE", |v| {
        parse_usize_range(v, 1, 64).and_then(|n| u32::try_from(n).ok())
    }) {
        settings.storage.pool_size = v;
    }

    // ── Logging ─────────────────────────────────────────────────────
    if let Some(v) = read_env_parsed("LUCY_LOG_LEVEL", LogLevel::parse) {
        settings.logging.level = v;
    }
    if let Some(v) = read_env_parsed("LUCY_LOG_FORMAT", LogFormat::parse) {
        settings.logging.format = v;
    }
}

// ── Pure parsing functions (testable without env vars) ──────────────────────

/// Parse a string as a `usize` within a range.
pub fn parse_usize_range(val: &str, min: usize, max: usize) -> Option<usize> {
    let n: usize = val.parse().ok()?;
    (n >= min && n <= max).then_some(n)
}

/// Parse a string as a finite `f64` within an inclusive range.
pub fn parse_f64_range(val: &str, min: f64, max: f64) -> Option<f64> {
    let n: f64 = val.trim().parse().ok()?;
    (n.is_finite() && n >= min && n <= max).then_some(n)
}

// ── Env var readers (thin wrappers) ─────────────────────────────────────────

fn read_env_string(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.is_empty())
}

fn read_env_parsed<T>(name: &str, parse: impl Fn(&str) -> Option<T>) -> Option<T> {
    let val = std::env::var(name).ok()?;
    let result = parse(&val);
    if result.is_none() {
        tracing::warn!(key = name, value = %val, "invalid env var, ignoring");
    }
    result
}

fn read_env_usize(name: &str, min: usize, max: usize) -> Option<usize> {
    read_env_parsed(name, |v| parse_usize_range(v, min, max))
}

fn read_env_f64(name: &str, min: f64, max: f64) -> Option<f64> {
    read_env_parsed(name, |v| parse_f64_range(v, min, max))
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::SettingsError;

    // ── deep_merge ──────────────────────────────────────────────────

    #[test]
    fn merge_nested_override() {
        let target = serde_json::json!({
            "engine": {"lookback": 5, "alertThreshold": 0.3}
        });
        let source = serde_json::json!({
            "engine": {"lookback": 8}
        });
        let merged = deep_merge(target, source);
        assert_eq!(merged["engine"]["lookback"], 8);
        assert_eq!(merged["engine"]["alertThreshold"], 0.3);
    }

    #[test]
    fn merge_array_replace() {
        let target = serde_json::json!({"items": [1, 2, 3]});
        let source = serde_json::json!({"items": [4, 5]});
        let merged = deep_merge(target, source);
        assert_eq!(merged["items"], serde_json::json!([4, 5]));
    }

    #[test]
    fn merge_null_preserves_target() {
        let target = serde_json::json!({"a": 1, "b": 2});
        let source = serde_json::json!({"a": null});
        let merged = deep_merge(target, source);
        assert_eq!(merged["a"], 1);
        assert_eq!(merged["b"], 2);
    }

    #[test]
    fn merge_new_keys_added() {
        let target = serde_json::json!({"a": 1});
        let source = serde_json::json!({"b": 2});
        let merged = deep_merge(target, source);
        assert_eq!(merged["a"], 1);
        assert_eq!(merged["b"], 2);
    }

    #[test]
    fn merge_primitive_replaces_object() {
        let target = serde_json::json!({"a": {"nested": true}});
        let source = serde_json::json!({"a": 42});
        let merged = deep_merge(target, source);
        assert_eq!(merged["a"], 42);
    }

    // ── load_settings_from_path ─────────────────────────────────────

    #[test]
    fn load_missing_file_returns_defaults() {
        let path = Path::new("/nonexistent/settings.json");
        let settings = load_settings_from_path(path).unwrap();
        let defaults = LucySettings::default();
        assert_eq!(settings.embedding.model, defaults.embedding.model);
        assert_eq!(settings.storage.pool_size, defaults.storage.pool_size);
    }

    #[test]
    fn load_partial_json_overrides() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(
            &path,
            r#"{"embedding": {"provider": "hash", "dimensions": 128}, "logging": {"format": "json"}}"#,
        )
        .unwrap();

        let settings = load_settings_from_path(&path).unwrap();
        assert_eq!(settings.embedding.provider, EmbeddingProvider::Hash);
        assert_eq!(settings.embedding.dimensions, 128);
        assert_eq!(settings.logging.format, LogFormat::Json);
        assert_eq!(settings.embedding.max_sequence_length, 256);
        assert_eq!(settings.storage.busy_timeout_ms, 30_000);
    }

    #[test]
    fn load_invalid_json_returns_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, "not valid json").unwrap();

        let result = load_settings_from_path(&path);
        assert!(matches!(result.unwrap_err(), SettingsError::Json(_)));
    }

    #[test]
    fn load_wrong_type_returns_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, r#"{"engine": {"lookback": "many"}}"#).unwrap();

        assert!(load_settings_from_path(&path).is_err());
    }

    // ── expand_home ─────────────────────────────────────────────────

    #[test]
    fn expand_home_replaces_tilde() {
        let expanded = expand_home("~/.lucy/lucy.db");
        let rendered = expanded.to_string_lossy();
        assert!(!rendered.starts_with('~'), "tilde should be expanded: {rendered}");
        assert!(rendered.ends_with(".lucy/lucy.db"));
    }

    #[test]
    fn expand_home_absolute_passthrough() {
        assert_eq!(expand_home("/var/lib/lucy.db"), PathBuf::from("/var/lib/lucy.db"));
    }

    // ── parsers ─────────────────────────────────────────────────────

    #[test]
    fn parse_usize_valid() {
        assert_eq!(parse_usize_range("50", 1, 1000), Some(50));
    }

    #[test]
    fn parse_usize_out_of_range() {
        assert_eq!(parse_usize_range("0", 1, 1000), None);
        assert_eq!(parse_usize_range("20000", 1, 1000), None);
        assert_eq!(parse_usize_range("five", 1, 1000), None);
    }

    #[test]
    fn parse_f64_valid() {
        assert_eq!(parse_f64_range("0.25", 0.0, 1.0), Some(0.25));
        assert_eq!(parse_f64_range("0", 0.0, 1.0), Some(0.0));
        assert_eq!(parse_f64_range("1", 0.0, 1.0), Some(1.0));
    }

    #[test]
    fn parse_f64_rejects_out_of_range_and_non_finite() {
        assert_eq!(parse_f64_range("1.01", 0.0, 1.0), None);
        assert_eq!(parse_f64_range("-0.5", 0.0, 1.0), None);
        assert_eq!(parse_f64_range("NaN", 0.0, 1.0), None);
        assert_eq!(parse_f64_range("inf", 0.0, 1.0), None);
    }
}
