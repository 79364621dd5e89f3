//! # lucy-settings
//!
//! Configuration management with layered sources for the lucy drift monitor.
//!
//! Settings are loaded from three layers (in priority order):
//! 1. **Compiled defaults**: [`LucySettings::default()`]
//! 2. **User file**: `~/.lucy/settings.json` (deep-merged over defaults)
//! 3. **Environment variables**: `LUCY_*` overrides (highest priority)
//!
//! There is no global settings instance. The binary loads settings once and
//! passes the relevant sections into each component's constructor.
//!
//! # Usage
//!
//! ```no_run
//! use lucy_settings::load_settings;
//!
//! let settings = load_settings().unwrap_or_default();
//! println!("lookback: {}", settings.engine.lookback);
//! ```

#![deny(unsafe_code)]

pub mod errors;
pub mod loader;
pub mod types;

pub use errors::{Result, SettingsError};
pub use loader::{deep_merge, expand_home, load_settings, load_settings_from_path, settings_path};
pub use types::*;

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn re_exports_work() {
        let _settings = LucySettings::default();
        let _path = settings_path();
    }

    #[test]
    fn default_settings_are_valid() {
        let settings = LucySettings::default();
        assert_eq!(settings.engine.lookback, 5);
        assert!((settings.engine.alert_threshold - 0.3).abs() < f64::EPSILON);
        assert_eq!(settings.embedding.dimensions, 384);
        assert_eq!(
            settings.embedding.model,
            "sentence-transformers/all-MiniLM-L6-v2"
        );
        assert_eq!(settings.embedding.provider, EmbeddingProvider::Hash);
        assert_eq!(settings.storage.pool_size, 4);
        assert_eq!(settings.logging.level, LogLevel::Warn);
        settings.validate().unwrap();
    }
}
