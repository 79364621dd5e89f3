//! Settings type definitions.
//!
//! All types use `#[serde(rename_all = "camelCase")]` for the JSON file
//! format. Each type implements [`Default`] with production default values,
//! and `#[serde(default)]` allows partial JSON.

mod engine;
mod storage;

pub use engine::*;
pub use storage::*;

use serde::{Deserialize, Serialize};

use crate::errors::{Result, SettingsError};

/// Root settings type for the lucy drift monitor.
///
/// ```json
/// {
///   "engine": { "lookback": 10, "alertThreshold": 0.25 },
///   "embedding": { "provider": "hash" }
/// }
/// ```
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LucySettings {
    /// Drift scoring defaults.
    pub engine: EngineSettings,
    /// Text embedder selection and model parameters.
    pub embedding: EmbeddingSettings,
    /// Response log database.
    pub storage: StorageSettings,
    /// Log output.
    pub logging: LoggingSettings,
}

impl LucySettings {
    /// Reject values the engine cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.engine.lookback == 0 {
            return Err(SettingsError::InvalidValue(
                "engine.lookback must be at least 1".into(),
            ));
        }
        let threshold = self.engine.alert_threshold;
        if !(0.0..=1.0).contains(&threshold) {
            return Err(SettingsError::InvalidValue(format!(
                "engine.alertThreshold must be within [0, 1], got {threshold}"
            )));
        }
        if self.embedding.dimensions == 0 {
            return Err(SettingsError::InvalidValue(
                "embedding.dimensions must be at least 1".into(),
            ));
        }
        if self.storage.pool_size == 0 {
            return Err(SettingsError::InvalidValue(
                "storage.poolSize must be at least 1".into(),
            ));
        }
        Ok(())
    }
}
