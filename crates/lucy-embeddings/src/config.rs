//! Embedding configuration.

use std::path::PathBuf;

use lucy_settings::{EmbeddingSettings, expand_home};
use serde::{Deserialize, Serialize};

/// Configuration for the ONNX embedder.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EmbeddingConfig {
    /// Hugging Face model identifier.
    pub model: String,
    /// Output dimensions.
    pub dimensions: usize,
    /// Local model cache directory (may contain `~`).
    pub cache_dir: String,
    /// Token limit per input.
    pub max_sequence_length: usize,
    /// ONNX Runtime intra-op threads.
    pub intra_threads: usize,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self::from_settings(&EmbeddingSettings::default())
    }
}

impl EmbeddingConfig {
    /// Create config from settings.
    pub fn from_settings(s: &EmbeddingSettings) -> Self {
        Self {
            model: s.model.clone(),
            dimensions: s.dimensions,
            cache_dir: s.cache_dir.clone(),
            max_sequence_length: s.max_sequence_length,
            intra_threads: s.intra_threads,
        }
    }

    /// Resolve the cache directory, expanding `~/` to the home directory.
    pub fn resolved_cache_dir(&self) -> PathBuf {
        expand_home(&self.cache_dir)
    }
}
