//! Drift engine and embedder settings.

use serde::{Deserialize, Serialize};

/// Defaults applied to every evaluation unless the caller overrides them.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EngineSettings {
    /// Number of nearest prior responses shortlisted per evaluation.
    pub lookback: usize,
    /// Drift score above which an alert is raised (strict `>`).
    pub alert_threshold: f64,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            lookback: 5,
            alert_threshold: 0.3,
        }
    }
}

/// Which text embedder backs the engine.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmbeddingProvider {
    /// Sentence-transformer model run through ONNX Runtime.
    Onnx,
    /// Deterministic feature-hashing embedder (no model download).
    #[default]
    Hash,
}

impl EmbeddingProvider {
    /// Parse a provider name (case-insensitive).
    pub fn parse(val: &str) -> Option<Self> {
        match val.to_lowercase().as_str() {
            "onnx" => Some(Self::Onnx),
            "hash" => Some(Self::Hash),
            _ => None,
        }
    }
}

/// Text embedder settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EmbeddingSettings {
    /// Embedder backend.
    pub provider: EmbeddingProvider,
    /// Hugging Face model identifier (ONNX provider only).
    pub model: String,
    /// Output vector dimensions.
    pub dimensions: usize,
    /// Local model cache directory (may contain `~`).
    pub cache_dir: String,
    /// Token limit per input; longer inputs are truncated.
    pub max_sequence_length: usize,
    /// ONNX Runtime intra-op threads.
    pub intra_threads: usize,
}

impl Default for EmbeddingSettings {
    fn default() -> Self {
        Self {
            provider: EmbeddingProvider::Hash,
            model: "sentence-transformers/all-MiniLM-L6-v2".to_string(),
            dimensions: 384,
            cache_dir: "~/.lucy/models".to_string(),
            max_sequence_length: 256,
            intra_threads: 2,
        }
    }
}
