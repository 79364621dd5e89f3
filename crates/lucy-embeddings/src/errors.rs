//! Embedding error types.
//!
//! Embedding failures are never retried here. They abort the caller's
//! operation before any state is touched.

use thiserror::Error;

/// Errors from embedding operations.
#[derive(Debug, Error)]
pub enum EmbeddingError {
    /// Model initialization failed.
    #[error("Model initialization failed: {0}")]
    ModelInit(String),

    /// Inference failed.
    #[error("Inference failed: {0}")]
    Inference(String),

    /// Input text was empty after normalization.
    #[error("Input text is empty after normalization")]
    EmptyInput,

    /// Embedder returned a vector of the wrong length.
    #[error("Embedding dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch {
        /// Declared dimension.
        expected: usize,
        /// Length actually returned.
        actual: usize,
    },

    /// Embedder returned unusable values (e.g. NaN).
    #[error("Malformed embedding: {0}")]
    Malformed(String),

    /// Configuration error.
    #[error("Config error: {0}")]
    Config(String),

    /// Service not ready (model not loaded).
    #[error("Embedding service not ready")]
    NotReady,

    /// Generic internal error.
    #[error("{0}")]
    Internal(String),
}

/// Result alias for embedding operations.
pub type Result<T> = std::result::Result<T, EmbeddingError>;
