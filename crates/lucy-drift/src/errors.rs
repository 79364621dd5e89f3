//! Error types for the drift engine.

use lucy_embeddings::EmbeddingError;
use lucy_store::{EmbedderFingerprint, StoreError};
use thiserror::Error;

use crate::types::DriftResult;

/// Errors returned by [`crate::DriftEngine`] and its components.
#[derive(Debug, Error)]
pub enum DriftError {
    /// The embedder failed or returned a malformed vector. Nothing was
    /// appended.
    #[error("embedding failed: {0}")]
    Embedding(#[from] EmbeddingError),

    /// The vector index and response log are out of alignment. The engine
    /// refuses all further work once this is raised.
    #[error("index corruption: {0}")]
    IndexCorruption(String),

    /// Reading or appending to the response log failed.
    ///
    /// When an append fails after scoring, `result` carries the computed
    /// scores and the in-memory index entry has been rolled back.
    #[error("storage error: {source}")]
    Storage {
        /// Underlying storage failure.
        #[source]
        source: StoreError,
        /// Scores computed before the append failed.
        result: Option<Box<DriftResult>>,
    },

    /// A caller-supplied parameter is out of range.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The store was built with a different embedder.
    #[error("embedder mismatch: store holds {stored}, engine configured with {configured}")]
    EmbedderMismatch {
        /// Fingerprint recorded in the store.
        stored: EmbedderFingerprint,
        /// Fingerprint of the embedder the engine was opened with.
        configured: EmbedderFingerprint,
    },
}

impl From<StoreError> for DriftError {
    fn from(source: StoreError) -> Self {
        Self::Storage {
            source,
            result: None,
        }
    }
}

/// Convenience type alias for drift engine results.
pub type Result<T> = std::result::Result<T, DriftError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn embedding_error_converts() {
        let err: DriftError = EmbeddingError::EmptyInput.into();
        assert!(matches!(err, DriftError::Embedding(EmbeddingError::EmptyInput)));
        assert!(err.to_string().starts_with("embedding failed"));
    }

    #[test]
    fn store_error_converts_without_result() {
        let err: DriftError = StoreError::NotFound(4).into();
        match err {
            DriftError::Storage { source, result } => {
                assert!(matches!(source, StoreError::NotFound(4)));
                assert!(result.is_none());
            }
            other => panic!("unexpected variant: {other:?}"),
        }
    }

    #[test]
    fn storage_error_exposes_source() {
        let err: DriftError = StoreError::Internal("disk full".into()).into();
        assert_eq!(err.to_string(), "storage error: internal error: disk full");
        assert!(err.source().is_some());
    }

    #[test]
    fn mismatch_display_names_both_embedders() {
        let err = DriftError::EmbedderMismatch {
            stored: EmbedderFingerprint {
                model_id: "a".into(),
                dimensions: 384,
            },
            configured: EmbedderFingerprint {
                model_id: "b".into(),
                dimensions: 64,
            },
        };
        let msg = err.to_string();
        assert!(msg.contains("a (384d)"));
        assert!(msg.contains("b (64d)"));
    }
}
