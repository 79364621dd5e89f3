//! Embedding service trait and output validation.

use async_trait::async_trait;

use crate::errors::{EmbeddingError, Result};

/// Trait for embedding text into vectors.
///
/// Implementations must be deterministic for a fixed configuration: the same
/// text always yields the same vector, with no state carried between calls.
#[async_trait]
pub trait EmbeddingService: Send + Sync {
    /// Embed a batch of texts.
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;

    /// Embed a single text (default: calls `embed` with one item).
    async fn embed_single(&self, text: &str) -> Result<Vec<f32>> {
        let results = self.embed(&[text.to_string()]).await?;
        results
            .into_iter()
            .next()
            .ok_or_else(|| EmbeddingError::Inference("empty result".into()))
    }

    /// Whether the service is ready for inference.
    fn is_ready(&self) -> bool;

    /// Output embedding dimensions.
    fn dimensions(&self) -> usize;

    /// Identifier of the model configuration producing the vectors.
    ///
    /// Vectors from different identifiers must never share an index.
    fn model_id(&self) -> &str;
}

/// Check that an embedder result has the declared length, finite values and
/// a non-zero norm.
pub fn validate_embedding(v: &[f32], dims: usize) -> Result<()> {
    if v.len() != dims {
        return Err(EmbeddingError::DimensionMismatch {
            expected: dims,
            actual: v.len(),
        });
    }
    if let Some(pos) = v.iter().position(|x| !x.is_finite()) {
        return Err(EmbeddingError::Malformed(format!(
            "non-finite component at index {pos}"
        )));
    }
    if v.iter().all(|x| *x == 0.0) {
        return Err(EmbeddingError::Malformed("zero vector".into()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedService {
        vectors: Vec<Vec<f32>>,
    }

    #[async_trait]
    impl EmbeddingService for FixedService {
        async fn embed(&self, _texts: &[String]) -> Result<Vec<Vec<f32>>> {
            Ok(self.vectors.clone())
        }

        fn is_ready(&self) -> bool {
            true
        }

        fn dimensions(&self) -> usize {
            2
        }

        fn model_id(&self) -> &str {
            "fixed"
        }
    }

    #[tokio::test]
    async fn embed_single_takes_first() {
        let svc = FixedService {
            vectors: vec![vec![1.0, 0.0], vec![0.0, 1.0]],
        };
        assert_eq!(svc.embed_single("x").await.unwrap(), vec![1.0, 0.0]);
    }

    #[tokio::test]
    async fn embed_single_empty_result_is_error() {
        let svc = FixedService { vectors: vec![] };
        let err = svc.embed_single("x").await.unwrap_err();
        assert!(matches!(err, EmbeddingError::Inference(_)));
    }

    #[test]
    fn validate_accepts_correct_length() {
        validate_embedding(&[0.6, 0.8], 2).unwrap();
    }

    #[test]
    fn validate_rejects_wrong_length() {
        let err = validate_embedding(&[1.0], 2).unwrap_err();
        assert!(matches!(
            err,
            EmbeddingError::DimensionMismatch {
                expected: 2,
                actual: 1
            }
        ));
    }

    #[test]
    fn validate_rejects_non_finite() {
        let err = validate_embedding(&[1.0, f32::NAN], 2).unwrap_err();
        assert!(err.to_string().contains("index 1"));
        assert!(validate_embedding(&[f32::INFINITY, 0.0], 2).is_err());
    }

    #[test]
    fn validate_rejects_zero_vector() {
        let err = validate_embedding(&[0.0, 0.0], 2).unwrap_err();
        assert!(matches!(err, EmbeddingError::Malformed(ref m) if m == "zero vector"));
    }
}
