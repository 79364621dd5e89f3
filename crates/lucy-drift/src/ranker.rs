//! Exact cosine re-ranking of shortlisted candidates.

use std::cmp::Ordering;
use std::sync::Arc;

use lucy_embeddings::{EmbeddingError, EmbeddingService, cosine_similarity, validate_embedding};
use lucy_store::LogEntry;

use crate::errors::Result;
use crate::types::ScoredCandidate;

/// Scores prior responses against a query by cosine similarity.
#[derive(Clone)]
pub struct SimilarityRanker {
    embedder: Arc<dyn EmbeddingService>,
}

impl SimilarityRanker {
    /// Create a ranker over the given embedder.
    pub fn new(embedder: Arc<dyn EmbeddingService>) -> Self {
        Self { embedder }
    }

    /// Cosine similarity between the embeddings of `a` and `b`.
    pub async fn score(&self, a: &str, b: &str) -> Result<f32> {
        let vectors = self.embed_all(vec![a.to_string(), b.to_string()]).await?;
        Ok(cosine_similarity(&vectors[0], &vectors[1]))
    }

    /// Score every candidate against `query`, best first.
    pub async fn rank(&self, query: &str, candidates: &[LogEntry]) -> Result<Vec<ScoredCandidate>> {
        let texts: Vec<String> = std::iter::once(query.to_string())
            .chain(candidates.iter().map(|c| c.response_text.clone()))
            .collect();
        let mut vectors = self.embed_all(texts).await?;
        let query_vec = vectors.remove(0);
        let pairs = candidates.iter().cloned().zip(vectors).collect();
        Ok(rank_embedded(&query_vec, pairs))
    }

    async fn embed_all(&self, texts: Vec<String>) -> Result<Vec<Vec<f32>>> {
        let expected = texts.len();
        let vectors = self.embedder.embed(&texts).await?;
        if vectors.len() != expected {
            return Err(EmbeddingError::Malformed(format!(
                "embedder returned {} vectors for {expected} texts",
                vectors.len()
            ))
            .into());
        }
        let dims = self.embedder.dimensions();
        for v in &vectors {
            validate_embedding(v, dims)?;
        }
        Ok(vectors)
    }
}

/// Rank candidates whose embeddings are already known.
///
/// Sorted by similarity descending, ties by lowest sequence index.
pub fn rank_embedded(query: &[f32], candidates: Vec<(LogEntry, Vec<f32>)>) -> Vec<ScoredCandidate> {
    let mut scored: Vec<ScoredCandidate> = candidates
        .into_iter()
        .map(|(entry, v)| ScoredCandidate {
            similarity: cosine_similarity(query, &v),
            sequence_index: entry.sequence_index,
            response_text: entry.response_text,
        })
        .collect();
    scored.sort_by(compare_scored);
    scored
}

fn compare_scored(a: &ScoredCandidate, b: &ScoredCandidate) -> Ordering {
    b.similarity
        .total_cmp(&a.similarity)
        .then(a.sequence_index.cmp(&b.sequence_index))
}
