//! Feature-hashing embedder.
//!
//! Each lower-cased alphanumeric token is hashed with SHA-256 and the first
//! eight bytes pick a bucket. Bucket counts are L2-normalized. Counts only
//! ever grow, so any text with at least one token has a non-zero vector even
//! when tokens collide. Texts with no tokens in common are orthogonal unless
//! their tokens share buckets.

use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use sha2::{Digest, Sha256};

use crate::errors::{EmbeddingError, Result};
use crate::normalize::l2_normalize;
use crate::service::{EmbeddingService, validate_embedding};
use crate::text::tokenize;

/// Model identifier recorded alongside vectors from this embedder.
pub const HASH_MODEL_ID: &str = "lucy/feature-hash-v2";

/// Deterministic bag-of-words embedder.
pub struct HashEmbeddingService {
    dims: usize,
    model_id: String,
    ready: AtomicBool,
}

impl HashEmbeddingService {
    /// Create a new hash embedder with the given dimensions.
    pub fn new(dims: usize) -> Self {
        Self {
            dims,
            model_id: format!("{HASH_MODEL_ID}/{dims}"),
            ready: AtomicBool::new(true),
        }
    }

    /// Set whether this embedder reports ready.
    pub fn set_ready(&self, ready: bool) {
        self.ready.store(ready, Ordering::SeqCst);
    }

    /// Embed one text synchronously.
    pub fn embed_text(&self, text: &str) -> Result<Vec<f32>> {
        let tokens = tokenize(text);
        if tokens.is_empty() {
            return Err(EmbeddingError::EmptyInput);
        }

        let mut v = vec![0.0_f32; self.dims];
        for token in &tokens {
            v[self.bucket(token)] += 1.0;
        }
        l2_normalize(&mut v);
        validate_embedding(&v, self.dims)?;
        Ok(v)
    }

    #[allow(clippy::cast_possible_truncation)]
    fn bucket(&self, token: &str) -> usize {
        let digest = Sha256::digest(token.as_bytes());
        let mut head = [0_u8; 8];
        head.copy_from_slice(&digest[..8]);
        (u64::from_le_bytes(head) % self.dims as u64) as usize
    }
}

#[async_trait]
impl EmbeddingService for HashEmbeddingService {
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if !self.is_ready() {
            return Err(EmbeddingError::NotReady);
        }
        if self.dims == 0 {
            return Err(EmbeddingError::Config("dimensions must be at least 1".into()));
        }
        texts.iter().map(|t| self.embed_text(t)).collect()
    }

    fn is_ready(&self) -> bool {
        self.ready.load(Ordering::SeqCst)
    }

    fn dimensions(&self) -> usize {
        self.dims
    }

    fn model_id(&self) -> &str {
        &self.model_id
    }
}
