//! The response log abstraction.

use crate::errors::Result;
use crate::types::{EmbedderFingerprint, LogEntry};

/// Append-only, ordered store of evaluated responses and their embeddings.
///
/// Sequence indices are dense and start at 0: after `n` successful appends
/// the entries are exactly `0..n`. Entries are never mutated or removed.
pub trait ResponseLog: Send {
    /// Append a response and its embedding, returning its sequence index.
    fn append(&mut self, text: &str, embedding: &[f32]) -> Result<u64>;

    /// Fetch the entry at `sequence_index`.
    fn get(&self, sequence_index: u64) -> Result<LogEntry>;

    /// Number of entries.
    fn count(&self) -> Result<u64>;

    /// All stored embeddings in sequence order.
    fn load_vectors(&self) -> Result<Vec<Vec<f32>>>;

    /// The embedder recorded for this store, if any.
    fn embedder_fingerprint(&self) -> Result<Option<EmbedderFingerprint>>;

    /// Record the embedder for this store.
    fn set_embedder_fingerprint(&mut self, fingerprint: &EmbedderFingerprint) -> Result<()>;
}
