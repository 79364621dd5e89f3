//! In-memory response log.

use crate::errors::{Result, StoreError};
use crate::log::ResponseLog;
use crate::types::{EmbedderFingerprint, LogEntry};

/// `Vec`-backed [`ResponseLog`] for tests and ephemeral runs.
#[derive(Debug, Default)]
pub struct MemoryResponseLog {
    entries: Vec<(String, Vec<f32>)>,
    fingerprint: Option<EmbedderFingerprint>,
}

impl MemoryResponseLog {
    /// Create an empty log.
    pub fn new() -> Self {
        Self::default()
    }
}

impl ResponseLog for MemoryResponseLog {
    fn append(&mut self, text: &str, embedding: &[f32]) -> Result<u64> {
        let seq = self.entries.len() as u64;
        self.entries.push((text.to_string(), embedding.to_vec()));
        Ok(seq)
    }

    fn get(&self, sequence_index: u64) -> Result<LogEntry> {
        usize::try_from(sequence_index)
            .ok()
            .and_then(|i| self.entries.get(i))
            .map(|(text, _)| LogEntry {
                sequence_index,
                response_text: text.clone(),
            })
            .ok_or(StoreError::NotFound(sequence_index))
    }

    fn count(&self) -> Result<u64> {
        Ok(self.entries.len() as u64)
    }

    fn load_vectors(&self) -> Result<Vec<Vec<f32>>> {
        Ok(self.entries.iter().map(|(_, v)| v.clone()).collect())
    }

    fn embedder_fingerprint(&self) -> Result<Option<EmbedderFingerprint>> {
        Ok(self.fingerprint.clone())
    }

    fn set_embedder_fingerprint(&mut self, fingerprint: &EmbedderFingerprint) -> Result<()> {
        self.fingerprint = Some(fingerprint.clone());
        Ok(())
    }
}
