//! Shared fixtures for the drift engine integration tests.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use async_trait::async_trait;
use lucy_drift::{DriftConfig, DriftEngine};
use lucy_embeddings::{EmbeddingError, EmbeddingService, HashEmbeddingService};
use lucy_store::{
    EmbedderFingerprint, LogEntry, MemoryResponseLog, ResponseLog, StoreError,
};

pub const DIMS: usize = 384;

pub fn hash_embedder() -> Arc<dyn EmbeddingService> {
    Arc::new(HashEmbeddingService::new(DIMS))
}

pub fn memory_engine() -> DriftEngine {
    DriftEngine::open(
        hash_embedder(),
        Box::new(MemoryResponseLog::new()),
        DriftConfig::default(),
    )
    .unwrap()
}

/// Switches that make a [`ControlledLog`] misbehave.
#[derive(Default)]
pub struct Controls {
    pub fail_appends: AtomicBool,
    pub lose_entries: AtomicBool,
    pub skip_sequence: AtomicBool,
    pub extra_count: AtomicU64,
}

/// In-memory log whose failures are switched on from the test.
pub struct ControlledLog {
    inner: MemoryResponseLog,
    controls: Arc<Controls>,
}

impl ControlledLog {
    pub fn new() -> (Self, Arc<Controls>) {
        let controls = Arc::new(Controls::default());
        (
            Self {
                inner: MemoryResponseLog::new(),
                controls: Arc::clone(&controls),
            },
            controls,
        )
    }
}

impl ResponseLog for ControlledLog {
    fn append(&mut self, text: &str, embedding: &[f32]) -> lucy_store::Result<u64> {
        if self.controls.fail_appends.load(Ordering::SeqCst) {
            return Err(StoreError::Internal("disk full".into()));
        }
        let seq = self.inner.append(text, embedding)?;
        if self.controls.skip_sequence.load(Ordering::SeqCst) {
            return Ok(seq + 1);
        }
        Ok(seq)
    }

    fn get(&self, sequence_index: u64) -> lucy_store::Result<LogEntry> {
        if self.controls.lose_entries.load(Ordering::SeqCst) {
            return Err(StoreError::NotFound(sequence_index));
        }
        self.inner.get(sequence_index)
    }

    fn count(&self) -> lucy_store::Result<u64> {
        Ok(self.inner.count()? + self.controls.extra_count.load(Ordering::SeqCst))
    }

    fn load_vectors(&self) -> lucy_store::Result<Vec<Vec<f32>>> {
        self.inner.load_vectors()
    }

    fn embedder_fingerprint(&self) -> lucy_store::Result<Option<EmbedderFingerprint>> {
        self.inner.embedder_fingerprint()
    }

    fn set_embedder_fingerprint(&mut self, fingerprint: &EmbedderFingerprint) -> lucy_store::Result<()> {
        self.inner.set_embedder_fingerprint(fingerprint)
    }
}

pub fn controlled_engine() -> (DriftEngine, Arc<Controls>) {
    let (log, controls) = ControlledLog::new();
    let engine = DriftEngine::open(hash_embedder(), Box::new(log), DriftConfig::default()).unwrap();
    (engine, controls)
}

/// In-memory log the test can still read after handing it to an engine.
#[derive(Clone, Default)]
pub struct SharedLog(pub Arc<Mutex<MemoryResponseLog>>);

impl ResponseLog for SharedLog {
    fn append(&mut self, text: &str, embedding: &[f32]) -> lucy_store::Result<u64> {
        self.0.lock().unwrap().append(text, embedding)
    }

    fn get(&self, sequence_index: u64) -> lucy_store::Result<LogEntry> {
        self.0.lock().unwrap().get(sequence_index)
    }

    fn count(&self) -> lucy_store::Result<u64> {
        self.0.lock().unwrap().count()
    }

    fn load_vectors(&self) -> lucy_store::Result<Vec<Vec<f32>>> {
        self.0.lock().unwrap().load_vectors()
    }

    fn embedder_fingerprint(&self) -> lucy_store::Result<Option<EmbedderFingerprint>> {
        self.0.lock().unwrap().embedder_fingerprint()
    }

    fn set_embedder_fingerprint(&mut self, fingerprint: &EmbedderFingerprint) -> lucy_store::Result<()> {
        self.0.lock().unwrap().set_embedder_fingerprint(fingerprint)
    }
}

/// Embedder that returns fixed vectors regardless of its declared dimensions.
pub struct FixedEmbedder {
    pub declared_dims: usize,
    pub vector: Vec<f32>,
}

#[async_trait]
impl EmbeddingService for FixedEmbedder {
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        Ok(texts.iter().map(|_| self.vector.clone()).collect())
    }

    fn is_ready(&self) -> bool {
        true
    }

    fn dimensions(&self) -> usize {
        self.declared_dims
    }

    fn model_id(&self) -> &str {
        "test/fixed"
    }
}
