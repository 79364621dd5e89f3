//! The drift engine.
//!
//! Owns the embedder, the vector index and the response log. Each evaluation
//! embeds the new response, searches the index as it stood before the call,
//! re-ranks the shortlist by cosine similarity, scores drift, then appends
//! the response to both the index and the log.
//!
//! Embedding runs outside the lock. Retrieval, scoring and the append run
//! under one `tokio::sync::Mutex` guard so concurrent callers never observe
//! or create a half-appended entry.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use lucy_embeddings::{EmbeddingService, validate_embedding};
use lucy_store::{EmbedderFingerprint, ResponseLog, StoreError};
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

use crate::errors::{DriftError, Result};
use crate::index::FlatL2Index;
use crate::ranker::{SimilarityRanker, rank_embedded};
use crate::types::{DriftConfig, DriftResult, EngineStats, EvaluateOptions, is_alert};

struct EngineState {
    index: FlatL2Index,
    log: Box<dyn ResponseLog>,
}

/// Semantic drift detector over an append-only response history.
pub struct DriftEngine {
    embedder: Arc<dyn EmbeddingService>,
    ranker: SimilarityRanker,
    state: Mutex<EngineState>,
    halted: AtomicBool,
    config: DriftConfig,
}

impl std::fmt::Debug for DriftEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DriftEngine")
            .field("halted", &self.halted)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl DriftEngine {
    /// Open an engine over an existing (possibly empty) log.
    ///
    /// Records the embedder fingerprint on first use and rejects a log built
    /// by a different embedder. The index is rebuilt from stored vectors.
    pub fn open(
        embedder: Arc<dyn EmbeddingService>,
        mut log: Box<dyn ResponseLog>,
        config: DriftConfig,
    ) -> Result<Self> {
        config.validate()?;
        let dims = embedder.dimensions();
        if dims == 0 {
            return Err(DriftError::InvalidArgument(
                "embedder dimensions must be at least 1".into(),
            ));
        }

        let configured = EmbedderFingerprint {
            model_id: embedder.model_id().to_string(),
            dimensions: dims,
        };
        match log.embedder_fingerprint()? {
            Some(stored) if stored != configured => {
                return Err(DriftError::EmbedderMismatch { stored, configured });
            }
            Some(_) => {}
            None => log.set_embedder_fingerprint(&configured)?,
        }

        let vectors = log.load_vectors()?;
        let index = FlatL2Index::from_vectors(dims, &vectors).map_err(|e| {
            DriftError::IndexCorruption(format!("stored vectors do not rebuild the index: {e}"))
        })?;
        let logged = log.count()?;
        if index.len() as u64 != logged {
            return Err(DriftError::IndexCorruption(format!(
                "rebuilt index has {} entries, log has {logged}",
                index.len()
            )));
        }

        info!(
            model = %configured.model_id,
            dims,
            entries = logged,
            lookback = config.lookback,
            alert_threshold = config.alert_threshold,
            "drift engine ready"
        );

        Ok(Self {
            ranker: SimilarityRanker::new(Arc::clone(&embedder)),
            embedder,
            state: Mutex::new(EngineState { index, log }),
            halted: AtomicBool::new(false),
            config,
        })
    }

    /// Evaluate with the configured lookback and threshold.
    pub async fn evaluate(&self, new_response: &str) -> Result<DriftResult> {
        self.evaluate_with(new_response, EvaluateOptions::default()).await
    }

    /// Evaluate with per-call overrides.
    pub async fn evaluate_with(
        &self,
        new_response: &str,
        options: EvaluateOptions,
    ) -> Result<DriftResult> {
        self.ensure_running()?;
        let config = options.resolve(&self.config)?;

        let query = self.embedder.embed_single(new_response).await?;
        validate_embedding(&query, self.embedder.dimensions())?;

        let mut state = self.state.lock().await;
        self.ensure_running()?;
        self.check_alignment(&state)?;

        let neighbors = state.index.search(&query, config.lookback)?;
        let mut candidates = Vec::with_capacity(neighbors.len());
        for neighbor in &neighbors {
            let entry = match state.log.get(neighbor.sequence_index) {
                Ok(entry) => entry,
                Err(StoreError::NotFound(seq)) => {
                    return Err(self.halt(format!("index returned {seq}, which the log does not hold")));
                }
                Err(e) => return Err(e.into()),
            };
            let vector = state
                .index
                .vector(neighbor.sequence_index)
                .map(<[f32]>::to_vec)
                .ok_or_else(|| self.halt(format!("index lost vector {}", neighbor.sequence_index)))?;
            candidates.push((entry, vector));
        }

        let ranked = rank_embedded(&query, candidates);
        let best_match = ranked.first().cloned();
        let similarity_score = best_match.as_ref().map_or(0.0, |b| f64::from(b.similarity));
        let drift_score = 1.0 - similarity_score;
        let alert = best_match.is_some() && is_alert(drift_score, config.alert_threshold);
        debug!(
            candidates = ranked.len(),
            similarity_score, drift_score, alert, "scored response"
        );

        let mut result = DriftResult {
            new_response: new_response.to_string(),
            best_match,
            similarity_score,
            drift_score,
            alert,
            candidates: ranked,
            sequence_index: None,
        };

        let next = state.index.len();
        state.index.add(next as u64, &query)?;
        match state.log.append(new_response, &query) {
            Ok(seq) if seq == next as u64 => result.sequence_index = Some(seq),
            Ok(seq) => {
                state.index.truncate(next);
                return Err(self.halt(format!("log assigned {seq}, index expected {next}")));
            }
            Err(source) => {
                state.index.truncate(next);
                warn!(error = %source, "append failed, index entry rolled back");
                return Err(DriftError::Storage {
                    source,
                    result: Some(Box::new(result)),
                });
            }
        }
        drop(state);

        if result.alert {
            warn!(
                sequence_index = next,
                similarity_score = result.similarity_score,
                drift_score = result.drift_score,
                alert_threshold = config.alert_threshold,
                "drift alert"
            );
        }
        Ok(result)
    }

    /// Cosine similarity between two texts under this engine's embedder.
    pub async fn score(&self, a: &str, b: &str) -> Result<f32> {
        self.ranker.score(a, b).await
    }

    /// The ranker sharing this engine's embedder.
    pub fn ranker(&self) -> &SimilarityRanker {
        &self.ranker
    }

    /// Entry counts of the index and the log.
    pub async fn stats(&self) -> Result<EngineStats> {
        let state = self.state.lock().await;
        Ok(EngineStats {
            indexed: state.index.len() as u64,
            logged: state.log.count()?,
        })
    }

    /// Engine-wide defaults.
    pub fn config(&self) -> &DriftConfig {
        &self.config
    }

    /// Whether the engine has stopped after detecting corruption.
    pub fn is_halted(&self) -> bool {
        self.halted.load(Ordering::SeqCst)
    }

    fn ensure_running(&self) -> Result<()> {
        if self.is_halted() {
            return Err(DriftError::IndexCorruption(
                "engine halted after an earlier alignment failure".into(),
            ));
        }
        Ok(())
    }

    fn check_alignment(&self, state: &EngineState) -> Result<()> {
        let indexed = state.index.len() as u64;
        let logged = state.log.count()?;
        if indexed != logged {
            return Err(self.halt(format!("index has {indexed} entries, log has {logged}")));
        }
        Ok(())
    }

    fn halt(&self, reason: String) -> DriftError {
        self.halted.store(true, Ordering::SeqCst);
        error!(reason = %reason, "alignment broken, halting drift engine");
        DriftError::IndexCorruption(reason)
    }
}
