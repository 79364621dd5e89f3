//! Concurrent evaluations are serialized and keep the log and index aligned.

mod common;

use std::collections::BTreeSet;
use std::sync::Arc;

use lucy_drift::{DriftConfig, DriftEngine, EngineStats};
use lucy_embeddings::HashEmbeddingService;
use lucy_store::{ConnectionConfig, ResponseLog, SqliteResponseLog, open_pool};

use common::{DIMS, hash_embedder, memory_engine};

const CALLERS: u64 = 8;

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_evaluations_get_distinct_sequence_indices() {
    let engine = Arc::new(memory_engine());

    let handles: Vec<_> = (0..CALLERS)
        .map(|i| {
            let engine = Arc::clone(&engine);
            tokio::spawn(async move {
                engine
                    .evaluate(&format!("response number {i} about topic {i}"))
                    .await
                    .unwrap()
            })
        })
        .collect();

    let mut results = Vec::new();
    for h in handles {
        results.push(h.await.unwrap());
    }

    let seqs: BTreeSet<u64> = results.iter().filter_map(|r| r.sequence_index).collect();
    assert_eq!(seqs, (0..CALLERS).collect::<BTreeSet<_>>());

    // Only the caller that found an empty store has no match.
    let unmatched: Vec<_> = results.iter().filter(|r| r.best_match.is_none()).collect();
    assert_eq!(unmatched.len(), 1);
    assert_eq!(unmatched[0].sequence_index, Some(0));

    // Every other caller saw exactly the entries appended before it.
    for r in &results {
        let seq = r.sequence_index.unwrap();
        let expected = usize::try_from(seq.min(5)).unwrap();
        assert_eq!(r.candidates.len(), expected);
        assert!(r.candidates.iter().all(|c| c.sequence_index < seq));
    }

    assert_eq!(
        engine.stats().await.unwrap(),
        EngineStats {
            indexed: CALLERS,
            logged: CALLERS
        }
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn stored_vectors_match_stored_texts_after_concurrent_writes() {
    let dir = tempfile::tempdir().unwrap();
    let pool = open_pool(&dir.path().join("lucy.db"), &ConnectionConfig::default()).unwrap();
    let reader = SqliteResponseLog::new(pool.clone());
    let engine = Arc::new(
        DriftEngine::open(
            hash_embedder(),
            Box::new(SqliteResponseLog::new(pool)),
            DriftConfig::default(),
        )
        .unwrap(),
    );

    let handles: Vec<_> = (0..CALLERS)
        .map(|i| {
            let engine = Arc::clone(&engine);
            tokio::spawn(async move {
                let text = if i % 2 == 0 {
                    format!("The sky is blue on day {i}.")
                } else {
                    format!("Bananas are yellow in batch {i}.")
                };
                engine.evaluate(&text).await.unwrap()
            })
        })
        .collect();
    for h in handles {
        let _ = h.await.unwrap();
    }

    let embedder = HashEmbeddingService::new(DIMS);
    let vectors = reader.load_vectors().unwrap();
    assert_eq!(vectors.len() as u64, CALLERS);
    for (seq, stored) in (0_u64..).zip(&vectors) {
        let entry = reader.get(seq).unwrap();
        assert_eq!(stored, &embedder.embed_text(&entry.response_text).unwrap());
    }
}
