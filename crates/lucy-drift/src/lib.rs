//! # lucy-drift
//!
//! Semantic drift detection over repeated outputs of a text generator.
//!
//! - [`FlatL2Index`]: approximate retrieval, squared Euclidean distance
//! - [`SimilarityRanker`]: exact re-ranking, cosine similarity
//! - [`DriftEngine`]: embed → retrieve → re-rank → score → append
//!
//! The two measures are deliberately different: the index only shortlists,
//! the ranker decides. Entry `i` of the index is always entry `i` of the
//! response log; the engine halts rather than serve from a misaligned store.
//!
//! ## Crate Position
//!
//! Depends on: lucy-settings, lucy-embeddings, lucy-store.
//! Depended on by: lucy-cli.

#![deny(unsafe_code)]

pub mod engine;
pub mod errors;
pub mod index;
pub mod ranker;
pub mod types;

pub use engine::DriftEngine;
pub use errors::{DriftError, Result};
pub use index::{FlatL2Index, Neighbor};
pub use ranker::{SimilarityRanker, rank_embedded};
pub use types::{DriftConfig, DriftResult, EngineStats, EvaluateOptions, ScoredCandidate, is_alert};
