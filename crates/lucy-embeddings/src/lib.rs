//! # lucy-embeddings
//!
//! Text embedders for the lucy drift monitor.
//!
//! - [`EmbeddingService`]: text → fixed-dimension vector, deterministic per
//!   model configuration
//! - [`HashEmbeddingService`]: feature-hashing embedder, no model download
//! - `OnnxEmbeddingService` (feature `ort`): all-MiniLM-L6-v2 via ONNX Runtime,
//!   mean pooling + L2 normalization, 384 dimensions
//! - [`normalize`]: cosine similarity (exact re-rank) and squared Euclidean
//!   distance (approximate retrieval)
//!
//! ## Crate Position
//!
//! Depends on: lucy-settings.
//! Depended on by: lucy-drift, lucy-cli.

#![deny(unsafe_code)]

pub mod config;
pub mod errors;
pub mod hash;
pub mod normalize;
#[cfg(feature = "ort")]
pub mod ort_service;
pub mod service;
pub mod text;

pub use config::EmbeddingConfig;
pub use errors::{EmbeddingError, Result};
pub use hash::HashEmbeddingService;
pub use normalize::{cosine_similarity, l2_norm, l2_normalize, squared_euclidean};
#[cfg(feature = "ort")]
pub use ort_service::OnnxEmbeddingService;
pub use service::{EmbeddingService, validate_embedding};
pub use text::{normalize_text, tokenize};
