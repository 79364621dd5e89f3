//! # lucy-store
//!
//! Storage for the lucy drift monitor.
//!
//! - [`ResponseLog`]: append-only, densely indexed log of evaluated responses
//!   and their embeddings. Position `i` in the log is position `i` in the
//!   vector index rebuilt from it.
//! - [`SqliteResponseLog`]: persistent log over an `r2d2` pool (WAL mode,
//!   embedded migrations).
//! - [`MemoryResponseLog`]: ephemeral log for tests and one-off runs.
//! - [`DriftHistory`]: per-evaluation records for the surrounding service.
//!
//! ## Crate Position
//!
//! Depends on: lucy-settings.
//! Depended on by: lucy-drift, lucy-cli.

#![deny(unsafe_code)]

pub mod blob;
pub mod errors;
pub mod log;
pub mod memory;
pub mod sqlite;
pub mod types;

pub use blob::{blob_to_f32_vec, f32_slice_to_blob};
pub use errors::{Result, StoreError};
pub use log::ResponseLog;
pub use memory::MemoryResponseLog;
pub use sqlite::{ConnectionConfig, DriftHistory, SqliteResponseLog, open_pool};
pub use types::{DriftRecord, EmbedderFingerprint, LogEntry};
