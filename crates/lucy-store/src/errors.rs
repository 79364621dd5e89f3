//! Error types for the response log and drift history.

use thiserror::Error;

/// Errors that can occur during storage operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// `SQLite` database error.
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// Connection pool error.
    #[error("connection pool error: {0}")]
    Pool(#[from] r2d2::Error),

    /// JSON serialization/deserialization error.
    #[error("serde error: {0}")]
    Serde(#[from] serde_json::Error),

    /// Filesystem error (creating the database directory).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Schema migration failed.
    #[error("migration error: {message}")]
    Migration {
        /// Describes which migration failed and why.
        message: String,
    },

    /// No log entry at the requested sequence index.
    #[error("log entry not found: {0}")]
    NotFound(u64),

    /// Stored data violates the log's own invariants.
    #[error("corrupt store: {0}")]
    Corrupt(String),

    /// Internal error (e.g. injected failure, poisoned lock).
    #[error("internal error: {0}")]
    Internal(String),
}

/// Convenience type alias for storage results.
pub type Result<T> = std::result::Result<T, StoreError>;

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
