//! `SQLite`-backed response log.
//!
//! Appends are a single `INSERT ... SELECT MAX(seq) + 1`, so sequence indices
//! stay dense even with several writers on the same file.

use chrono::Utc;
use rusqlite::{OptionalExtension, params};
use tracing::debug;

use super::connection::ConnectionPool;
use crate::blob::{blob_to_f32_vec, f32_slice_to_blob};
use crate::errors::{Result, StoreError};
use crate::log::ResponseLog;
use crate::types::{EmbedderFingerprint, LogEntry};

const FINGERPRINT_KEY: &str = "embedder";

/// Persistent [`ResponseLog`] over an `r2d2` pool.
#[derive(Clone)]
pub struct SqliteResponseLog {
    pool: ConnectionPool,
}

impl SqliteResponseLog {
    /// Wrap a migrated pool.
    pub fn new(pool: ConnectionPool) -> Self {
        Self { pool }
    }
}

fn to_seq(raw: i64) -> Result<u64> {
    u64::try_from(raw).map_err(|_| StoreError::Corrupt(format!("negative sequence index {raw}")))
}

impl ResponseLog for SqliteResponseLog {
    fn append(&mut self, text: &str, embedding: &[f32]) -> Result<u64> {
        let conn = self.pool.get()?;
        let seq: i64 = conn.query_row(
            "INSERT INTO responses (seq, response_text, embedding, created_at)
             SELECT COALESCE(MAX(seq) + 1, 0), ?1, ?2, ?3 FROM responses
             RETURNING seq",
            params![text, f32_slice_to_blob(embedding), Utc::now().to_rfc3339()],
            |row| row.get(0),
        )?;
        debug!(seq, "appended response");
        to_seq(seq)
    }

    fn get(&self, sequence_index: u64) -> Result<LogEntry> {
        let seq = i64::try_from(sequence_index).map_err(|_| StoreError::NotFound(sequence_index))?;
        let conn = self.pool.get()?;
        let text: Option<String> = conn
            .query_row(
                "SELECT response_text FROM responses WHERE seq = ?1",
                params![seq],
                |row| row.get(0),
            )
            .optional()?;
        text.map(|response_text| LogEntry {
            sequence_index,
            response_text,
        })
        .ok_or(StoreError::NotFound(sequence_index))
    }

    fn count(&self) -> Result<u64> {
        let conn = self.pool.get()?;
        let n: i64 = conn.query_row("SELECT COUNT(*) FROM responses", [], |row| row.get(0))?;
        to_seq(n)
    }

    fn load_vectors(&self) -> Result<Vec<Vec<f32>>> {
        let conn = self.pool.get()?;
        let mut stmt = conn.prepare("SELECT seq, embedding FROM responses ORDER BY seq")?;
        let rows = stmt.query_map([], |row| Ok((row.get::<_, i64>(0)?, row.get::<_, Vec<u8>>(1)?)))?;

        let mut vectors = Vec::new();
        for (expected, row) in (0_i64..).zip(rows) {
            let (seq, blob) = row?;
            if seq != expected {
                return Err(StoreError::Corrupt(format!(
                    "sequence gap: expected {expected}, found {seq}"
                )));
            }
            vectors.push(blob_to_f32_vec(&blob)?);
        }
        Ok(vectors)
    }

    fn embedder_fingerprint(&self) -> Result<Option<EmbedderFingerprint>> {
        let conn = self.pool.get()?;
        let raw: Option<String> = conn
            .query_row(
                "SELECT value FROM meta WHERE key = ?1",
                params![FINGERPRINT_KEY],
                |row| row.get(0),
            )
            .optional()?;
        raw.map(|json| serde_json::from_str(&json).map_err(StoreError::from))
            .transpose()
    }

    fn set_embedder_fingerprint(&mut self, fingerprint: &EmbedderFingerprint) -> Result<()> {
        let json = serde_json::to_string(fingerprint)?;
        let conn = self.pool.get()?;
        let _ = conn.execute(
            "INSERT INTO meta (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
            params![FINGERPRINT_KEY, json],
        )?;
        Ok(())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
