//! Drift history: one row per evaluation, newest first on read.

use chrono::{DateTime, Utc};
use rusqlite::params;

use super::connection::ConnectionPool;
use crate::errors::{Result, StoreError};
use crate::types::DriftRecord;

/// Recorded evaluations, kept alongside the response log.
#[derive(Clone)]
pub struct DriftHistory {
    pool: ConnectionPool,
}

impl DriftHistory {
    /// Wrap a migrated pool.
    pub fn new(pool: ConnectionPool) -> Self {
        Self { pool }
    }

    /// Store a record, returning its row id.
    pub fn record(&self, record: &DriftRecord) -> Result<i64> {
        let conn = self.pool.get()?;
        let _ = conn.execute(
            "INSERT INTO drift_records (timestamp, query, response, similarity_score, drift_score, alert)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                record.timestamp.to_rfc3339(),
                record.query,
                record.response,
                record.similarity_score,
                record.drift_score,
                record.alert,
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }

    /// The most recent `limit` records, newest first.
    pub fn recent(&self, limit: usize) -> Result<Vec<DriftRecord>> {
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let conn = self.pool.get()?;
        let mut stmt = conn.prepare(
            "SELECT id, timestamp, query, response, similarity_score, drift_score, alert
             FROM drift_records ORDER BY id DESC LIMIT ?1",
        )?;
        let rows = stmt.query_map(params![limit], |row| {
            Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, Option<String>>(2)?,
                row.get::<_, String>(3)?,
                row.get::<_, f64>(4)?,
                row.get::<_, f64>(5)?,
                row.get::<_, bool>(6)?,
            ))
        })?;

        let mut records = Vec::new();
        for row in rows {
            let (id, timestamp, query, response, similarity_score, drift_score, alert) = row?;
            records.push(DriftRecord {
                id: Some(id),
                timestamp: parse_timestamp(&timestamp)?,
                query,
                response,
                similarity_score,
                drift_score,
                alert,
            });
        }
        Ok(records)
    }

    /// Number of stored records.
    pub fn count(&self) -> Result<u64> {
        let conn = self.pool.get()?;
        let n: i64 = conn.query_row("SELECT COUNT(*) FROM drift_records", [], |row| row.get(0))?;
        u64::try_from(n).map_err(|_| StoreError::Corrupt(format!("negative count {n}")))
    }
}

fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| StoreError::Corrupt(format!("bad timestamp {raw:?}: {e}")))
}
