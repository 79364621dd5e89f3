//! `SQLite` persistence: connection pool, migrations, response log, history.

pub mod connection;
pub mod history;
pub mod migrations;
pub mod response_log;

use std::path::Path;

pub use connection::{ConnectionConfig, ConnectionPool, PooledConnection};
pub use history::DriftHistory;
pub use response_log::SqliteResponseLog;

use crate::errors::Result;

/// Open a file-backed pool and bring its schema up to date.
pub fn open_pool(path: &Path, config: &ConnectionConfig) -> Result<ConnectionPool> {
    let pool = connection::new_file(path, config)?;
    let conn = pool.get()?;
    let _ = migrations::run_migrations(&conn)?;
    Ok(pool)
}
