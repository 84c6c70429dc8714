//! SQLite connection pool
//!
//! Provides r2d2-based connection pooling for the collection database.
//! Per-connection pragmas (WAL, synchronous mode, foreign keys, busy
//! timeout) are applied by the manager's init callback so every pooled
//! connection behaves the same.

use std::path::Path;
use std::time::Duration;

use jimpitan_domain::{JimpitanError, Result};
use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::Connection;
use tracing::{info, warn};

/// Pooled SQLite connection handle.
pub type SqliteConn = PooledConnection<SqliteConnectionManager>;

/// Pool configuration.
#[derive(Debug, Clone)]
pub struct SqlitePoolConfig {
    /// Maximum number of pooled connections.
    pub max_size: u32,
    /// How long a checkout waits for a free connection.
    pub connection_timeout: Duration,
    /// SQLite busy handler timeout for lock contention.
    pub busy_timeout: Duration,
    /// Use WAL journaling so readers and the writer do not block each other.
    pub enable_wal: bool,
    /// Enforce foreign key constraints.
    pub enable_foreign_keys: bool,
}

impl Default for SqlitePoolConfig {
    fn default() -> Self {
        Self {
            max_size: 8,
            connection_timeout: Duration::from_secs(5),
            busy_timeout: Duration::from_secs(5),
            enable_wal: true,
            enable_foreign_keys: true,
        }
    }
}

/// SQLite connection pool.
///
/// Opening the pool smoke-tests one connection so a database that cannot
/// be opened fails construction instead of the first query. A failed
/// construction leaves nothing cached, so callers are free to retry.
pub struct SqlitePool {
    pool: Pool<SqliteConnectionManager>,
    config: SqlitePoolConfig,
}

impl SqlitePool {
    /// Create a new pool for the database at `path`.
    pub fn new(path: &Path, config: SqlitePoolConfig) -> Result<Self> {
        info!(
            db_path = %path.display(),
            pool_size = config.max_size,
            "creating sqlite connection pool"
        );

        let pool_config = config.clone();
        let manager = SqliteConnectionManager::file(path)
            .with_init(move |conn| apply_connection_pragmas(conn, &pool_config));

        let pool = Pool::builder()
            .max_size(config.max_size.max(1))
            .connection_timeout(config.connection_timeout)
            .build(manager)
            .map_err(|e| {
                warn!(error = %e, "failed to create connection pool");
                JimpitanError::StorageUnavailable(format!("failed to create pool: {e}"))
            })?;

        // Surface unopenable databases here rather than on first use.
        pool.get().map_err(|e| {
            warn!(error = %e, "failed to open test connection");
            JimpitanError::StorageUnavailable(format!("failed to open database: {e}"))
        })?;

        Ok(Self { pool, config })
    }

    /// Check out a connection.
    pub fn get(&self) -> Result<SqliteConn> {
        self.pool.get().map_err(|e| {
            let description = e.to_string();
            if description.to_lowercase().contains("timed out") {
                warn!(timeout = ?self.config.connection_timeout, "connection checkout timed out");
            }
            JimpitanError::StorageUnavailable(format!("failed to get connection: {e}"))
        })
    }

    /// Configured maximum pool size.
    pub fn max_size(&self) -> u32 {
        self.config.max_size
    }
}

/// Apply per-connection pragmas.
///
/// Runs once per pooled connection via the manager's init callback.
pub fn apply_connection_pragmas(
    conn: &Connection,
    config: &SqlitePoolConfig,
) -> rusqlite::Result<()> {
    let mut pragma_sql = String::new();

    if config.enable_wal {
        pragma_sql.push_str("PRAGMA journal_mode=WAL;\n");
        pragma_sql.push_str("PRAGMA wal_autocheckpoint=1000;\n");
    }

    pragma_sql.push_str("PRAGMA synchronous=NORMAL;\n");

    if config.enable_foreign_keys {
        pragma_sql.push_str("PRAGMA foreign_keys=ON;\n");
    }

    conn.execute_batch(&pragma_sql)?;

    // Separate call as it takes a parameter.
    conn.busy_timeout(config.busy_timeout)?;

    Ok(())
}
