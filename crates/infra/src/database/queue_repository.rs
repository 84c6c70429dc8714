//! SQLite-backed implementation of the upload queue port.
//!
//! The queue holds no policy of its own: attempt counting is a plain
//! increment and eviction decisions belong to the sync engine. `remove`
//! is idempotent (removing an already-removed item is a no-op) because
//! a drain pass and a retention sweep may race over the same rows.

use std::sync::Arc;

use async_trait::async_trait;
use jimpitan_core::UploadQueue;
use jimpitan_domain::{
    epoch_millis, JimpitanError, NewQueueItem, QueueItem, QueueStatus, Result as DomainResult,
};
use rusqlite::{params, Row};
use tokio::task;

use super::manager::DbManager;
use super::pool::SqliteConn;
use crate::errors::{map_join_error, map_read_error, map_write_error};

/// SQLite-backed upload queue repository.
pub struct SqliteQueueRepository {
    db: Arc<DbManager>,
}

impl SqliteQueueRepository {
    /// Construct a repository backed by the shared database manager.
    pub fn new(db: Arc<DbManager>) -> Self {
        Self { db }
    }

    fn insert_item(
        conn: &SqliteConn,
        item: &NewQueueItem,
        enqueued_at: i64,
    ) -> DomainResult<QueueItem> {
        conn.execute(
            QUEUE_INSERT_SQL,
            params![item.payload_json, item.category, item.entry_date, enqueued_at],
        )
        .map_err(map_write_error)?;

        Ok(QueueItem {
            id: conn.last_insert_rowid(),
            payload_json: item.payload_json.clone(),
            category: item.category.clone(),
            entry_date: item.entry_date.clone(),
            enqueued_at,
            attempts: 0,
        })
    }

    fn fetch_pending(conn: &SqliteConn) -> DomainResult<Vec<QueueItem>> {
        let mut stmt = conn.prepare(QUEUE_SELECT_SQL).map_err(map_read_error)?;
        let rows = stmt
            .query_map([], map_queue_row)
            .map_err(map_read_error)?
            .collect::<rusqlite::Result<Vec<_>>>()
            .map_err(map_read_error)?;
        Ok(rows)
    }

    fn fetch_status(conn: &SqliteConn) -> DomainResult<QueueStatus> {
        conn.query_row(QUEUE_STATUS_SQL, [], |row| {
            let pending: i64 = row.get(0)?;
            let oldest_enqueued_at: Option<i64> = row.get(1)?;
            Ok(QueueStatus {
                pending: usize::try_from(pending).unwrap_or_default(),
                oldest_enqueued_at,
            })
        })
        .map_err(map_read_error)
    }
}

#[async_trait]
impl UploadQueue for SqliteQueueRepository {
    async fn enqueue(&self, item: &NewQueueItem) -> DomainResult<QueueItem> {
        let db = Arc::clone(&self.db);
        let to_insert = item.clone();

        task::spawn_blocking(move || -> DomainResult<QueueItem> {
            let conn = db.get_connection()?;
            Self::insert_item(&conn, &to_insert, epoch_millis())
        })
        .await
        .map_err(map_join_error)?
    }

    async fn list_pending(&self) -> DomainResult<Vec<QueueItem>> {
        let db = Arc::clone(&self.db);

        task::spawn_blocking(move || -> DomainResult<Vec<QueueItem>> {
            let conn = db.get_connection()?;
            Self::fetch_pending(&conn)
        })
        .await
        .map_err(map_join_error)?
    }

    async fn record_attempt_failure(&self, id: i64) -> DomainResult<()> {
        let db = Arc::clone(&self.db);

        task::spawn_blocking(move || -> DomainResult<()> {
            let conn = db.get_connection()?;
            let affected =
                conn.execute(QUEUE_BUMP_ATTEMPTS_SQL, params![id]).map_err(map_write_error)?;
            if affected == 0 {
                return Err(JimpitanError::NotFound(format!("Queue item {id} not found")));
            }
            Ok(())
        })
        .await
        .map_err(map_join_error)?
    }

    async fn remove(&self, id: i64) -> DomainResult<()> {
        let db = Arc::clone(&self.db);

        task::spawn_blocking(move || -> DomainResult<()> {
            let conn = db.get_connection()?;
            conn.execute(QUEUE_DELETE_SQL, params![id]).map_err(map_write_error)?;
            Ok(())
        })
        .await
        .map_err(map_join_error)?
    }

    async fn status(&self) -> DomainResult<QueueStatus> {
        let db = Arc::clone(&self.db);

        task::spawn_blocking(move || -> DomainResult<QueueStatus> {
            let conn = db.get_connection()?;
            Self::fetch_status(&conn)
        })
        .await
        .map_err(map_join_error)?
    }
}

const QUEUE_INSERT_SQL: &str = "INSERT INTO upload_queue (
        payload_json, category, entry_date, enqueued_at, attempts
    ) VALUES (?1, ?2, ?3, ?4, 0)";

const QUEUE_SELECT_SQL: &str = "SELECT
        id, payload_json, category, entry_date, enqueued_at, attempts
    FROM upload_queue
    ORDER BY id ASC";

const QUEUE_BUMP_ATTEMPTS_SQL: &str =
    "UPDATE upload_queue SET attempts = attempts + 1 WHERE id = ?1";

const QUEUE_DELETE_SQL: &str = "DELETE FROM upload_queue WHERE id = ?1";

const QUEUE_STATUS_SQL: &str = "SELECT COUNT(*), MIN(enqueued_at) FROM upload_queue";

fn map_queue_row(row: &Row<'_>) -> rusqlite::Result<QueueItem> {
    Ok(QueueItem {
        id: row.get(0)?,
        payload_json: row.get(1)?,
        category: row.get(2)?,
        entry_date: row.get(3)?,
        enqueued_at: row.get(4)?,
        attempts: row.get(5)?,
    })
}
