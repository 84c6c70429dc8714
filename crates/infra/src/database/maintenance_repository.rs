//! SQLite-backed implementation of the maintenance store port.
//!
//! The retention sweep deletes synced entries and stale queue items in a
//! single transaction: either both collections are trimmed or neither is.

use std::sync::Arc;

use async_trait::async_trait;
use jimpitan_core::MaintenanceStore;
use jimpitan_domain::constants::MS_PER_DAY;
use jimpitan_domain::{epoch_millis, Result as DomainResult};
use rusqlite::params;
use tokio::task;
use tracing::debug;

use super::manager::DbManager;
use crate::errors::{map_join_error, map_write_error};

/// SQLite-backed maintenance repository.
pub struct SqliteMaintenanceRepository {
    db: Arc<DbManager>,
}

impl SqliteMaintenanceRepository {
    /// Construct a repository backed by the shared database manager.
    pub fn new(db: Arc<DbManager>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl MaintenanceStore for SqliteMaintenanceRepository {
    async fn retention_sweep(
        &self,
        synced_max_age_days: i64,
        queue_max_age_days: i64,
    ) -> DomainResult<usize> {
        let db = Arc::clone(&self.db);
        let now = epoch_millis();
        let entry_cutoff = now - synced_max_age_days * MS_PER_DAY;
        let queue_cutoff = now - queue_max_age_days * MS_PER_DAY;

        task::spawn_blocking(move || -> DomainResult<usize> {
            let mut conn = db.get_connection()?;
            let tx = conn.transaction().map_err(map_write_error)?;

            let entries_removed = tx
                .execute(SWEEP_ENTRIES_SQL, params![entry_cutoff])
                .map_err(map_write_error)?;
            let queue_removed =
                tx.execute(SWEEP_QUEUE_SQL, params![queue_cutoff]).map_err(map_write_error)?;

            tx.commit().map_err(map_write_error)?;

            debug!(
                entries_removed = entries_removed,
                queue_removed = queue_removed,
                "retention sweep committed"
            );

            Ok(entries_removed + queue_removed)
        })
        .await
        .map_err(map_join_error)?
    }
}

// Unsynced entries are kept forever; queue age alone decides eviction.
const SWEEP_ENTRIES_SQL: &str =
    "DELETE FROM donation_entries WHERE synced = 1 AND created_at < ?1";

const SWEEP_QUEUE_SQL: &str = "DELETE FROM upload_queue WHERE enqueued_at < ?1";
