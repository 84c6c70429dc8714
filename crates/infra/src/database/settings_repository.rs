//! SQLite-backed implementation of the settings store port.
//!
//! Values are stored as JSON text. Writes are last-write-wins upserts
//! with no versioning.

use std::sync::Arc;

use async_trait::async_trait;
use jimpitan_core::SettingsStore;
use jimpitan_domain::{epoch_millis, JimpitanError, Result as DomainResult, Setting};
use rusqlite::{params, OptionalExtension};
use tokio::task;

use super::manager::DbManager;
use super::pool::SqliteConn;
use crate::errors::{map_join_error, map_read_error, map_write_error};

/// SQLite-backed settings repository.
pub struct SqliteSettingsRepository {
    db: Arc<DbManager>,
}

impl SqliteSettingsRepository {
    /// Construct a repository backed by the shared database manager.
    pub fn new(db: Arc<DbManager>) -> Self {
        Self { db }
    }

    fn upsert(conn: &SqliteConn, key: &str, value: &str, updated_at: i64) -> DomainResult<()> {
        conn.execute(SETTING_UPSERT_SQL, params![key, value, updated_at])
            .map_err(map_write_error)?;
        Ok(())
    }

    fn fetch(conn: &SqliteConn, key: &str) -> DomainResult<Option<Setting>> {
        let row = conn
            .query_row(SETTING_SELECT_SQL, params![key], |row| {
                let value: String = row.get(0)?;
                let updated_at: i64 = row.get(1)?;
                Ok((value, updated_at))
            })
            .optional()
            .map_err(map_read_error)?;

        match row {
            Some((raw, updated_at)) => {
                let value = serde_json::from_str(&raw).map_err(|e| {
                    JimpitanError::Internal(format!("Corrupt setting value for {key}: {e}"))
                })?;
                Ok(Some(Setting { key: key.to_owned(), value, updated_at }))
            }
            None => Ok(None),
        }
    }
}

#[async_trait]
impl SettingsStore for SqliteSettingsRepository {
    async fn put_setting(&self, key: &str, value: &serde_json::Value) -> DomainResult<()> {
        let db = Arc::clone(&self.db);
        let key = key.to_owned();
        let raw = value.to_string();

        task::spawn_blocking(move || -> DomainResult<()> {
            let conn = db.get_connection()?;
            Self::upsert(&conn, &key, &raw, epoch_millis())
        })
        .await
        .map_err(map_join_error)?
    }

    async fn get_setting(&self, key: &str) -> DomainResult<Option<Setting>> {
        let db = Arc::clone(&self.db);
        let key = key.to_owned();

        task::spawn_blocking(move || -> DomainResult<Option<Setting>> {
            let conn = db.get_connection()?;
            Self::fetch(&conn, &key)
        })
        .await
        .map_err(map_join_error)?
    }
}

const SETTING_UPSERT_SQL: &str = "INSERT INTO settings (key, value, updated_at)
    VALUES (?1, ?2, ?3)
    ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at";

const SETTING_SELECT_SQL: &str = "SELECT value, updated_at FROM settings WHERE key = ?1";
