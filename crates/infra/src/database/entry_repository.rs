//! SQLite-backed implementation of the donation entry store port.
//!
//! Lookups run through the category/date/donor indexes; the common
//! working-set query never scans the whole table. The at-most-one entry
//! per donor and day rule is owned by the collection service, so this
//! repository stays a plain row store.

use std::sync::Arc;

use async_trait::async_trait;
use jimpitan_core::EntryStore;
use jimpitan_domain::{
    epoch_millis, DonationEntry, EntryPatch, JimpitanError, NewEntry, Result as DomainResult,
};
use rusqlite::{params, OptionalExtension, Row};
use tokio::task;

use super::manager::DbManager;
use super::pool::SqliteConn;
use crate::errors::{map_join_error, map_read_error, map_write_error};

/// SQLite-backed entry repository.
pub struct SqliteEntryRepository {
    db: Arc<DbManager>,
}

impl SqliteEntryRepository {
    /// Construct a repository backed by the shared database manager.
    pub fn new(db: Arc<DbManager>) -> Self {
        Self { db }
    }

    fn insert_entry(
        conn: &SqliteConn,
        entry: &NewEntry,
        created_at: i64,
    ) -> DomainResult<DonationEntry> {
        conn.execute(
            ENTRY_INSERT_SQL,
            params![entry.donor, entry.amount, entry.category, entry.entry_date, created_at],
        )
        .map_err(map_write_error)?;

        Ok(DonationEntry {
            id: conn.last_insert_rowid(),
            donor: entry.donor.clone(),
            amount: entry.amount,
            category: entry.category.clone(),
            entry_date: entry.entry_date.clone(),
            synced: false,
            created_at,
            updated_at: None,
        })
    }

    fn fetch_for_category(
        conn: &SqliteConn,
        category: &str,
        entry_date: Option<&str>,
    ) -> DomainResult<Vec<DonationEntry>> {
        match entry_date {
            Some(day) => {
                Self::collect_entries(conn, ENTRY_SELECT_BY_DAY_SQL, params![category, day])
            }
            None => Self::collect_entries(conn, ENTRY_SELECT_BY_CATEGORY_SQL, params![category]),
        }
    }

    fn collect_entries<P: rusqlite::Params>(
        conn: &SqliteConn,
        sql: &str,
        bound: P,
    ) -> DomainResult<Vec<DonationEntry>> {
        let mut stmt = conn.prepare(sql).map_err(map_read_error)?;
        let rows = stmt
            .query_map(bound, map_entry_row)
            .map_err(map_read_error)?
            .collect::<rusqlite::Result<Vec<_>>>()
            .map_err(map_read_error)?;
        Ok(rows)
    }

    fn fetch_by_donor(
        conn: &SqliteConn,
        donor: &str,
        category: &str,
        entry_date: &str,
    ) -> DomainResult<Option<DonationEntry>> {
        conn.query_row(ENTRY_FIND_SQL, params![donor, category, entry_date], map_entry_row)
            .optional()
            .map_err(map_read_error)
    }

    fn fetch_by_id(conn: &SqliteConn, id: i64) -> DomainResult<DonationEntry> {
        conn.query_row(ENTRY_SELECT_BY_ID_SQL, params![id], map_entry_row).map_err(|err| {
            match err {
                rusqlite::Error::QueryReturnedNoRows => {
                    JimpitanError::NotFound(format!("Entry {id} not found"))
                }
                other => map_read_error(other),
            }
        })
    }

    fn apply_patch(
        conn: &SqliteConn,
        id: i64,
        patch: &EntryPatch,
    ) -> DomainResult<DonationEntry> {
        let mut entry = Self::fetch_by_id(conn, id)?;

        if let Some(amount) = patch.amount {
            entry.amount = amount;
        }
        if let Some(entry_date) = &patch.entry_date {
            entry.entry_date = entry_date.clone();
        }
        if let Some(synced) = patch.synced {
            entry.synced = synced;
        }
        entry.updated_at = Some(epoch_millis());

        conn.execute(
            ENTRY_UPDATE_SQL,
            params![
                entry.amount,
                entry.entry_date,
                bool_to_int(entry.synced),
                entry.updated_at,
                id
            ],
        )
        .map_err(map_write_error)?;

        Ok(entry)
    }
}

#[async_trait]
impl EntryStore for SqliteEntryRepository {
    async fn create_entry(&self, entry: &NewEntry) -> DomainResult<DonationEntry> {
        let db = Arc::clone(&self.db);
        let to_insert = entry.clone();

        task::spawn_blocking(move || -> DomainResult<DonationEntry> {
            let conn = db.get_connection()?;
            Self::insert_entry(&conn, &to_insert, epoch_millis())
        })
        .await
        .map_err(map_join_error)?
    }

    async fn get_entries(
        &self,
        category: &str,
        entry_date: Option<&str>,
    ) -> DomainResult<Vec<DonationEntry>> {
        let db = Arc::clone(&self.db);
        let category = category.to_owned();
        let entry_date = entry_date.map(str::to_owned);

        task::spawn_blocking(move || -> DomainResult<Vec<DonationEntry>> {
            let conn = db.get_connection()?;
            Self::fetch_for_category(&conn, &category, entry_date.as_deref())
        })
        .await
        .map_err(map_join_error)?
    }

    async fn find_entry(
        &self,
        donor: &str,
        category: &str,
        entry_date: &str,
    ) -> DomainResult<Option<DonationEntry>> {
        let db = Arc::clone(&self.db);
        let donor = donor.to_owned();
        let category = category.to_owned();
        let entry_date = entry_date.to_owned();

        task::spawn_blocking(move || -> DomainResult<Option<DonationEntry>> {
            let conn = db.get_connection()?;
            Self::fetch_by_donor(&conn, &donor, &category, &entry_date)
        })
        .await
        .map_err(map_join_error)?
    }

    async fn update_entry(&self, id: i64, patch: &EntryPatch) -> DomainResult<DonationEntry> {
        let db = Arc::clone(&self.db);
        let patch = patch.clone();

        task::spawn_blocking(move || -> DomainResult<DonationEntry> {
            let conn = db.get_connection()?;
            Self::apply_patch(&conn, id, &patch)
        })
        .await
        .map_err(map_join_error)?
    }

    async fn delete_entry(&self, id: i64) -> DomainResult<()> {
        let db = Arc::clone(&self.db);

        task::spawn_blocking(move || -> DomainResult<()> {
            let conn = db.get_connection()?;
            let affected =
                conn.execute(ENTRY_DELETE_SQL, params![id]).map_err(map_write_error)?;
            if affected == 0 {
                return Err(JimpitanError::NotFound(format!("Entry {id} not found")));
            }
            Ok(())
        })
        .await
        .map_err(map_join_error)?
    }

    async fn delete_entries_for_day(
        &self,
        category: &str,
        entry_date: &str,
    ) -> DomainResult<usize> {
        let db = Arc::clone(&self.db);
        let category = category.to_owned();
        let entry_date = entry_date.to_owned();

        task::spawn_blocking(move || -> DomainResult<usize> {
            let conn = db.get_connection()?;
            conn.execute(ENTRY_DELETE_DAY_SQL, params![category, entry_date])
                .map_err(map_write_error)
        })
        .await
        .map_err(map_join_error)?
    }
}

const ENTRY_INSERT_SQL: &str = "INSERT INTO donation_entries (
        donor, amount, category, entry_date, synced, created_at, updated_at
    ) VALUES (?1, ?2, ?3, ?4, 0, ?5, NULL)";

const ENTRY_SELECT_BY_CATEGORY_SQL: &str = "SELECT
        id, donor, amount, category, entry_date, synced, created_at, updated_at
    FROM donation_entries
    WHERE category = ?1
    ORDER BY id ASC";

const ENTRY_SELECT_BY_DAY_SQL: &str = "SELECT
        id, donor, amount, category, entry_date, synced, created_at, updated_at
    FROM donation_entries
    WHERE category = ?1 AND entry_date = ?2
    ORDER BY id ASC";

const ENTRY_FIND_SQL: &str = "SELECT
        id, donor, amount, category, entry_date, synced, created_at, updated_at
    FROM donation_entries
    WHERE donor = ?1 AND category = ?2 AND entry_date = ?3
    LIMIT 1";

const ENTRY_SELECT_BY_ID_SQL: &str = "SELECT
        id, donor, amount, category, entry_date, synced, created_at, updated_at
    FROM donation_entries
    WHERE id = ?1";

const ENTRY_UPDATE_SQL: &str = "UPDATE donation_entries
    SET amount = ?1, entry_date = ?2, synced = ?3, updated_at = ?4
    WHERE id = ?5";

const ENTRY_DELETE_SQL: &str = "DELETE FROM donation_entries WHERE id = ?1";

const ENTRY_DELETE_DAY_SQL: &str =
    "DELETE FROM donation_entries WHERE category = ?1 AND entry_date = ?2";

fn map_entry_row(row: &Row<'_>) -> rusqlite::Result<DonationEntry> {
    Ok(DonationEntry {
        id: row.get(0)?,
        donor: row.get(1)?,
        amount: row.get(2)?,
        category: row.get(3)?,
        entry_date: row.get(4)?,
        synced: int_to_bool(row.get(5)?),
        created_at: row.get(6)?,
        updated_at: row.get(7)?,
    })
}

fn bool_to_int(value: bool) -> i64 {
    if value {
        1
    } else {
        0
    }
}

fn int_to_bool(value: i64) -> bool {
    value != 0
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    #[tokio::test(flavor = "multi_thread")]
    async fn create_then_find_round_trips() {
        let (repo, _manager, _temp_dir) = setup_repository().await;

        let created =
            repo.create_entry(&sample_new_entry("Amat", 5000)).await.expect("create succeeds");
        assert!(created.id > 0);
        assert!(!created.synced);
        assert!(created.updated_at.is_none());

        let found = repo
            .find_entry("Amat", "kategori1", "1/1/2025")
            .await
            .expect("find succeeds")
            .expect("entry present");
        assert_eq!(found, created);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn get_entries_narrows_to_one_day() {
        let (repo, _manager, _temp_dir) = setup_repository().await;

        repo.create_entry(&sample_new_entry("Amat", 5000)).await.expect("create succeeds");
        let mut other_day = sample_new_entry("Dani", 2000);
        other_day.entry_date = "2/1/2025".to_string();
        repo.create_entry(&other_day).await.expect("create succeeds");

        let all = repo.get_entries("kategori1", None).await.expect("get succeeds");
        assert_eq!(all.len(), 2);

        let today =
            repo.get_entries("kategori1", Some("1/1/2025")).await.expect("get succeeds");
        assert_eq!(today.len(), 1);
        assert_eq!(today[0].donor, "Amat");
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn update_merges_patch_and_stamps_updated_at() {
        let (repo, _manager, _temp_dir) = setup_repository().await;

        let created =
            repo.create_entry(&sample_new_entry("Amat", 5000)).await.expect("create succeeds");

        let updated = repo
            .update_entry(created.id, &EntryPatch::amount(7000))
            .await
            .expect("update succeeds");
        assert_eq!(updated.amount, 7000);
        assert_eq!(updated.donor, "Amat");
        assert!(updated.updated_at.is_some());

        let reread = repo
            .find_entry("Amat", "kategori1", "1/1/2025")
            .await
            .expect("find succeeds")
            .expect("entry present");
        assert_eq!(reread.amount, 7000);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn update_can_mark_synced() {
        let (repo, _manager, _temp_dir) = setup_repository().await;

        let created =
            repo.create_entry(&sample_new_entry("Amat", 5000)).await.expect("create succeeds");
        let updated = repo
            .update_entry(created.id, &EntryPatch::synced(true))
            .await
            .expect("update succeeds");
        assert!(updated.synced);
        assert_eq!(updated.amount, 5000);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn update_missing_entry_is_not_found() {
        let (repo, _manager, _temp_dir) = setup_repository().await;

        let result = repo.update_entry(99, &EntryPatch::amount(1000)).await;
        assert!(
            matches!(result, Err(JimpitanError::NotFound(message)) if message.contains("99"))
        );
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn delete_entry_is_strict_about_missing_rows() {
        let (repo, _manager, _temp_dir) = setup_repository().await;

        let created =
            repo.create_entry(&sample_new_entry("Amat", 5000)).await.expect("create succeeds");
        repo.delete_entry(created.id).await.expect("delete succeeds");

        let result = repo.delete_entry(created.id).await;
        assert!(matches!(result, Err(JimpitanError::NotFound(_))));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn delete_entries_for_day_reports_count() {
        let (repo, _manager, _temp_dir) = setup_repository().await;

        repo.create_entry(&sample_new_entry("Amat", 5000)).await.expect("create succeeds");
        repo.create_entry(&sample_new_entry("Dani", 0)).await.expect("create succeeds");

        let removed = repo
            .delete_entries_for_day("kategori1", "1/1/2025")
            .await
            .expect("delete succeeds");
        assert_eq!(removed, 2);

        let removed_again = repo
            .delete_entries_for_day("kategori1", "1/1/2025")
            .await
            .expect("delete succeeds");
        assert_eq!(removed_again, 0);
    }

    async fn setup_repository() -> (SqliteEntryRepository, Arc<DbManager>, TempDir) {
        let temp_dir = TempDir::new().expect("temp dir created");
        let db_path = temp_dir.path().join("test.db");

        let manager = DbManager::new(&db_path, 4).expect("manager created");
        manager.run_migrations().expect("migrations applied");
        let manager = Arc::new(manager);
        let repo = SqliteEntryRepository::new(Arc::clone(&manager));

        (repo, manager, temp_dir)
    }

    fn sample_new_entry(donor: &str, amount: i64) -> NewEntry {
        NewEntry {
            donor: donor.to_string(),
            amount,
            category: "kategori1".to_string(),
            entry_date: "1/1/2025".to_string(),
        }
    }
}
