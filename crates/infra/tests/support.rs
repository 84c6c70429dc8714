use std::sync::Arc;

use tempfile::TempDir;

use jimpitan_domain::{NewEntry, NewQueueItem};
use jimpitan_infra::database::DbManager;

/// Temporary database wrapper that keeps the underlying file alive for the
/// duration of a test run.
pub struct TestDatabase {
    pub manager: Arc<DbManager>,
    _temp_dir: TempDir,
}

impl TestDatabase {
    /// Create a new temporary database with migrations applied.
    pub fn new() -> Self {
        let temp_dir = tempfile::tempdir().expect("temp dir should be created");
        let db_path = temp_dir.path().join("test.db");

        let manager = DbManager::new(&db_path, 4).expect("db manager should be created");
        manager.run_migrations().expect("migrations should apply");

        Self { manager: Arc::new(manager), _temp_dir: temp_dir }
    }

    /// Execute a batch of SQL statements against the database.
    pub fn execute_batch(&self, sql: &str) {
        let conn = self
            .manager
            .get_connection()
            .expect("connection should be available for execute_batch");
        conn.execute_batch(sql).expect("SQL batch execution should succeed");
    }

    /// Count rows in a table.
    pub fn count(&self, table: &str) -> i64 {
        let conn = self.manager.get_connection().expect("connection should be available");
        conn.query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |row| row.get(0))
            .expect("count query should succeed")
    }
}

impl Default for TestDatabase {
    fn default() -> Self {
        Self::new()
    }
}

/// Utility helper for constructing new entries inside tests.
pub fn make_new_entry(donor: &str, amount: i64, category: &str, entry_date: &str) -> NewEntry {
    NewEntry {
        donor: donor.to_string(),
        amount,
        category: category.to_string(),
        entry_date: entry_date.to_string(),
    }
}

/// Utility helper for constructing queue items inside tests.
pub fn make_queue_item(category: &str, entry_date: &str) -> NewQueueItem {
    NewQueueItem {
        payload_json: format!(
            r#"[{{"donatur":"Amat","nominal":5000,"tanggal":"{entry_date}"}}]"#
        ),
        category: category.to_string(),
        entry_date: entry_date.to_string(),
    }
}
