//! Port interfaces for the persistent store
//!
//! These traits define the boundaries between core business logic
//! and the storage implementation.

use async_trait::async_trait;
use jimpitan_domain::{
    DonationEntry, EntryPatch, NewEntry, NewQueueItem, QueueItem, QueueStatus, Result, Setting,
};

/// Trait for persisting donation entries
#[async_trait]
pub trait EntryStore: Send + Sync {
    /// Create a new entry. The store assigns the id and stamps `created_at`.
    async fn create_entry(&self, entry: &NewEntry) -> Result<DonationEntry>;

    /// Get entries for a category, optionally narrowed to one collection day
    async fn get_entries(
        &self,
        category: &str,
        entry_date: Option<&str>,
    ) -> Result<Vec<DonationEntry>>;

    /// Find the entry for one donor on one collection day, if any
    async fn find_entry(
        &self,
        donor: &str,
        category: &str,
        entry_date: &str,
    ) -> Result<Option<DonationEntry>>;

    /// Apply a shallow patch to an entry and refresh `updated_at`
    async fn update_entry(&self, id: i64, patch: &EntryPatch) -> Result<DonationEntry>;

    /// Delete a single entry
    async fn delete_entry(&self, id: i64) -> Result<()>;

    /// Delete every entry for a category on one collection day
    async fn delete_entries_for_day(&self, category: &str, entry_date: &str) -> Result<usize>;
}

/// Trait for managing the upload queue
#[async_trait]
pub trait UploadQueue: Send + Sync {
    /// Enqueue a pending upload. The store stamps `enqueued_at` and starts
    /// the attempt counter at zero.
    async fn enqueue(&self, item: &NewQueueItem) -> Result<QueueItem>;

    /// List every pending item in store order, attempts included
    async fn list_pending(&self) -> Result<Vec<QueueItem>>;

    /// Increment the attempt counter after a failed delivery
    async fn record_attempt_failure(&self, id: i64) -> Result<()>;

    /// Remove an item after delivery or eviction
    async fn remove(&self, id: i64) -> Result<()>;

    /// Pending count and oldest enqueue time, for startup notices
    async fn status(&self) -> Result<QueueStatus>;
}

/// Trait for the small key-value settings collection
#[async_trait]
pub trait SettingsStore: Send + Sync {
    /// Upsert a setting
    async fn put_setting(&self, key: &str, value: &serde_json::Value) -> Result<()>;

    /// Get a setting, `None` if absent
    async fn get_setting(&self, key: &str) -> Result<Option<Setting>>;
}

/// Trait for cross-collection maintenance operations
#[async_trait]
pub trait MaintenanceStore: Send + Sync {
    /// Delete synced entries and stale queue items past their age bounds.
    ///
    /// Runs as a single transaction spanning both collections: either the
    /// whole sweep commits or none of it does. Returns the number of
    /// records deleted across both.
    async fn retention_sweep(
        &self,
        synced_max_age_days: i64,
        queue_max_age_days: i64,
    ) -> Result<usize>;
}
