//! Port interface for the daily-upload guard store

use async_trait::async_trait;
use jimpitan_domain::Result;

/// Trait for the category-to-day map backing the daily-upload guard
///
/// This store is deliberately separate from the main collections: a plain
/// key-value map with no transactions, mirroring how little the guard
/// needs. Days are UTC `yyyy-mm-dd` strings.
#[async_trait]
pub trait GuardStore: Send + Sync {
    /// Day of the last successful or queued upload for a category
    async fn get_last_upload_day(&self, category: &str) -> Result<Option<String>>;

    /// Record an upload day for a category, replacing any previous value
    async fn set_last_upload_day(&self, category: &str, day: &str) -> Result<()>;
}
