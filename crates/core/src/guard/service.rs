//! Once-per-day upload lock

use std::sync::Arc;

use jimpitan_domain::utils::{guard_day, guard_day_for};
use jimpitan_domain::Result;

use super::ports::GuardStore;

/// Guards each category against a second upload on the same day.
///
/// The lock is implicit: a category is locked exactly when its stored day
/// equals today, so the lock releases itself at the UTC day rollover
/// without any reset step. Locking happens on direct upload success and
/// on enqueue alike, since a queued payload will eventually reach the
/// endpoint.
pub struct DailyUploadGuard {
    store: Arc<dyn GuardStore>,
}

impl DailyUploadGuard {
    pub fn new(store: Arc<dyn GuardStore>) -> Self {
        Self { store }
    }

    /// Whether the category already uploaded today
    pub async fn is_locked_today(&self, category: &str) -> Result<bool> {
        self.is_locked_at(category, &guard_day()).await
    }

    /// Lock the category for the rest of today
    pub async fn lock_today(&self, category: &str) -> Result<()> {
        self.store.set_last_upload_day(category, &guard_day()).await
    }

    /// Whether the category is locked on the given day
    pub async fn is_locked_at(&self, category: &str, day: &str) -> Result<bool> {
        let stored = self.store.get_last_upload_day(category).await?;
        Ok(stored.as_deref() == Some(day))
    }

    /// Lock the category as of the given timestamp. Used by callers that
    /// already pinned "now" for the rest of their operation.
    pub async fn lock_at(&self, category: &str, timestamp_ms: i64) -> Result<()> {
        self.store.set_last_upload_day(category, &guard_day_for(timestamp_ms)).await
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use async_trait::async_trait;
    use parking_lot::Mutex;

    use super::*;

    #[derive(Default)]
    struct MemoryGuardStore {
        days: Mutex<HashMap<String, String>>,
    }

    #[async_trait]
    impl GuardStore for MemoryGuardStore {
        async fn get_last_upload_day(&self, category: &str) -> Result<Option<String>> {
            Ok(self.days.lock().get(category).cloned())
        }

        async fn set_last_upload_day(&self, category: &str, day: &str) -> Result<()> {
            self.days.lock().insert(category.to_string(), day.to_string());
            Ok(())
        }
    }

    fn guard() -> (DailyUploadGuard, Arc<MemoryGuardStore>) {
        let store = Arc::new(MemoryGuardStore::default());
        (DailyUploadGuard::new(Arc::clone(&store) as Arc<dyn GuardStore>), store)
    }

    #[tokio::test]
    async fn unlocked_until_first_upload() {
        let (guard, _) = guard();
        assert!(!guard.is_locked_today("kategori1").await.unwrap());
    }

    #[tokio::test]
    async fn locks_for_the_rest_of_the_day() {
        let (guard, _) = guard();
        guard.lock_today("kategori1").await.unwrap();
        assert!(guard.is_locked_today("kategori1").await.unwrap());
        // Other categories are unaffected.
        assert!(!guard.is_locked_today("kategori2").await.unwrap());
    }

    #[tokio::test]
    async fn stale_day_unlocks_implicitly() {
        let (guard, store) = guard();
        store.set_last_upload_day("kategori1", "2025-01-01").await.unwrap();
        assert!(guard.is_locked_at("kategori1", "2025-01-01").await.unwrap());
        // The next day the same stored value no longer matches.
        assert!(!guard.is_locked_at("kategori1", "2025-01-02").await.unwrap());
        assert!(!guard.is_locked_today("kategori1").await.unwrap());
    }

    #[tokio::test]
    async fn lock_at_uses_the_utc_date_of_the_timestamp() {
        let (guard, store) = guard();
        // 2024-12-31T18:00:00Z
        guard.lock_at("kategori1", 1_735_668_000_000).await.unwrap();
        let stored = store.get_last_upload_day("kategori1").await.unwrap();
        assert_eq!(stored.as_deref(), Some("2024-12-31"));
    }
}
