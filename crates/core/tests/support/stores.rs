//! In-memory mocks for the storage and guard ports.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};

use async_trait::async_trait;
use jimpitan_core::guard::ports::GuardStore;
use jimpitan_core::store::ports::{EntryStore, UploadQueue};
use jimpitan_domain::utils::epoch_millis;
use jimpitan_domain::{
    DonationEntry, EntryPatch, JimpitanError, NewEntry, NewQueueItem, QueueItem, QueueStatus,
    Result as DomainResult,
};
use parking_lot::Mutex;

/// In-memory `EntryStore` with the same merge and stamp behaviour as the
/// real repository.
#[derive(Default)]
pub struct MemoryEntryStore {
    entries: Mutex<Vec<DonationEntry>>,
    next_id: AtomicI64,
}

impl MemoryEntryStore {
    pub fn new() -> Self {
        Self { entries: Mutex::new(Vec::new()), next_id: AtomicI64::new(1) }
    }

    pub fn all(&self) -> Vec<DonationEntry> {
        self.entries.lock().clone()
    }
}

#[async_trait]
impl EntryStore for MemoryEntryStore {
    async fn create_entry(&self, entry: &NewEntry) -> DomainResult<DonationEntry> {
        let created = DonationEntry {
            id: self.next_id.fetch_add(1, Ordering::SeqCst),
            donor: entry.donor.clone(),
            amount: entry.amount,
            category: entry.category.clone(),
            entry_date: entry.entry_date.clone(),
            synced: false,
            created_at: epoch_millis(),
            updated_at: None,
        };
        self.entries.lock().push(created.clone());
        Ok(created)
    }

    async fn get_entries(
        &self,
        category: &str,
        entry_date: Option<&str>,
    ) -> DomainResult<Vec<DonationEntry>> {
        Ok(self
            .entries
            .lock()
            .iter()
            .filter(|e| {
                e.category == category
                    && entry_date.map_or(true, |date| e.entry_date == date)
            })
            .cloned()
            .collect())
    }

    async fn find_entry(
        &self,
        donor: &str,
        category: &str,
        entry_date: &str,
    ) -> DomainResult<Option<DonationEntry>> {
        Ok(self
            .entries
            .lock()
            .iter()
            .find(|e| e.donor == donor && e.category == category && e.entry_date == entry_date)
            .cloned())
    }

    async fn update_entry(&self, id: i64, patch: &EntryPatch) -> DomainResult<DonationEntry> {
        let mut entries = self.entries.lock();
        let entry = entries
            .iter_mut()
            .find(|e| e.id == id)
            .ok_or_else(|| JimpitanError::NotFound(format!("Entry {} not found", id)))?;
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
        Ok(entry.clone())
    }

    async fn delete_entry(&self, id: i64) -> DomainResult<()> {
        let mut entries = self.entries.lock();
        let before = entries.len();
        entries.retain(|e| e.id != id);
        if entries.len() == before {
            return Err(JimpitanError::NotFound(format!("Entry {} not found", id)));
        }
        Ok(())
    }

    async fn delete_entries_for_day(
        &self,
        category: &str,
        entry_date: &str,
    ) -> DomainResult<usize> {
        let mut entries = self.entries.lock();
        let before = entries.len();
        entries.retain(|e| !(e.category == category && e.entry_date == entry_date));
        Ok(before - entries.len())
    }
}

/// In-memory `UploadQueue` with an optional failure switch for testing
/// write-error paths.
#[derive(Default)]
pub struct MemoryUploadQueue {
    items: Mutex<Vec<QueueItem>>,
    next_id: AtomicI64,
    fail_enqueue: AtomicBool,
}

impl MemoryUploadQueue {
    pub fn new() -> Self {
        Self {
            items: Mutex::new(Vec::new()),
            next_id: AtomicI64::new(1),
            fail_enqueue: AtomicBool::new(false),
        }
    }

    pub fn all(&self) -> Vec<QueueItem> {
        self.items.lock().clone()
    }

    pub fn set_fail_enqueue(&self, fail: bool) {
        self.fail_enqueue.store(fail, Ordering::SeqCst);
    }

    /// Seed an item directly, bypassing enqueue stamping.
    pub fn push_raw(&self, item: QueueItem) {
        self.items.lock().push(item);
    }
}

#[async_trait]
impl UploadQueue for MemoryUploadQueue {
    async fn enqueue(&self, item: &NewQueueItem) -> DomainResult<QueueItem> {
        if self.fail_enqueue.load(Ordering::SeqCst) {
            return Err(JimpitanError::WriteFailed("enqueue refused by test".to_string()));
        }
        let queued = QueueItem {
            id: self.next_id.fetch_add(1, Ordering::SeqCst),
            payload_json: item.payload_json.clone(),
            category: item.category.clone(),
            entry_date: item.entry_date.clone(),
            enqueued_at: epoch_millis(),
            attempts: 0,
        };
        self.items.lock().push(queued.clone());
        Ok(queued)
    }

    async fn list_pending(&self) -> DomainResult<Vec<QueueItem>> {
        Ok(self.items.lock().clone())
    }

    async fn record_attempt_failure(&self, id: i64) -> DomainResult<()> {
        let mut items = self.items.lock();
        let item = items
            .iter_mut()
            .find(|i| i.id == id)
            .ok_or_else(|| JimpitanError::NotFound(format!("Queue item {} not found", id)))?;
        item.attempts += 1;
        Ok(())
    }

    async fn remove(&self, id: i64) -> DomainResult<()> {
        self.items.lock().retain(|i| i.id != id);
        Ok(())
    }

    async fn status(&self) -> DomainResult<QueueStatus> {
        let items = self.items.lock();
        Ok(QueueStatus {
            pending: items.len(),
            oldest_enqueued_at: items.iter().map(|i| i.enqueued_at).min(),
        })
    }
}

/// In-memory `GuardStore`.
#[derive(Default)]
pub struct MemoryGuardStore {
    days: Mutex<HashMap<String, String>>,
}

impl MemoryGuardStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stored_day(&self, category: &str) -> Option<String> {
        self.days.lock().get(category).cloned()
    }
}

#[async_trait]
impl GuardStore for MemoryGuardStore {
    async fn get_last_upload_day(&self, category: &str) -> DomainResult<Option<String>> {
        Ok(self.days.lock().get(category).cloned())
    }

    async fn set_last_upload_day(&self, category: &str, day: &str) -> DomainResult<()> {
        self.days.lock().insert(category.to_string(), day.to_string());
        Ok(())
    }
}
