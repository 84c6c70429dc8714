//! In-memory state for the active user session
//!
//! Holds the working entry list for the active category plus the
//! donors-entered bookkeeping per category. Everything here is a cache of
//! store state: callers re-read from the store and push the result back in
//! rather than mutating pieces concurrently. The lock is never held across
//! an await point.

use std::collections::{BTreeMap, BTreeSet};

use jimpitan_domain::DonationEntry;
use parking_lot::RwLock;

/// Session-scoped view state. One instance per running app.
pub struct SessionState {
    inner: RwLock<Inner>,
}

struct Inner {
    active_category: String,
    working: Vec<DonationEntry>,
    entered: BTreeMap<String, BTreeSet<String>>,
}

impl SessionState {
    pub fn new(initial_category: impl Into<String>) -> Self {
        Self {
            inner: RwLock::new(Inner {
                active_category: initial_category.into(),
                working: Vec::new(),
                entered: BTreeMap::new(),
            }),
        }
    }

    pub fn active_category(&self) -> String {
        self.inner.read().active_category.clone()
    }

    /// Switch categories. The working list is cleared and expected to be
    /// refilled by a store re-read.
    pub fn set_active_category(&self, category: &str) {
        let mut inner = self.inner.write();
        if inner.active_category != category {
            inner.active_category = category.to_string();
            inner.working.clear();
        }
    }

    /// Replace cached state for a category from a fresh store read.
    pub fn replace_working(&self, category: &str, entries: Vec<DonationEntry>) {
        let mut inner = self.inner.write();
        let donors: BTreeSet<String> =
            entries.iter().map(|entry| entry.donor.clone()).collect();
        inner.entered.insert(category.to_string(), donors);
        if inner.active_category == category {
            inner.working = entries;
        }
    }

    /// Fold one created or updated entry into the cache.
    pub fn upsert_working(&self, entry: DonationEntry) {
        let mut inner = self.inner.write();
        inner
            .entered
            .entry(entry.category.clone())
            .or_default()
            .insert(entry.donor.clone());
        if inner.active_category != entry.category {
            return;
        }
        match inner.working.iter_mut().find(|e| e.id == entry.id || e.donor == entry.donor) {
            Some(slot) => *slot = entry,
            None => inner.working.push(entry),
        }
    }

    /// Drop one entry from the cache, if present.
    pub fn remove_working(&self, id: i64) {
        let mut inner = self.inner.write();
        if let Some(pos) = inner.working.iter().position(|e| e.id == id) {
            let removed = inner.working.remove(pos);
            if let Some(donors) = inner.entered.get_mut(&removed.category) {
                donors.remove(&removed.donor);
            }
        }
    }

    /// Reset a category after an upload or a bulk delete.
    pub fn clear_working(&self, category: &str) {
        let mut inner = self.inner.write();
        inner.entered.insert(category.to_string(), BTreeSet::new());
        if inner.active_category == category {
            inner.working.clear();
        }
    }

    pub fn working_snapshot(&self) -> Vec<DonationEntry> {
        self.inner.read().working.clone()
    }

    pub fn entered_count(&self, category: &str) -> usize {
        self.inner.read().entered.get(category).map_or(0, BTreeSet::len)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(id: i64, donor: &str, category: &str, amount: i64) -> DonationEntry {
        DonationEntry {
            id,
            donor: donor.to_string(),
            amount,
            category: category.to_string(),
            entry_date: "1/1/2025".to_string(),
            synced: false,
            created_at: 0,
            updated_at: None,
        }
    }

    #[test]
    fn upsert_replaces_same_donor() {
        let session = SessionState::new("kategori1");
        session.upsert_working(entry(1, "Amat", "kategori1", 5000));
        session.upsert_working(entry(1, "Amat", "kategori1", 2000));
        let working = session.working_snapshot();
        assert_eq!(working.len(), 1);
        assert_eq!(working[0].amount, 2000);
        assert_eq!(session.entered_count("kategori1"), 1);
    }

    #[test]
    fn upsert_for_inactive_category_only_tracks_entered() {
        let session = SessionState::new("kategori1");
        session.upsert_working(entry(1, "Pak A", "kategori2", 1000));
        assert!(session.working_snapshot().is_empty());
        assert_eq!(session.entered_count("kategori2"), 1);
    }

    #[test]
    fn remove_unwinds_entered_set() {
        let session = SessionState::new("kategori1");
        session.upsert_working(entry(1, "Amat", "kategori1", 5000));
        session.upsert_working(entry(2, "Dani", "kategori1", 0));
        session.remove_working(1);
        assert_eq!(session.working_snapshot().len(), 1);
        assert_eq!(session.entered_count("kategori1"), 1);
    }

    #[test]
    fn switching_category_clears_working_but_keeps_entered() {
        let session = SessionState::new("kategori1");
        session.upsert_working(entry(1, "Amat", "kategori1", 5000));
        session.set_active_category("kategori2");
        assert!(session.working_snapshot().is_empty());
        assert_eq!(session.entered_count("kategori1"), 1);
        assert_eq!(session.active_category(), "kategori2");
    }

    #[test]
    fn replace_rebuilds_entered_from_store_read() {
        let session = SessionState::new("kategori1");
        session.upsert_working(entry(1, "Amat", "kategori1", 5000));
        session.replace_working(
            "kategori1",
            vec![entry(3, "Dani", "kategori1", 0), entry(4, "Idek", "kategori1", 1000)],
        );
        assert_eq!(session.working_snapshot().len(), 2);
        assert_eq!(session.entered_count("kategori1"), 2);
    }

    #[test]
    fn clear_resets_both_views() {
        let session = SessionState::new("kategori1");
        session.upsert_working(entry(1, "Amat", "kategori1", 5000));
        session.clear_working("kategori1");
        assert!(session.working_snapshot().is_empty());
        assert_eq!(session.entered_count("kategori1"), 0);
    }
}
