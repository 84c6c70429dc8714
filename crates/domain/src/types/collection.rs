//! Donation entries, queue items, and the surrounding bookkeeping types
//!
//! Timestamps are epoch milliseconds throughout. Entry dates are the local
//! collection day formatted `d/m/yyyy`; the daily-upload guard uses UTC
//! `yyyy-mm-dd` strings and lives in its own sidecar store.

use serde::{Deserialize, Serialize};

/// A single donation record for one donor on one collection day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DonationEntry {
    pub id: i64,
    pub donor: String,
    /// Amount in rupiah. Zero is a valid recorded value ("did not fill").
    pub amount: i64,
    pub category: String,
    /// Local collection day, `d/m/yyyy`.
    pub entry_date: String,
    /// Set once the entry has been delivered to the remote endpoint.
    pub synced: bool,
    pub created_at: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<i64>,
}

/// Fields required to create a new entry. The store assigns the id and
/// stamps `created_at`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewEntry {
    pub donor: String,
    pub amount: i64,
    pub category: String,
    pub entry_date: String,
}

/// Shallow patch applied to an existing entry. Unset fields are left
/// untouched; any applied patch refreshes `updated_at`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EntryPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entry_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub synced: Option<bool>,
}

impl EntryPatch {
    pub fn amount(amount: i64) -> Self {
        Self { amount: Some(amount), ..Self::default() }
    }

    pub fn synced(synced: bool) -> Self {
        Self { synced: Some(synced), ..Self::default() }
    }

    pub fn is_empty(&self) -> bool {
        self.amount.is_none() && self.entry_date.is_none() && self.synced.is_none()
    }
}

/// A pending upload captured while the endpoint was unreachable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueItem {
    pub id: i64,
    /// Serialized wire entries (`WireEntry` array) for this upload.
    pub payload_json: String,
    pub category: String,
    /// Local collection day the payload was built for, `d/m/yyyy`.
    pub entry_date: String,
    pub enqueued_at: i64,
    /// Failed delivery attempts so far. Three strikes evicts the item.
    pub attempts: u32,
}

/// Fields required to enqueue a new upload. The store assigns the id,
/// stamps `enqueued_at`, and starts `attempts` at zero.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewQueueItem {
    pub payload_json: String,
    pub category: String,
    pub entry_date: String,
}

/// Small key-value setting persisted alongside the main collections.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Setting {
    pub key: String,
    pub value: serde_json::Value,
    pub updated_at: i64,
}

/// Today's entries for the active category, with the roster size for
/// completeness checks.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkingSet {
    pub category: String,
    pub entry_date: String,
    pub entries: Vec<DonationEntry>,
    pub roster_size: usize,
}

impl WorkingSet {
    /// Donors recorded so far. Entries are unique per donor and day, so
    /// this is just the entry count.
    pub fn filled_count(&self) -> usize {
        self.entries.len()
    }

    /// Donors still missing from the roster.
    pub fn missing_count(&self) -> usize {
        self.roster_size.saturating_sub(self.entries.len())
    }

    pub fn is_complete(&self) -> bool {
        self.missing_count() == 0
    }

    pub fn total_amount(&self) -> i64 {
        self.entries.iter().map(|entry| entry.amount).sum()
    }
}

/// Result of recording a donor's contribution: the stored entry plus the
/// status message shown to the user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordedEntry {
    pub entry: DonationEntry,
    /// False when an existing entry for the donor and day was updated.
    pub created: bool,
    pub message: String,
}

/// Result of a submit: either delivered directly or parked in the queue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum UploadOutcome {
    Uploaded { message: String },
    Queued { message: String },
}

impl UploadOutcome {
    pub fn message(&self) -> &str {
        match self {
            Self::Uploaded { message } | Self::Queued { message } => message,
        }
    }
}

/// Aggregate result of one background drain pass over the queue.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncReport {
    /// Items delivered and removed from the queue.
    pub succeeded: usize,
    /// Items that failed this pass and stay queued for another try.
    pub failed: usize,
    /// Items removed permanently after exhausting their attempts.
    pub evicted: usize,
}

impl SyncReport {
    pub fn processed(&self) -> usize {
        self.succeeded + self.failed + self.evicted
    }

    /// Items that did not make it this pass, evictions included.
    pub fn failure_count(&self) -> usize {
        self.failed + self.evicted
    }

    pub fn is_empty(&self) -> bool {
        self.processed() == 0
    }
}

/// Snapshot of the queue for startup notices and health reporting.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueStatus {
    pub pending: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub oldest_enqueued_at: Option<i64>,
}
