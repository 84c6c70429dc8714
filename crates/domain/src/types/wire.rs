//! Wire-format types for the upload endpoint
//!
//! The endpoint predates this codebase, so field names on the wire are the
//! Indonesian originals (`kategori`, `donatur`, `nominal`, `tanggal`).
//! Queued uploads carry the same entry array wrapped in an envelope that
//! also records the collection day and the attempt count.

use serde::{Deserialize, Serialize};

use crate::errors::{JimpitanError, Result};
use crate::types::collection::{DonationEntry, QueueItem};
use crate::utils::epoch_millis;

/// One donor row as the endpoint expects it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireEntry {
    #[serde(rename = "donatur")]
    pub donor: String,
    #[serde(rename = "nominal")]
    pub amount: i64,
    #[serde(rename = "tanggal")]
    pub entry_date: String,
}

impl From<&DonationEntry> for WireEntry {
    fn from(entry: &DonationEntry) -> Self {
        Self {
            donor: entry.donor.clone(),
            amount: entry.amount,
            entry_date: entry.entry_date.clone(),
        }
    }
}

/// Body of a foreground upload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectUpload {
    #[serde(rename = "kategori")]
    pub category: String,
    pub data: Vec<WireEntry>,
    pub timestamp: i64,
}

impl DirectUpload {
    pub fn new(category: impl Into<String>, data: Vec<WireEntry>) -> Self {
        Self { category: category.into(), data, timestamp: epoch_millis() }
    }
}

/// Body of a queued upload replayed by the background drain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueuedUpload {
    pub data: Vec<WireEntry>,
    #[serde(rename = "kategori")]
    pub category: String,
    #[serde(rename = "tanggal")]
    pub entry_date: String,
    pub timestamp: i64,
    pub attempts: u32,
}

impl QueuedUpload {
    /// Rebuild the wire envelope from a stored queue item.
    ///
    /// # Errors
    /// Returns `JimpitanError::Internal` if the stored payload is not a
    /// valid entry array.
    pub fn from_queue_item(item: &QueueItem) -> Result<Self> {
        let data: Vec<WireEntry> = serde_json::from_str(&item.payload_json).map_err(|e| {
            JimpitanError::Internal(format!("Corrupt queue payload for item {}: {}", item.id, e))
        })?;
        Ok(Self {
            data,
            category: item.category.clone(),
            entry_date: item.entry_date.clone(),
            timestamp: item.enqueued_at,
            attempts: item.attempts,
        })
    }
}

/// Response body from the endpoint. Only the optional message is used.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UploadAck {
    pub message: Option<String>,
}
