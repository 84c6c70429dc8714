//! Domain types and models

pub mod collection;
pub mod wire;

pub use collection::{
    DonationEntry, EntryPatch, NewEntry, NewQueueItem, QueueItem, QueueStatus, RecordedEntry,
    Setting, SyncReport, UploadOutcome, WorkingSet,
};
pub use wire::{DirectUpload, QueuedUpload, UploadAck, WireEntry};
