//! Sync infrastructure for the jimpitan collection tracker
//!
//! This module provides background synchronization services:
//! - UploadClient: HTTP delivery to the donation endpoint
//! - SyncEngine: Background drain of the upload queue
//! - RetentionService: Periodic pruning of delivered and stale data
//!
//! All services follow the same runtime rules: explicit lifecycle
//! management, join handle tracking, and cancellation support.

pub mod engine;
mod errors;
pub mod retention;
pub mod upload_client;

pub use engine::{SyncEngine, SyncEngineConfig};
pub use errors::SyncError;
pub use retention::{RetentionService, RetentionServiceConfig};
pub use upload_client::{UploadClient, UploadClientConfig};
