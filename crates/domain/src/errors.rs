//! Error types used throughout the application

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Main error type for the jimpitan core.
///
/// The variants follow the failure taxonomy of the storage and sync layers:
/// `StorageUnavailable` is fatal (the store could not be opened at all),
/// `ReadFailed`/`WriteFailed` are transient storage errors surfaced to the
/// user, `Network` failures are absorbed by the queue/retry machinery, and
/// `Validation` failures are rejected before any I/O happens.
#[derive(Error, Debug, Serialize, Deserialize)]
#[serde(tag = "type", content = "message")]
pub enum JimpitanError {
    #[error("Storage unavailable: {0}")]
    StorageUnavailable(String),

    #[error("Read failed: {0}")]
    ReadFailed(String),

    #[error("Write failed: {0}")]
    WriteFailed(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("{0}")]
    Validation(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl JimpitanError {
    /// Stable label for logs and metrics.
    pub const fn label(&self) -> &'static str {
        match self {
            Self::StorageUnavailable(_) => "storage_unavailable",
            Self::ReadFailed(_) => "read_failed",
            Self::WriteFailed(_) => "write_failed",
            Self::NotFound(_) => "not_found",
            Self::Network(_) => "network",
            Self::Validation(_) => "validation",
            Self::Config(_) => "config",
            Self::Internal(_) => "internal",
        }
    }
}

/// Result type alias for jimpitan operations
pub type Result<T> = std::result::Result<T, JimpitanError>;
