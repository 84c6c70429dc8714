//! Sync-specific error types
//!
//! Classifies delivery failures before they collapse into the domain
//! taxonomy. The queue treats every retryable failure the same way, so
//! the classification exists for logs and for the one case that must
//! not be retried: a payload that cannot be serialized.

use std::time::Duration;

use jimpitan_domain::JimpitanError;
use thiserror::Error;

/// Delivery failures observed by the upload client.
#[derive(Debug, Error)]
pub enum SyncError {
    /// Endpoint answered outside the 2xx range.
    #[error("endpoint returned HTTP {status}")]
    Status { status: u16 },

    /// Connection-level failure before any response arrived.
    #[error("transport error: {0}")]
    Transport(String),

    /// The bounded attempt ran out of time.
    #[error("timed out after {0:?}")]
    Timeout(Duration),

    /// The payload could not be turned into a request body.
    #[error("payload not serializable: {0}")]
    Serialization(String),
}

impl SyncError {
    /// Stable label for logs.
    pub const fn category(&self) -> &'static str {
        match self {
            Self::Status { .. } => "status",
            Self::Transport(_) => "transport",
            Self::Timeout(_) => "timeout",
            Self::Serialization(_) => "serialization",
        }
    }

    /// Whether another attempt could plausibly succeed.
    pub const fn should_retry(&self) -> bool {
        !matches!(self, Self::Serialization(_))
    }
}

impl From<SyncError> for JimpitanError {
    fn from(err: SyncError) -> Self {
        if err.should_retry() {
            Self::Network(err.to_string())
        } else {
            Self::Internal(err.to_string())
        }
    }
}
