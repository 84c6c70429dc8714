//! Port interfaces for upload delivery

use async_trait::async_trait;
use jimpitan_domain::{DirectUpload, QueuedUpload, Result, UploadAck};

/// Trait for delivering payloads to the remote endpoint
///
/// Implementations own the HTTP details and the per-attempt timeouts.
/// Any non-2xx response or transport failure surfaces as
/// `JimpitanError::Network`.
#[async_trait]
pub trait UploadTransport: Send + Sync {
    /// One bounded foreground upload attempt
    async fn send_direct(&self, payload: &DirectUpload) -> Result<UploadAck>;

    /// One bounded delivery attempt for a queued item
    async fn send_queued(&self, payload: &QueuedUpload) -> Result<UploadAck>;
}

/// Trait reporting whether the host currently has connectivity
///
/// The report is advisory: a `true` can still be followed by a failed
/// request, and callers fall back to the queue when that happens.
pub trait ConnectivityProbe: Send + Sync {
    fn is_online(&self) -> bool;
}
