//! HTTP client for the donation upload endpoint
//!
//! One client serves both delivery paths: the foreground upload fired
//! straight from a submit, and the background drain replaying queued
//! items. The endpoint contract is loose by design: any 2xx means the
//! batch was accepted, and the body is at most a JSON object with an
//! optional `message`. Everything else is a failure the caller turns
//! into a queue entry or a retry.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use serde::Serialize;
use tracing::{debug, warn};

use jimpitan_core::UploadTransport;
use jimpitan_domain::constants::{
    DEFAULT_UPLOAD_URL, DIRECT_UPLOAD_TIMEOUT_SECS, QUEUE_DRAIN_TIMEOUT_SECS,
};
use jimpitan_domain::{DirectUpload, JimpitanError, QueuedUpload, Result, UploadAck, UploadConfig};

use super::errors::SyncError;

/// Configuration for the upload client
#[derive(Debug, Clone)]
pub struct UploadClientConfig {
    /// Endpoint that receives upload payloads
    pub url: String,
    /// Timeout for a foreground upload attempt
    pub direct_timeout: Duration,
    /// Timeout for one queued item during a drain pass
    pub queue_item_timeout: Duration,
}

impl Default for UploadClientConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_UPLOAD_URL.to_string(),
            direct_timeout: Duration::from_secs(DIRECT_UPLOAD_TIMEOUT_SECS),
            queue_item_timeout: Duration::from_secs(QUEUE_DRAIN_TIMEOUT_SECS),
        }
    }
}

impl From<&UploadConfig> for UploadClientConfig {
    fn from(config: &UploadConfig) -> Self {
        Self {
            url: config.url.clone(),
            direct_timeout: Duration::from_secs(config.direct_timeout_secs),
            queue_item_timeout: Duration::from_secs(config.queue_item_timeout_secs),
        }
    }
}

/// HTTP implementation of [`UploadTransport`]
///
/// Each call is one bounded attempt. Retry policy lives in the callers:
/// the orchestrator falls back to the queue, the sync engine counts
/// attempts per item.
pub struct UploadClient {
    client: reqwest::Client,
    config: UploadClientConfig,
}

impl UploadClient {
    /// Create a client posting to the default endpoint
    ///
    /// # Errors
    ///
    /// Returns `JimpitanError::Config` if the HTTP client cannot be built
    pub fn new() -> Result<Self> {
        Self::with_config(UploadClientConfig::default())
    }

    /// Create a client with custom configuration
    ///
    /// # Errors
    ///
    /// Returns `JimpitanError::Config` if the HTTP client cannot be built
    pub fn with_config(config: UploadClientConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .build()
            .map_err(|e| JimpitanError::Config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { client, config })
    }

    /// Endpoint the client was configured with
    pub fn url(&self) -> &str {
        &self.config.url
    }

    async fn post_json<T: Serialize>(
        &self,
        payload: &T,
        timeout: Duration,
    ) -> std::result::Result<UploadAck, SyncError> {
        let body =
            serde_json::to_vec(payload).map_err(|e| SyncError::Serialization(e.to_string()))?;

        let request = self
            .client
            .post(&self.config.url)
            .header(CONTENT_TYPE, "application/json")
            .body(body);

        let response = tokio::time::timeout(timeout, request.send())
            .await
            .map_err(|_| SyncError::Timeout(timeout))?
            .map_err(|e| SyncError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(SyncError::Status { status: status.as_u16() });
        }

        // Any 2xx is acceptance. A missing or non-JSON body is still success.
        Ok(response.json::<UploadAck>().await.unwrap_or_default())
    }
}

#[async_trait]
impl UploadTransport for UploadClient {
    async fn send_direct(&self, payload: &DirectUpload) -> Result<UploadAck> {
        debug!(category = %payload.category, entries = payload.data.len(), "sending direct upload");

        match self.post_json(payload, self.config.direct_timeout).await {
            Ok(ack) => Ok(ack),
            Err(err) => {
                warn!(error = %err, error_category = err.category(), "direct upload failed");
                Err(err.into())
            }
        }
    }

    async fn send_queued(&self, payload: &QueuedUpload) -> Result<UploadAck> {
        debug!(
            category = %payload.category,
            entries = payload.data.len(),
            attempts = payload.attempts,
            "sending queued upload"
        );

        match self.post_json(payload, self.config.queue_item_timeout).await {
            Ok(ack) => Ok(ack),
            Err(err) => {
                warn!(error = %err, error_category = err.category(), "queued upload failed");
                Err(err.into())
            }
        }
    }
}
