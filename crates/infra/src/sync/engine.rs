//! Background drain of the upload queue
//!
//! Polls the queue for payloads captured while the endpoint was
//! unreachable and replays them one at a time. Join handles are
//! tracked, cancellation is explicit, and every pass runs under a
//! timeout. An item that has exhausted its attempts is evicted without
//! touching the network; everything else gets one bounded delivery
//! attempt per pass.
//!
//! Two engines draining the same queue can deliver an item twice. The
//! wire format carries no idempotency key, so the endpoint may see the
//! duplicate; a single process runs one engine and serializes its own
//! passes through an internal lock.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex as TokioMutex;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

use jimpitan_core::{ConnectivityProbe, UploadQueue, UploadTransport};
use jimpitan_domain::constants::MAX_UPLOAD_ATTEMPTS;
use jimpitan_domain::{JimpitanError, QueuedUpload, Result as DomainResult, SyncReport};

/// Configuration for the sync engine.
#[derive(Debug, Clone)]
pub struct SyncEngineConfig {
    /// Interval between periodic drain attempts
    pub poll_interval: Duration,
    /// Timeout for one whole drain pass
    pub pass_timeout: Duration,
    /// Delivery attempts before an item is evicted
    pub max_attempts: u32,
    /// Join timeout when stopping
    pub join_timeout: Duration,
}

impl Default for SyncEngineConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(30),
            pass_timeout: Duration::from_secs(300),
            max_attempts: MAX_UPLOAD_ATTEMPTS,
            join_timeout: Duration::from_secs(5),
        }
    }
}

/// Queue drain engine with explicit lifecycle management.
pub struct SyncEngine {
    queue: Arc<dyn UploadQueue>,
    transport: Arc<dyn UploadTransport>,
    connectivity: Arc<dyn ConnectivityProbe>,
    config: SyncEngineConfig,
    drain_lock: Arc<TokioMutex<()>>,
    cancellation: CancellationToken,
    task_handle: Option<JoinHandle<()>>,
}

impl SyncEngine {
    /// Create a new engine over the given queue and transport.
    pub fn new(
        queue: Arc<dyn UploadQueue>,
        transport: Arc<dyn UploadTransport>,
        connectivity: Arc<dyn ConnectivityProbe>,
        config: SyncEngineConfig,
    ) -> Self {
        Self {
            queue,
            transport,
            connectivity,
            config,
            drain_lock: Arc::new(TokioMutex::new(())),
            cancellation: CancellationToken::new(),
            task_handle: None,
        }
    }

    /// Start the periodic drain task.
    #[instrument(skip(self))]
    pub async fn start(&mut self) -> Result<(), String> {
        if self.is_running() {
            return Err("Sync engine already running".to_string());
        }

        info!("Starting sync engine");

        // Create fresh cancellation token
        self.cancellation = CancellationToken::new();

        let queue = Arc::clone(&self.queue);
        let transport = Arc::clone(&self.transport);
        let connectivity = Arc::clone(&self.connectivity);
        let drain_lock = Arc::clone(&self.drain_lock);
        let poll_interval = self.config.poll_interval;
        let pass_timeout = self.config.pass_timeout;
        let max_attempts = self.config.max_attempts;
        let cancel = self.cancellation.clone();

        let handle = tokio::spawn(async move {
            Self::drain_loop(
                queue,
                transport,
                connectivity,
                drain_lock,
                poll_interval,
                pass_timeout,
                max_attempts,
                cancel,
            )
            .await;
        });

        self.task_handle = Some(handle);
        info!("Sync engine started");

        Ok(())
    }

    /// Stop the engine and wait for the drain task to finish.
    #[instrument(skip(self))]
    pub async fn stop(&mut self) -> Result<(), String> {
        if !self.is_running() {
            return Err("Sync engine not running".to_string());
        }

        info!("Stopping sync engine");

        // Cancel background task
        self.cancellation.cancel();

        // Await join handle with timeout
        if let Some(handle) = self.task_handle.take() {
            let join_timeout = self.config.join_timeout;
            match tokio::time::timeout(join_timeout, handle).await {
                Ok(Ok(())) => {}
                Ok(Err(e)) => {
                    warn!("Sync engine task panicked: {}", e);
                    return Err("Sync engine task panicked".to_string());
                }
                Err(_) => {
                    warn!("Sync engine task did not complete within timeout");
                    return Err("Sync engine task timeout".to_string());
                }
            }
        }

        info!("Sync engine stopped");
        self.cancellation = CancellationToken::new();

        Ok(())
    }

    /// Returns true when the periodic drain task is active.
    pub fn is_running(&self) -> bool {
        self.task_handle.is_some()
    }

    /// Run one drain pass now, for startup and connectivity-restored
    /// triggers.
    ///
    /// Skips the pass entirely when the connectivity probe reports
    /// offline, so queued items do not burn attempts against a network
    /// that is known to be down. Passes are serialized with the
    /// periodic loop through an internal lock.
    pub async fn drain_once(&self) -> DomainResult<SyncReport> {
        if !self.connectivity.is_online() {
            debug!("offline, skipping drain");
            return Ok(SyncReport::default());
        }

        let _guard = self.drain_lock.lock().await;
        Self::drain(&self.queue, &self.transport, self.config.max_attempts).await
    }

    /// Background drain loop.
    #[allow(clippy::too_many_arguments)]
    async fn drain_loop(
        queue: Arc<dyn UploadQueue>,
        transport: Arc<dyn UploadTransport>,
        connectivity: Arc<dyn ConnectivityProbe>,
        drain_lock: Arc<TokioMutex<()>>,
        poll_interval: Duration,
        pass_timeout: Duration,
        max_attempts: u32,
        cancel: CancellationToken,
    ) {
        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    debug!("Sync engine drain loop cancelled");
                    break;
                }
                _ = tokio::time::sleep(poll_interval) => {
                    if !connectivity.is_online() {
                        debug!("offline, skipping drain tick");
                        continue;
                    }

                    let _guard = drain_lock.lock().await;
                    match tokio::time::timeout(
                        pass_timeout,
                        Self::drain(&queue, &transport, max_attempts),
                    )
                    .await
                    {
                        Ok(Ok(_)) => {}
                        Ok(Err(e)) => {
                            error!(error = %e, "Drain pass failed");
                        }
                        Err(_) => {
                            warn!(timeout_secs = pass_timeout.as_secs(), "Drain pass timed out");
                        }
                    }
                }
            }
        }
    }

    /// Replay every pending item once, oldest first.
    async fn drain(
        queue: &Arc<dyn UploadQueue>,
        transport: &Arc<dyn UploadTransport>,
        max_attempts: u32,
    ) -> DomainResult<SyncReport> {
        let items = queue.list_pending().await?;
        if items.is_empty() {
            debug!("No queued uploads to drain");
            return Ok(SyncReport::default());
        }

        let pass_id = Uuid::new_v4();
        info!(pass_id = %pass_id, pending = items.len(), "Draining upload queue");

        let mut report = SyncReport::default();

        for item in items {
            if item.attempts >= max_attempts {
                warn!(
                    pass_id = %pass_id,
                    item_id = item.id,
                    attempts = item.attempts,
                    "Evicting queue item after exhausted attempts"
                );
                queue.remove(item.id).await?;
                report.evicted += 1;
                continue;
            }

            let envelope = match QueuedUpload::from_queue_item(&item) {
                Ok(envelope) => envelope,
                Err(err) => {
                    warn!(
                        pass_id = %pass_id,
                        item_id = item.id,
                        error = %err,
                        "Queue payload unusable"
                    );
                    Self::note_failure(queue, item.id, &mut report).await?;
                    continue;
                }
            };

            match transport.send_queued(&envelope).await {
                Ok(ack) => {
                    debug!(
                        pass_id = %pass_id,
                        item_id = item.id,
                        message = ack.message.as_deref().unwrap_or_default(),
                        "Queued upload delivered"
                    );
                    queue.remove(item.id).await?;
                    report.succeeded += 1;
                }
                Err(err) => {
                    debug!(
                        pass_id = %pass_id,
                        item_id = item.id,
                        error = %err,
                        "Queued upload failed"
                    );
                    Self::note_failure(queue, item.id, &mut report).await?;
                }
            }
        }

        info!(
            pass_id = %pass_id,
            succeeded = report.succeeded,
            failed = report.failed,
            evicted = report.evicted,
            "Drain pass finished"
        );

        Ok(report)
    }

    /// Count a failed delivery against the item. A concurrent retention
    /// sweep may have evicted the row already, so a missing item is not
    /// an error.
    async fn note_failure(
        queue: &Arc<dyn UploadQueue>,
        item_id: i64,
        report: &mut SyncReport,
    ) -> DomainResult<()> {
        match queue.record_attempt_failure(item_id).await {
            Ok(()) => {}
            Err(JimpitanError::NotFound(_)) => {
                debug!(item_id, "Queue item already gone, skipping attempt bump");
            }
            Err(err) => return Err(err),
        }
        report.failed += 1;
        Ok(())
    }
}

impl Drop for SyncEngine {
    fn drop(&mut self) {
        if self.is_running() {
            warn!("SyncEngine dropped while running; cancelling tasks");
            self.cancellation.cancel();
        }
    }
}
