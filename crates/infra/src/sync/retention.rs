//! Retention sweep service for storage management
//!
//! Periodically prunes delivered entries and stale queue items past
//! their age bounds. The sweep itself is one store transaction; this
//! service adds the schedule around it and a once-per-day latch
//! persisted in the settings collection, so restarting the app several
//! times a day does not re-run the sweep.
//!
//! Unsynced entries are never touched. Losing data that was recorded
//! but not yet delivered is the one thing retention must not do.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

use jimpitan_core::{MaintenanceStore, SettingsStore};
use jimpitan_domain::constants::{
    QUEUE_ITEM_MAX_AGE_DAYS, SETTING_LAST_SWEEP_DAY, SYNCED_ENTRY_MAX_AGE_DAYS,
};
use jimpitan_domain::{guard_day, JimpitanError, RetentionConfig, Result};

/// Type alias for task handle to avoid complexity warnings
type TaskHandle = Arc<Mutex<Option<JoinHandle<()>>>>;

/// Configuration for the retention service
#[derive(Debug, Clone)]
pub struct RetentionServiceConfig {
    /// Age bound for synced entries (days)
    pub synced_max_age_days: i64,
    /// Age bound for queue items (days)
    pub queue_max_age_days: i64,
    /// Interval between sweep checks
    pub sweep_interval: Duration,
}

impl Default for RetentionServiceConfig {
    fn default() -> Self {
        Self {
            synced_max_age_days: SYNCED_ENTRY_MAX_AGE_DAYS,
            queue_max_age_days: QUEUE_ITEM_MAX_AGE_DAYS,
            sweep_interval: Duration::from_secs(3600),
        }
    }
}

impl From<&RetentionConfig> for RetentionServiceConfig {
    fn from(config: &RetentionConfig) -> Self {
        Self {
            synced_max_age_days: config.synced_max_age_days,
            queue_max_age_days: config.queue_max_age_days,
            sweep_interval: Duration::from_secs(config.interval_seconds),
        }
    }
}

/// Background retention service with lifecycle management
pub struct RetentionService {
    maintenance: Arc<dyn MaintenanceStore>,
    settings: Arc<dyn SettingsStore>,
    config: RetentionServiceConfig,
    cancellation_token: CancellationToken,
    task_handle: TaskHandle,
}

impl RetentionService {
    /// Create a new retention service
    pub fn new(
        maintenance: Arc<dyn MaintenanceStore>,
        settings: Arc<dyn SettingsStore>,
        config: RetentionServiceConfig,
    ) -> Self {
        Self {
            maintenance,
            settings,
            config,
            cancellation_token: CancellationToken::new(),
            task_handle: Arc::new(Mutex::new(None)),
        }
    }

    /// Start the retention service
    ///
    /// Spawns a background task that checks the latch periodically.
    ///
    /// # Errors
    ///
    /// Returns error if the service is already running
    #[instrument(skip(self))]
    pub async fn start(&mut self) -> Result<()> {
        if self.is_running().await {
            return Err(JimpitanError::Internal("Retention service already running".into()));
        }

        info!("Starting retention service");

        // Create a new cancellation token (supports restart after stop)
        self.cancellation_token = CancellationToken::new();

        let maintenance = Arc::clone(&self.maintenance);
        let settings = Arc::clone(&self.settings);
        let config = self.config.clone();
        let cancel = self.cancellation_token.clone();

        let handle = tokio::spawn(async move {
            Self::retention_loop(maintenance, settings, config, cancel).await;
        });

        *self.task_handle.lock().await = Some(handle);

        info!("Retention service started");

        Ok(())
    }

    /// Stop the retention service gracefully
    ///
    /// # Errors
    ///
    /// Returns error if the service is not running
    #[instrument(skip(self))]
    pub async fn stop(&mut self) -> Result<()> {
        if !self.is_running().await {
            return Err(JimpitanError::Internal("Retention service not running".into()));
        }

        info!("Stopping retention service");

        // Cancel background task
        self.cancellation_token.cancel();

        // Await handle with timeout
        if let Some(handle) = self.task_handle.lock().await.take() {
            match tokio::time::timeout(Duration::from_secs(5), handle).await {
                Ok(Ok(())) => {}
                Ok(Err(e)) => {
                    warn!("Retention task panicked: {}", e);
                    return Err(JimpitanError::Internal(format!("Retention task panicked: {e}")));
                }
                Err(_) => {
                    warn!("Retention task did not complete within timeout");
                    return Err(JimpitanError::Internal("Retention task timeout".into()));
                }
            }
        }

        info!("Retention service stopped");

        Ok(())
    }

    /// Check if the retention service is running
    ///
    /// A service is considered running if it has an active task handle.
    pub async fn is_running(&self) -> bool {
        let guard = self.task_handle.lock().await;
        guard.as_ref().is_some_and(|handle| !handle.is_finished())
    }

    /// Run the sweep once immediately, ignoring the daily latch
    ///
    /// # Errors
    ///
    /// Returns error if the store sweep fails
    #[instrument(skip(self))]
    pub async fn sweep_once(&self) -> Result<usize> {
        Self::run_sweep(&self.maintenance, &self.config).await
    }

    /// Run the sweep unless one already ran today
    ///
    /// Returns `None` when today's sweep already happened, otherwise the
    /// number of records removed. The latch day is UTC, matching the
    /// daily-upload guard.
    ///
    /// # Errors
    ///
    /// Returns error if the store sweep or the latch update fails
    pub async fn sweep_if_due(&self) -> Result<Option<usize>> {
        Self::check_and_sweep(&self.maintenance, &self.settings, &self.config).await
    }

    async fn run_sweep(
        maintenance: &Arc<dyn MaintenanceStore>,
        config: &RetentionServiceConfig,
    ) -> Result<usize> {
        info!("Running retention sweep");

        let removed = maintenance
            .retention_sweep(config.synced_max_age_days, config.queue_max_age_days)
            .await?;

        info!(removed, "Retention sweep completed");

        Ok(removed)
    }

    async fn check_and_sweep(
        maintenance: &Arc<dyn MaintenanceStore>,
        settings: &Arc<dyn SettingsStore>,
        config: &RetentionServiceConfig,
    ) -> Result<Option<usize>> {
        let today = guard_day();

        if let Some(setting) = settings.get_setting(SETTING_LAST_SWEEP_DAY).await? {
            if setting.value.as_str() == Some(today.as_str()) {
                debug!(day = %today, "Retention sweep already ran today");
                return Ok(None);
            }
        }

        let removed = Self::run_sweep(maintenance, config).await?;
        settings
            .put_setting(SETTING_LAST_SWEEP_DAY, &serde_json::Value::String(today))
            .await?;

        Ok(Some(removed))
    }

    /// Background retention loop
    async fn retention_loop(
        maintenance: Arc<dyn MaintenanceStore>,
        settings: Arc<dyn SettingsStore>,
        config: RetentionServiceConfig,
        cancel: CancellationToken,
    ) {
        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    debug!("Retention loop cancelled");
                    break;
                }
                _ = tokio::time::sleep(config.sweep_interval) => {
                    match Self::check_and_sweep(&maintenance, &settings, &config).await {
                        Ok(Some(removed)) => {
                            debug!(removed, "Periodic retention sweep completed");
                        }
                        Ok(None) => {
                            debug!("Periodic retention sweep skipped, already ran today");
                        }
                        Err(e) => {
                            warn!(error = %e, "Periodic retention sweep failed");
                        }
                    }
                }
            }
        }
    }
}

/// Ensure the service is stopped when dropped
impl Drop for RetentionService {
    fn drop(&mut self) {
        // Drop cannot await the handle lock; try_lock is best effort
        if let Ok(guard) = self.task_handle.try_lock() {
            if guard.as_ref().is_some_and(|handle| !handle.is_finished()) {
                warn!("RetentionService dropped while running; cancelling");
            }
        }
        self.cancellation_token.cancel();
    }
}
