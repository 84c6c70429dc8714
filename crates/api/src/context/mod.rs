//! Application context - dependency injection container

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use jimpitan_core::{
    CollectionService, ConnectivityProbe, DailyUploadGuard, EntryStore, GuardStore,
    MaintenanceStore, SessionState, SettingsStore, UploadQueue, UploadTransport,
};
use jimpitan_domain::{Config, JimpitanError, Result};
use jimpitan_infra::{
    DbManager, FileGuardStore, RetentionService, RetentionServiceConfig, SqliteEntryRepository,
    SqliteMaintenanceRepository, SqliteQueueRepository, SqliteSettingsRepository, SyncEngine,
    SyncEngineConfig, UploadClient, UploadClientConfig,
};
use tracing::{error, info, warn};

use crate::utils::health::{ComponentHealth, HealthStatus};

/// Host-settable connectivity flag.
///
/// The embedding environment owns the truth about network availability;
/// this flag is its hand-off point. Flipping it changes nothing by
/// itself: a host that just came back online should follow up with
/// [`crate::commands::sync_now`].
#[derive(Debug)]
pub struct ConnectivityFlag {
    online: AtomicBool,
}

impl ConnectivityFlag {
    /// Create a flag with the given initial state.
    pub fn new(online: bool) -> Self {
        Self { online: AtomicBool::new(online) }
    }

    /// Record the host's current connectivity.
    pub fn set_online(&self, online: bool) {
        self.online.store(online, Ordering::SeqCst);
    }
}

impl Default for ConnectivityFlag {
    /// Assume online until the host says otherwise.
    fn default() -> Self {
        Self::new(true)
    }
}

impl ConnectivityProbe for ConnectivityFlag {
    fn is_online(&self) -> bool {
        self.online.load(Ordering::SeqCst)
    }
}

/// Application context - holds all services and dependencies
pub struct AppContext {
    /// Resolved configuration the context was built from.
    pub config: Config,
    /// Database manager owning the connection pool.
    pub db: Arc<DbManager>,
    /// Donation entry store.
    pub entries: Arc<dyn EntryStore>,
    /// Pending-upload queue store.
    pub queue: Arc<dyn UploadQueue>,
    /// Key-value settings store.
    pub settings: Arc<dyn SettingsStore>,
    /// Once-per-day upload guard.
    pub guard: Arc<DailyUploadGuard>,
    /// In-memory working state for the active category.
    pub session: Arc<SessionState>,
    /// Connectivity flag the host keeps current.
    pub connectivity: Arc<ConnectivityFlag>,
    /// Core orchestrator behind the command functions.
    pub collection: Arc<CollectionService>,
    /// Background queue drain engine.
    pub sync_engine: Arc<SyncEngine>,
    /// Background retention sweeper.
    pub retention: Arc<RetentionService>,
}

impl fmt::Debug for AppContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppContext")
            .field("config", &self.config)
            .field("connectivity", &self.connectivity)
            .finish_non_exhaustive()
    }
}

async fn create_sync_engine(
    config: &Config,
    queue: Arc<dyn UploadQueue>,
    transport: Arc<dyn UploadTransport>,
    connectivity: Arc<dyn ConnectivityProbe>,
) -> Result<Arc<SyncEngine>> {
    let engine_config = SyncEngineConfig {
        poll_interval: Duration::from_secs(config.sync.interval_seconds.max(1)),
        ..SyncEngineConfig::default()
    };

    let mut engine = SyncEngine::new(queue, transport, connectivity, engine_config);

    if config.sync.enabled {
        // Start with timeout (fail-fast initialization)
        let start_timeout = Duration::from_secs(10);
        tokio::time::timeout(start_timeout, engine.start())
            .await
            .map_err(|_| {
                error!(timeout_secs = 10, "SyncEngine start timed out");
                JimpitanError::Internal("SyncEngine start timed out after 10s".into())
            })?
            .map_err(|err| {
                error!(error = %err, "failed to start SyncEngine");
                JimpitanError::Internal(format!("failed to start SyncEngine: {}", err))
            })?;
    } else {
        info!("Periodic sync disabled by configuration");
    }

    Ok(Arc::new(engine))
}

async fn create_retention_service(
    config: &Config,
    maintenance: Arc<dyn MaintenanceStore>,
    settings: Arc<dyn SettingsStore>,
) -> Result<Arc<RetentionService>> {
    let service_config = RetentionServiceConfig::from(&config.retention);
    let mut service = RetentionService::new(maintenance, settings, service_config);

    if config.retention.enabled {
        // Start with timeout (fail-fast initialization)
        let start_timeout = Duration::from_secs(10);
        tokio::time::timeout(start_timeout, service.start())
            .await
            .map_err(|_| {
                error!(timeout_secs = 10, "RetentionService start timed out");
                JimpitanError::Internal("RetentionService start timed out after 10s".into())
            })??;
    } else {
        info!("Retention sweeps disabled by configuration");
    }

    Ok(Arc::new(service))
}

impl AppContext {
    /// Create a new application context from the resolved configuration.
    ///
    /// Configuration comes from the environment, a probed config file, or
    /// built-in defaults, in that order.
    pub async fn new() -> Result<Self> {
        Self::new_with_config(jimpitan_infra::config::load()?).await
    }

    /// Create a new application context with custom configuration
    ///
    /// This is also the test entry point: tests pass a config pointing at
    /// a temporary database path so contexts never collide.
    pub async fn new_with_config(config: Config) -> Result<Self> {
        Self::new_with_config_and_connectivity(config, true).await
    }

    /// Create a new application context with a known connectivity state
    ///
    /// Hosts that can already tell they are offline pass `online = false`
    /// so the startup backlog check does not waste delivery attempts
    /// against a dead network.
    pub async fn new_with_config_and_connectivity(config: Config, online: bool) -> Result<Self> {
        let initial_category =
            config.collection.rosters.keys().next().cloned().ok_or_else(|| {
                JimpitanError::Config("No collection rosters configured".to_string())
            })?;

        // Initialize database and run migrations
        let db = Arc::new(DbManager::new(&config.database.path, config.database.pool_size)?);
        db.run_migrations()?;

        // Store adapters over the shared pool
        let entries: Arc<dyn EntryStore> = Arc::new(SqliteEntryRepository::new(Arc::clone(&db)));
        let queue: Arc<dyn UploadQueue> = Arc::new(SqliteQueueRepository::new(Arc::clone(&db)));
        let settings: Arc<dyn SettingsStore> =
            Arc::new(SqliteSettingsRepository::new(Arc::clone(&db)));
        let maintenance: Arc<dyn MaintenanceStore> =
            Arc::new(SqliteMaintenanceRepository::new(Arc::clone(&db)));

        // Daily-upload guard, persisted beside the database file
        let guard_store: Arc<dyn GuardStore> =
            Arc::new(FileGuardStore::beside_database(&config.database.path));
        let guard = Arc::new(DailyUploadGuard::new(guard_store));

        // Session state starts on the first configured category
        let session = Arc::new(SessionState::new(initial_category));

        // Network side: host-driven connectivity plus the HTTP transport
        let connectivity = Arc::new(ConnectivityFlag::new(online));
        let probe: Arc<dyn ConnectivityProbe> = connectivity.clone();
        let transport: Arc<dyn UploadTransport> =
            Arc::new(UploadClient::with_config(UploadClientConfig::from(&config.upload))?);

        // Core orchestrator
        let collection = Arc::new(CollectionService::new(
            Arc::clone(&entries),
            Arc::clone(&queue),
            Arc::clone(&transport),
            Arc::clone(&probe),
            Arc::clone(&guard),
            Arc::clone(&session),
            config.collection.clone(),
        )?);

        // Background services (fail-fast start)
        let sync_engine =
            create_sync_engine(&config, Arc::clone(&queue), transport, probe).await?;
        let retention = create_retention_service(&config, maintenance, Arc::clone(&settings)).await?;

        let context = Self {
            config,
            db,
            entries,
            queue,
            settings,
            guard,
            session,
            connectivity,
            collection,
            sync_engine,
            retention,
        };

        context.announce_offline_backlog().await;

        Ok(context)
    }

    /// Surface any offline backlog at startup: notify, then drain
    /// immediately when the network is there.
    ///
    /// Best-effort only. A store error here is logged and swallowed so a
    /// backlog check can never abort startup.
    async fn announce_offline_backlog(&self) {
        match self.queue.status().await {
            Ok(status) if status.pending > 0 => {
                info!(
                    pending = status.pending,
                    "📦 Ada {} data offline yang tersimpan", status.pending
                );
                if self.connectivity.is_online() {
                    info!("🔄 Menyinkronkan data offline...");
                    let engine = Arc::clone(&self.sync_engine);
                    tokio::spawn(async move {
                        if let Err(err) = engine.drain_once().await {
                            warn!(error = %err, "Startup drain failed");
                        }
                    });
                }
            }
            Ok(_) => {}
            Err(err) => warn!(error = %err, "Could not check the offline queue at startup"),
        }
    }

    /// Check health of all application components
    ///
    /// Returns a [`HealthStatus`] with individual component checks and an
    /// overall score (healthy components / total components). A disabled
    /// background service counts as healthy; an enabled one must actually
    /// be running.
    pub async fn health_check(&self) -> HealthStatus {
        let mut status = HealthStatus::new();

        // Live database query (async to avoid blocking)
        status = status.add_component(self.check_database_health().await);

        // Orchestrator and guard are stateless wrappers over the stores
        status = status.add_component(ComponentHealth::healthy("collection_service"));
        status = status.add_component(ComponentHealth::healthy("daily_guard"));

        status = status.add_component(if !self.config.sync.enabled {
            ComponentHealth::healthy("sync_engine")
        } else if self.sync_engine.is_running() {
            ComponentHealth::healthy("sync_engine")
        } else {
            ComponentHealth::unhealthy("sync_engine", "enabled but not running")
        });

        status = status.add_component(if !self.config.retention.enabled {
            ComponentHealth::healthy("retention_service")
        } else if self.retention.is_running().await {
            ComponentHealth::healthy("retention_service")
        } else {
            ComponentHealth::unhealthy("retention_service", "enabled but not running")
        });

        status.calculate_score();

        status
    }

    /// Check database health by running the manager's probe query
    ///
    /// Uses spawn_blocking to keep the synchronous SQLite call off the
    /// async runtime.
    async fn check_database_health(&self) -> ComponentHealth {
        let db = Arc::clone(&self.db);
        match tokio::task::spawn_blocking(move || db.health_check()).await {
            Ok(Ok(())) => ComponentHealth::healthy("database"),
            Ok(Err(e)) => {
                warn!(error = %e, "database health check failed");
                ComponentHealth::unhealthy("database", format!("query failed: {}", e))
            }
            Err(e) => {
                error!(error = %e, "database health check task panicked");
                ComponentHealth::unhealthy("database", format!("task panic: {}", e))
            }
        }
    }

    /// Shutdown the application context gracefully
    ///
    /// Intentionally close to a no-op: the sync engine and retention
    /// service hold `CancellationToken`s that their `Drop` impls cancel,
    /// so dropping the context (or shutting the runtime down) stops the
    /// background tasks without explicit calls. Both services also expose
    /// `stop()` for embedders that keep exclusive ownership and want to
    /// join the tasks.
    ///
    /// Idempotent; safe to call any number of times.
    pub async fn shutdown(&self) -> Result<()> {
        info!("shutdown called on AppContext");

        self.shutdown_diagnostics();

        Ok(())
    }

    /// Log the cleanup path for each component, for shutdown debugging.
    fn shutdown_diagnostics(&self) {
        info!(
            component = "SyncEngine",
            cleanup_method = "Drop (CancellationToken)",
            running = self.sync_engine.is_running(),
            "service_cleanup"
        );

        info!(
            component = "RetentionService",
            cleanup_method = "Drop (CancellationToken)",
            "service_cleanup"
        );

        info!(
            component = "CollectionService",
            cleanup_method = "stateless (no cleanup)",
            "service_cleanup"
        );

        info!(
            component = "DbManager",
            cleanup_method = "connection pool auto-closes",
            "database_cleanup"
        );
    }
}
