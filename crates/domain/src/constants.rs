//! Shared constants for storage, sync, and upload behavior

/// Endpoint that receives donation uploads when no override is configured.
pub const DEFAULT_UPLOAD_URL: &str = "https://input.pnakote.my.id/upload";

/// Timezone in which collection days roll over.
pub const DEFAULT_COLLECTION_TIMEZONE: &str = "Asia/Jakarta";

/// Queue items that have failed this many times are evicted permanently.
pub const MAX_UPLOAD_ATTEMPTS: u32 = 3;

/// Timeout for a direct (foreground) upload attempt.
pub const DIRECT_UPLOAD_TIMEOUT_SECS: u64 = 15;

/// Timeout for a single queued item during a background drain pass.
pub const QUEUE_DRAIN_TIMEOUT_SECS: u64 = 10;

/// Synced entries older than this are dropped by the retention sweep.
pub const SYNCED_ENTRY_MAX_AGE_DAYS: i64 = 30;

/// Queue items older than this are dropped by the retention sweep.
pub const QUEUE_ITEM_MAX_AGE_DAYS: i64 = 7;

/// File name of the daily-upload guard sidecar, kept next to the database.
pub const GUARD_FILE_NAME: &str = "last_upload.json";

/// Settings key recording the last UTC day a retention sweep ran.
pub const SETTING_LAST_SWEEP_DAY: &str = "retention.last_sweep_day";

/// Milliseconds per day, for age arithmetic on epoch-millis timestamps.
pub const MS_PER_DAY: i64 = 86_400_000;
