//! Logging setup and command execution logging.

use std::time::Duration;

use jimpitan_domain::Result;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Environment variable controlling the log filter.
pub const LOG_ENV_VAR: &str = "JIMPITAN_LOG";

/// Install the global tracing subscriber.
///
/// The filter comes from `JIMPITAN_LOG` (same syntax as `RUST_LOG`),
/// defaulting to `info`. Calling this twice is harmless: the second
/// install attempt is ignored so embedders and tests can both call it.
pub fn init_logging() {
    let filter =
        EnvFilter::try_from_env(LOG_ENV_VAR).unwrap_or_else(|_| EnvFilter::new("info"));

    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

/// Log the outcome of a command execution with structured fields.
///
/// # Parameters
/// * `command` - Logical command identifier (e.g. `"collection::record_entry"`).
/// * `elapsed` - Duration the command execution took.
/// * `result` - The command outcome about to be returned to the caller.
///
/// The helper keeps the command wrappers concise and gives every command
/// the same success/failure log shape. Callers must avoid forwarding
/// sensitive values in `command`.
#[inline]
pub fn log_command_execution<T>(command: &str, elapsed: Duration, result: &Result<T>) {
    let duration_ms = elapsed.as_millis() as u64;

    match result {
        Ok(_) => info!(command, duration_ms, "command_execution_success"),
        Err(err) => {
            warn!(
                command,
                duration_ms,
                error = %err,
                error_label = err.label(),
                "command_execution_failure"
            );
        }
    }
}
