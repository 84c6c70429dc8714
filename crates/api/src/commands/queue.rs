//! Offline queue inspection commands

use std::time::Instant;

use jimpitan_domain::{QueueStatus, Result};

use crate::utils::logging::log_command_execution;
use crate::AppContext;

/// Pending-queue snapshot: item count and oldest enqueue time.
pub async fn get_queue_status(ctx: &AppContext) -> Result<QueueStatus> {
    let command_name = "queue::get_queue_status";
    let start = Instant::now();

    let result = ctx.collection.queue_status().await;
    log_command_execution(command_name, start.elapsed(), &result);

    result
}

/// Banner text for a non-empty offline queue, `None` when nothing is
/// stored. Indonesian, like the rest of the user-facing strings.
pub fn offline_data_notice(status: &QueueStatus) -> Option<String> {
    if status.pending == 0 {
        return None;
    }
    Some(format!("📦 Ada {} data offline yang tersimpan", status.pending))
}
