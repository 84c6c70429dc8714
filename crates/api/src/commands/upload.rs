//! Daily submission and sync commands

use std::time::Instant;

use jimpitan_domain::{Result, SyncReport, UploadOutcome};
use tracing::info;

use crate::utils::logging::log_command_execution;
use crate::AppContext;

/// Submit today's entries for a category.
///
/// Runs the full precondition chain (daily lock, empty day, roster
/// completeness), then delivers directly when online or hands the
/// payload to the offline queue. Either path locks the category until
/// the day rolls over.
pub async fn submit(ctx: &AppContext, category: &str) -> Result<UploadOutcome> {
    let command_name = "upload::submit";
    let start = Instant::now();

    info!(command = command_name, category, "Submitting today's entries");

    let result = ctx.collection.submit(category).await;
    log_command_execution(command_name, start.elapsed(), &result);

    result
}

/// Drain the offline queue once, right now.
///
/// This is the host's "connectivity restored" hook: flip the
/// [`crate::ConnectivityFlag`] online, then call this. It is also safe
/// to call at any other time; an empty queue or an offline flag produce
/// an empty report, not an error.
pub async fn sync_now(ctx: &AppContext) -> Result<SyncReport> {
    let command_name = "upload::sync_now";
    let start = Instant::now();

    match ctx.queue.status().await {
        Ok(status) if status.pending > 0 => {
            info!(
                command = command_name,
                pending = status.pending,
                "🔄 Menyinkronkan {} data offline...", status.pending
            );
        }
        _ => {}
    }

    let result = ctx.sync_engine.drain_once().await;
    log_command_execution(command_name, start.elapsed(), &result);

    result
}

/// User-facing summary lines for a drain report: successes first, then
/// failures (evictions count as failures). Empty when nothing was
/// processed.
pub fn sync_report_notices(report: &SyncReport) -> Vec<String> {
    let mut notices = Vec::new();
    if report.succeeded > 0 {
        notices.push(format!("✅ {} data berhasil disinkronkan", report.succeeded));
    }
    if report.failure_count() > 0 {
        notices.push(format!("❌ {} data gagal disinkronkan", report.failure_count()));
    }
    notices
}
