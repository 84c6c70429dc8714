//! Key-value settings commands

use std::time::Instant;

use jimpitan_domain::{Result, Setting};
use tracing::info;

use crate::utils::logging::log_command_execution;
use crate::AppContext;

/// Read a setting by key, `None` when absent.
pub async fn get_setting(ctx: &AppContext, key: &str) -> Result<Option<Setting>> {
    let command_name = "settings::get_setting";
    let start = Instant::now();

    let result = ctx.settings.get_setting(key).await;
    log_command_execution(command_name, start.elapsed(), &result);

    result
}

/// Upsert a setting. Last write wins; no history is kept.
pub async fn put_setting(ctx: &AppContext, key: &str, value: &serde_json::Value) -> Result<()> {
    let command_name = "settings::put_setting";
    let start = Instant::now();

    info!(command = command_name, key, "Storing setting");

    let result = ctx.settings.put_setting(key, value).await;
    log_command_execution(command_name, start.elapsed(), &result);

    result
}
