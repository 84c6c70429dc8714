//! Entry recording and working-set commands

use std::time::Instant;

use jimpitan_domain::{DonationEntry, RecordedEntry, Result, WorkingSet};
use tracing::info;

use crate::utils::logging::log_command_execution;
use crate::AppContext;

/// Record a donor's contribution for today.
///
/// Creates the entry on first call for a donor, updates the amount on a
/// repeat call the same day. Zero is a valid "did not contribute" amount.
pub async fn record_entry(
    ctx: &AppContext,
    donor: &str,
    amount: i64,
    category: &str,
) -> Result<RecordedEntry> {
    let command_name = "collection::record_entry";
    let start = Instant::now();

    info!(command = command_name, donor, category, "Recording donation entry");

    let result = ctx.collection.record_entry(donor, amount, category).await;
    log_command_execution(command_name, start.elapsed(), &result);

    result
}

/// Change the amount on an existing entry.
pub async fn edit_entry(ctx: &AppContext, id: i64, new_amount: i64) -> Result<DonationEntry> {
    let command_name = "collection::edit_entry";
    let start = Instant::now();

    info!(command = command_name, id, new_amount, "Editing donation entry");

    let result = ctx.collection.edit_entry(id, new_amount).await;
    log_command_execution(command_name, start.elapsed(), &result);

    result
}

/// Delete a single entry by id.
pub async fn delete_entry(ctx: &AppContext, id: i64) -> Result<()> {
    let command_name = "collection::delete_entry";
    let start = Instant::now();

    info!(command = command_name, id, "Deleting donation entry");

    let result = ctx.collection.delete_entry(id).await;
    log_command_execution(command_name, start.elapsed(), &result);

    result
}

/// Delete all of today's entries for a category. Returns the count deleted.
pub async fn delete_all_today(ctx: &AppContext, category: &str) -> Result<usize> {
    let command_name = "collection::delete_all_today";
    let start = Instant::now();

    info!(command = command_name, category, "Deleting today's entries");

    let result = ctx.collection.delete_all_today(category).await;
    log_command_execution(command_name, start.elapsed(), &result);

    result
}

/// Today's entries for the active category.
pub async fn get_working_set(ctx: &AppContext) -> Result<WorkingSet> {
    let command_name = "collection::get_working_set";
    let start = Instant::now();

    let result = ctx.collection.get_working_set().await;
    log_command_execution(command_name, start.elapsed(), &result);

    result
}

/// Switch the active category and load its working set for today.
pub async fn set_active_category(ctx: &AppContext, category: &str) -> Result<WorkingSet> {
    let command_name = "collection::set_active_category";
    let start = Instant::now();

    info!(command = command_name, category, "Switching active category");

    let result = ctx.collection.set_active_category(category).await;
    log_command_execution(command_name, start.elapsed(), &result);

    result
}

/// Whether every roster member of the category has an entry today.
pub async fn is_roster_complete(ctx: &AppContext, category: &str) -> Result<bool> {
    let command_name = "collection::is_roster_complete";
    let start = Instant::now();

    let result = ctx.collection.is_roster_complete(category).await;
    log_command_execution(command_name, start.elapsed(), &result);

    result
}
