//! Time helpers
//!
//! Two date vocabularies coexist here on purpose. Entry dates follow the
//! local collection day (`d/m/yyyy` in the configured timezone); the
//! daily-upload guard compares UTC `yyyy-mm-dd` strings. Keeping both
//! formats behind these helpers stops the formats from drifting apart.

use chrono::{DateTime, Utc};
use chrono_tz::Tz;

use crate::errors::{JimpitanError, Result};

/// Current time as epoch milliseconds.
pub fn epoch_millis() -> i64 {
    Utc::now().timestamp_millis()
}

/// Today's collection day in the given timezone, `d/m/yyyy` without
/// zero padding.
pub fn collection_day(tz: &Tz) -> String {
    collection_day_for(epoch_millis(), tz)
}

/// Collection day for an epoch-millis timestamp in the given timezone.
pub fn collection_day_for(timestamp_ms: i64, tz: &Tz) -> String {
    to_datetime(timestamp_ms).with_timezone(tz).format("%-d/%-m/%Y").to_string()
}

/// Today's guard day: the UTC calendar date as `yyyy-mm-dd`.
pub fn guard_day() -> String {
    guard_day_for(epoch_millis())
}

/// Guard day for an epoch-millis timestamp.
pub fn guard_day_for(timestamp_ms: i64) -> String {
    to_datetime(timestamp_ms).format("%Y-%m-%d").to_string()
}

/// Resolve an IANA timezone name.
///
/// # Errors
/// Returns `JimpitanError::Config` if the name is not a known timezone.
pub fn resolve_timezone(name: &str) -> Result<Tz> {
    name.parse::<Tz>()
        .map_err(|_| JimpitanError::Config(format!("Unknown timezone: {}", name)))
}

fn to_datetime(timestamp_ms: i64) -> DateTime<Utc> {
    DateTime::from_timestamp_millis(timestamp_ms).unwrap_or(DateTime::UNIX_EPOCH)
}
