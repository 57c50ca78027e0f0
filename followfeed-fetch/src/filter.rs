//! Activity filtering and formatting.
//!
//! A story's acting user is the first whitespace-delimited token of its
//! text. Stories acted by the target user become [`ActivityRecord`]s; the
//! rest are dropped. Output order is input order.

use chrono::{Local, TimeZone};
use followfeed_core::{ActivityRecord, RawActivityEntry};
use std::fmt::Display;
use tracing::{debug, warn};

/// `YYYY-MM-DD HH:MM:SS`.
pub const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

fn format_timestamp_in<Tz>(epoch_secs: i64, tz: &Tz) -> Option<String>
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    tz.timestamp_opt(epoch_secs, 0)
        .earliest()
        .map(|dt| dt.format(TIME_FORMAT).to_string())
}

/// Keeps entries acted by `target_username`, formatted in local time.
pub fn filter_activities(entries: &[RawActivityEntry], target_username: &str) -> Vec<ActivityRecord> {
    filter_activities_in(entries, target_username, &Local)
}

/// Like [`filter_activities`], formatting times in `tz`.
pub fn filter_activities_in<Tz>(
    entries: &[RawActivityEntry],
    target_username: &str,
    tz: &Tz,
) -> Vec<ActivityRecord>
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let records: Vec<ActivityRecord> = entries
        .iter()
        .filter(|entry| entry.acting_username() == Some(target_username))
        .filter_map(|entry| {
            let Some(time) = entry.args.timestamp.and_then(|ts| format_timestamp_in(ts, tz)) else {
                warn!(
                    timestamp = ?entry.args.timestamp,
                    activity = %entry.args.text,
                    "Dropping matching entry without a usable timestamp"
                );
                return None;
            };
            Some(ActivityRecord {
                activity: entry.args.text.clone(),
                time,
                media: entry.args.media.clone(),
            })
        })
        .collect();

    debug!(
        scanned = entries.len(),
        matched = records.len(),
        target = target_username,
        "Filtered activities"
    );
    records
}

// ============================================================================
// Tests
// ============================================================================
