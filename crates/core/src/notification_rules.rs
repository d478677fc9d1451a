//! Firing conditions for the two notification rules.
//!
//! - Weekly summary: fires when the UTC wall clock is inside the
//!   Monday 09:00-09:59 window. With hourly wakes that happens exactly once
//!   per week; a week whose window falls during downtime is skipped.
//! - Inactivity reminder: evaluated on every wake, selects users whose most
//!   recent skill update is strictly older than the inactivity window.

use chrono::{Datelike, Duration, Timelike, Weekday};

use crate::types::Timestamp;

/// Day of week on which weekly summaries are sent.
pub const WEEKLY_SUMMARY_WEEKDAY: Weekday = Weekday::Mon;

/// UTC hour of day on which weekly summaries are sent.
pub const WEEKLY_SUMMARY_HOUR: u32 = 9;

/// Days without any skill update after which a reminder is due.
pub const INACTIVITY_WINDOW_DAYS: i64 = 30;

/// Name of the weekly summary rule as it appears in logs and reports.
pub const RULE_WEEKLY_SUMMARY: &str = "weekly_summary";

/// Name of the inactivity reminder rule as it appears in logs and reports.
pub const RULE_INACTIVITY_REMINDER: &str = "inactivity_reminder";

/// Whether `now` falls inside the weekly summary window.
pub fn is_weekly_summary_due(now: Timestamp) -> bool {
    now.weekday() == WEEKLY_SUMMARY_WEEKDAY && now.hour() == WEEKLY_SUMMARY_HOUR
}

/// Whether a user whose newest skill update is `last_updated` is inactive.
///
/// Strict: exactly [`INACTIVITY_WINDOW_DAYS`] days is still active.
pub fn is_inactive(last_updated: Timestamp, now: Timestamp) -> bool {
    now - last_updated > Duration::days(INACTIVITY_WINDOW_DAYS)
}

/// Whole days elapsed since `last_updated`, truncated toward zero.
pub fn days_since(last_updated: Timestamp, now: Timestamp) -> i64 {
    (now - last_updated).num_days()
}
