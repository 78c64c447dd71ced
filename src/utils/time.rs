use chrono::{DateTime, FixedOffset};

/// India Standard Time, used in human-readable notification text.
const IST_OFFSET_SECS: i32 = 5 * 3600 + 30 * 60;

/// Formats `at` as e.g. "05/03/2025, 02:30:00 PM IST".
pub fn format_ist(at: DateTime<FixedOffset>) -> String {
    FixedOffset::east_opt(IST_OFFSET_SECS)
        .map(|ist| at.with_timezone(&ist))
        .unwrap_or(at)
        .format("%d/%m/%Y, %I:%M:%S %p IST")
        .to_string()
}
