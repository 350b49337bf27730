use chrono::{DateTime, Duration, DurationRound, FixedOffset, Local};

/// Server-assigned timestamps are truncated to the minute before storage,
/// in the server's fixed UTC offset.
pub fn now_minute() -> DateTime<FixedOffset> {
    let now = Local::now().fixed_offset();
    now.duration_trunc(Duration::minutes(1)).unwrap_or(now)
}
