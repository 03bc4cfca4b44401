/// Current UTC timestamp in milliseconds
pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Format a unix-millis timestamp as `HH:MM` local display time.
///
/// Display only. Ordering always follows the server-provided log order,
/// never this value.
pub fn format_clock(millis: i64) -> String {
    use chrono::TimeZone;
    match chrono::Local.timestamp_millis_opt(millis) {
        chrono::LocalResult::Single(dt) => dt.format("%H:%M").to_string(),
        _ => String::from("--:--"),
    }
}
