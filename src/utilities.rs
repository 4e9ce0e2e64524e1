use chrono::{DateTime, TimeZone, Utc};

pub fn millis_to_datetime(millis: i64) -> DateTime<Utc> {
    Utc.timestamp_millis_opt(millis)
        .single()
        .unwrap_or(DateTime::<Utc>::UNIX_EPOCH)
}

/// Current time in milliseconds since the epoch, the unit CloudWatch Logs expects.
pub fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

/// Stream name used when a descriptor has no `stream` key.
pub fn default_stream_name(group: &str) -> String {
    format!("{}-{}", group, Utc::now().timestamp())
}
