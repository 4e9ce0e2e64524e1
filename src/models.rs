pub type SendableError = Box<dyn std::error::Error + Send + Sync>;

/// One event to append, timestamp in milliseconds since the epoch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEvent {
    pub message: String,
    pub timestamp: i64,
}

/// The parts of a described log stream the writer cares about.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LogStreamInfo {
    pub log_stream_name: Option<String>,
    pub upload_sequence_token: Option<String>,
}

/// Acknowledgment of a queued message.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SendReceipt {
    pub message_id: Option<String>,
    pub md5_of_body: Option<String>,
}
