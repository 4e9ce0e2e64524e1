use async_trait::async_trait;
use aws_sdk_cloudwatchlogs::types::InputLogEvent;
use aws_sdk_cloudwatchlogs::Client;
use log::{debug, warn};

use crate::error::{ErrorKind, ServiceError};
use crate::models::{LogEvent, LogStreamInfo};

/// The CloudWatch Logs operations the writer depends on.
#[async_trait]
pub trait LogService: Send + Sync {
    async fn create_log_group(&self, group: &str) -> Result<(), ServiceError>;

    async fn create_log_stream(&self, group: &str, stream: &str) -> Result<(), ServiceError>;

    /// DescribeLogStreams with a name prefix, ordered by name, at most `limit` results.
    async fn describe_log_streams(
        &self,
        group: &str,
        stream_prefix: &str,
        descending: bool,
        limit: i32,
    ) -> Result<Vec<LogStreamInfo>, ServiceError>;

    /// PutLogEvents. Returns the next sequence token reported by the service.
    async fn put_log_events(
        &self,
        group: &str,
        stream: &str,
        events: Vec<LogEvent>,
        sequence_token: Option<String>,
    ) -> Result<Option<String>, ServiceError>;
}

#[async_trait]
#[allow(deprecated)]
impl LogService for Client {
    async fn create_log_group(&self, group: &str) -> Result<(), ServiceError> {
        debug!("CreateLogGroup {}", group);
        self.create_log_group()
            .log_group_name(group)
            .send()
            .await?;
        Ok(())
    }

    async fn create_log_stream(&self, group: &str, stream: &str) -> Result<(), ServiceError> {
        debug!("CreateLogStream {}/{}", group, stream);
        self.create_log_stream()
            .log_group_name(group)
            .log_stream_name(stream)
            .send()
            .await?;
        Ok(())
    }

    async fn describe_log_streams(
        &self,
        group: &str,
        stream_prefix: &str,
        descending: bool,
        limit: i32,
    ) -> Result<Vec<LogStreamInfo>, ServiceError> {
        debug!(
            "DescribeLogStreams {}/{}* descending {} limit {}",
            group, stream_prefix, descending, limit
        );
        let resp = self
            .describe_log_streams()
            .log_group_name(group)
            .log_stream_name_prefix(stream_prefix)
            .descending(descending)
            .limit(limit)
            .send()
            .await?;

        Ok(resp
            .log_streams
            .unwrap_or_default()
            .into_iter()
            .map(|s| LogStreamInfo {
                log_stream_name: s.log_stream_name,
                upload_sequence_token: s.upload_sequence_token,
            })
            .collect())
    }

    async fn put_log_events(
        &self,
        group: &str,
        stream: &str,
        events: Vec<LogEvent>,
        sequence_token: Option<String>,
    ) -> Result<Option<String>, ServiceError> {
        debug!(
            "PutLogEvents {}/{} ({} event(s), token {:?})",
            group,
            stream,
            events.len(),
            sequence_token
        );
        let events = events
            .into_iter()
            .map(|e| {
                InputLogEvent::builder()
                    .message(e.message)
                    .timestamp(e.timestamp)
                    .build()
                    .map_err(|err| ServiceError::new(ErrorKind::Other, None, err.to_string()))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let resp = self
            .put_log_events()
            .log_group_name(group)
            .log_stream_name(stream)
            .set_log_events(Some(events))
            .set_sequence_token(sequence_token)
            .send()
            .await?;

        if let Some(rejected) = resp.rejected_log_events_info {
            warn!("PutLogEvents rejected events in {}/{}: {:?}", group, stream, rejected);
        }
        Ok(resp.next_sequence_token)
    }
}
