use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

use aws_sdk_cloudwatchlogs::Client;
use log::{debug, info, warn};
use tokio::sync::Mutex;

use crate::aws::Session;
use crate::descriptor::{self, Descriptor};
use crate::error::{Result, ServiceError};
use crate::logs::LogService;
use crate::models::{LogEvent, LogStreamInfo};
use crate::utilities::{default_stream_name, millis_to_datetime, now_millis};

const CLOUDWATCH_MAX_EVENT_SIZE: usize = 1024 * 1024;
const CLOUDWATCH_EXTRA_MSG_PAYLOAD_SIZE: usize = 26;
const CLOUDWATCH_MAX_MESSAGE_SIZE: usize =
    CLOUDWATCH_MAX_EVENT_SIZE - CLOUDWATCH_EXTRA_MSG_PAYLOAD_SIZE;

/// How the writer obtains the sequence token for each append.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TokenPolicy {
    /// Describe the stream before every append. Independent writers on the
    /// same stream may still race each other.
    #[default]
    Refetch,
    /// Describe once, then reuse the token returned by each append. Appends
    /// through one writer are serialized; a failed append clears the cache.
    Cache,
}

/// Appends lines to one CloudWatch Logs stream.
///
/// The group and stream are created on construction if they don't exist yet.
pub struct CloudWatchWriter<S = Client> {
    service: Arc<S>,
    group: String,
    stream: String,
    policy: TokenPolicy,
    // Outer `None`: nothing cached yet.
    cached_token: Mutex<Option<Option<String>>>,
    last_timestamp: AtomicI64,
}

impl CloudWatchWriter<Client> {
    /// Parses `dsn`, opens a session and provisions the group and stream.
    /// Descriptor problems are reported before any request is made.
    pub async fn from_dsn(dsn: &str) -> Result<Self> {
        let descriptor = Descriptor::parse_with_keys(
            dsn,
            &[descriptor::REGION, descriptor::CREDENTIALS, descriptor::GROUP],
        )?;
        let session = Session::from_descriptor(&descriptor).await?;
        Self::new(&session, &descriptor).await
    }

    pub async fn new(session: &Session, descriptor: &Descriptor) -> Result<Self> {
        Self::with_service(Arc::new(session.logs_client()), descriptor).await
    }
}

impl<S> CloudWatchWriter<S>
where
    S: LogService,
{
    pub async fn with_service(service: Arc<S>, descriptor: &Descriptor) -> Result<Self> {
        let group = descriptor.require(descriptor::GROUP)?.to_string();
        let stream = descriptor
            .get(descriptor::STREAM)
            .map(str::to_string)
            .unwrap_or_else(|| default_stream_name(&group));

        ignore_already_exists(
            service.create_log_group(&group).await,
            "log group",
            &group,
        )?;
        ignore_already_exists(
            service.create_log_stream(&group, &stream).await,
            "log stream",
            &stream,
        )?;

        Ok(Self {
            service,
            group,
            stream,
            policy: TokenPolicy::default(),
            cached_token: Mutex::new(None),
            last_timestamp: AtomicI64::new(i64::MIN),
        })
    }

    pub fn with_token_policy(mut self, policy: TokenPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn group(&self) -> &str {
        &self.group
    }

    pub fn stream(&self) -> &str {
        &self.stream
    }

    pub fn token_policy(&self) -> TokenPolicy {
        self.policy
    }

    /// Appends `buf` as a single event.
    ///
    /// Returns `Ok(0)` on success; callers only look at success or failure.
    /// Service errors, including a rejected sequence token, are returned as is.
    pub async fn write(&self, buf: &[u8]) -> Result<usize> {
        let event = self.event_from(buf);
        debug!(
            "Appending {} byte(s) to {}/{} at {}",
            event.message.len(),
            self.group,
            self.stream,
            millis_to_datetime(event.timestamp)
        );

        match self.policy {
            TokenPolicy::Refetch => {
                let token = self.next_sequence_token().await?;
                self.service
                    .put_log_events(&self.group, &self.stream, vec![event], token)
                    .await?;
            }
            TokenPolicy::Cache => {
                let mut cached = self.cached_token.lock().await;
                let token = match cached.take() {
                    Some(token) => token,
                    None => self.next_sequence_token().await?,
                };
                let next = self
                    .service
                    .put_log_events(&self.group, &self.stream, vec![event], token)
                    .await?;
                *cached = Some(next);
            }
        }

        Ok(0)
    }

    pub async fn write_str(&self, line: &str) -> Result<usize> {
        self.write(line.as_bytes()).await
    }

    /// Nothing to release; the service client belongs to the caller.
    pub async fn close(self) -> Result<()> {
        debug!("Closing writer for {}/{}", self.group, self.stream);
        Ok(())
    }

    fn event_from(&self, buf: &[u8]) -> LogEvent {
        let buf = buf.strip_suffix(b"\n").unwrap_or(buf);
        let buf = buf.strip_suffix(b"\r").unwrap_or(buf);

        let mut message = String::from_utf8_lossy(buf).into_owned();
        if message.len() > CLOUDWATCH_MAX_MESSAGE_SIZE {
            warn!("Message size exceeds max payload size, truncated");
            let mut end = CLOUDWATCH_MAX_MESSAGE_SIZE;
            while !message.is_char_boundary(end) {
                end -= 1;
            }
            message.truncate(end);
        }

        LogEvent {
            message,
            timestamp: self.next_timestamp(),
        }
    }

    // Never goes backwards, even if the wall clock does.
    fn next_timestamp(&self) -> i64 {
        let now = now_millis();
        let previous = self.last_timestamp.fetch_max(now, Ordering::SeqCst);
        previous.max(now)
    }

    async fn next_sequence_token(&self) -> std::result::Result<Option<String>, ServiceError> {
        match self.describe_own_stream(true).await? {
            Some(info) if self.is_own_stream(&info) => Ok(token_of(info)),
            Some(info) => {
                // A longer name sharing the prefix sorts first when descending;
                // ascending, the exact name comes before all of them.
                debug!(
                    "Describe returned {:?} instead of {}, looking up ascending",
                    info.log_stream_name, self.stream
                );
                match self.describe_own_stream(false).await? {
                    Some(info) if self.is_own_stream(&info) => Ok(token_of(info)),
                    _ => Ok(None),
                }
            }
            None => Ok(None),
        }
    }

    async fn describe_own_stream(
        &self,
        descending: bool,
    ) -> std::result::Result<Option<LogStreamInfo>, ServiceError> {
        let streams = self
            .service
            .describe_log_streams(&self.group, &self.stream, descending, 1)
            .await?;
        Ok(streams.into_iter().next())
    }

    fn is_own_stream(&self, info: &LogStreamInfo) -> bool {
        info.log_stream_name.as_deref() == Some(self.stream.as_str())
    }
}

fn token_of(info: LogStreamInfo) -> Option<String> {
    info.upload_sequence_token.filter(|t| !t.is_empty())
}

fn ignore_already_exists(
    result: std::result::Result<(), ServiceError>,
    what: &str,
    name: &str,
) -> std::result::Result<(), ServiceError> {
    match result {
        Ok(()) => {
            info!("Created {} {}", what, name);
            Ok(())
        }
        Err(err) if err.is_already_exists() => {
            debug!("The {} {} already exists", what, name);
            Ok(())
        }
        Err(err) => Err(err),
    }
}
