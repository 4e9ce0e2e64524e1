//! In-memory stand-ins for CloudWatch Logs and SQS that follow the same
//! contracts as the real services.

use std::collections::BTreeMap;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::{ErrorKind, ServiceError};
use crate::logs::LogService;
use crate::models::{LogEvent, LogStreamInfo, SendReceipt};
use crate::queue::QueueService;

fn service_error(kind: ErrorKind, code: &str, message: impl Into<String>) -> ServiceError {
    ServiceError::new(kind, Some(code.to_string()), message)
}

#[derive(Default)]
struct FakeStream {
    events: Vec<LogEvent>,
    token: Option<String>,
}

impl FakeStream {
    fn append(&mut self, event: LogEvent) -> String {
        self.events.push(event);
        let token = format!("{:056}", self.events.len() * 7919);
        self.token = Some(token.clone());
        token
    }
}

#[derive(Default)]
struct FakeLogState {
    groups: BTreeMap<String, BTreeMap<String, FakeStream>>,
    calls: Vec<String>,
    put_tokens: Vec<Option<String>>,
}

#[derive(Default)]
pub struct FakeLogService {
    state: Mutex<FakeLogState>,
    unauthorized: bool,
}

impl FakeLogService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every call fails as if the credentials were rejected.
    pub fn unauthorized(mut self) -> Self {
        self.unauthorized = true;
        self
    }

    /// Creates the group and stream if needed and appends `events` events.
    pub fn seed_stream(&self, group: &str, stream: &str, events: usize) {
        let mut state = self.state.lock().unwrap();
        let stream = state
            .groups
            .entry(group.to_string())
            .or_default()
            .entry(stream.to_string())
            .or_default();
        for i in 0..events {
            stream.append(LogEvent {
                message: format!("seed {}", i),
                timestamp: 1_600_000_000_000 + i as i64,
            });
        }
    }

    pub fn current_token(&self, group: &str, stream: &str) -> Option<String> {
        let state = self.state.lock().unwrap();
        state.groups[group][stream].token.clone()
    }

    pub fn events(&self, group: &str, stream: &str) -> Vec<LogEvent> {
        let state = self.state.lock().unwrap();
        state.groups[group][stream].events.clone()
    }

    pub fn messages(&self, group: &str, stream: &str) -> Vec<String> {
        self.events(group, stream)
            .into_iter()
            .map(|e| e.message)
            .collect()
    }

    pub fn calls(&self) -> Vec<String> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn count_calls(&self, operation: &str) -> usize {
        self.calls().iter().filter(|c| *c == operation).count()
    }

    /// Sequence tokens passed to each PutLogEvents call, in order.
    pub fn put_tokens(&self) -> Vec<Option<String>> {
        self.state.lock().unwrap().put_tokens.clone()
    }

    fn check_auth(&self) -> Result<(), ServiceError> {
        if self.unauthorized {
            return Err(service_error(
                ErrorKind::Unauthorized,
                "UnrecognizedClientException",
                "The security token included in the request is invalid.",
            ));
        }
        Ok(())
    }
}

#[async_trait]
impl LogService for FakeLogService {
    async fn create_log_group(&self, group: &str) -> Result<(), ServiceError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push("CreateLogGroup".to_string());
        self.check_auth()?;

        if state.groups.contains_key(group) {
            return Err(service_error(
                ErrorKind::AlreadyExists,
                "ResourceAlreadyExistsException",
                "The specified log group already exists",
            ));
        }
        state.groups.insert(group.to_string(), BTreeMap::new());
        Ok(())
    }

    async fn create_log_stream(&self, group: &str, stream: &str) -> Result<(), ServiceError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push("CreateLogStream".to_string());
        self.check_auth()?;

        let streams = state.groups.get_mut(group).ok_or_else(|| {
            service_error(
                ErrorKind::NotFound,
                "ResourceNotFoundException",
                "The specified log group does not exist.",
            )
        })?;
        if streams.contains_key(stream) {
            return Err(service_error(
                ErrorKind::AlreadyExists,
                "ResourceAlreadyExistsException",
                "The specified log stream already exists",
            ));
        }
        streams.insert(stream.to_string(), FakeStream::default());
        Ok(())
    }

    async fn describe_log_streams(
        &self,
        group: &str,
        stream_prefix: &str,
        descending: bool,
        limit: i32,
    ) -> Result<Vec<LogStreamInfo>, ServiceError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push("DescribeLogStreams".to_string());
        self.check_auth()?;

        let streams = state.groups.get(group).ok_or_else(|| {
            service_error(
                ErrorKind::NotFound,
                "ResourceNotFoundException",
                "The specified log group does not exist.",
            )
        })?;
        let matching = streams
            .iter()
            .filter(|(name, _)| name.starts_with(stream_prefix))
            .map(|(name, s)| LogStreamInfo {
                log_stream_name: Some(name.clone()),
                upload_sequence_token: s.token.clone(),
            });
        let limit = limit.max(0) as usize;
        Ok(if descending {
            matching.rev().take(limit).collect()
        } else {
            matching.take(limit).collect()
        })
    }

    async fn put_log_events(
        &self,
        group: &str,
        stream: &str,
        events: Vec<LogEvent>,
        sequence_token: Option<String>,
    ) -> Result<Option<String>, ServiceError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push("PutLogEvents".to_string());
        state.put_tokens.push(sequence_token.clone());
        self.check_auth()?;

        let target = state
            .groups
            .get_mut(group)
            .and_then(|streams| streams.get_mut(stream))
            .ok_or_else(|| {
                service_error(
                    ErrorKind::NotFound,
                    "ResourceNotFoundException",
                    "The specified log stream does not exist.",
                )
            })?;

        if target.token != sequence_token {
            return Err(service_error(
                ErrorKind::InvalidSequenceToken,
                "InvalidSequenceTokenException",
                format!(
                    "The given sequenceToken is invalid. The next expected sequenceToken is: {}",
                    target.token.as_deref().unwrap_or("null")
                ),
            ));
        }

        let mut next = None;
        for event in events {
            next = Some(target.append(event));
        }
        Ok(next)
    }
}

#[derive(Default)]
struct FakeQueueState {
    queues: BTreeMap<String, String>,
    calls: Vec<String>,
    sent: Vec<(String, String)>,
}

#[derive(Default)]
pub struct FakeQueueService {
    state: Mutex<FakeQueueState>,
}

impl FakeQueueService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_queue(self, name: &str) -> Self {
        let url = format!("https://sqs.us-east-1.amazonaws.com/123456789012/{}", name);
        self.state
            .lock()
            .unwrap()
            .queues
            .insert(name.to_string(), url);
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.state.lock().unwrap().calls.clone()
    }

    /// (queue url, body) for every accepted message.
    pub fn sent(&self) -> Vec<(String, String)> {
        self.state.lock().unwrap().sent.clone()
    }
}

#[async_trait]
impl QueueService for FakeQueueService {
    async fn get_queue_url(&self, queue_name: &str) -> Result<String, ServiceError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push("GetQueueUrl".to_string());
        state.queues.get(queue_name).cloned().ok_or_else(|| {
            service_error(
                ErrorKind::NotFound,
                "AWS.SimpleQueueService.NonExistentQueue",
                "The specified queue does not exist.",
            )
        })
    }

    async fn send_message(&self, queue_url: &str, body: &str) -> Result<SendReceipt, ServiceError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push("SendMessage".to_string());
        state.sent.push((queue_url.to_string(), body.to_string()));
        Ok(SendReceipt {
            message_id: Some(format!("msg-{}", state.sent.len())),
            md5_of_body: None,
        })
    }
}
