use std::error::Error as StdError;
use std::fmt::Debug;

use aws_sdk_cloudwatchlogs::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};

pub type Result<T> = std::result::Result<T, Error>;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Service(#[from] ServiceError),
}

impl Error {
    /// Service error kind, `None` for configuration errors.
    pub fn kind(&self) -> Option<ErrorKind> {
        match self {
            Error::Config(_) => None,
            Error::Service(err) => Some(err.kind),
        }
    }

    pub fn is_config(&self) -> bool {
        matches!(self, Error::Config(_))
    }
}

/// Problems detected locally, before any request is sent.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("malformed descriptor segment '{0}', expected key=value")]
    Malformed(String),
    #[error("descriptor key '{0}' given more than once")]
    DuplicateKey(String),
    #[error("descriptor is missing required key(s): {}", .0.join(", "))]
    MissingKeys(Vec<String>),
    #[error("unknown AWS region '{0}'")]
    UnknownRegion(String),
    #[error("invalid credentials reference '{0}'")]
    InvalidCredentials(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    AlreadyExists,
    Throttled,
    Unauthorized,
    NotFound,
    InvalidSequenceToken,
    Transport,
    Other,
}

impl ErrorKind {
    /// Maps a CloudWatch Logs or SQS error code onto a kind.
    pub fn from_code(code: Option<&str>) -> ErrorKind {
        match code {
            Some("ResourceAlreadyExistsException")
            | Some("QueueAlreadyExists")
            | Some("QueueNameExists") => ErrorKind::AlreadyExists,
            Some("ThrottlingException")
            | Some("Throttling")
            | Some("RequestThrottled")
            | Some("RequestLimitExceeded") => ErrorKind::Throttled,
            Some("AccessDeniedException")
            | Some("AccessDenied")
            | Some("UnrecognizedClientException")
            | Some("InvalidClientTokenId")
            | Some("ExpiredTokenException")
            | Some("SignatureDoesNotMatch") => ErrorKind::Unauthorized,
            Some("ResourceNotFoundException")
            | Some("QueueDoesNotExist")
            | Some("AWS.SimpleQueueService.NonExistentQueue") => ErrorKind::NotFound,
            Some("InvalidSequenceTokenException") => ErrorKind::InvalidSequenceToken,
            _ => ErrorKind::Other,
        }
    }
}

/// An error reported by (or on the way to) a remote service, passed through
/// to the caller unchanged apart from the attached kind.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct ServiceError {
    pub kind: ErrorKind,
    pub code: Option<String>,
    pub message: String,
}

impl ServiceError {
    pub fn new(kind: ErrorKind, code: Option<String>, message: impl Into<String>) -> Self {
        Self {
            kind,
            code,
            message: message.into(),
        }
    }

    pub fn is_already_exists(&self) -> bool {
        self.kind == ErrorKind::AlreadyExists
    }
}

// Both SDKs share the smithy runtime error types, so one conversion covers
// every operation of either client.
impl<E, R> From<SdkError<E, R>> for ServiceError
where
    E: ProvideErrorMetadata + StdError + Send + Sync + 'static,
    R: Debug + Send + Sync + 'static,
{
    fn from(err: SdkError<E, R>) -> Self {
        let code = err.code().map(str::to_owned);
        let kind = match &err {
            SdkError::DispatchFailure(_) | SdkError::TimeoutError(_) => ErrorKind::Transport,
            _ => ErrorKind::from_code(code.as_deref()),
        };
        let message = DisplayErrorContext(&err).to_string();
        ServiceError {
            kind,
            code,
            message,
        }
    }
}
