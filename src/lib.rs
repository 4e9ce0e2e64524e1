//! Append lines to a CloudWatch Logs stream and send messages to SQS, with
//! both targets described by a single `key=value` connection string.
//!
//! ```no_run
//! use cloudwatch_writer::CloudWatchWriter;
//!
//! # async fn example() -> cloudwatch_writer::Result<()> {
//! let writer = CloudWatchWriter::from_dsn("region=us-east-1;credentials=default;group=app-logs").await?;
//! writer.write(b"hello").await?;
//! writer.write(b"world").await?;
//! writer.close().await?;
//! # Ok(())
//! # }
//! ```

#[macro_use]
extern crate lazy_static;

pub mod aws;
pub mod descriptor;
pub mod error;
pub mod logs;
pub mod models;
pub mod queue;
pub mod utilities;
pub mod writer;

#[cfg(test)]
mod test_utils;

pub use aws::{CredentialsSource, Session};
pub use descriptor::Descriptor;
pub use error::{ConfigError, Error, ErrorKind, Result, ServiceError};
pub use logs::LogService;
pub use models::{LogEvent, LogStreamInfo, SendReceipt};
pub use queue::{send_message_with_dsn, QueueSender, QueueService};
pub use writer::{CloudWatchWriter, TokenPolicy};
