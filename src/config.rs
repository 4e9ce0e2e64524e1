use clap::{Parser, Subcommand};
use cloudwatch_writer::TokenPolicy;

pub const DSN_ENV: &str = "CLOUDWATCH_WRITER_DSN";

#[derive(Parser, Debug)]
#[command(
    name = "cloudwatch-writer",
    version,
    about = "Append messages to a CloudWatch Logs stream or send them to an SQS queue."
)]
pub struct AppConfig {
    /// -v for info, -vv for debug output on stderr
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Write one log event, or one per stdin line when the message is "-"
    Write {
        /// e.g. region=us-east-1;credentials=default;group=app-logs[;stream=name]
        #[arg(long, env = DSN_ENV)]
        dsn: String,

        /// Reuse the sequence token from each append instead of describing the stream
        #[arg(long)]
        cache_token: bool,

        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        message: Vec<String>,
    },
    /// Send one SQS message, or one per stdin line when the body is "-"
    Send {
        /// e.g. region=us-east-1;credentials=default;queue=jobs
        #[arg(long, env = DSN_ENV)]
        dsn: String,

        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        body: Vec<String>,
    },
}

#[derive(Debug, PartialEq, Eq)]
pub enum MessageSource {
    Stdin,
    Literal(String),
}

impl AppConfig {
    pub fn log_level(&self) -> log::LevelFilter {
        match self.verbose {
            0 => log::LevelFilter::Warn,
            1 => log::LevelFilter::Info,
            _ => log::LevelFilter::Debug,
        }
    }
}

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
#[error("no message given, pass the text or \"-\" to read lines from stdin")]
pub struct EmptyMessage;

/// The service rejects empty events, so a blank literal is refused up front.
pub fn message_source(args: &[String]) -> Result<MessageSource, EmptyMessage> {
    match args.first().map(String::as_str) {
        Some("-") => Ok(MessageSource::Stdin),
        _ => {
            let message = args.join(" ");
            if message.trim().is_empty() {
                Err(EmptyMessage)
            } else {
                Ok(MessageSource::Literal(message))
            }
        }
    }
}

pub fn token_policy(cache_token: bool) -> TokenPolicy {
    if cache_token {
        TokenPolicy::Cache
    } else {
        TokenPolicy::Refetch
    }
}
