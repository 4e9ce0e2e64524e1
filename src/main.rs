mod config;

use std::time::SystemTime;

use clap::Parser;
use cloudwatch_writer::models::SendableError;
use cloudwatch_writer::{CloudWatchWriter, QueueSender};
use colored::Colorize;
use config::{message_source, token_policy, AppConfig, Command, MessageSource};
use log::info;
use tokio::io::{AsyncBufReadExt, BufReader};

pub fn setup_logger(level: log::LevelFilter) -> Result<(), SendableError> {
    fern::Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!(
                "[{} {} {}] {}",
                humantime::format_rfc3339_seconds(SystemTime::now()),
                record.level(),
                record.target(),
                message
            ))
        })
        .level(level)
        .chain(std::io::stderr())
        .apply()?;
    Ok(())
}

#[tokio::main]
async fn main() {
    let app_config = AppConfig::parse();

    if let Err(err) = setup_logger(app_config.log_level()) {
        eprintln!("{} {}", "warning:".yellow().bold(), err);
    }

    if let Err(err) = run(app_config.command).await {
        eprintln!("{} {}", "error:".red().bold(), err);
        std::process::exit(1);
    }
}

async fn run(command: Command) -> Result<(), SendableError> {
    match command {
        Command::Write {
            dsn,
            cache_token,
            message,
        } => {
            let source = message_source(&message)?;
            let writer = CloudWatchWriter::from_dsn(&dsn)
                .await?
                .with_token_policy(token_policy(cache_token));
            info!("Writing to {}/{}", writer.group(), writer.stream());

            match source {
                MessageSource::Stdin => {
                    let mut count = 0usize;
                    let mut stdin = BufReader::new(tokio::io::stdin());
                    let mut line = Vec::new();
                    while stdin.read_until(b'\n', &mut line).await? > 0 {
                        if !line.trim_ascii().is_empty() {
                            writer.write(&line).await?;
                            count += 1;
                        }
                        line.clear();
                    }
                    info!("Wrote {} event(s)", count);
                }
                MessageSource::Literal(msg) => {
                    writer.write_str(&msg).await?;
                }
            }
            writer.close().await?;
        }
        Command::Send { dsn, body } => {
            let source = message_source(&body)?;
            let sender = QueueSender::from_dsn(&dsn).await?;
            info!("Sending to {}", sender.queue_url());

            match source {
                MessageSource::Stdin => {
                    let mut lines = BufReader::new(tokio::io::stdin()).lines();
                    while let Some(line) = lines.next_line().await? {
                        if line.trim().is_empty() {
                            continue;
                        }
                        let receipt = sender.send(&line).await?;
                        println!("{}", receipt.message_id.unwrap_or_default());
                    }
                }
                MessageSource::Literal(msg) => {
                    let receipt = sender.send(&msg).await?;
                    println!("{}", receipt.message_id.unwrap_or_default());
                }
            }
        }
    }
    Ok(())
}
