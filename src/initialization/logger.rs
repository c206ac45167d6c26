//! Logger initialization.
//!
//! This module provides functions to initialize the logger with custom formatting.

use std::io::Write;

use crate::config::LogFormat;
use crate::error_handling::InitializationError;
use colored::*;
use log::LevelFilter;

/// Initializes the logger with the specified level and format.
///
/// Configures `env_logger` with custom formatting. Supports both plain text
/// (with colors and glyphs) and JSON formats for structured logging. Log lines
/// go to stderr, leaving stdout for the generated records.
///
/// The logger reads from the `RUST_LOG` environment variable by default, but
/// the provided `level` parameter will override it.
///
/// # Arguments
///
/// * `level` - Minimum log level to display (overrides `RUST_LOG` if set)
/// * `format` - Log format (Plain or Json)
///
/// # Errors
///
/// Returns `InitializationError::LoggerError` if a logger is already installed.
///
/// # Examples
///
/// ```bash
/// # Show every include as it is resolved
/// spf_flattener example.com -o out.zone --log-level debug
///
/// # Per-module filtering via RUST_LOG
/// RUST_LOG=spf_flattener=debug,hickory_resolver=info spf_flattener example.com -o out.zone
/// ```
pub fn init_logger_with(level: LevelFilter, format: LogFormat) -> Result<(), InitializationError> {
    // Read from RUST_LOG environment variable first, then override with CLI arg
    let mut builder = env_logger::Builder::from_default_env();

    builder.filter_level(level);
    // hickory logs truncated/malformed UDP answers at warn; it retries on its own
    builder.filter_module("hickory_proto", LevelFilter::Error);
    builder.filter_module("hickory_resolver", LevelFilter::Warn);
    builder.filter_module("spf_flattener", level);

    match format {
        LogFormat::Json => {
            builder.format(|buf, record| {
                writeln!(
                    buf,
                    "{}",
                    json_line(
                        chrono::Utc::now().timestamp_millis(),
                        record.level(),
                        record.target(),
                        &record.args().to_string(),
                    )
                )
            });
        }
        LogFormat::Plain => {
            builder.format(|buf, record| {
                let level = record.level();
                let colored_level = match level {
                    log::Level::Error => level.to_string().red(),
                    log::Level::Warn => level.to_string().yellow(),
                    log::Level::Info => level.to_string().green(),
                    log::Level::Debug => level.to_string().blue(),
                    log::Level::Trace => level.to_string().purple(),
                };

                let glyph = match level {
                    log::Level::Error => "✗",
                    log::Level::Warn => "!",
                    log::Level::Info => "✓",
                    log::Level::Debug => "·",
                    log::Level::Trace => "…",
                };

                writeln!(
                    buf,
                    "{} {} [{}] {}",
                    glyph,
                    record.target().cyan(),
                    colored_level,
                    record.args()
                )
            });
        }
    }

    // try_init() so tests can call this more than once
    builder.try_init().map_err(InitializationError::from)?;

    Ok(())
}

/// One JSON log line (without the trailing newline).
fn json_line(timestamp_millis: i64, level: log::Level, target: &str, message: &str) -> String {
    serde_json::json!({
        "ts": timestamp_millis,
        "level": level.to_string(),
        "target": target,
        "msg": message,
    })
    .to_string()
}
