//! Configuration types and CLI options.
//!
//! This module defines enums and structs used for command-line argument parsing
//! and configuration.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

use crate::config::constants::{BACKUP_SUFFIX, DEFAULT_MAX_CONCURRENCY, DEFAULT_SPF_PREFIX};

/// Logging level for the application.
///
/// Controls the verbosity of log output, from most restrictive (Error) to most
/// verbose (Trace).
#[derive(Clone, Debug, ValueEnum)]
pub enum LogLevel {
    /// Only error messages
    Error,
    /// Error and warning messages
    Warn,
    /// Error, warning, and informational messages
    Info,
    /// All messages except trace
    Debug,
    /// All messages including trace
    Trace,
}

impl From<LogLevel> for log::LevelFilter {
    fn from(l: LogLevel) -> Self {
        match l {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

/// Log output format.
///
/// Controls how log messages are formatted:
/// - `Plain`: Human-readable format with colors (default)
/// - `Json`: Structured JSON format for machine parsing
#[derive(Clone, Debug, ValueEnum)]
pub enum LogFormat {
    /// Human-readable format with colors (default)
    Plain,
    /// Structured JSON format for machine parsing
    Json,
}

/// Command-line options.
///
/// This struct is automatically generated by `clap` from the field attributes.
///
/// # Examples
///
/// ```bash
/// # Flatten the published record of example.com
/// spf_flattener example.com -o example.com.zone
///
/// # Custom shard prefix, record read from a file instead of DNS
/// spf_flattener example.com -o out.zone -p _s -r current_spf.txt
/// ```
#[derive(Debug, Parser)]
#[command(
    name = "spf_flattener",
    about = "Flattens a domain's SPF record so it stays under the 10 DNS lookup limit."
)]
pub struct Opt {
    /// Domain whose SPF record is flattened
    pub domain: String,

    /// File to write the resulting TXT records to (required)
    #[arg(short = 'o', long = "spf-file", value_parser)]
    pub spf_file: PathBuf,

    /// Prefix for subdomains when multiple records are needed
    #[arg(short = 'p', long = "spf-prefix", default_value = DEFAULT_SPF_PREFIX)]
    pub spf_prefix: String,

    /// Read the SPF record from this file instead of looking it up in DNS
    #[arg(short = 'r', long = "record-file", value_parser)]
    pub record_file: Option<PathBuf>,

    /// Maximum number of sibling includes resolved concurrently
    #[arg(long, default_value_t = DEFAULT_MAX_CONCURRENCY)]
    pub max_concurrency: usize,

    /// Log level: error|warn|info|debug|trace
    #[arg(long, value_enum, default_value_t = LogLevel::Info)]
    pub log_level: LogLevel,

    /// Log format: plain|json
    #[arg(long, value_enum, default_value_t = LogFormat::Plain)]
    pub log_format: LogFormat,
}

/// Library configuration (no CLI dependencies).
///
/// This is the core configuration struct used by the library. It can be
/// constructed programmatically without going through `clap`.
///
/// # Examples
///
/// ```no_run
/// use spf_flattener::Config;
/// use std::path::PathBuf;
///
/// let config = Config {
///     domain: "example.com".to_string(),
///     spf_file: PathBuf::from("example.com.zone"),
///     ..Default::default()
/// };
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    /// Domain whose SPF record is flattened
    pub domain: String,

    /// Output file for the resulting TXT records
    pub spf_file: PathBuf,

    /// Label prefix for generated shard subdomains
    pub spf_prefix: String,

    /// Optional file holding the SPF record (skips the DNS lookup)
    pub record_file: Option<PathBuf>,

    /// Maximum number of sibling includes resolved concurrently
    pub max_concurrency: usize,

    /// Log level
    pub log_level: LogLevel,

    /// Log format
    pub log_format: LogFormat,
}

impl Config {
    /// Path of the backup file holding the raw, unprocessed record.
    pub fn backup_path(&self) -> PathBuf {
        let mut path = self.spf_file.clone().into_os_string();
        path.push(BACKUP_SUFFIX);
        PathBuf::from(path)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            domain: String::new(),
            spf_file: PathBuf::from("spf.zone"),
            spf_prefix: DEFAULT_SPF_PREFIX.to_string(),
            record_file: None,
            max_concurrency: DEFAULT_MAX_CONCURRENCY,
            log_level: LogLevel::Info,
            log_format: LogFormat::Plain,
        }
    }
}

impl From<Opt> for Config {
    fn from(opt: Opt) -> Self {
        Self {
            domain: opt.domain,
            spf_file: opt.spf_file,
            spf_prefix: opt.spf_prefix,
            record_file: opt.record_file,
            max_concurrency: opt.max_concurrency.max(1),
            log_level: opt.log_level,
            log_format: opt.log_format,
        }
    }
}
