//! spf_flattener library: keeps SPF policies under the 10 DNS lookup limit
//!
//! This library fetches a domain's SPF record, resolves every `include:` into
//! literal `ip4:`/`ip6:` mechanisms and, when the flattened policy still costs
//! more than ten lookups, splits it into content-addressed shard records that a
//! slim top-level record includes.
//!
//! # Example
//!
//! ```no_run
//! use spf_flattener::{run_flatten, Config};
//! use std::path::PathBuf;
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Config {
//!     domain: "example.com".to_string(),
//!     spf_file: PathBuf::from("example.com.zone"),
//!     ..Default::default()
//! };
//!
//! let outcome = run_flatten(config).await?;
//! println!("{} shard(s) written", outcome.report.shards.len());
//! # Ok(())
//! # }
//! ```
//!
//! The core pipeline can also be driven directly with any [`dns::SpfResolver`]:
//!
//! ```
//! use spf_flattener::dns::StaticResolver;
//! use spf_flattener::report::build_report;
//! use spf_flattener::spf::{parse_record, Flattener};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let resolver = StaticResolver::new();
//! let record = parse_record("v=spf1 ip4:1.2.3.4 -all", "example.com", &resolver)
//!     .await
//!     .unwrap();
//! let report = build_report(&record, "example.com", "_spf", &Flattener::new(&resolver))
//!     .await
//!     .unwrap();
//! assert_eq!(report.top.txt(), "v=spf1 ip4:1.2.3.4 -all");
//! # }
//! ```
//!
//! # Requirements
//!
//! This library requires a Tokio runtime. Use `#[tokio::main]` in your application
//! or ensure you're calling library functions within an async context.

#![warn(missing_docs)]

pub mod config;
pub mod dns;
pub mod error_handling;
pub mod export;
pub mod initialization;
pub mod report;
pub mod spf;

// Re-export public API
pub use config::{Config, LogFormat, LogLevel, Opt};
pub use error_handling::SpfError;
pub use run::{run_flatten, run_flatten_with, FlattenOutcome};

// Internal run module (fetch, back up, flatten, export)
mod run {
    use anyhow::{Context, Result};
    use log::info;
    use std::path::PathBuf;

    use crate::config::Config;
    use crate::dns::{extract_spf_record, SpfResolver};
    use crate::error_handling::SpfError;
    use crate::export::{export_records, write_backup};
    use crate::initialization::init_resolver;
    use crate::report::{build_report, SpfReport};
    use crate::spf::{parse_record, Flattener};

    /// Result of a flattening run.
    #[derive(Debug, Clone)]
    pub struct FlattenOutcome {
        /// The SPF record as fetched, before any processing
        pub original: String,
        /// Records to publish
        pub report: SpfReport,
        /// File the records were written to
        pub output_path: PathBuf,
        /// File the original record was backed up to
        pub backup_path: PathBuf,
    }

    /// Flattens the configured domain's SPF record using the system DNS resolver.
    ///
    /// # Errors
    ///
    /// This function will return an error if:
    /// - The DNS resolver cannot be initialized
    /// - The record cannot be fetched, or the domain publishes no SPF record
    /// - Parsing, flattening or splitting fails
    /// - The output or backup file cannot be written
    pub async fn run_flatten(config: Config) -> Result<FlattenOutcome> {
        let resolver = init_resolver().context("Failed to initialize DNS resolver")?;
        run_flatten_with(config, &resolver).await
    }

    /// Same as [`run_flatten`], with a caller-supplied resolver.
    ///
    /// # Errors
    ///
    /// See [`run_flatten`].
    pub async fn run_flatten_with(
        config: Config,
        resolver: &dyn SpfResolver,
    ) -> Result<FlattenOutcome> {
        let original = match &config.record_file {
            Some(path) => {
                let text = tokio::fs::read_to_string(path)
                    .await
                    .with_context(|| format!("Failed to read record file: {}", path.display()))?;
                text.trim().to_string()
            }
            None => fetch_spf_record(&config.domain, resolver)
                .await
                .with_context(|| format!("Failed to fetch SPF record for {}", config.domain))?,
        };
        info!("Record: {original}");

        let backup_path = config.backup_path();
        write_backup(&original, &backup_path).await?;

        let record = parse_record(&original, &config.domain, resolver)
            .await
            .context("Failed to parse SPF record")?;

        let flattener = Flattener::new(resolver).with_max_concurrency(config.max_concurrency);
        let report = build_report(&record, &config.domain, &config.spf_prefix, &flattener)
            .await
            .with_context(|| format!("Failed to flatten SPF record for {}", config.domain))?;

        export_records(&report, &config.spf_file).await?;

        Ok(FlattenOutcome {
            original,
            report,
            output_path: config.spf_file.clone(),
            backup_path,
        })
    }

    async fn fetch_spf_record(
        domain: &str,
        resolver: &dyn SpfResolver,
    ) -> Result<String, SpfError> {
        let txt_records = resolver.query_txt(domain).await?;
        extract_spf_record(&txt_records).ok_or_else(|| SpfError::NoSpfRecord(domain.to_string()))
    }
}
