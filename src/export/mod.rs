//! Output files for flattened SPF records.
//!
//! Two files are produced per run:
//! - the record file, one `TXT\t <fqdn>\t <text>` line per record to publish
//! - a backup holding the raw record exactly as it was fetched, for rollback

use std::path::Path;

use anyhow::{Context, Result};

use crate::report::SpfReport;

/// Renders the report as zone-style lines, top-level record first.
///
/// Every line has the form `TXT\t <fqdn>\t <text>\n`.
pub fn format_records(report: &SpfReport) -> String {
    report
        .records()
        .map(|record| format!("TXT\t {}\t {}\n", report.fqdn(record), record.txt()))
        .collect()
}

/// Writes the report's records to `path`, replacing any existing file.
///
/// # Errors
///
/// Returns an error if the file cannot be created or written.
pub async fn export_records(report: &SpfReport, path: &Path) -> Result<()> {
    tokio::fs::write(path, format_records(report))
        .await
        .with_context(|| format!("Failed to write output file: {}", path.display()))?;
    log::info!(
        "Wrote {} record(s) to {}",
        report.shards.len() + 1,
        path.display()
    );
    Ok(())
}

/// Writes the raw, unprocessed SPF record to `path`.
///
/// # Errors
///
/// Returns an error if the file cannot be created or written.
pub async fn write_backup(raw_record: &str, path: &Path) -> Result<()> {
    tokio::fs::write(path, raw_record)
        .await
        .with_context(|| format!("Failed to write backup file: {}", path.display()))?;
    log::debug!("Backed up original record to {}", path.display());
    Ok(())
}
