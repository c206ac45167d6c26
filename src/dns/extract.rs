//! SPF record extraction from TXT answers.

/// Whether a TXT string is an SPF version 1 record.
pub fn is_spf_record(txt: &str) -> bool {
    txt.split_whitespace().next() == Some("v=spf1")
}

/// Extracts SPF record from TXT records.
///
/// SPF records start with "v=spf1".
///
/// # Arguments
///
/// * `txt_records` - Vector of TXT record strings
///
/// # Returns
///
/// The first SPF record found (trimmed), or `None` if no SPF record exists.
/// A domain publishing more than one SPF record is misconfigured; the extra
/// records are reported and ignored.
pub fn extract_spf_record(txt_records: &[String]) -> Option<String> {
    let mut spf_records = txt_records.iter().filter(|txt| is_spf_record(txt));
    let first = spf_records.next()?;
    let extra = spf_records.count();
    if extra > 0 {
        log::warn!(
            "Found {} SPF records, using the first: {}",
            extra + 1,
            first.trim()
        );
    }
    Some(first.trim().to_string())
}
