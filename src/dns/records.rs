//! DNS record queries (TXT, MX, A/AAAA).
//!
//! This module provides functions to query the record types SPF evaluation
//! depends on:
//! - Text records (TXT)
//! - Mail exchanger records (MX)
//! - Host addresses (A/AAAA)

use hickory_resolver::error::ResolveError;
use hickory_resolver::proto::rr::{RData, RecordType};
use hickory_resolver::TokioAsyncResolver;

use crate::error_handling::{LookupKind, SpfError};

/// Whether a resolver error means "the name has no such records".
///
/// Those answers are expected (a domain without MX records, an include target
/// publishing nothing) and map to an empty result rather than a failure.
fn is_no_records(e: &ResolveError) -> bool {
    let error_msg = e.to_string();
    error_msg.contains("no records found") || error_msg.contains("NXDomain")
}

fn lookup_failure(kind: LookupKind, domain: &str, e: ResolveError) -> SpfError {
    let error_msg = e.to_string();
    if error_msg.contains("timeout") || error_msg.contains("timed out") {
        log::warn!("{kind} record lookup timed out for {domain}: {e}");
    } else {
        log::warn!("Failed to lookup {kind} records for {domain}: {e}");
    }
    SpfError::resolution(kind, domain, e)
}

/// Queries TXT (text) records for a domain.
///
/// # Arguments
///
/// * `domain` - The domain to query
/// * `resolver` - The DNS resolver instance
///
/// # Returns
///
/// A vector of TXT record strings (multi-string records joined), or an empty
/// vector if the domain has no TXT records.
///
/// # Errors
///
/// Returns `SpfError::Resolution` on timeouts, network errors and server failures.
pub async fn lookup_txt_records(
    domain: &str,
    resolver: &TokioAsyncResolver,
) -> Result<Vec<String>, SpfError> {
    match resolver.lookup(domain, RecordType::TXT).await {
        Ok(lookup) => {
            let txt_records: Vec<String> = lookup
                .iter()
                .filter_map(|rdata| {
                    if let RData::TXT(txt) = rdata {
                        // TXT records can contain multiple strings - join them
                        Some(
                            txt.iter()
                                .map(|bytes| String::from_utf8_lossy(bytes).to_string())
                                .collect::<Vec<String>>()
                                .join(""),
                        )
                    } else {
                        None
                    }
                })
                .collect();
            Ok(txt_records)
        }
        Err(e) if is_no_records(&e) => Ok(Vec::new()),
        Err(e) => Err(lookup_failure(LookupKind::Txt, domain, e)),
    }
}

/// Queries MX (mail exchanger) records for a domain.
///
/// # Arguments
///
/// * `domain` - The domain to query
/// * `resolver` - The DNS resolver instance
///
/// # Returns
///
/// Exchange host names sorted by priority (lower preference first), without
/// the trailing root dot. Empty if the domain has no MX records.
///
/// # Errors
///
/// Returns `SpfError::Resolution` on timeouts, network errors and server failures.
pub async fn lookup_mx_records(
    domain: &str,
    resolver: &TokioAsyncResolver,
) -> Result<Vec<String>, SpfError> {
    match resolver.lookup(domain, RecordType::MX).await {
        Ok(lookup) => {
            let mut mx_records: Vec<(u16, String)> = lookup
                .iter()
                .filter_map(|rdata| {
                    if let RData::MX(mx) = rdata {
                        Some((mx.preference(), mx.exchange().to_utf8()))
                    } else {
                        None
                    }
                })
                .collect();
            // Sort by priority (lower preference = higher priority)
            mx_records.sort_by_key(|(priority, _)| *priority);
            Ok(mx_records
                .into_iter()
                .map(|(_, host)| host.trim_end_matches('.').to_string())
                .collect())
        }
        Err(e) if is_no_records(&e) => Ok(Vec::new()),
        Err(e) => Err(lookup_failure(LookupKind::Mx, domain, e)),
    }
}

/// Resolves a host name to all of its IPv4 and IPv6 addresses.
///
/// # Arguments
///
/// * `host` - The host name to resolve
/// * `resolver` - The DNS resolver instance
///
/// # Returns
///
/// Address strings in answer order, or an empty vector if the host has none.
///
/// # Errors
///
/// Returns `SpfError::Resolution` on timeouts, network errors and server failures.
pub async fn lookup_ip_addresses(
    host: &str,
    resolver: &TokioAsyncResolver,
) -> Result<Vec<String>, SpfError> {
    match resolver.lookup_ip(host).await {
        Ok(response) => Ok(response.iter().map(|ip| ip.to_string()).collect()),
        Err(e) if is_no_records(&e) => Ok(Vec::new()),
        Err(e) => Err(lookup_failure(LookupKind::A, host, e)),
    }
}
