//! SPF record text parsing.
//!
//! `a` and `mx` mechanisms are expanded while parsing: their addresses are
//! resolved immediately and stored as literal `ip4`/`ip6` entries.

use log::{debug, warn};

use crate::dns::SpfResolver;
use crate::error_handling::SpfError;

use super::record::{Qualifier, Record};

/// Parses SPF record text into a [`Record`].
///
/// `subject_domain` is the domain the record is published at; bare `a` and
/// `mx` mechanisms resolve against it.
///
/// # Errors
///
/// Returns `SpfError::NotAnSpfRecord` if the text does not start with `v=spf1`,
/// or `SpfError::Resolution` if expanding an `a`/`mx` mechanism fails.
/// Unrecognized mechanisms are logged and skipped.
///
/// # Example
///
/// ```
/// use spf_flattener::dns::StaticResolver;
/// use spf_flattener::spf::parse_record;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let resolver = StaticResolver::new();
/// let record = parse_record("v=spf1 ip4:192.0.2.0/24 -all", "example.com", &resolver)
///     .await
///     .unwrap();
/// assert_eq!(record.ip4(), ["192.0.2.0/24"]);
/// # }
/// ```
pub async fn parse_record(
    text: &str,
    subject_domain: &str,
    resolver: &dyn SpfResolver,
) -> Result<Record, SpfError> {
    let text = text.trim();
    if !text.starts_with("v=spf1") {
        return Err(SpfError::NotAnSpfRecord(text.to_string()));
    }

    let mut record = Record::new();
    for part in text.split_whitespace() {
        if let Some(version) = part.strip_prefix("v=") {
            record.set_version(version);
        } else if let Some(addr) = part.strip_prefix("ip4:") {
            record.push_ip4(addr);
        } else if let Some(addr) = part.strip_prefix("ip6:") {
            record.push_ip6(addr);
        } else if let Some(domain) = part.strip_prefix("include:") {
            record.push_include(domain);
        } else if part.ends_with("all") {
            match all_qualifier(part) {
                Some(qualifier) => record.set_qualifier(qualifier),
                None => warn_unrecognized(part),
            }
        } else if let Some(target) = mechanism_target(part, "mx", subject_domain) {
            expand_mx(&mut record, target, resolver).await?;
        } else if let Some(target) = mechanism_target(part, "a", subject_domain) {
            expand_a(&mut record, target, resolver).await?;
        } else {
            warn_unrecognized(part);
        }
    }

    Ok(record)
}

fn warn_unrecognized(part: &str) {
    warn!("{}", SpfError::UnrecognizedMechanism(part.to_string()));
}

/// Qualifier of an `all` token; a bare `all` is an implicit pass.
fn all_qualifier(part: &str) -> Option<Qualifier> {
    if part == "all" {
        return Some(Qualifier::Pass);
    }
    let mut chars = part.chars();
    let qualifier = Qualifier::from_char(chars.next()?)?;
    (chars.as_str() == "all").then_some(qualifier)
}

/// Target domain of an `a`/`mx` style mechanism.
///
/// Accepts `name`, `name/<cidr>` and `name:<domain>[/<cidr>]`; anything else
/// (for instance `aaa`) is not this mechanism.
fn mechanism_target<'a>(part: &'a str, name: &str, subject_domain: &'a str) -> Option<&'a str> {
    let rest = part.strip_prefix(name)?;
    if rest.is_empty() || rest.starts_with('/') {
        return Some(subject_domain);
    }
    let domain = rest.strip_prefix(':')?;
    let domain = domain.split('/').next().unwrap_or_default();
    if domain.is_empty() {
        Some(subject_domain)
    } else {
        Some(domain)
    }
}

async fn expand_mx(
    record: &mut Record,
    domain: &str,
    resolver: &dyn SpfResolver,
) -> Result<(), SpfError> {
    debug!("mx domain: {domain}");
    for host in resolver.query_mx(domain).await? {
        for addr in resolver.query_a(&host).await? {
            record.push_address(addr);
            record.add_lookups(1);
        }
    }
    Ok(())
}

async fn expand_a(
    record: &mut Record,
    domain: &str,
    resolver: &dyn SpfResolver,
) -> Result<(), SpfError> {
    debug!("a domain: {domain}");
    for addr in resolver.query_a(domain).await? {
        record.push_address(addr);
        record.add_lookups(1);
    }
    Ok(())
}
