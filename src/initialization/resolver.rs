//! DNS resolver initialization.
//!
//! This module provides functions to initialize the DNS resolver with proper
//! timeout configuration.

use std::sync::Arc;
use std::time::Duration;

use crate::config::{DNS_ATTEMPTS, DNS_TIMEOUT_SECS};
use crate::dns::HickoryResolver;
use crate::error_handling::InitializationError;
use hickory_resolver::config::{ResolverConfig, ResolverOpts};
use hickory_resolver::TokioAsyncResolver;

/// Initializes the DNS resolver used for SPF lookups.
///
/// Uses the system resolver configuration when it can be read, falling back
/// to hickory's default upstreams otherwise. Timeouts and attempts are kept
/// short so a dead server fails the run quickly instead of hanging it.
///
/// # Returns
///
/// A [`HickoryResolver`] ready to be handed to the parser and flattener.
///
/// # Errors
///
/// Returns `InitializationError::DnsResolverError` if the resolver cannot be
/// constructed.
pub fn init_resolver() -> Result<HickoryResolver, InitializationError> {
    let (config, mut opts) = match hickory_resolver::system_conf::read_system_conf() {
        Ok(system) => system,
        Err(e) => {
            log::debug!("System DNS configuration unavailable ({e}), using defaults");
            (ResolverConfig::default(), ResolverOpts::default())
        }
    };
    if config.name_servers().is_empty() {
        return Err(InitializationError::DnsResolverError(
            "no name servers configured".to_string(),
        ));
    }

    opts.timeout = Duration::from_secs(DNS_TIMEOUT_SECS);
    opts.attempts = DNS_ATTEMPTS;
    // Names in SPF records are absolute; never append search domains
    opts.ndots = 0;

    Ok(HickoryResolver::new(Arc::new(TokioAsyncResolver::tokio(
        config, opts,
    ))))
}
