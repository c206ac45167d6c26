//! Error type definitions.
//!
//! This module defines all error types used throughout the application.

use log::SetLoggerError;
use strum_macros::{Display as DisplayMacro, EnumIter as EnumIterMacro};
use thiserror::Error;

/// Error types for initialization failures.
#[derive(Error, Debug)]
#[allow(clippy::enum_variant_names)] // All variants end with "Error" by convention
pub enum InitializationError {
    /// Error initializing the logger.
    #[error("Logger initialization error: {0}")]
    LoggerError(#[from] SetLoggerError),

    /// Error initializing the DNS resolver.
    #[error("DNS resolver initialization error: {0}")]
    DnsResolverError(String),
}

/// DNS record type queried by a resolver call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, DisplayMacro, EnumIterMacro)]
pub enum LookupKind {
    /// TXT query (SPF record text)
    #[strum(serialize = "TXT")]
    Txt,
    /// MX query (mail exchanger host names)
    #[strum(serialize = "MX")]
    Mx,
    /// A/AAAA query (host addresses)
    #[strum(serialize = "A")]
    A,
}

/// Errors produced while parsing, flattening, splitting or reporting SPF records.
///
/// Every variant except [`SpfError::UnrecognizedMechanism`] is returned to the
/// caller; unrecognized mechanisms are logged and parsing continues.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SpfError {
    /// The text does not start with `v=spf1`.
    #[error("not a valid SPF record: {0}")]
    NotAnSpfRecord(String),

    /// The domain publishes no `v=spf1` TXT record.
    #[error("no SPF record found for {0}")]
    NoSpfRecord(String),

    /// A DNS query failed.
    #[error("{kind} lookup failed for {name}: {message}")]
    Resolution {
        /// Record type that was queried
        kind: LookupKind,
        /// Name that was queried
        name: String,
        /// Resolver error text
        message: String,
    },

    /// Splitting was attempted before all includes were flattened.
    #[error("record cannot have includes when splitting ({0} unresolved)")]
    HasIncludes(usize),

    /// An include chain revisits a domain already on the active path.
    #[error("include cycle detected at {domain}: {}", path.join(" -> "))]
    CycleDetected {
        /// Domain that closed the cycle
        domain: String,
        /// Include path from the subject domain up to (not including) `domain`
        path: Vec<String>,
    },

    /// The include chain is deeper than the configured bound.
    #[error("include chain deeper than {0} levels")]
    IncludeDepthExceeded(usize),

    /// A token matched none of the known mechanism forms.
    #[error("unrecognised SPF part: {0}")]
    UnrecognizedMechanism(String),
}

impl SpfError {
    /// Builds a [`SpfError::Resolution`] from any displayable resolver error.
    pub fn resolution(kind: LookupKind, name: &str, err: impl std::fmt::Display) -> Self {
        SpfError::Resolution {
            kind,
            name: name.to_string(),
            message: err.to_string(),
        }
    }
}
