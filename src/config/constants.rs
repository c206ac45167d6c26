//! Configuration constants.
//!
//! This module defines the protocol limits and operational parameters used
//! throughout the application.

/// Maximum number of DNS lookups an SPF evaluator may perform per check.
///
/// A flattened policy whose lookup count is at or below this ceiling is left
/// untouched; above it, the policy is split into shard records.
pub const MAX_DNS_LOOKUPS: usize = 10;

/// Maximum number of `ip4:`/`ip6:` entries placed in one shard record.
///
/// A TXT response should never exceed 512 bytes, including the domain name and
/// any other records in the same answer. A worst-case entry looks like
/// `ip6:1234:1234:1234::12/64` (about 23 octets with its separator), so keeping
/// a record under 450 octets gives `450 >= 7 + 23 * entries + 4`, i.e. 19.
pub const MAX_ENTRIES: usize = 19;

/// Maximum depth of nested `include:` chains followed while flattening.
pub const MAX_INCLUDE_DEPTH: usize = 32;

/// Default label prefix for generated shard subdomains.
pub const DEFAULT_SPF_PREFIX: &str = "_spf";

/// Suffix appended to the output path for the raw record backup.
pub const BACKUP_SUFFIX: &str = ".backup";

/// Number of hash bytes used for a shard label (6 hex characters).
pub const LABEL_HASH_BYTES: usize = 3;

// Network operation timeouts
/// DNS query timeout in seconds
/// SPF providers answer quickly; 3s fails fast on dead servers without
/// flapping on slow ones.
pub const DNS_TIMEOUT_SECS: u64 = 3;
/// Attempts per DNS query (including the first)
pub const DNS_ATTEMPTS: usize = 2;

/// Default number of sibling includes resolved concurrently (1 = sequential).
pub const DEFAULT_MAX_CONCURRENCY: usize = 1;
