//! DNS resolution and record querying.
//!
//! This module provides async DNS operations using `hickory-resolver`:
//! - Text record queries (TXT records) with SPF extraction
//! - Mail exchanger queries (MX records)
//! - Address resolution (A/AAAA records)
//!
//! The SPF core consumes these through the [`SpfResolver`] trait so it can be
//! driven by [`StaticResolver`] in tests.

mod extract;
mod records;
mod resolver;

// Re-export public API
pub use extract::{extract_spf_record, is_spf_record};
pub use records::{lookup_ip_addresses, lookup_mx_records, lookup_txt_records};
pub use resolver::{normalize_name, HickoryResolver, SpfResolver, StaticResolver};
