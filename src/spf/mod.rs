//! SPF record model and the flatten/split pipeline.
//!
//! - [`Record`] / [`Qualifier`]: the policy value type and merge rules
//! - [`parse_record`]: TXT text to [`Record`], expanding `a`/`mx` eagerly
//! - [`Flattener`]: recursive `include:` resolution with lookup accounting
//! - [`split`]: partitioning into shards of at most `MAX_ENTRIES` entries

mod flatten;
mod parse;
mod record;
mod split;

// Re-export public API
pub use flatten::Flattener;
pub use parse::parse_record;
pub use record::{is_ipv6, Qualifier, Record};
pub use split::split;
