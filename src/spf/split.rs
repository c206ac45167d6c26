//! Size-bounded partitioning of flattened records.

use crate::config::MAX_ENTRIES;
use crate::error_handling::SpfError;

use super::record::Record;

/// Splits a flattened record into shards of at most [`MAX_ENTRIES`] address
/// entries each.
///
/// Shards are filled greedily, IPv4 entries first, and each carries the
/// record's qualifier so it reads as a complete policy on its own. A record
/// that already fits (including an empty one) comes back as a single copy.
///
/// # Errors
///
/// Returns `SpfError::HasIncludes` if the record still has includes; flatten
/// it first.
pub fn split(record: &Record) -> Result<Vec<Record>, SpfError> {
    if !record.includes().is_empty() {
        return Err(SpfError::HasIncludes(record.includes().len()));
    }

    let shard_count = record.entry_count().div_ceil(MAX_ENTRIES);
    if shard_count <= 1 {
        return Ok(vec![record.clone()]);
    }

    let mut ip4 = record.ip4().iter();
    let mut ip6 = record.ip6().iter();
    let mut shards = Vec::with_capacity(shard_count);
    for _ in 0..shard_count {
        let mut shard = Record::new();
        shard.set_version(record.version());
        shard.set_qualifier(record.qualifier());

        let mut space = MAX_ENTRIES;
        for addr in ip4.by_ref().take(space) {
            shard.push_ip4(addr.as_str());
            space -= 1;
        }
        for addr in ip6.by_ref().take(space) {
            shard.push_ip6(addr.as_str());
        }
        shards.push(shard);
    }
    Ok(shards)
}
