// Shared test helpers for building fake DNS data and records.
//
// This module provides common utilities used across multiple test files to reduce duplication.

use spf_flattener::dns::StaticResolver;
use spf_flattener::spf::{parse_record, Record};

/// Registers `count` include targets `_spf<i>.<vendor>`, each publishing a
/// single `ip4:` address and `-all`, and returns the resolver plus the
/// top-level record text that includes all of them.
#[allow(dead_code)] // Used by other test files
pub fn single_address_includes(
    resolver: StaticResolver,
    vendor: &str,
    count: usize,
) -> (StaticResolver, String) {
    let mut resolver = resolver;
    let mut text = String::from("v=spf1");
    for i in 0..count {
        let domain = format!("_spf{i}.{vendor}");
        resolver = resolver.with_txt(&domain, [format!("v=spf1 ip4:192.0.2.{i} -all")]);
        text.push_str(&format!(" include:{domain}"));
    }
    text.push_str(" -all");
    (resolver, text)
}

/// Parses `text` offline (no `a`/`mx` mechanisms expected).
#[allow(dead_code)] // Used by other test files
pub async fn parse_offline(text: &str) -> Record {
    parse_record(text, "example.com", &StaticResolver::new())
        .await
        .expect("Test record should parse")
}
