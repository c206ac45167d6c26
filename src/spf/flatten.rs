//! Include flattening.
//!
//! Replaces every `include:` of a record with the addresses the included
//! policies resolve to, recursively, while accounting for the DNS lookups the
//! original policy would have cost an evaluator.

use futures::future::{BoxFuture, FutureExt};
use futures::stream::{self, StreamExt, TryStreamExt};
use log::debug;

use crate::config::{DEFAULT_MAX_CONCURRENCY, MAX_INCLUDE_DEPTH};
use crate::dns::{is_spf_record, normalize_name, SpfResolver};
use crate::error_handling::SpfError;

use super::parse::parse_record;
use super::record::Record;

/// Resolves `include:` chains into literal address mechanisms.
///
/// Sibling includes may be resolved concurrently (see
/// [`Flattener::with_max_concurrency`]); their results are always merged in
/// the order the includes appear in the record.
pub struct Flattener<'r> {
    resolver: &'r dyn SpfResolver,
    max_concurrency: usize,
    max_depth: usize,
}

impl<'r> Flattener<'r> {
    /// Sequential flattener with the default depth bound.
    pub fn new(resolver: &'r dyn SpfResolver) -> Self {
        Self {
            resolver,
            max_concurrency: DEFAULT_MAX_CONCURRENCY,
            max_depth: MAX_INCLUDE_DEPTH,
        }
    }

    /// Number of sibling includes resolved at once (at least 1).
    pub fn with_max_concurrency(mut self, max_concurrency: usize) -> Self {
        self.max_concurrency = max_concurrency.max(1);
        self
    }

    /// Deepest include chain followed before giving up.
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Flattens `record`, published at `subject_domain`, into a record without
    /// includes.
    ///
    /// The result starts from the record's own addresses, qualifier and lookup
    /// count. Each include adds one lookup plus whatever its own policy cost.
    ///
    /// # Errors
    ///
    /// - `SpfError::Resolution` if any TXT query (or `a`/`mx` expansion inside
    ///   an included policy) fails; the whole flatten is abandoned.
    /// - `SpfError::CycleDetected` if an include chain comes back to a domain
    ///   already being resolved.
    /// - `SpfError::IncludeDepthExceeded` if the chain is deeper than the limit.
    pub async fn flatten(&self, record: &Record, subject_domain: &str) -> Result<Record, SpfError> {
        self.flatten_path(record, vec![normalize_name(subject_domain)])
            .await
    }

    fn flatten_path<'a>(
        &'a self,
        record: &'a Record,
        path: Vec<String>,
    ) -> BoxFuture<'a, Result<Record, SpfError>> {
        async move {
            let mut aggregate = record.without_includes();
            if record.includes().is_empty() {
                return Ok(aggregate);
            }
            if path.len() > self.max_depth {
                return Err(SpfError::IncludeDepthExceeded(self.max_depth));
            }

            // buffered() yields in input order, so merge order never depends
            // on which query answered first
            let pending: Vec<_> = record
                .includes()
                .iter()
                .map(|domain| self.resolve_include(domain, &path))
                .collect();
            let resolved: Vec<Vec<Record>> = stream::iter(pending)
                .buffered(self.max_concurrency)
                .try_collect()
                .await?;

            for children in resolved {
                aggregate.add_lookups(1);
                for child in children {
                    aggregate = aggregate.merge(&child);
                    aggregate.add_lookups(child.lookup_count());
                }
            }
            Ok(aggregate)
        }
        .boxed()
    }

    /// Fetches and flattens every SPF policy published at one include target.
    async fn resolve_include(
        &self,
        domain: &str,
        path: &[String],
    ) -> Result<Vec<Record>, SpfError> {
        let name = normalize_name(domain);
        if path.contains(&name) {
            return Err(SpfError::CycleDetected {
                domain: name,
                path: path.to_vec(),
            });
        }

        debug!("Checking include: {domain}");
        let txts = self.resolver.query_txt(domain).await?;
        debug!("Returned txts for {domain}: {txts:?}");

        let mut child_path = path.to_vec();
        child_path.push(name);

        let mut children = Vec::with_capacity(txts.len());
        for txt in &txts {
            if !is_spf_record(txt) {
                debug!("Skipping non-SPF TXT record at {domain}: {txt}");
                continue;
            }
            let child = parse_record(txt, domain, self.resolver).await?;
            let child = if child.includes().is_empty() {
                child
            } else {
                self.flatten_path(&child, child_path.clone()).await?
            };
            children.push(child);
        }
        Ok(children)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dns::StaticResolver;
    use crate::error_handling::LookupKind;
    use crate::spf::Qualifier;

    async fn parse(text: &str) -> Record {
        parse_record(text, "example.com", &StaticResolver::new())
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_flatten_without_includes_is_unchanged() {
        let resolver = StaticResolver::new();
        let record = parse("v=spf1 ip4:192.0.2.1 ip6:2001:db8::1 ~all").await;
        let flat = Flattener::new(&resolver)
            .flatten(&record, "example.com")
            .await
            .unwrap();
        assert_eq!(flat, record);
        assert_eq!(resolver.query_count(), 0);
    }

    #[tokio::test]
    async fn test_flatten_single_level() {
        let resolver = StaticResolver::new()
            .with_txt("_spf.a.example", ["v=spf1 ip4:198.51.100.0/24 ip4:192.0.2.1 -all"])
            .with_txt("_spf.b.example", ["v=spf1 ip6:2001:db8::/32 ~all"]);
        let record =
            parse("v=spf1 ip4:192.0.2.1 include:_spf.a.example include:_spf.b.example ~all").await;

        let flat = Flattener::new(&resolver)
            .flatten(&record, "example.com")
            .await
            .unwrap();
        assert_eq!(flat.ip4(), ["192.0.2.1", "198.51.100.0/24"]);
        assert_eq!(flat.ip6(), ["2001:db8::/32"]);
        assert!(flat.includes().is_empty());
        assert_eq!(flat.qualifier(), Qualifier::Fail);
        assert_eq!(flat.lookup_count(), 2);
    }

    #[tokio::test]
    async fn test_flatten_nested_counts_every_lookup() {
        let resolver = StaticResolver::new()
            .with_txt("outer.example", ["v=spf1 include:inner.example a ~all"])
            .with_a("outer.example", ["203.0.113.5"])
            .with_txt("inner.example", ["v=spf1 ip4:198.51.100.9 ~all"]);
        let record = parse("v=spf1 include:outer.example ~all").await;

        let flat = Flattener::new(&resolver)
            .flatten(&record, "example.com")
            .await
            .unwrap();
        // outer include (1) + its `a` address (1) + inner include (1)
        assert_eq!(flat.lookup_count(), 3);
        assert_eq!(flat.ip4(), ["203.0.113.5", "198.51.100.9"]);
        assert_eq!(flat.qualifier(), Qualifier::SoftFail);
    }

    #[tokio::test]
    async fn test_flatten_skips_non_spf_txt() {
        let resolver = StaticResolver::new().with_txt(
            "vendor.example",
            ["google-site-verification=abc", "v=spf1 ip4:192.0.2.77 -all"],
        );
        let record = parse("v=spf1 include:vendor.example -all").await;
        let flat = Flattener::new(&resolver)
            .flatten(&record, "example.com")
            .await
            .unwrap();
        assert_eq!(flat.ip4(), ["192.0.2.77"]);
        assert_eq!(flat.qualifier(), Qualifier::Fail);
        assert_eq!(flat.lookup_count(), 1);
    }

    #[tokio::test]
    async fn test_flatten_accepts_tab_after_version() {
        let resolver =
            StaticResolver::new().with_txt("vendor.example", ["v=spf1\tip4:192.0.2.9 -all"]);
        let record = parse("v=spf1 include:vendor.example -all").await;
        let flat = Flattener::new(&resolver)
            .flatten(&record, "example.com")
            .await
            .unwrap();
        assert_eq!(flat.ip4(), ["192.0.2.9"]);
        assert_eq!(flat.lookup_count(), 1);
    }

    #[tokio::test]
    async fn test_flatten_propagates_resolution_error() {
        let resolver = StaticResolver::new()
            .with_txt("ok.example", ["v=spf1 ip4:192.0.2.1 -all"])
            .with_failure(LookupKind::Txt, "broken.example");
        let record = parse("v=spf1 include:ok.example include:broken.example -all").await;
        let err = Flattener::new(&resolver)
            .flatten(&record, "example.com")
            .await
            .unwrap_err();
        assert_eq!(
            err,
            SpfError::Resolution {
                kind: LookupKind::Txt,
                name: "broken.example".to_string(),
                message: "SERVFAIL".to_string(),
            }
        );
    }

    #[tokio::test]
    async fn test_flatten_detects_cycle() {
        let resolver = StaticResolver::new()
            .with_txt("a.example", ["v=spf1 include:b.example -all"])
            .with_txt("b.example", ["v=spf1 include:A.Example. -all"]);
        let record = parse("v=spf1 include:a.example -all").await;
        let err = Flattener::new(&resolver)
            .flatten(&record, "example.com")
            .await
            .unwrap_err();
        assert_eq!(
            err,
            SpfError::CycleDetected {
                domain: "a.example".to_string(),
                path: vec![
                    "example.com".to_string(),
                    "a.example".to_string(),
                    "b.example".to_string()
                ],
            }
        );
    }

    #[tokio::test]
    async fn test_flatten_detects_self_include() {
        let resolver =
            StaticResolver::new().with_txt("example.com", ["v=spf1 include:example.com -all"]);
        let record = parse("v=spf1 include:example.com -all").await;
        let err = Flattener::new(&resolver)
            .flatten(&record, "example.com")
            .await
            .unwrap_err();
        assert!(matches!(err, SpfError::CycleDetected { .. }));
        // rejected before any query
        assert_eq!(resolver.query_count(), 0);
    }

    #[tokio::test]
    async fn test_flatten_repeated_sibling_include_is_not_a_cycle() {
        let resolver =
            StaticResolver::new().with_txt("shared.example", ["v=spf1 ip4:192.0.2.5 -all"]);
        let record = parse("v=spf1 include:shared.example include:shared.example -all").await;
        let flat = Flattener::new(&resolver)
            .flatten(&record, "example.com")
            .await
            .unwrap();
        assert_eq!(flat.ip4(), ["192.0.2.5"]);
        assert_eq!(flat.lookup_count(), 2);
    }

    #[tokio::test]
    async fn test_flatten_depth_limit() {
        let resolver = StaticResolver::new()
            .with_txt("l1.example", ["v=spf1 include:l2.example -all"])
            .with_txt("l2.example", ["v=spf1 include:l3.example -all"])
            .with_txt("l3.example", ["v=spf1 ip4:192.0.2.1 -all"]);
        let record = parse("v=spf1 include:l1.example -all").await;
        let err = Flattener::new(&resolver)
            .with_max_depth(2)
            .flatten(&record, "example.com")
            .await
            .unwrap_err();
        assert_eq!(err, SpfError::IncludeDepthExceeded(2));
    }

    #[tokio::test]
    async fn test_flatten_concurrent_matches_sequential() {
        let mut resolver = StaticResolver::new();
        let mut text = String::from("v=spf1");
        for i in 0..8 {
            let domain = format!("_spf{i}.example");
            resolver = resolver.with_txt(
                &domain,
                [format!("v=spf1 ip4:192.0.2.{i} ip6:2001:db8::{i} -all")],
            );
            text.push_str(&format!(" include:{domain}"));
        }
        text.push_str(" ~all");
        let record = parse(&text).await;

        let sequential = Flattener::new(&resolver)
            .flatten(&record, "example.com")
            .await
            .unwrap();
        let concurrent = Flattener::new(&resolver)
            .with_max_concurrency(4)
            .flatten(&record, "example.com")
            .await
            .unwrap();
        assert_eq!(sequential, concurrent);
        assert_eq!(sequential.ip4().first().map(String::as_str), Some("192.0.2.0"));
        assert_eq!(sequential.lookup_count(), 8);
    }
}
