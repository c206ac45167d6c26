//! Resolver capability used by the SPF core.
//!
//! The parser and flattener never talk to DNS directly; they go through
//! [`SpfResolver`]. [`HickoryResolver`] is the production implementation,
//! [`StaticResolver`] answers from in-memory tables.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use hickory_resolver::TokioAsyncResolver;

use super::records::{lookup_ip_addresses, lookup_mx_records, lookup_txt_records};
use crate::error_handling::{LookupKind, SpfError};

/// DNS queries needed to evaluate SPF records.
#[async_trait]
pub trait SpfResolver: Send + Sync {
    /// TXT strings published at `name`.
    async fn query_txt(&self, name: &str) -> Result<Vec<String>, SpfError>;

    /// Mail exchanger host names for `name`, highest priority first.
    async fn query_mx(&self, name: &str) -> Result<Vec<String>, SpfError>;

    /// IPv4 and IPv6 addresses of `name`.
    async fn query_a(&self, name: &str) -> Result<Vec<String>, SpfError>;
}

/// [`SpfResolver`] backed by a hickory resolver.
#[derive(Clone)]
pub struct HickoryResolver {
    inner: Arc<TokioAsyncResolver>,
}

impl HickoryResolver {
    /// Wraps an initialized resolver (see `initialization::init_resolver`).
    pub fn new(inner: Arc<TokioAsyncResolver>) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl SpfResolver for HickoryResolver {
    async fn query_txt(&self, name: &str) -> Result<Vec<String>, SpfError> {
        lookup_txt_records(name, &self.inner).await
    }

    async fn query_mx(&self, name: &str) -> Result<Vec<String>, SpfError> {
        lookup_mx_records(name, &self.inner).await
    }

    async fn query_a(&self, name: &str) -> Result<Vec<String>, SpfError> {
        lookup_ip_addresses(name, &self.inner).await
    }
}

/// Deterministic in-memory [`SpfResolver`].
///
/// Names are matched case-insensitively and without a trailing dot. Unknown
/// names answer with an empty list. Every query, answered or failed, is
/// counted.
///
/// ```
/// use spf_flattener::dns::StaticResolver;
///
/// let resolver = StaticResolver::new()
///     .with_txt("_spf.example.com", ["v=spf1 ip4:192.0.2.0/24 -all"])
///     .with_a("example.com", ["192.0.2.10"]);
/// assert_eq!(resolver.query_count(), 0);
/// ```
#[derive(Debug, Default)]
pub struct StaticResolver {
    txt: HashMap<String, Vec<String>>,
    mx: HashMap<String, Vec<String>>,
    a: HashMap<String, Vec<String>>,
    failing: HashSet<(LookupKind, String)>,
    queries: AtomicUsize,
}

impl StaticResolver {
    /// A resolver with no records.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers the TXT strings published at `name`.
    pub fn with_txt<I, S>(mut self, name: &str, records: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.txt
            .insert(normalize_name(name), records.into_iter().map(Into::into).collect());
        self
    }

    /// Registers the MX host names of `name`.
    pub fn with_mx<I, S>(mut self, name: &str, hosts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.mx
            .insert(normalize_name(name), hosts.into_iter().map(Into::into).collect());
        self
    }

    /// Registers the addresses of `name`.
    pub fn with_a<I, S>(mut self, name: &str, addrs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.a
            .insert(normalize_name(name), addrs.into_iter().map(Into::into).collect());
        self
    }

    /// Makes every `kind` query for `name` fail.
    pub fn with_failure(mut self, kind: LookupKind, name: &str) -> Self {
        self.failing.insert((kind, normalize_name(name)));
        self
    }

    /// Number of queries made so far, failed ones included.
    pub fn query_count(&self) -> usize {
        self.queries.load(Ordering::SeqCst)
    }

    fn answer(
        &self,
        kind: LookupKind,
        table: &HashMap<String, Vec<String>>,
        name: &str,
    ) -> Result<Vec<String>, SpfError> {
        self.queries.fetch_add(1, Ordering::SeqCst);
        let key = normalize_name(name);
        if self.failing.contains(&(kind, key.clone())) {
            return Err(SpfError::resolution(kind, name, "SERVFAIL"));
        }
        Ok(table.get(&key).cloned().unwrap_or_default())
    }
}

#[async_trait]
impl SpfResolver for StaticResolver {
    async fn query_txt(&self, name: &str) -> Result<Vec<String>, SpfError> {
        self.answer(LookupKind::Txt, &self.txt, name)
    }

    async fn query_mx(&self, name: &str) -> Result<Vec<String>, SpfError> {
        self.answer(LookupKind::Mx, &self.mx, name)
    }

    async fn query_a(&self, name: &str) -> Result<Vec<String>, SpfError> {
        self.answer(LookupKind::A, &self.a, name)
    }
}

/// Lowercases a domain name and strips the trailing root dot.
pub fn normalize_name(name: &str) -> String {
    name.trim().trim_end_matches('.').to_ascii_lowercase()
}
