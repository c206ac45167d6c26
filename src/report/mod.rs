//! Shard naming and final record assembly.
//!
//! Turns a parsed SPF record into the TXT records to publish: either the
//! original record unchanged, or a slim top-level record that includes one
//! generated subdomain per shard.

use log::{debug, info};
use ring::digest::{digest, SHA1_FOR_LEGACY_USE_ONLY};

use crate::config::{LABEL_HASH_BYTES, MAX_DNS_LOOKUPS};
use crate::error_handling::SpfError;
use crate::spf::{split, Flattener, Record};

/// One TXT record to publish.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TxtRecordOutput {
    name: String,
    txt: String,
}

impl TxtRecordOutput {
    /// Record `txt` published under `name`.
    pub fn new(name: impl Into<String>, txt: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            txt: txt.into(),
        }
    }

    /// Top domain for the top-level record, generated label for a shard.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// TXT text to publish.
    pub fn txt(&self) -> &str {
        &self.txt
    }

    /// Length of the TXT text in characters.
    pub fn len(&self) -> usize {
        self.txt.chars().count()
    }

    /// Whether the TXT text is empty.
    pub fn is_empty(&self) -> bool {
        self.txt.is_empty()
    }
}

/// Records produced for one domain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpfReport {
    /// Domain the records are published under
    pub top_domain: String,
    /// Record published at the top domain
    pub top: TxtRecordOutput,
    /// Shard records, in include order (empty if no split was needed)
    pub shards: Vec<TxtRecordOutput>,
    /// DNS lookups the original policy costs once fully flattened
    pub lookup_count: usize,
}

impl SpfReport {
    /// Fully-qualified name a record is published at.
    pub fn fqdn(&self, record: &TxtRecordOutput) -> String {
        if record.name() == self.top_domain {
            self.top_domain.clone()
        } else {
            format!("{}.{}", record.name(), self.top_domain)
        }
    }

    /// Whether the policy had to be split into shards.
    pub fn is_split(&self) -> bool {
        !self.shards.is_empty()
    }

    /// Top-level record followed by the shards.
    pub fn records(&self) -> impl Iterator<Item = &TxtRecordOutput> {
        std::iter::once(&self.top).chain(self.shards.iter())
    }
}

/// Content-derived subdomain label for a shard's TXT text.
///
/// `prefix` followed by the first three bytes of the SHA-1 digest of `txt`, in
/// hex. Identical shard text always gets the same label.
pub fn shard_label(prefix: &str, txt: &str) -> String {
    let sum = digest(&SHA1_FOR_LEGACY_USE_ONLY, txt.as_bytes());
    format!("{prefix}{}", hex::encode(&sum.as_ref()[..LABEL_HASH_BYTES]))
}

/// Builds the TXT records to publish for `record` at `top_domain`.
///
/// If the flattened policy costs at most [`MAX_DNS_LOOKUPS`], the original
/// record text is kept as is. Otherwise the flattened addresses are split into
/// shards named `<prefix><hash>` and the top-level record includes each of them
/// under `top_domain`, using the first shard's qualifier.
///
/// # Errors
///
/// Propagates any flattening or splitting error.
pub async fn build_report(
    record: &Record,
    top_domain: &str,
    subdomain_prefix: &str,
    flattener: &Flattener<'_>,
) -> Result<SpfReport, SpfError> {
    let flat = flattener.flatten(record, top_domain).await?;
    info!("Flat lookup count: {}", flat.lookup_count());

    if flat.lookup_count() <= MAX_DNS_LOOKUPS {
        return Ok(SpfReport {
            top_domain: top_domain.to_string(),
            top: TxtRecordOutput::new(top_domain, record.as_txt_record()),
            shards: Vec::new(),
            lookup_count: flat.lookup_count(),
        });
    }

    let splits = split(&flat)?;
    let mut top = Record::new();
    if let Some(first) = splits.first() {
        top.set_qualifier(first.qualifier());
    }

    let mut shards = Vec::with_capacity(splits.len());
    for shard in &splits {
        let txt = shard.as_txt_record();
        let label = shard_label(subdomain_prefix, &txt);
        debug!("Shard {label}: {} entries", shard.entry_count());
        top.push_include(format!("{label}.{top_domain}"));
        shards.push(TxtRecordOutput::new(label, txt));
    }

    Ok(SpfReport {
        top_domain: top_domain.to_string(),
        top: TxtRecordOutput::new(top_domain, top.as_txt_record()),
        shards,
        lookup_count: flat.lookup_count(),
    })
}
