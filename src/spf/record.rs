//! SPF record model.
//!
//! A [`Record`] holds the parts of one SPF policy this tool understands:
//! address mechanisms, unresolved includes, the `all` qualifier and the number
//! of DNS lookups spent producing it.

use std::fmt;

use strum_macros::EnumIter as EnumIterMacro;

/// Disposition of the catch-all `all` mechanism.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, EnumIterMacro)]
pub enum Qualifier {
    /// `+all`
    Pass,
    /// `-all`
    Fail,
    /// `~all`
    SoftFail,
    /// `?all`
    #[default]
    Neutral,
}

impl Qualifier {
    /// Maps a qualifier character to its variant.
    pub fn from_char(c: char) -> Option<Self> {
        match c {
            '+' => Some(Qualifier::Pass),
            '-' => Some(Qualifier::Fail),
            '~' => Some(Qualifier::SoftFail),
            '?' => Some(Qualifier::Neutral),
            _ => None,
        }
    }

    /// The qualifier character used in record text.
    pub fn as_char(self) -> char {
        match self {
            Qualifier::Pass => '+',
            Qualifier::Fail => '-',
            Qualifier::SoftFail => '~',
            Qualifier::Neutral => '?',
        }
    }

    /// Combines the qualifiers of two aggregated policies.
    ///
    /// `Fail` wins over everything; two different non-failing qualifiers
    /// degrade to `SoftFail`; equal qualifiers are kept.
    pub fn merge(self, other: Qualifier) -> Qualifier {
        if self == other {
            self
        } else if self == Qualifier::Fail || other == Qualifier::Fail {
            Qualifier::Fail
        } else {
            Qualifier::SoftFail
        }
    }
}

impl fmt::Display for Qualifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

/// One SPF policy.
///
/// Address lists keep insertion order and never hold duplicates; every
/// insertion path goes through [`Record::push_ip4`]/[`Record::push_ip6`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    version: String,
    ip4: Vec<String>,
    ip6: Vec<String>,
    includes: Vec<String>,
    qualifier: Qualifier,
    lookup_count: usize,
}

impl Default for Record {
    fn default() -> Self {
        Self::new()
    }
}

impl Record {
    /// An empty `spf1` record with a neutral qualifier.
    pub fn new() -> Self {
        Self {
            version: "spf1".to_string(),
            ip4: Vec::new(),
            ip6: Vec::new(),
            includes: Vec::new(),
            qualifier: Qualifier::default(),
            lookup_count: 0,
        }
    }

    /// SPF version tag, normally `spf1`.
    pub fn version(&self) -> &str {
        &self.version
    }

    /// IPv4 entries, in insertion order.
    pub fn ip4(&self) -> &[String] {
        &self.ip4
    }

    /// IPv6 entries, in insertion order.
    pub fn ip6(&self) -> &[String] {
        &self.ip6
    }

    /// Unresolved `include:` domains.
    pub fn includes(&self) -> &[String] {
        &self.includes
    }

    /// Qualifier of the terminal `all`.
    pub fn qualifier(&self) -> Qualifier {
        self.qualifier
    }

    /// DNS lookups this policy costs an evaluator.
    pub fn lookup_count(&self) -> usize {
        self.lookup_count
    }

    /// Total number of address entries (`ip4` plus `ip6`).
    pub fn entry_count(&self) -> usize {
        self.ip4.len() + self.ip6.len()
    }

    /// Replaces the version tag.
    pub fn set_version(&mut self, version: impl Into<String>) {
        self.version = version.into();
    }

    /// Replaces the qualifier.
    pub fn set_qualifier(&mut self, qualifier: Qualifier) {
        self.qualifier = qualifier;
    }

    /// Adds `count` lookups to the running total.
    pub fn add_lookups(&mut self, count: usize) {
        self.lookup_count += count;
    }

    /// Appends an IPv4 entry unless already present. Returns whether it was added.
    pub fn push_ip4(&mut self, addr: impl Into<String>) -> bool {
        push_unique(&mut self.ip4, addr.into())
    }

    /// Appends an IPv6 entry unless already present. Returns whether it was added.
    pub fn push_ip6(&mut self, addr: impl Into<String>) -> bool {
        push_unique(&mut self.ip6, addr.into())
    }

    /// Appends an address to `ip4` or `ip6` depending on its shape.
    ///
    /// Anything with two or more `:` is treated as IPv6.
    pub fn push_address(&mut self, addr: impl Into<String>) -> bool {
        let addr = addr.into();
        if is_ipv6(&addr) {
            self.push_ip6(addr)
        } else {
            self.push_ip4(addr)
        }
    }

    /// Appends an include target.
    pub fn push_include(&mut self, domain: impl Into<String>) {
        self.includes.push(domain.into());
    }

    /// A copy of this record's addresses, qualifier and lookup count, with
    /// no includes. This is the seed of a flattened aggregate.
    pub fn without_includes(&self) -> Record {
        Record {
            version: self.version.clone(),
            ip4: self.ip4.clone(),
            ip6: self.ip6.clone(),
            includes: Vec::new(),
            qualifier: self.qualifier,
            lookup_count: self.lookup_count,
        }
    }

    /// Merges `source` into this record and returns the result.
    ///
    /// Address entries already present are skipped, includes are appended
    /// as-is and differing qualifiers are combined with [`Qualifier::merge`].
    /// The lookup count is left for the caller to account.
    pub fn merge(mut self, source: &Record) -> Record {
        for addr in &source.ip4 {
            push_unique(&mut self.ip4, addr.clone());
        }
        for addr in &source.ip6 {
            push_unique(&mut self.ip6, addr.clone());
        }
        self.includes.extend(source.includes.iter().cloned());
        if self.qualifier != source.qualifier {
            self.qualifier = self.qualifier.merge(source.qualifier);
        }
        self
    }

    /// Canonical TXT text: `v=spf1`, ip4 entries, ip6 entries, includes,
    /// then the qualified `all`, space separated.
    pub fn as_txt_record(&self) -> String {
        let mut parts = Vec::with_capacity(2 + self.entry_count() + self.includes.len());
        parts.push("v=spf1".to_string());
        parts.extend(self.ip4.iter().map(|a| format!("ip4:{a}")));
        parts.extend(self.ip6.iter().map(|a| format!("ip6:{a}")));
        parts.extend(self.includes.iter().map(|d| format!("include:{d}")));
        parts.push(format!("{}all", self.qualifier));
        parts.join(" ")
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_txt_record())
    }
}

/// Whether an address string is IPv6 (two or more `:` characters).
pub fn is_ipv6(addr: &str) -> bool {
    addr.matches(':').count() >= 2
}

fn push_unique(list: &mut Vec<String>, value: String) -> bool {
    if list.contains(&value) {
        false
    } else {
        list.push(value);
        true
    }
}
