//! Core data model: resolver records, per-source provenance metadata, and the
//! persisted dataset shape.

use std::collections::HashMap;

use chrono::Utc;
use serde::{Deserialize, Serialize};

/// One candidate nameserver.
///
/// Field order is fixed so the pretty-printed dataset is stable across runs.
/// The structured source supplies most fields; flat-source records start out
/// with everything defaulted and are filled in by later pipeline stages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolverRecord {
    /// Canonical textual IP address; unique key across the dataset.
    pub ip: String,
    /// Reverse-DNS hostname, when known.
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub country_id: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub version: Option<String>,
    /// Last observed error for this resolver, if any.
    #[serde(default)]
    pub error: Option<String>,
    /// DNSSEC support tri-state: validated / not validated / unknown.
    #[serde(default)]
    pub dnssec: Option<bool>,
    /// Externally supplied quality score in [0, 1] (structured source only).
    #[serde(default)]
    pub reliability: Option<f64>,
    #[serde(default)]
    pub checked_at: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    /// Origin tags; a record discovered by more than one source carries all
    /// of them. Order-preserving, no duplicates.
    #[serde(default)]
    pub sources: Vec<String>,
}

impl ResolverRecord {
    /// Builds the all-defaulted record for a flat-source line. Timestamps are
    /// left unset until the merge stage stamps them.
    pub fn flat_entry(ip: impl Into<String>, source_tag: &str) -> Self {
        ResolverRecord {
            ip: ip.into(),
            name: None,
            country_id: Some(String::new()),
            city: Some(String::new()),
            version: Some(String::new()),
            error: None,
            dnssec: None,
            reliability: None,
            checked_at: None,
            created_at: None,
            sources: vec![source_tag.to_string()],
        }
    }

    /// Unions a source tag into the record, preserving first-seen order.
    pub fn add_source(&mut self, tag: &str) {
        if !self.sources.iter().any(|s| s == tag) {
            self.sources.push(tag.to_string());
        }
    }
}

/// Current UTC time as an ISO-8601 string with second precision, the format
/// used for `checked_at` / `created_at`.
pub fn utc_timestamp() -> String {
    Utc::now().format("%Y-%m-%dT%H:%M:%SZ").to_string()
}

/// Per-source provenance used for change detection.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SourceMeta {
    pub url: Option<String>,
    pub count: Option<usize>,
    pub sha512: Option<String>,
    pub md5: Option<String>,
}

impl SourceMeta {
    /// Whether freshly fetched content requires reprocessing.
    ///
    /// Both digests must differ from the stored pair; a digest we never
    /// recorded counts as differing. If either digest matches, the content is
    /// assumed unchanged and the source is skipped.
    pub fn changed(&self, md5: &str, sha512: &str) -> bool {
        let md5_differs = self.md5.as_deref() != Some(md5);
        let sha512_differs = self.sha512.as_deref() != Some(sha512);
        md5_differs && sha512_differs
    }

    /// Records the outcome of this run's fetch, replacing the stored digests.
    pub fn record_fetch(&mut self, url: &str, count: usize, md5: String, sha512: String) {
        self.url = Some(url.to_string());
        self.count = Some(count);
        self.md5 = Some(md5);
        self.sha512 = Some(sha512);
    }
}

/// Run-level provenance persisted alongside the resolver records.
///
/// Loaded from the previous dataset (or zero-valued) at run start, updated in
/// place as each source is fetched, and written back at run end.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunMetadata {
    pub structured: SourceMeta,
    pub flat: SourceMeta,
    /// Soft failures accumulated during the run (e.g. reverse-lookup errors).
    #[serde(default)]
    pub errors: Vec<String>,
}

impl RunMetadata {
    /// Carries url/count/digests over from the previous run and resets the
    /// error list.
    pub fn carried_over(previous: Option<&RunMetadata>) -> Self {
        match previous {
            Some(prev) => RunMetadata {
                structured: prev.structured.clone(),
                flat: prev.flat.clone(),
                errors: Vec::new(),
            },
            None => RunMetadata::default(),
        }
    }
}

/// The persisted snapshot: provenance plus the merged resolver records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    pub meta: RunMetadata,
    pub nameservers: Vec<ResolverRecord>,
}

/// Insertion-ordered set of records keyed by IP.
///
/// The pipeline needs deterministic output matching input order for
/// reproducible diffs, plus O(1) duplicate checks; this is a Vec of IPs for
/// order with a HashMap for the records themselves.
#[derive(Debug, Clone, Default)]
pub struct RecordSet {
    order: Vec<String>,
    by_ip: HashMap<String, ResolverRecord>,
}

impl RecordSet {
    pub fn contains(&self, ip: &str) -> bool {
        self.by_ip.contains_key(ip)
    }

    /// Inserts the record if its IP is not already present; an existing
    /// record is never overwritten. Returns whether an insert happened.
    pub fn insert(&mut self, record: ResolverRecord) -> bool {
        if self.by_ip.contains_key(&record.ip) {
            return false;
        }
        self.order.push(record.ip.clone());
        self.by_ip.insert(record.ip.clone(), record);
        true
    }

    pub fn get_mut(&mut self, ip: &str) -> Option<&mut ResolverRecord> {
        self.by_ip.get_mut(ip)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Iterates records in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &ResolverRecord> {
        self.order.iter().map(|ip| &self.by_ip[ip])
    }

    /// Consumes the set, yielding records in insertion order.
    pub fn into_records(mut self) -> Vec<ResolverRecord> {
        self.order
            .iter()
            .filter_map(|ip| self.by_ip.remove(ip))
            .collect()
    }
}
