//! Merging and reliability filtering of normalized resolver records.

use std::collections::{BTreeMap, HashSet};

use log::{debug, warn};

use crate::models::{utc_timestamp, RecordSet, ResolverRecord};

use super::enrich::ReverseLookupEnricher;

/// Total-ordered f64 key for the reliability frequency table.
#[derive(Debug, Clone, Copy, PartialEq)]
struct ScoreKey(f64);

impl Eq for ScoreKey {}

impl PartialOrd for ScoreKey {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ScoreKey {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.0.total_cmp(&other.0)
    }
}

/// One run's merge and filter state.
///
/// Owns the reliable/unreliable working sets, the shared processed-IP gate
/// across sources, and the per-score diagnostics. Exclusively owned by the
/// pipeline for the duration of one run.
pub struct MergeState {
    threshold: f64,
    reliability_counts: BTreeMap<ScoreKey, usize>,
    min_reliability: f64,
    reliable: RecordSet,
    unreliable: RecordSet,
    processed_ips: HashSet<String>,
    unreliable_ips: HashSet<String>,
    soft_errors: Vec<String>,
}

impl MergeState {
    /// `threshold` is the normalized value in [0, 1].
    pub fn new(threshold: f64) -> Self {
        MergeState {
            threshold,
            reliability_counts: BTreeMap::new(),
            min_reliability: 1.0,
            reliable: RecordSet::default(),
            unreliable: RecordSet::default(),
            processed_ips: HashSet::new(),
            unreliable_ips: HashSet::new(),
            soft_errors: Vec::new(),
        }
    }

    /// Unions the duplicate's source tags into the already-accepted record.
    /// Returns whether a union happened (i.e. the IP was in the reliable
    /// set).
    fn merge_duplicate(&mut self, record: &ResolverRecord) -> bool {
        let Some(existing) = self.reliable.get_mut(&record.ip) else {
            return false;
        };
        for tag in &record.sources {
            existing.add_source(tag);
        }
        true
    }

    /// Processes structured-source records through the reliability filter.
    ///
    /// Records arriving a second time (same-run duplicate or earlier
    /// repopulation) are merged by source-tag union and logged as a warning;
    /// the asymmetry with the flat path's silent union is deliberate.
    pub fn process_structured(&mut self, records: Vec<ResolverRecord>) {
        for record in records {
            let ip = record.ip.clone();
            if self.processed_ips.contains(&ip) || self.reliable.contains(&ip) {
                if self.merge_duplicate(&record) {
                    warn!("duplicate IP in structured record: {}", ip);
                }
                self.processed_ips.insert(ip);
                continue;
            }
            self.processed_ips.insert(ip.clone());

            match record.reliability {
                Some(score) => {
                    *self.reliability_counts.entry(ScoreKey(score)).or_insert(0) += 1;
                    if score < self.min_reliability {
                        self.min_reliability = score;
                    }
                    if score < self.threshold {
                        self.unreliable_ips.insert(ip);
                        self.unreliable.insert(record);
                        continue;
                    }
                }
                None => {
                    // Missing scores pass the filter unconditionally.
                    warn!("record {} carries no reliability score; accepting", ip);
                }
            }

            // Error-flagging is independent of the reliability verdict.
            if record.error.as_deref().is_some_and(|e| !e.is_empty()) {
                warn!(
                    "{}",
                    serde_json::to_string_pretty(&record).unwrap_or_default()
                );
            }

            self.reliable.insert(record);
        }
    }

    /// Processes flat-source records: same-run duplicates union silently,
    /// new records get timestamped and optionally enriched with a reverse
    /// lookup before landing in the reliable set.
    pub async fn process_flat(
        &mut self,
        records: Vec<ResolverRecord>,
        mut enricher: Option<&mut ReverseLookupEnricher<'_>>,
    ) {
        let mut newly_found = 0usize;
        for mut record in records {
            let ip = record.ip.clone();
            if self.processed_ips.contains(&ip) || self.reliable.contains(&ip) {
                self.merge_duplicate(&record);
                self.processed_ips.insert(ip);
                continue;
            }
            self.processed_ips.insert(ip.clone());
            newly_found += 1;

            record.created_at = Some(utc_timestamp());

            if record.name.is_none() {
                if let Some(enricher) = enricher.as_deref_mut() {
                    match enricher.hostname_for(&ip).await {
                        Ok(found) => record.name = found,
                        Err(errmsg) => {
                            // Reverse lookup failures never abort the run.
                            self.soft_errors.push(format!("{}: {}", ip, errmsg));
                            record.error = Some(errmsg);
                        }
                    }
                }
            }

            record.checked_at = Some(utc_timestamp());
            self.reliable.insert(record);
        }
        debug!("{} new nameservers found from the flat source", newly_found);
    }

    /// Re-inserts previously persisted records carrying `tag`, used when a
    /// source is enabled but its content did not change. Records already
    /// present are left untouched.
    pub fn repopulate_from(&mut self, previous: &[ResolverRecord], tag: &str) {
        for record in previous {
            if record.sources.iter().any(|s| s == tag) {
                self.reliable.insert(record.clone());
            }
        }
    }

    /// Dumps the per-score histogram (descending), the minimum score, and
    /// the DNSSEC-less count at debug level.
    pub fn log_statistics(&self, sources_processed: usize) {
        if self.reliability_counts.is_empty() && sources_processed == 0 {
            return;
        }
        for (score, count) in self.reliability_counts.iter().rev() {
            debug!("reliability {}: {} records", score.0, count);
        }
        debug!("{} is the lowest reliability score", self.min_reliability);
        debug!(
            "{} resolvers do not have DNSSEC",
            self.reliable
                .iter()
                .filter(|r| r.dnssec != Some(true))
                .count()
        );
    }

    pub fn reliable_count(&self) -> usize {
        self.reliable.len()
    }

    pub fn unreliable_count(&self) -> usize {
        self.unreliable.len()
    }

    pub fn is_processed(&self, ip: &str) -> bool {
        self.processed_ips.contains(ip)
    }

    pub fn is_unreliable(&self, ip: &str) -> bool {
        self.unreliable_ips.contains(ip)
    }

    /// Soft failures gathered during processing, for the run metadata.
    pub fn soft_errors(&self) -> &[String] {
        &self.soft_errors
    }

    /// Consumes the state, yielding the reliable records in merge order.
    pub fn into_reliable_records(self) -> Vec<ResolverRecord> {
        self.reliable.into_records()
    }
}
