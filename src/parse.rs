//! Source parsing: both remote formats normalize into [`ResolverRecord`]s.

use log::debug;

use crate::config::{FLAT_SOURCE_TAG, STRUCTURED_SOURCE_TAG};
use crate::error_handling::PipelineError;
use crate::models::ResolverRecord;

/// Parses the structured source: a JSON array of objects with per-entry
/// metadata. Input order is preserved and every record is tagged with the
/// structured-source tag.
///
/// # Errors
///
/// Returns `PipelineError::MalformedSource` if the body is not a JSON list
/// or any entry is missing the mandatory `ip` key. Fatal for the run.
pub fn parse_structured(bytes: &[u8], url: &str) -> Result<Vec<ResolverRecord>, PipelineError> {
    let mut records: Vec<ResolverRecord> =
        serde_json::from_slice(bytes).map_err(|err| PipelineError::MalformedSource {
            url: url.to_string(),
            detail: err.to_string(),
        })?;
    for record in &mut records {
        record.add_source(STRUCTURED_SOURCE_TAG);
    }
    debug!("{} records parsed from {}", records.len(), url);
    Ok(records)
}

/// Parses the flat source: newline-delimited IPs, blank lines skipped. All
/// metadata besides `ip` is defaulted; timestamps stay unset until the merge
/// stage stamps them. Input order is preserved.
pub fn parse_flat(text: &str) -> Vec<ResolverRecord> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(|line| ResolverRecord::flat_entry(line, FLAT_SOURCE_TAG))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_flat_skips_blank_lines_and_keeps_order() {
        let records = parse_flat("1.2.3.4\n\n5.6.7.8\n");
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].ip, "1.2.3.4");
        assert_eq!(records[1].ip, "5.6.7.8");
        for record in &records {
            assert_eq!(record.sources, vec![FLAT_SOURCE_TAG]);
            assert!(record.created_at.is_none());
            assert!(record.checked_at.is_none());
            assert_eq!(record.country_id.as_deref(), Some(""));
        }
    }

    #[test]
    fn test_parse_flat_trims_whitespace() {
        let records = parse_flat("  9.9.9.9  \r\n");
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].ip, "9.9.9.9");
    }

    #[test]
    fn test_parse_structured_tags_and_defaults() {
        let body = br#"[
            {"ip": "8.8.8.8", "name": "dns.google.", "reliability": 1.0, "dnssec": true},
            {"ip": "1.0.0.1", "reliability": 0.42}
        ]"#;
        let records = parse_structured(body, "http://example.test/ns.json").unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].ip, "8.8.8.8");
        assert_eq!(records[0].name.as_deref(), Some("dns.google."));
        assert_eq!(records[0].dnssec, Some(true));
        assert_eq!(records[0].sources, vec![STRUCTURED_SOURCE_TAG]);
        assert!(records[1].name.is_none());
        assert_eq!(records[1].reliability, Some(0.42));
    }

    #[test]
    fn test_parse_structured_missing_ip_is_fatal() {
        let body = br#"[{"name": "no-ip.example."}]"#;
        let err = parse_structured(body, "http://example.test/ns.json").unwrap_err();
        assert!(matches!(err, PipelineError::MalformedSource { .. }));
    }

    #[test]
    fn test_parse_structured_does_not_duplicate_existing_tag() {
        let body = br#"[{"ip": "8.8.8.8", "sources": ["structured-source"]}]"#;
        let records = parse_structured(body, "http://example.test/ns.json").unwrap();
        assert_eq!(records[0].sources, vec![STRUCTURED_SOURCE_TAG]);
    }
}
