//! Change-detection and output-stability properties of the persisted
//! dataset, exercised through the public API.

use resolver_curator::{Dataset, ResolverRecord, RunMetadata, SourceMeta};

fn record(ip: &str) -> ResolverRecord {
    let mut record = ResolverRecord {
        ip: ip.to_string(),
        name: None,
        country_id: Some("US".to_string()),
        city: Some(String::new()),
        version: None,
        error: None,
        dnssec: Some(true),
        reliability: Some(1.0),
        checked_at: Some("2024-01-01T00:00:00Z".to_string()),
        created_at: Some("2024-01-01T00:00:00Z".to_string()),
        sources: Vec::new(),
    };
    record.add_source("structured-source");
    record
}

#[test]
fn test_identical_content_serializes_to_identical_bytes() {
    let build = || Dataset {
        meta: RunMetadata::default(),
        nameservers: vec![record("8.8.8.8"), record("9.9.9.9")],
    };
    let first = serde_json::to_string_pretty(&build()).unwrap();
    let second = serde_json::to_string_pretty(&build()).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_unchanged_digests_mean_no_reprocessing() {
    let mut meta = SourceMeta::default();
    meta.record_fetch(
        "https://example.test/ns.json",
        100,
        "weak-digest".to_string(),
        "strong-digest".to_string(),
    );

    // Same content on the next run: source skipped.
    assert!(!meta.changed("weak-digest", "strong-digest"));
    // Both digests must differ before reprocessing kicks in.
    assert!(!meta.changed("weak-digest", "other"));
    assert!(!meta.changed("other", "strong-digest"));
    assert!(meta.changed("other-weak", "other-strong"));
}

#[test]
fn test_dataset_survives_persist_format_round_trip() {
    let mut meta = RunMetadata::default();
    meta.structured.record_fetch(
        "https://example.test/ns.json",
        2,
        "md5".to_string(),
        "sha512".to_string(),
    );
    meta.errors.push("192.0.2.1: lookup failed".to_string());

    let dataset = Dataset {
        meta,
        nameservers: vec![record("8.8.8.8")],
    };

    let text = serde_json::to_string_pretty(&dataset).unwrap();
    let back: Dataset = serde_json::from_str(&text).unwrap();
    assert_eq!(back, dataset);
    assert_eq!(back.meta.structured.count, Some(2));
    assert_eq!(back.nameservers[0].sources, vec!["structured-source"]);
}
