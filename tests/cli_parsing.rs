//! Tests for CLI argument parsing and defaults.

use clap::Parser;
use resolver_curator::Config;
use std::path::PathBuf;

#[test]
fn test_defaults() {
    let config = Config::parse_from(["resolver_curator"]);
    assert_eq!(config.reliability_threshold, 90.0);
    assert!(!config.flat_enabled);
    assert!(!config.lookup_missing_names);
    assert_eq!(config.output_json, PathBuf::from("resolvers.json"));
    assert_eq!(config.output, PathBuf::from("resolvers.txt"));
    assert!(config.resolver_seed.is_none());
    assert!(config.structured_url.starts_with("https://"));
    assert!(config.flat_url.starts_with("https://"));
}

#[test]
fn test_flags_and_overrides() {
    let config = Config::parse_from([
        "resolver_curator",
        "--flat-source",
        "--names",
        "--reliability-threshold",
        "75",
        "--output-json",
        "/tmp/out.json",
        "--output",
        "/tmp/out.txt",
        "--resolver-seed",
        "/etc/resolvers.txt",
    ]);
    assert!(config.flat_enabled);
    assert!(config.lookup_missing_names);
    assert_eq!(config.reliability_threshold, 75.0);
    assert_eq!(config.output_json, PathBuf::from("/tmp/out.json"));
    assert_eq!(config.output, PathBuf::from("/tmp/out.txt"));
    assert_eq!(
        config.resolver_seed,
        Some(PathBuf::from("/etc/resolvers.txt"))
    );
    assert!((config.normalized_threshold() - 0.75).abs() < f64::EPSILON);
}

#[test]
fn test_custom_source_urls() {
    let config = Config::parse_from([
        "resolver_curator",
        "--structured-url",
        "http://localhost:8080/ns.json",
        "--flat-url",
        "http://localhost:8080/resolvers.txt",
    ]);
    assert_eq!(config.structured_url, "http://localhost:8080/ns.json");
    assert_eq!(config.flat_url, "http://localhost:8080/resolvers.txt");
}

#[test]
fn test_unknown_flag_is_rejected() {
    let result = Config::try_parse_from(["resolver_curator", "--definitely-not-a-flag"]);
    assert!(result.is_err());
}
