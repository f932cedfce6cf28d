use std::path::PathBuf;

use clap::{Parser, ValueEnum};

// constants (used as defaults)

/// Per-attempt DNS query timeout in seconds. Also used as the query lifetime
/// budget since each attempt talks to exactly one ephemeral resolver config.
pub const DNS_TIMEOUT_SECS: u64 = 6;
/// Default query retry budget (total attempts, not extra tries).
pub const DNS_RETRIES: usize = 5;
/// When the resolver pool shrinks to this size or below, it is reloaded from
/// the seed file before the next selection.
pub const MIN_POOL_SIZE: usize = 400;
/// Number of resolvers picked by `SelectionMode::Sample`.
pub const DEFAULT_SAMPLE_SIZE: usize = 10;

/// HTTP fetch timeout in seconds for the remote source downloads.
pub const HTTP_TIMEOUT_SECS: u64 = 30;

/// Origin tag applied to records parsed from the structured source.
pub const STRUCTURED_SOURCE_TAG: &str = "structured-source";
/// Origin tag applied to records parsed from the flat source.
pub const FLAT_SOURCE_TAG: &str = "flat-source";

/// Fallback resolver pool used when no seed file is configured.
///
/// Well-known public recursors (Google, OpenDNS, Level3, Verisign, FreeDNS,
/// Hurricane Electric, Neustar).
pub const DEFAULT_PUBLIC_RESOLVERS: &[&str] = &[
    "8.8.8.8",
    "8.8.4.4",
    "208.67.222.222",
    "208.67.220.220",
    "208.67.222.220",
    "208.67.220.222",
    "209.244.0.3",
    "209.244.0.4",
    "64.6.64.6",
    "64.6.65.6",
    "37.235.1.174",
    "37.235.1.177",
    "74.82.42.42",
    "156.154.70.1",
    "156.154.71.1",
];

/// Logging level for the application.
#[derive(Clone, Debug, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for log::LevelFilter {
    fn from(l: LogLevel) -> Self {
        match l {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

/// Log output format.
///
/// - `Plain`: Human-readable format with colors (default)
/// - `Json`: Structured JSON format for machine parsing
#[derive(Clone, Debug, ValueEnum)]
pub enum LogFormat {
    Plain,
    Json,
}

/// Command-line options and configuration.
///
/// This struct is generated by `clap` from the field attributes and doubles
/// as the programmatic configuration for [`crate::run_pipeline`].
///
/// # Examples
///
/// ```bash
/// # Refresh the dataset from the structured source only
/// resolver_curator
///
/// # Include the flat source and backfill missing hostnames
/// resolver_curator --flat-source --names
///
/// # Lower the reliability bar to 80%
/// resolver_curator --reliability-threshold 80
/// ```
#[derive(Debug, Clone, Parser)]
#[command(
    name = "resolver_curator",
    about = "Maintains a merged, reliability-filtered list of public DNS resolvers."
)]
pub struct Config {
    /// Reliability threshold as a percentage in [0, 100]; records scoring
    /// below threshold/100 are rejected
    #[arg(long, default_value_t = 90.0)]
    pub reliability_threshold: f64,

    /// Structured source URL (JSON list with per-entry metadata)
    #[arg(long, default_value = "https://public-dns.info/nameserver/us.json")]
    pub structured_url: String,

    /// Flat source URL (newline-delimited resolver IPs)
    #[arg(
        long,
        default_value = "https://raw.githubusercontent.com/blechschmidt/massdns/master/lists/resolvers.txt"
    )]
    pub flat_url: String,

    /// Include the flat source in the output
    #[arg(long = "flat-source", default_value_t = false)]
    pub flat_enabled: bool,

    /// Perform reverse lookups for flat-source IPs missing hostnames
    #[arg(long = "names", default_value_t = false)]
    pub lookup_missing_names: bool,

    /// Path to the structured JSON output (also re-read as prior state)
    #[arg(long, value_parser, default_value = "resolvers.json")]
    pub output_json: PathBuf,

    /// Path to the flat output file of line-separated resolver IPs
    #[arg(long, value_parser, default_value = "resolvers.txt")]
    pub output: PathBuf,

    /// Resolver seed file, one IP per line (lines containing ':' skipped).
    /// Falls back to a built-in public resolver list when omitted.
    #[arg(long, value_parser)]
    pub resolver_seed: Option<PathBuf>,

    /// HTTP fetch timeout in seconds
    #[arg(long, default_value_t = HTTP_TIMEOUT_SECS)]
    pub timeout_seconds: u64,

    /// Log level: error|warn|info|debug|trace
    #[arg(long, value_enum, default_value_t = LogLevel::Info)]
    pub log_level: LogLevel,

    /// Log format: plain|json
    #[arg(long, value_enum, default_value_t = LogFormat::Plain)]
    pub log_format: LogFormat,
}

impl Config {
    /// Threshold normalized from a percentage into [0, 1].
    pub fn normalized_threshold(&self) -> f64 {
        (self.reliability_threshold / 100.0).clamp(0.0, 1.0)
    }
}

impl Default for Config {
    fn default() -> Self {
        Config::parse_from(["resolver_curator"])
    }
}
