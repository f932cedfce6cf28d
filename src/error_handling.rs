//! Typed error taxonomy for the pipeline and the query executor.

use log::SetLoggerError;
use reqwest::Error as ReqwestError;
use thiserror::Error;

/// Error types for initialization failures.
#[derive(Error, Debug)]
pub enum InitializationError {
    /// Error initializing the logger.
    #[error("Logger initialization error: {0}")]
    LoggerError(#[from] SetLoggerError),

    /// Error initializing the HTTP client.
    #[error("HTTP client initialization error: {0}")]
    HttpClientError(#[from] ReqwestError),
}

/// Fatal pipeline errors. Any of these aborts the run before anything is
/// persisted.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// A source fetch failed at the transport layer. Single attempt, no
    /// retry; the run is aborted.
    #[error("transport error fetching {url}: {source}")]
    Transport {
        url: String,
        #[source]
        source: ReqwestError,
    },

    /// A source record is missing its mandatory IP key or otherwise does not
    /// decode.
    #[error("malformed source data from {url}: {detail}")]
    MalformedSource { url: String, detail: String },

    /// Reading or writing a persisted file failed.
    #[error("I/O error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// The previously persisted dataset does not decode.
    #[error("corrupt dataset at {path}: {source}")]
    CorruptDataset {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

/// A single failed query attempt, kept for error annotation and for the
/// misconfigured-origin diagnosis.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailureEvent {
    /// "timeout" or "refused".
    pub kind: &'static str,
    /// The resolver the attempt was issued against.
    pub nameserver: String,
    pub detail: String,
}

impl std::fmt::Display for FailureEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} via {}: {}", self.kind, self.nameserver, self.detail)
    }
}

/// Errors surfaced by the query executor.
///
/// `Timeout` and `Refused` are raised only once the retry budget is
/// exhausted (and can be suppressed per call); `MisconfiguredOrigin`
/// short-circuits the retry loop the moment both failure kinds have been
/// seen for the same query.
#[derive(Error, Debug)]
pub enum QueryError {
    /// Every attempt timed out; the listed resolvers were pruned from the
    /// pool.
    #[error("query for {query} timed out; unresponsive resolvers: {nameservers:?}")]
    Timeout {
        query: String,
        nameservers: Vec<String>,
    },

    /// Every attempt was explicitly refused (SERVFAIL or similar) by the
    /// listed resolvers.
    #[error("no nameservers would answer {query}; refused by: {nameservers:?}")]
    Refused {
        query: String,
        nameservers: Vec<String>,
    },

    /// Both a timeout and an explicit refusal occurred for the same query.
    /// That co-occurrence almost always means the queried domain's own DNS
    /// delegation is broken, not the resolver pool.
    #[error("suspected misconfigured DNS for {query}: {events:?}")]
    MisconfiguredOrigin {
        query: String,
        events: Vec<FailureEvent>,
    },

    /// The name does not exist (NXDOMAIN). Only surfaced when the caller
    /// opted in.
    #[error("name not found: {0}")]
    NameNotFound(String),

    /// The name exists but has no records of the requested type. Only
    /// surfaced when the caller opted in.
    #[error("no answer for {0}")]
    NoAnswer(String),

    /// The underlying exchange failed in a way the retry loop does not
    /// handle (e.g. a malformed query name).
    #[error("DNS exchange error for {query}: {detail}")]
    Exchange { query: String, detail: String },

    /// The resolver pool has no candidates left to query.
    #[error("resolver pool is empty")]
    EmptyPool,
}
