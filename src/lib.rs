//! resolver_curator library: resolver-list curation and resilient DNS
//! querying.
//!
//! Two independent subsystems:
//!
//! - the **pipeline** ingests candidate nameserver lists from remote
//!   sources, deduplicates and merges them against previously persisted
//!   state, filters by a reliability threshold, optionally backfills missing
//!   reverse-DNS hostnames, and persists a change-aware dataset plus a flat
//!   resolver list;
//! - the **query executor** rotates across a resolver pool with bounded
//!   retries, pruning unresponsive resolvers and distinguishing a
//!   misconfigured origin domain from resolver flakiness.
//!
//! # Example
//!
//! ```no_run
//! use resolver_curator::{run_pipeline, Config};
//!
//! # #[tokio::main]
//! # async fn main() -> anyhow::Result<()> {
//! let config = Config {
//!     flat_enabled: true,
//!     ..Config::default()
//! };
//! let report = run_pipeline(&config).await?;
//! println!(
//!     "{} reliable resolvers ({} rejected) from {} changed source(s)",
//!     report.reliable, report.unreliable, report.sources_processed
//! );
//! # Ok(())
//! # }
//! ```
//!
//! This library requires a Tokio runtime.

pub mod config;
mod error_handling;
mod fetch;
pub mod initialization;
mod models;
mod parse;
mod persist;
mod pipeline;
mod query;

// Re-export public API
pub use config::{Config, LogFormat, LogLevel};
pub use error_handling::{FailureEvent, InitializationError, PipelineError, QueryError};
pub use models::{Dataset, ResolverRecord, RunMetadata, SourceMeta};
pub use pipeline::{run_pipeline, reverse_query_name, PipelineReport, ReverseLookupEnricher, WritePlan};
pub use query::{
    resolve, DnsExchange, FailurePolicy, HickoryExchange, LookupFailure, QueryOptions,
    ResolverPool, SelectionMode,
};
