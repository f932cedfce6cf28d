//! Resolver pool and resilient query execution.
//!
//! The pool owns the working set of candidate resolver IPs and prunes the
//! ones that prove unresponsive. The executor issues a query through an
//! ephemeral per-attempt resolver, retries on transient failure, and
//! distinguishes "the queried domain is broken" from "this resolver is bad".

mod exchange;
mod executor;
mod pool;

// Re-export public API
pub use exchange::{DnsExchange, HickoryExchange, LookupFailure};
pub use executor::{resolve, FailurePolicy, QueryOptions};
pub use pool::{ResolverPool, SelectionMode};

#[cfg(test)]
pub(crate) use exchange::ScriptedExchange;
