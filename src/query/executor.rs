//! The retry state machine over the resolver pool.

use std::collections::BTreeSet;

use hickory_resolver::proto::rr::RecordType;
use log::{debug, error};

use crate::config::DNS_RETRIES;
use crate::error_handling::{FailureEvent, QueryError};

use super::exchange::{DnsExchange, LookupFailure};
use super::pool::{ResolverPool, SelectionMode};

/// Which failures the caller wants surfaced versus swallowed.
///
/// By default no-data conditions (NXDOMAIN, empty answer) come back as an
/// empty set, while exhausted timeout/refusal budgets are raised. The query
/// executor is shared by callers with different risk tolerance, so both
/// directions are opt-in per call.
#[derive(Debug, Clone, Copy, Default)]
pub struct FailurePolicy {
    /// Surface NXDOMAIN as `QueryError::NameNotFound` instead of an empty
    /// result.
    pub raise_name_not_found: bool,
    /// Surface an empty answer as `QueryError::NoAnswer` instead of an empty
    /// result.
    pub raise_no_answer: bool,
    /// Swallow an exhausted refusal budget, returning what was gathered.
    pub suppress_refused: bool,
    /// Swallow an exhausted timeout budget, returning what was gathered.
    pub suppress_timeout: bool,
}

/// Per-call knobs for [`resolve`].
#[derive(Debug, Clone, Copy)]
pub struct QueryOptions {
    /// Total attempt budget. A value of 0 is normalized to exactly one
    /// attempt (no retry).
    pub retries: usize,
    pub selection: SelectionMode,
    pub policy: FailurePolicy,
}

impl Default for QueryOptions {
    fn default() -> Self {
        QueryOptions {
            retries: DNS_RETRIES,
            selection: SelectionMode::default(),
            policy: FailurePolicy::default(),
        }
    }
}

/// Resolves `query_name` with bounded retries across the pool.
///
/// Each attempt selects resolvers per `options.selection` and issues one
/// query. Answers are deduplicated into a set; order is not guaranteed.
///
/// Failure handling, per attempt:
/// - `NoSuchName` / `NoAnswer` end the loop immediately (no-data, not a
///   resolver problem);
/// - `Refused` records the resolver and retries;
/// - `Timeout` prunes the resolver from the pool permanently and retries;
/// - once both a timeout and a refusal have been seen for this one query,
///   the co-occurrence is treated as evidence that the queried domain's own
///   delegation is broken and `MisconfiguredOrigin` is raised without
///   consuming the remaining budget.
///
/// # Errors
///
/// `Timeout` / `Refused` once the attempt budget is exhausted (unless
/// suppressed), `MisconfiguredOrigin` on the mixed-failure short circuit,
/// `NameNotFound` / `NoAnswer` when opted in, `EmptyPool` when no candidate
/// resolvers remain.
pub async fn resolve(
    pool: &mut ResolverPool,
    exchange: &dyn DnsExchange,
    query_name: &str,
    record_type: RecordType,
    options: &QueryOptions,
) -> Result<BTreeSet<String>, QueryError> {
    let attempts = if options.retries == 0 {
        1
    } else {
        options.retries
    };

    let mut answers = BTreeSet::new();
    let mut timed_out: Vec<String> = Vec::new();
    let mut refused: Vec<String> = Vec::new();
    let mut events: Vec<FailureEvent> = Vec::new();

    for attempt in 0..attempts {
        let nameservers = pool.select(options.selection)?;
        let primary = nameservers[0].clone();

        match exchange.lookup(&nameservers, query_name, record_type).await {
            Ok(values) => {
                answers.extend(values.into_iter().filter(|v| !v.is_empty()));
                break;
            }
            Err(LookupFailure::NoSuchName) => {
                debug!("NXDOMAIN: {}", query_name);
                if options.policy.raise_name_not_found {
                    return Err(QueryError::NameNotFound(query_name.to_string()));
                }
                break;
            }
            Err(LookupFailure::NoAnswer) => {
                debug!("no answer: {}", query_name);
                if options.policy.raise_no_answer {
                    return Err(QueryError::NoAnswer(query_name.to_string()));
                }
                break;
            }
            Err(LookupFailure::Refused(detail)) => {
                events.push(FailureEvent {
                    kind: "refused",
                    nameserver: primary.clone(),
                    detail,
                });
                refused.push(primary);

                if !timed_out.is_empty() {
                    return Err(QueryError::MisconfiguredOrigin {
                        query: query_name.to_string(),
                        events,
                    });
                }
                if attempt + 1 < attempts {
                    continue;
                }
                error!("refused: {}  {:?}", query_name, refused);
                if options.policy.suppress_refused {
                    break;
                }
                return Err(QueryError::Refused {
                    query: query_name.to_string(),
                    nameservers: refused,
                });
            }
            Err(LookupFailure::Timeout(detail)) => {
                // A resolver that times out once is assumed persistently bad
                // for the remainder of process lifetime.
                pool.remove(&primary);
                events.push(FailureEvent {
                    kind: "timeout",
                    nameserver: primary.clone(),
                    detail,
                });
                timed_out.push(primary);

                if !refused.is_empty() {
                    return Err(QueryError::MisconfiguredOrigin {
                        query: query_name.to_string(),
                        events,
                    });
                }
                if attempt + 1 < attempts {
                    continue;
                }
                error!("timeout: {}  {:?}", query_name, timed_out);
                if options.policy.suppress_timeout {
                    break;
                }
                return Err(QueryError::Timeout {
                    query: query_name.to_string(),
                    nameservers: timed_out,
                });
            }
            Err(LookupFailure::Other(detail)) => {
                return Err(QueryError::Exchange {
                    query: query_name.to_string(),
                    detail,
                });
            }
        }
    }

    Ok(answers)
}
