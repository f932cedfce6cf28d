//! The wire seam: one query attempt against one ephemeral resolver config.

use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use async_trait::async_trait;
use hickory_resolver::config::{NameServerConfig, Protocol, ResolverConfig, ResolverOpts};
use hickory_resolver::error::{ResolveError, ResolveErrorKind};
use hickory_resolver::proto::op::ResponseCode;
use hickory_resolver::proto::rr::RecordType;
use hickory_resolver::TokioAsyncResolver;

use crate::config::DNS_TIMEOUT_SECS;

/// Why a single query attempt failed, as far as the retry loop cares.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupFailure {
    /// NXDOMAIN: the name definitively does not exist.
    NoSuchName,
    /// The name exists but holds no records of the requested type.
    NoAnswer,
    /// The resolver explicitly refused or failed the query (SERVFAIL etc.).
    Refused(String),
    /// No response within the attempt's time budget.
    Timeout(String),
    /// Anything the retry loop does not handle (bad query name, protocol
    /// errors).
    Other(String),
}

/// A single DNS exchange against a caller-chosen set of nameservers.
///
/// The executor owns retry policy, resolver selection, and pool pruning;
/// implementations only perform one attempt and classify its failure.
#[async_trait]
pub trait DnsExchange: Send + Sync {
    /// Issues one query against the given nameservers, returning decoded
    /// answer values of the requested record type.
    async fn lookup(
        &self,
        nameservers: &[String],
        query_name: &str,
        record_type: RecordType,
    ) -> Result<Vec<String>, LookupFailure>;
}

/// Production exchange: builds an ephemeral `hickory-resolver` instance per
/// attempt.
///
/// `attempts` is pinned to 1 and negative responses are not trusted across
/// servers, so every retry and failover decision stays in the executor
/// instead of being duplicated inside the resolver library.
pub struct HickoryExchange {
    timeout: Duration,
}

impl HickoryExchange {
    pub fn new(timeout: Duration) -> Self {
        HickoryExchange { timeout }
    }
}

impl Default for HickoryExchange {
    fn default() -> Self {
        HickoryExchange::new(Duration::from_secs(DNS_TIMEOUT_SECS))
    }
}

#[async_trait]
impl DnsExchange for HickoryExchange {
    async fn lookup(
        &self,
        nameservers: &[String],
        query_name: &str,
        record_type: RecordType,
    ) -> Result<Vec<String>, LookupFailure> {
        let mut config = ResolverConfig::new();
        for ip in nameservers {
            let addr: IpAddr = ip
                .parse()
                .map_err(|err| LookupFailure::Other(format!("bad resolver IP {ip}: {err}")))?;
            config.add_name_server(NameServerConfig::new(
                SocketAddr::new(addr, 53),
                Protocol::Udp,
            ));
        }

        let mut opts = ResolverOpts::default();
        opts.timeout = self.timeout;
        opts.attempts = 1;
        opts.ndots = 0;

        let resolver = TokioAsyncResolver::tokio(config, opts);
        match resolver.lookup(query_name, record_type).await {
            Ok(lookup) => Ok(lookup
                .iter()
                .filter(|rdata| rdata.record_type() == record_type)
                .map(|rdata| rdata.to_string().trim().to_string())
                .collect()),
            Err(err) => Err(classify(&err)),
        }
    }
}

fn classify(err: &ResolveError) -> LookupFailure {
    match err.kind() {
        ResolveErrorKind::NoRecordsFound { response_code, .. } => match *response_code {
            ResponseCode::NXDomain => LookupFailure::NoSuchName,
            ResponseCode::ServFail | ResponseCode::Refused | ResponseCode::NotImp => {
                LookupFailure::Refused(err.to_string())
            }
            _ => LookupFailure::NoAnswer,
        },
        ResolveErrorKind::Timeout => LookupFailure::Timeout(err.to_string()),
        _ => LookupFailure::Other(err.to_string()),
    }
}

/// Test double that replays a scripted sequence of attempt outcomes and
/// counts how many attempts were made.
#[cfg(test)]
pub(crate) struct ScriptedExchange {
    script: std::sync::Mutex<std::collections::VecDeque<Result<Vec<String>, LookupFailure>>>,
    calls: std::sync::atomic::AtomicUsize,
}

#[cfg(test)]
impl ScriptedExchange {
    pub(crate) fn new(
        outcomes: impl IntoIterator<Item = Result<Vec<String>, LookupFailure>>,
    ) -> Self {
        ScriptedExchange {
            script: std::sync::Mutex::new(outcomes.into_iter().collect()),
            calls: std::sync::atomic::AtomicUsize::new(0),
        }
    }

    pub(crate) fn calls(&self) -> usize {
        self.calls.load(std::sync::atomic::Ordering::SeqCst)
    }
}

#[cfg(test)]
#[async_trait]
impl DnsExchange for ScriptedExchange {
    async fn lookup(
        &self,
        _nameservers: &[String],
        _query_name: &str,
        _record_type: RecordType,
    ) -> Result<Vec<String>, LookupFailure> {
        self.calls
            .fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        self.script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(LookupFailure::Other("script exhausted".into())))
    }
}
