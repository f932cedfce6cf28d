//! Reverse-DNS backfill for flat-source records missing hostnames.

use std::net::IpAddr;

use hickory_resolver::proto::rr::RecordType;
use log::debug;

use crate::error_handling::QueryError;
use crate::query::{resolve, DnsExchange, FailurePolicy, QueryOptions, ResolverPool, SelectionMode};

/// Derives the PTR query name for an IP address
/// (`4.3.2.1.in-addr.arpa.` / nibble-reversed `ip6.arpa.`).
pub fn reverse_query_name(addr: IpAddr) -> String {
    match addr {
        IpAddr::V4(v4) => {
            let [a, b, c, d] = v4.octets();
            format!("{d}.{c}.{b}.{a}.in-addr.arpa.")
        }
        IpAddr::V6(v6) => {
            let mut name = String::with_capacity(74);
            for byte in v6.octets().iter().rev() {
                name.push(char::from_digit((byte & 0x0f) as u32, 16).unwrap_or('0'));
                name.push('.');
                name.push(char::from_digit((byte >> 4) as u32, 16).unwrap_or('0'));
                name.push('.');
            }
            name.push_str("ip6.arpa.");
            name
        }
    }
}

/// Performs reverse lookups through the shared resolver pool, with one
/// fresh-resolver retry on transient failure.
pub struct ReverseLookupEnricher<'a> {
    pool: &'a mut ResolverPool,
    exchange: &'a dyn DnsExchange,
}

impl<'a> ReverseLookupEnricher<'a> {
    pub fn new(pool: &'a mut ResolverPool, exchange: &'a dyn DnsExchange) -> Self {
        ReverseLookupEnricher { pool, exchange }
    }

    /// Looks up the hostname for `ip`.
    ///
    /// - `Ok(Some(name))`: a PTR record was found;
    /// - `Ok(None)`: the reverse name definitively does not exist;
    /// - `Err(text)`: any other failure, described for recording on the
    ///   record. Never aborts the enrichment pass.
    pub async fn hostname_for(&mut self, ip: &str) -> Result<Option<String>, String> {
        let addr: IpAddr = ip
            .parse()
            .map_err(|err| format!("invalid IP {ip}: {err}"))?;
        let rname = reverse_query_name(addr);

        let options = QueryOptions {
            retries: 1,
            selection: SelectionMode::RandomOne,
            policy: FailurePolicy {
                raise_name_not_found: true,
                raise_no_answer: true,
                ..FailurePolicy::default()
            },
        };

        let mut outcome = resolve(
            self.pool,
            self.exchange,
            &rname,
            RecordType::PTR,
            &options,
        )
        .await;

        // One retry against a freshly chosen resolver on transient failure.
        if matches!(
            outcome,
            Err(QueryError::Timeout { .. }) | Err(QueryError::Refused { .. })
        ) {
            outcome = resolve(
                self.pool,
                self.exchange,
                &rname,
                RecordType::PTR,
                &options,
            )
            .await;
        }

        let result = match outcome {
            Ok(answers) => Ok(answers.into_iter().next()),
            Err(QueryError::NameNotFound(_)) => Ok(None),
            Err(err) => Err(err.to_string()),
        };
        debug!("{} --> {} --> {:?}", ip, rname, result);
        result
    }
}
