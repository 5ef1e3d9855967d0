//! the lookup facade used by the command line and the web api

use std::net::IpAddr;

use log::{debug, info};

use crate::dns::context::ResolverConfig;
use crate::dns::protocol::{DnsRecord, QueryType};
use crate::dns::resolve::{DnsResolver, LookupError, Result};

/// Tries a chain of resolution strategies in order, settling for the first
/// one that produces records.
pub struct DnsLookup {
    resolvers: Vec<Box<dyn DnsResolver + Send + Sync>>,
}

impl DnsLookup {
    pub fn new(config: &ResolverConfig) -> DnsLookup {
        DnsLookup::with_resolvers(config.create_resolvers())
    }

    pub fn with_resolvers(resolvers: Vec<Box<dyn DnsResolver + Send + Sync>>) -> DnsLookup {
        DnsLookup { resolvers }
    }

    /// Look up every common record type, one after the other.
    pub fn lookup_all(&self, domain: &str) -> Vec<(QueryType, Result<Vec<DnsRecord>>)> {
        QueryType::LOOKUP_ALL
            .iter()
            .map(|qtype| (*qtype, self.resolve(domain, *qtype)))
            .collect()
    }

    /// Host names for an IPv4 or IPv6 address given in text form.
    pub fn reverse_lookup(&self, ip: &str) -> Result<Vec<DnsRecord>> {
        let addr = ip
            .parse::<IpAddr>()
            .map_err(|_| LookupError::InvalidInput(format!("{} is not an IP address", ip)))?;

        self.resolve_addr(addr)
    }

    /// Run `query` against each strategy until one returns records.
    ///
    /// When all of them come up empty, `NoRecords` is reported if any
    /// strategy got an actual answer. Otherwise the last failure is, and
    /// strategies that cannot handle the query only count when nothing else
    /// was tried.
    fn first_answer<F>(&self, what: &str, query: F) -> Result<Vec<DnsRecord>>
    where
        F: Fn(&dyn DnsResolver) -> Result<Vec<DnsRecord>>,
    {
        let mut answered = false;
        let mut last_error = None;
        let mut unsupported = None;

        for resolver in &self.resolvers {
            match query(resolver.as_ref()) {
                Ok(ref records) if records.is_empty() => answered = true,
                Ok(records) => {
                    info!("{}: {} records via {}", what, records.len(), resolver.name());
                    return Ok(records);
                }
                Err(e @ LookupError::UnknownRecordType(_)) | Err(e @ LookupError::InvalidInput(_)) => {
                    return Err(e);
                }
                Err(LookupError::NoRecords) => {
                    debug!("{} via {}: no records", what, resolver.name());
                    answered = true;
                }
                Err(e @ LookupError::Unsupported(_)) => {
                    debug!("{} skipped by {}: {}", what, resolver.name(), e);
                    unsupported = Some(e);
                }
                Err(e) => {
                    debug!("{} via {}: {}", what, resolver.name(), e);
                    last_error = Some(e);
                }
            }
        }

        if answered {
            return Err(LookupError::NoRecords);
        }

        Err(last_error.or(unsupported).unwrap_or(LookupError::NoRecords))
    }
}

impl DnsResolver for DnsLookup {
    fn name(&self) -> &'static str {
        "chain"
    }

    fn resolve(&self, domain: &str, qtype: QueryType) -> Result<Vec<DnsRecord>> {
        let what = format!("{} {}", qtype, domain);
        self.first_answer(&what, |resolver| resolver.resolve(domain, qtype))
    }

    fn resolve_addr(&self, addr: IpAddr) -> Result<Vec<DnsRecord>> {
        let what = format!("reverse {}", addr);
        self.first_answer(&what, |resolver| resolver.resolve_addr(addr))
    }
}

#[cfg(test)]
mod tests {

    use super::*;

    use std::net::{Ipv4Addr, SocketAddr, UdpSocket};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    use crate::dns::client::DnsUdpClient;
    use crate::dns::external::PlatformResolver;
    use crate::dns::protocol::RecordData;
    use crate::dns::resolve::UdpResolver;

    #[derive(Clone, Copy)]
    enum Outcome {
        Answer(Ipv4Addr),
        Empty,
        Timeout,
        Unsupported,
    }

    struct FixedResolver {
        calls: Arc<AtomicUsize>,
        outcome: Outcome,
    }

    impl DnsResolver for FixedResolver {
        fn name(&self) -> &'static str {
            "fixed"
        }

        fn resolve(&self, domain: &str, qtype: QueryType) -> Result<Vec<DnsRecord>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match (self.outcome, qtype) {
                (Outcome::Answer(addr), QueryType::A) => Ok(vec![DnsRecord::new(
                    domain.to_string(),
                    60,
                    RecordData::A(addr),
                )]),
                (Outcome::Answer(_), QueryType::PTR) => Ok(vec![DnsRecord::new(
                    domain.to_string(),
                    60,
                    RecordData::PTR(domain.to_string()),
                )]),
                (Outcome::Unsupported, _) => Err(LookupError::Unsupported(qtype.to_string())),
                (Outcome::Timeout, _) => Err(LookupError::Timeout),
                _ => Err(LookupError::NoRecords),
            }
        }
    }

    fn chain(outcomes: &[Outcome]) -> (DnsLookup, Vec<Arc<AtomicUsize>>) {
        let mut counters = Vec::new();
        let mut resolvers: Vec<Box<dyn DnsResolver + Send + Sync>> = Vec::new();
        for outcome in outcomes {
            let calls = Arc::new(AtomicUsize::new(0));
            counters.push(calls.clone());
            resolvers.push(Box::new(FixedResolver {
                calls,
                outcome: *outcome,
            }));
        }

        (DnsLookup::with_resolvers(resolvers), counters)
    }

    #[test]
    fn test_first_non_empty_strategy_wins() {
        let addr = Ipv4Addr::new(10, 0, 0, 1);
        let (lookup, counters) = chain(&[
            Outcome::Timeout,
            Outcome::Answer(addr),
            Outcome::Answer(addr),
        ]);

        let records = lookup.resolve("example.com", QueryType::A).unwrap();
        assert_eq!(RecordData::A(addr), records[0].data);
        assert_eq!(1, counters[0].load(Ordering::SeqCst));
        assert_eq!(1, counters[1].load(Ordering::SeqCst));
        assert_eq!(0, counters[2].load(Ordering::SeqCst));
    }

    #[test]
    fn test_exhausted_chain() {
        let (lookup, _) = chain(&[Outcome::Timeout, Outcome::Timeout]);
        match lookup.resolve("example.com", QueryType::A) {
            Err(LookupError::Timeout) => {}
            other => panic!("expected timeout, got {:?}", other),
        }
        assert!(lookup.resolve_strings("example.com", "A").is_empty());

        let (empty, _) = chain(&[]);
        match empty.resolve("example.com", QueryType::A) {
            Err(LookupError::NoRecords) => {}
            other => panic!("expected no records, got {:?}", other),
        }
    }

    #[test]
    fn test_failure_kind_survives_the_chain() {
        // An empty answer from any strategy means the name has no such records
        let (lookup, _) = chain(&[Outcome::Timeout, Outcome::Empty, Outcome::Unsupported]);
        match lookup.resolve("example.com", QueryType::MX) {
            Err(LookupError::NoRecords) => {}
            other => panic!("expected no records, got {:?}", other),
        }

        // Strategies that cannot handle the type do not mask the failure
        let (lookup, _) = chain(&[Outcome::Timeout, Outcome::Unsupported]);
        match lookup.resolve("example.com", QueryType::MX) {
            Err(LookupError::Timeout) => {}
            other => panic!("expected timeout, got {:?}", other),
        }

        let (lookup, _) = chain(&[Outcome::Unsupported]);
        match lookup.resolve("example.com", QueryType::MX) {
            Err(LookupError::Unsupported(_)) => {}
            other => panic!("expected unsupported, got {:?}", other),
        }
    }

    #[test]
    fn test_silent_server_then_platform_reports_timeout() {
        let silent = UdpSocket::bind("127.0.0.1:0").unwrap();
        let server: SocketAddr = silent.local_addr().unwrap();

        let mut config = ResolverConfig::default();
        config.servers = vec![server];
        config.timeout = Duration::from_millis(100);
        config.external_fallback = false;
        let client = DnsUdpClient::new(config.timeout, config.verify_response);

        let lookup = DnsLookup::with_resolvers(vec![
            Box::new(UdpResolver::new(config, client)),
            Box::new(PlatformResolver),
        ]);

        match lookup.resolve("example.com", QueryType::MX) {
            Err(LookupError::Timeout) => {}
            other => panic!("expected timeout, got {:?}", other),
        }
    }

    #[test]
    fn test_lookup_all_is_sequential_per_type() {
        let (lookup, counters) = chain(&[Outcome::Answer(Ipv4Addr::new(10, 0, 0, 1))]);

        let results = lookup.lookup_all("example.com");
        let types: Vec<QueryType> = results.iter().map(|x| x.0).collect();
        assert_eq!(QueryType::LOOKUP_ALL.to_vec(), types);
        assert!(results[0].1.is_ok());
        assert!(results[1].1.is_err());
        assert_eq!(7, counters[0].load(Ordering::SeqCst));
    }

    #[test]
    fn test_reverse_lookup() {
        let (lookup, counters) = chain(&[Outcome::Answer(Ipv4Addr::new(10, 0, 0, 1))]);

        let records = lookup.reverse_lookup("93.184.216.34").unwrap();
        assert_eq!("34.216.184.93.in-addr.arpa", records[0].domain);
        assert_eq!(1, counters[0].load(Ordering::SeqCst));

        // Only strategies backed by the system resolver take IPv6
        assert!(matches!(
            lookup.reverse_lookup("::1"),
            Err(LookupError::Unsupported(_))
        ));
        assert!(matches!(
            lookup.reverse_lookup("nonsense"),
            Err(LookupError::InvalidInput(_))
        ));
        assert_eq!(1, counters[0].load(Ordering::SeqCst));
    }
}
