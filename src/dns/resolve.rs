//! resolution strategies and the wire protocol resolver

use std::io::ErrorKind;
use std::net::{IpAddr, Ipv4Addr};

use derive_more::Display;
use log::{debug, info};
use rand::random;

use crate::dns::client::{DnsClient, DnsUdpClient};
use crate::dns::context::ResolverConfig;
use crate::dns::protocol::{DnsRecord, QueryType};
use crate::dns::query::{build_query, LEGACY_TRANSACTION_ID};
use crate::dns::response::ResponseParser;

#[derive(Debug, Display)]
pub enum LookupError {
    #[display(fmt = "timed out waiting for a reply")]
    Timeout,
    #[display(fmt = "network error: {}", _0)]
    Network(std::io::Error),
    #[display(fmt = "malformed response")]
    MalformedResponse,
    #[display(fmt = "no records found")]
    NoRecords,
    #[display(fmt = "unknown record type: {}", _0)]
    UnknownRecordType(String),
    #[display(fmt = "invalid input: {}", _0)]
    InvalidInput(String),
    /// The strategy cannot answer this kind of query at all
    #[display(fmt = "not supported: {}", _0)]
    Unsupported(String),
}

impl std::error::Error for LookupError {}

impl From<std::io::Error> for LookupError {
    fn from(err: std::io::Error) -> LookupError {
        match err.kind() {
            ErrorKind::WouldBlock | ErrorKind::TimedOut => LookupError::Timeout,
            _ => LookupError::Network(err),
        }
    }
}

pub type Result<T> = std::result::Result<T, LookupError>;

/// Name to query for the PTR record of an IPv4 address.
pub fn reverse_name(addr: Ipv4Addr) -> String {
    let octets = addr.octets();
    format!(
        "{}.{}.{}.{}.in-addr.arpa",
        octets[3], octets[2], octets[1], octets[0]
    )
}

/// A way of answering queries. Implementations never return an empty list on
/// success: an empty result is reported as `LookupError::NoRecords`.
pub trait DnsResolver {
    /// Short label used in log output
    fn name(&self) -> &'static str;

    fn resolve(&self, domain: &str, qtype: QueryType) -> Result<Vec<DnsRecord>>;

    fn resolve_name(&self, domain: &str, type_name: &str) -> Result<Vec<DnsRecord>> {
        let qtype = QueryType::from_name(type_name)
            .ok_or_else(|| LookupError::UnknownRecordType(type_name.to_string()))?;

        self.resolve(domain, qtype)
    }

    /// Host names registered for an address. IPv4 goes through a PTR query
    /// on the `in-addr.arpa` name; IPv6 is left to strategies that can ask
    /// the system resolver.
    fn resolve_addr(&self, addr: IpAddr) -> Result<Vec<DnsRecord>> {
        match addr {
            IpAddr::V4(v4) => self.resolve(&reverse_name(v4), QueryType::PTR),
            IpAddr::V6(_) => Err(LookupError::Unsupported(format!(
                "reverse lookup of {} via {}",
                addr,
                self.name()
            ))),
        }
    }

    /// Answers rendered as text, with every failure folded into an empty list.
    fn resolve_strings(&self, domain: &str, type_name: &str) -> Vec<String> {
        match self.resolve_name(domain, type_name) {
            Ok(records) => records.iter().map(|x| x.to_string()).collect(),
            Err(e) => {
                debug!("{} lookup of {} failed: {}", type_name, domain, e);
                Vec::new()
            }
        }
    }
}

/// Queries the configured servers directly over UDP, one after another,
/// until one of them produces answers of the requested type.
pub struct UdpResolver {
    config: ResolverConfig,
    client: DnsUdpClient,
}

impl UdpResolver {
    pub fn new(config: ResolverConfig, client: DnsUdpClient) -> UdpResolver {
        UdpResolver { config, client }
    }

    #[cfg(test)]
    pub fn client(&self) -> &DnsUdpClient {
        &self.client
    }
}

impl DnsResolver for UdpResolver {
    fn name(&self) -> &'static str {
        "udp"
    }

    fn resolve(&self, domain: &str, qtype: QueryType) -> Result<Vec<DnsRecord>> {
        if let QueryType::UNKNOWN(x) = qtype {
            return Err(LookupError::UnknownRecordType(x.to_string()));
        }

        let id = if self.config.randomize_id {
            random::<u16>()
        } else {
            LEGACY_TRANSACTION_ID
        };
        let query = build_query(domain, qtype, id)?;
        let parser = ResponseParser::new(qtype).with_decoding(self.config.name_decoding);

        // A server that answered without records outranks any failure
        let mut answered = false;
        let mut last_error = LookupError::NoRecords;

        for server in &self.config.servers {
            let response = match self.client.send_query(&query, *server) {
                Ok(x) => x,
                Err(e) => {
                    info!("{} {} via {} failed: {}", qtype, domain, server, e);
                    last_error = e;
                    continue;
                }
            };

            match parser.try_parse(&response) {
                Ok(records) if !records.is_empty() => {
                    debug!("{} {} answered by {}", qtype, domain, server);
                    return Ok(records);
                }
                Ok(_) => {
                    debug!("{} {} via {}: no records", qtype, domain, server);
                    answered = true;
                }
                Err(e) => {
                    info!("{} {} via {}: {}", qtype, domain, server, e);
                    last_error = LookupError::MalformedResponse;
                }
            }
        }

        debug!(
            "{} {}: servers exhausted ({} queries sent, {} failed so far)",
            qtype,
            domain,
            self.client.get_sent_count(),
            self.client.get_failed_count()
        );

        if answered {
            Err(LookupError::NoRecords)
        } else {
            Err(last_error)
        }
    }
}
