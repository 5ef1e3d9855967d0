//! fallback strategies that bypass the wire protocol code
//!
//! `ExternalToolResolver` runs `dig` and reads its answer section, while
//! `PlatformResolver` asks the operating system's resolver for addresses and
//! for the names of addresses. Neither is as precise as `UdpResolver`, so
//! they only run once it has come up empty.

use std::io::{Error, ErrorKind};
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, ToSocketAddrs};
use std::process::Command;
use std::time::Duration;

use dns_lookup::lookup_addr;
use log::debug;

use crate::dns::protocol::{DnsRecord, QueryType, RecordData};
use crate::dns::resolve::{DnsResolver, LookupError, Result};

/// Exit status of `dig` when no server replied
const DIG_NO_REPLY: i32 = 9;

pub struct ExternalToolResolver {
    program: String,
    timeout: Duration,
}

impl ExternalToolResolver {
    pub fn new(timeout: Duration) -> ExternalToolResolver {
        ExternalToolResolver {
            program: "dig".to_string(),
            timeout,
        }
    }

    fn run(&self, domain: &str, qtype: QueryType) -> Result<String> {
        let output = Command::new(&self.program)
            .arg("+noall")
            .arg("+answer")
            .arg("+tries=1")
            .arg(format!("+time={}", self.timeout.as_secs().max(1)))
            .arg(domain)
            .arg(qtype.name())
            .output()
            .map_err(|e| match e.kind() {
                ErrorKind::NotFound => {
                    LookupError::Unsupported(format!("{} is not installed", self.program))
                }
                _ => LookupError::from(e),
            })?;

        match output.status.code() {
            Some(0) => {}
            Some(DIG_NO_REPLY) => return Err(LookupError::Timeout),
            _ => {
                return Err(LookupError::Network(Error::new(
                    ErrorKind::Other,
                    format!("{} exited with {}", self.program, output.status),
                )))
            }
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

impl DnsResolver for ExternalToolResolver {
    fn name(&self) -> &'static str {
        "dig"
    }

    fn resolve(&self, domain: &str, qtype: QueryType) -> Result<Vec<DnsRecord>> {
        if let QueryType::UNKNOWN(x) = qtype {
            return Err(LookupError::UnknownRecordType(x.to_string()));
        }

        let output = self.run(domain, qtype)?;
        let records = parse_dig_answer(&output, qtype);
        debug!("{} produced {} {} records for {}", self.program, records.len(), qtype, domain);

        if records.is_empty() {
            Err(LookupError::NoRecords)
        } else {
            Ok(records)
        }
    }
}

/// Split off the first `n` whitespace separated columns, returning them along
/// with the untouched remainder of the line.
fn split_columns(line: &str, n: usize) -> Option<(Vec<&str>, &str)> {
    let mut columns = Vec::with_capacity(n);
    let mut rest = line.trim_start();

    for _ in 0..n {
        if rest.is_empty() {
            return None;
        }
        let end = rest.find(char::is_whitespace).unwrap_or_else(|| rest.len());
        columns.push(&rest[..end]);
        rest = rest[end..].trim_start();
    }

    Some((columns, rest.trim_end()))
}

fn strip_root(name: &str) -> String {
    name.trim_end_matches('.').to_string()
}

/// Concatenate the quoted strings of a TXT presentation, honouring
/// backslash escapes. Unquoted input is taken as is.
fn unquote_txt(rdata: &str) -> String {
    if !rdata.contains('"') {
        return rdata.to_string();
    }

    let mut text = String::new();
    let mut in_quotes = false;
    let mut chars = rdata.chars();
    while let Some(c) = chars.next() {
        match c {
            '"' => in_quotes = !in_quotes,
            '\\' if in_quotes => {
                if let Some(escaped) = chars.next() {
                    text.push(escaped);
                }
            }
            _ if in_quotes => text.push(c),
            _ => {}
        }
    }

    text
}

fn parse_rdata(qtype: QueryType, rdata: &str) -> Option<RecordData> {
    match qtype {
        QueryType::A => rdata.parse::<Ipv4Addr>().ok().map(RecordData::A),
        QueryType::AAAA => rdata.parse::<Ipv6Addr>().ok().map(RecordData::AAAA),
        QueryType::MX => {
            let mut parts = rdata.split_whitespace();
            let priority = parts.next()?.parse::<u16>().ok()?;
            let host = strip_root(parts.next()?);
            Some(RecordData::MX { priority, host })
        }
        QueryType::NS => Some(RecordData::NS(strip_root(rdata))),
        QueryType::CNAME => Some(RecordData::CNAME(strip_root(rdata))),
        QueryType::PTR => Some(RecordData::PTR(strip_root(rdata))),
        QueryType::TXT => Some(RecordData::TXT(unquote_txt(rdata))),
        QueryType::SOA => Some(RecordData::SOA),
        QueryType::UNKNOWN(_) => None,
    }
}

/// Parse the answer lines printed by `dig +noall +answer`:
/// `owner ttl class type rdata...`. Lines of other types, such as the CNAME
/// chain leading to the answer, are ignored.
pub fn parse_dig_answer(output: &str, qtype: QueryType) -> Vec<DnsRecord> {
    let mut records = Vec::new();

    for line in output.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with(';') {
            continue;
        }

        let (columns, rdata) = match split_columns(line, 4) {
            Some(x) => x,
            None => continue,
        };

        let ttl = match columns[1].parse::<u32>() {
            Ok(x) => x,
            Err(_) => continue,
        };

        if !columns[3].eq_ignore_ascii_case(qtype.name()) || rdata.is_empty() {
            continue;
        }

        if let Some(data) = parse_rdata(qtype, rdata) {
            if !data.to_string().is_empty() {
                records.push(DnsRecord::new(strip_root(columns[0]), ttl, data));
            }
        }
    }

    records
}

/// Lookups through the operating system resolver: A and AAAA by name, and
/// host names by address. The system interface reports neither owner names
/// nor TTLs.
pub struct PlatformResolver;

impl DnsResolver for PlatformResolver {
    fn name(&self) -> &'static str {
        "system"
    }

    fn resolve(&self, domain: &str, qtype: QueryType) -> Result<Vec<DnsRecord>> {
        let want_v4 = match qtype {
            QueryType::A => true,
            QueryType::AAAA => false,
            _ => return Err(LookupError::Unsupported(format!("{} via {}", qtype, self.name()))),
        };

        let mut records: Vec<DnsRecord> = Vec::new();
        for addr in (domain, 0).to_socket_addrs()? {
            let data = match addr.ip() {
                IpAddr::V4(ip) if want_v4 => RecordData::A(ip),
                IpAddr::V6(ip) if !want_v4 => RecordData::AAAA(ip),
                _ => continue,
            };

            if !records.iter().any(|x| x.data == data) {
                records.push(DnsRecord::new(domain.to_string(), 0, data));
            }
        }

        if records.is_empty() {
            Err(LookupError::NoRecords)
        } else {
            Ok(records)
        }
    }

    fn resolve_addr(&self, addr: IpAddr) -> Result<Vec<DnsRecord>> {
        let host = lookup_addr(&addr)?;
        debug!("system resolver named {} as {}", addr, host);

        // getnameinfo falls back to the numeric form when no name is known
        if host.is_empty() || host.parse::<IpAddr>().is_ok() {
            return Err(LookupError::NoRecords);
        }

        Ok(vec![DnsRecord::new(
            addr.to_string(),
            0,
            RecordData::PTR(strip_root(&host)),
        )])
    }
}
