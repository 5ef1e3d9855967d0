//! sanity checks for user supplied names and addresses

use regex::Regex;

const DOMAIN_PATTERN: &str = r"^(?:[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?\.)*[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?$";
const IPV4_PATTERN: &str = r"^(?:(?:25[0-5]|2[0-4][0-9]|[01]?[0-9][0-9]?)\.){3}(?:25[0-5]|2[0-4][0-9]|[01]?[0-9][0-9]?)$";
const IPV6_PATTERN: &str = r"^(?:[0-9a-fA-F]{1,4}:){7}[0-9a-fA-F]{1,4}$";

/// Patterns for command line input, compiled once up front.
pub struct Validator {
    domain: Regex,
    ipv4: Regex,
    ipv6: Regex,
}

impl Validator {
    pub fn new() -> Result<Validator, regex::Error> {
        Ok(Validator {
            domain: Regex::new(DOMAIN_PATTERN)?,
            ipv4: Regex::new(IPV4_PATTERN)?,
            ipv6: Regex::new(IPV6_PATTERN)?,
        })
    }

    pub fn is_valid_domain(&self, domain: &str) -> bool {
        self.domain.is_match(domain)
    }

    /// Dotted IPv4 or fully written out IPv6.
    pub fn is_valid_ip(&self, ip: &str) -> bool {
        self.ipv4.is_match(ip) || self.ipv6.is_match(ip)
    }
}
