use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::Duration;

use crate::dns::client::DnsUdpClient;
use crate::dns::external::{ExternalToolResolver, PlatformResolver};
use crate::dns::name::NameDecoding;
use crate::dns::resolve::{DnsResolver, UdpResolver};

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Google, Cloudflare, Google secondary
pub const DEFAULT_SERVERS: [Ipv4Addr; 3] = [
    Ipv4Addr::new(8, 8, 8, 8),
    Ipv4Addr::new(1, 1, 1, 1),
    Ipv4Addr::new(8, 8, 4, 4),
];

#[derive(Clone, Debug)]
pub struct ResolverConfig {
    /// Queried in order until one yields records
    pub servers: Vec<SocketAddr>,
    /// Receive timeout per server
    pub timeout: Duration,
    pub randomize_id: bool,
    pub verify_response: bool,
    pub name_decoding: NameDecoding,
    /// Fall back to external tools and the system resolver when the wire
    /// path comes up empty
    pub external_fallback: bool,
}

impl Default for ResolverConfig {
    fn default() -> ResolverConfig {
        ResolverConfig {
            servers: DEFAULT_SERVERS
                .iter()
                .map(|x| SocketAddr::new(IpAddr::V4(*x), 53))
                .collect(),
            timeout: DEFAULT_TIMEOUT,
            randomize_id: true,
            verify_response: true,
            name_decoding: NameDecoding::SingleJump,
            external_fallback: true,
        }
    }
}

impl ResolverConfig {
    /// Resolution strategies in the order they should be tried.
    pub fn create_resolvers(&self) -> Vec<Box<dyn DnsResolver + Send + Sync>> {
        let client = DnsUdpClient::new(self.timeout, self.verify_response);

        let mut resolvers: Vec<Box<dyn DnsResolver + Send + Sync>> =
            vec![Box::new(UdpResolver::new(self.clone(), client))];

        if self.external_fallback {
            resolvers.push(Box::new(ExternalToolResolver::new(self.timeout)));
            resolvers.push(Box::new(PlatformResolver));
        }

        resolvers
    }
}

/// Parse a server given as `ip` or `ip:port`, defaulting to port 53.
pub fn parse_server(server: &str) -> Option<SocketAddr> {
    if let Ok(addr) = server.parse::<SocketAddr>() {
        return Some(addr);
    }

    server
        .parse::<IpAddr>()
        .ok()
        .map(|ip| SocketAddr::new(ip, 53))
}
