//! client for sending DNS queries to other servers

use std::net::{Ipv4Addr, Ipv6Addr, SocketAddr, UdpSocket};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};

use log::debug;

use crate::dns::resolve::{LookupError, Result};
use crate::dns::response::matches_query;

/// Largest datagram we are prepared to receive
const MAX_DATAGRAM: usize = 4096;

pub trait DnsClient {
    fn get_sent_count(&self) -> usize;
    fn get_failed_count(&self) -> usize;

    /// Send an encoded query to `server` and return the raw reply.
    fn send_query(&self, query: &[u8], server: SocketAddr) -> Result<Vec<u8>>;
}

/// Sends each query from a fresh UDP socket and blocks for the reply.
pub struct DnsUdpClient {
    timeout: Duration,
    verify: bool,
    total_sent: AtomicUsize,
    total_failed: AtomicUsize,
}

impl DnsUdpClient {
    pub fn new(timeout: Duration, verify: bool) -> DnsUdpClient {
        DnsUdpClient {
            timeout,
            verify,
            total_sent: AtomicUsize::new(0),
            total_failed: AtomicUsize::new(0),
        }
    }

    fn exchange(&self, query: &[u8], server: SocketAddr) -> Result<Vec<u8>> {
        let local: SocketAddr = if server.is_ipv4() {
            (Ipv4Addr::UNSPECIFIED, 0).into()
        } else {
            (Ipv6Addr::UNSPECIFIED, 0).into()
        };

        // Connecting makes the kernel drop datagrams from other sources
        let socket = UdpSocket::bind(local)?;
        socket.connect(server)?;
        socket.send(query)?;

        let deadline = Instant::now() + self.timeout;
        let mut buf = [0; MAX_DATAGRAM];
        loop {
            let now = Instant::now();
            if now >= deadline {
                return Err(LookupError::Timeout);
            }
            socket.set_read_timeout(Some(deadline - now))?;

            let len = socket.recv(&mut buf)?;
            let response = &buf[..len];

            if !self.verify || matches_query(query, response) {
                return Ok(response.to_vec());
            }

            debug!("discarding mismatched reply of {} bytes from {}", len, server);
        }
    }
}

impl DnsClient for DnsUdpClient {
    fn get_sent_count(&self) -> usize {
        self.total_sent.load(Ordering::Acquire)
    }

    fn get_failed_count(&self) -> usize {
        self.total_failed.load(Ordering::Acquire)
    }

    fn send_query(&self, query: &[u8], server: SocketAddr) -> Result<Vec<u8>> {
        let _ = self.total_sent.fetch_add(1, Ordering::Release);

        let result = self.exchange(query, server);
        if result.is_err() {
            let _ = self.total_failed.fetch_add(1, Ordering::Release);
        }

        result
    }
}
