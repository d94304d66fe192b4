//! Single-host connect probes.

use std::net::{Ipv4Addr, Shutdown, SocketAddr, SocketAddrV4, TcpStream};
use std::time::Duration;
use tracing::{debug, trace};

/// Outcome for one address.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProbeResult {
    pub address: Ipv4Addr,
    pub open: bool,
}

/// Something that can tell whether a TCP endpoint accepts connections.
pub trait Prober {
    fn probe(&mut self, addr: SocketAddrV4) -> bool;
}

impl<F> Prober for F
where
    F: FnMut(SocketAddrV4) -> bool,
{
    fn probe(&mut self, addr: SocketAddrV4) -> bool {
        self(addr)
    }
}

/// Blocking TCP connect with a per-attempt timeout.
///
/// Refused, unreachable and timed-out attempts all count as closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TcpProber {
    timeout: Duration,
}

impl TcpProber {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

impl Prober for TcpProber {
    fn probe(&mut self, addr: SocketAddrV4) -> bool {
        match TcpStream::connect_timeout(&SocketAddr::V4(addr), self.timeout) {
            Ok(stream) => {
                if let Err(e) = stream.shutdown(Shutdown::Both) {
                    trace!("Shutdown of {} failed: {}", addr, e);
                }
                true
            }
            Err(e) => {
                debug!("Probe of {} failed: {}", addr, e);
                false
            }
        }
    }
}
