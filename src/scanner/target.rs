//! The block of addresses a scan walks through.

use ipnetwork::Ipv4Network;
use std::net::Ipv4Addr;
use std::ops::RangeInclusive;
use thiserror::Error;

/// Why a scan target was refused. No address is probed in any of these cases.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScanError {
    #[error("Invalid network address '{input}': {reason}")]
    InvalidNetwork { input: String, reason: String },

    #[error("Invalid range: start {start} is after end {end}")]
    InvalidRange { start: u32, end: u32 },

    #[error("Offset {offset} is outside {network} ({capacity} addresses)")]
    OffsetOutOfRange {
        offset: u32,
        network: Ipv4Network,
        capacity: u64,
    },
}

/// An inclusive run of host offsets inside one IPv4 block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanTarget {
    network: Ipv4Network,
    start: u32,
    end: u32,
}

impl ScanTarget {
    /// Parse `network` as a CIDR block and check the offsets fit inside it.
    ///
    /// The block address must not have host bits set (`192.168.1.5/24` is
    /// refused). A bare address is treated as a `/32`.
    pub fn parse(network: &str, start: u32, end: u32) -> Result<Self, ScanError> {
        let input = network.trim();
        let parsed: Ipv4Network = input.parse().map_err(|e: ipnetwork::IpNetworkError| {
            ScanError::InvalidNetwork {
                input: input.to_string(),
                reason: e.to_string(),
            }
        })?;

        if parsed.ip() != parsed.network() {
            return Err(ScanError::InvalidNetwork {
                input: input.to_string(),
                reason: "host bits set".to_string(),
            });
        }

        Self::new(parsed, start, end)
    }

    /// Build a target from an already parsed block.
    pub fn new(network: Ipv4Network, start: u32, end: u32) -> Result<Self, ScanError> {
        if start > end {
            return Err(ScanError::InvalidRange { start, end });
        }

        let capacity = capacity(&network);
        if u64::from(end) >= capacity {
            return Err(ScanError::OffsetOutOfRange {
                offset: end,
                network,
                capacity,
            });
        }

        Ok(Self {
            network,
            start,
            end,
        })
    }

    pub fn network(&self) -> Ipv4Network {
        self.network
    }

    pub fn offsets(&self) -> RangeInclusive<u32> {
        self.start..=self.end
    }

    /// Number of addresses the scan will probe.
    pub fn host_count(&self) -> u64 {
        u64::from(self.end - self.start) + 1
    }

    /// The concrete address for a host offset.
    pub fn address(&self, offset: u32) -> Ipv4Addr {
        // Offsets were checked against the block size, so this cannot overflow.
        Ipv4Addr::from(u32::from(self.network.network()) + offset)
    }

    /// Every address in the range, ascending.
    pub fn addresses(&self) -> impl Iterator<Item = Ipv4Addr> + '_ {
        self.offsets().map(move |offset| self.address(offset))
    }
}

/// Total addresses in the block, network and broadcast included.
fn capacity(network: &Ipv4Network) -> u64 {
    1u64 << (32 - u32::from(network.prefix()))
}
