//! Sequential Telnet scanner.
//!
//! Walks a [`ScanTarget`] one address at a time and reports which hosts
//! accept a TCP connection on the configured port.

pub mod probe;
pub mod target;

pub use probe::{ProbeResult, Prober, TcpProber};
pub use target::{ScanError, ScanTarget};

use crate::config::ScannerConfig;
use std::io::{self, BufRead, Write};
use std::iter::Peekable;
use std::net::{Ipv4Addr, SocketAddrV4};
use std::ops::RangeInclusive;
use tracing::info;

/// Default Telnet port.
pub const TELNET_PORT: u16 = 23;

/// Lazy scan: each call to `next` probes exactly one address.
pub struct Scan<P> {
    target: ScanTarget,
    offsets: Peekable<RangeInclusive<u32>>,
    port: u16,
    prober: P,
}

impl<P: Prober> Scan<P> {
    /// The address the next call to `next` will probe.
    pub fn peek_address(&mut self) -> Option<Ipv4Addr> {
        let target = self.target;
        self.offsets.peek().map(|&offset| target.address(offset))
    }
}

impl<P: Prober> Iterator for Scan<P> {
    type Item = ProbeResult;

    fn next(&mut self) -> Option<ProbeResult> {
        let address = self.target.address(self.offsets.next()?);
        let open = self.prober.probe(SocketAddrV4::new(address, self.port));
        Some(ProbeResult { address, open })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.offsets.size_hint()
    }
}

/// Probe `target` on `port`, ascending, one address per `next`.
pub fn scan<P: Prober>(target: &ScanTarget, port: u16, prober: P) -> Scan<P> {
    Scan {
        target: *target,
        offsets: target.offsets().peekable(),
        port,
        prober,
    }
}

/// Totals printed at the end of a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanSummary {
    pub probed: u64,
    pub open: u64,
}

/// Run a scan, printing progress for every address and a line for each open host.
pub fn run_scan<P: Prober, W: Write>(
    target: &ScanTarget,
    port: u16,
    prober: P,
    out: &mut W,
) -> io::Result<ScanSummary> {
    info!(
        "Scanning {} offsets {:?} on port {}",
        target.network(),
        target.offsets(),
        port
    );

    let mut summary = ScanSummary::default();
    let mut probes = scan(target, port, prober);
    while let Some(address) = probes.peek_address() {
        writeln!(out, "checking {address}")?;
        out.flush()?;

        let Some(result) = probes.next() else { break };
        summary.probed += 1;
        if result.open {
            summary.open += 1;
            info!("Port {} open on {}", port, result.address);
            writeln!(out, "Telnet is open on {}", result.address)?;
        }
    }

    writeln!(
        out,
        "Scan complete: {} open of {} probed",
        summary.open, summary.probed
    )?;
    Ok(summary)
}

/// Prompt for network and offsets, falling back to `defaults` on blank or
/// non-numeric answers.
pub fn prompt_target<R: BufRead, W: Write>(
    defaults: &ScannerConfig,
    input: &mut R,
    out: &mut W,
) -> io::Result<Result<ScanTarget, ScanError>> {
    let network = ask(
        input,
        out,
        &format!("Enter the network address (e.g., {}): ", defaults.network),
    )?;
    let network = if network.is_empty() {
        defaults.network.clone()
    } else {
        network
    };

    let start = ask_offset(
        input,
        out,
        "Enter the starting IP suffix (e.g., 1): ",
        "starting",
        defaults.start,
    )?;
    let end = ask_offset(
        input,
        out,
        "Enter the ending IP suffix (e.g., 254): ",
        "ending",
        defaults.end,
    )?;

    Ok(ScanTarget::parse(&network, start, end))
}

fn ask<R: BufRead, W: Write>(input: &mut R, out: &mut W, prompt: &str) -> io::Result<String> {
    write!(out, "{prompt}")?;
    out.flush()?;
    let mut line = String::new();
    input.read_line(&mut line)?;
    Ok(line.trim().to_string())
}

fn ask_offset<R: BufRead, W: Write>(
    input: &mut R,
    out: &mut W,
    prompt: &str,
    which: &str,
    default: u32,
) -> io::Result<u32> {
    let answer = ask(input, out, prompt)?;
    match answer.parse() {
        Ok(value) => Ok(value),
        Err(_) => {
            writeln!(out, "No valid {which} value entered, using default value of {default}")?;
            Ok(default)
        }
    }
}
