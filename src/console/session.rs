//! The serial session and its polling loop.
//!
//! Each tick first drains whatever the device has sent. Only when nothing was
//! waiting does the loop look at the keyboard, so inbound data always wins.
//! The command prompt blocks the loop until the user presses Enter; anything
//! the device sends meanwhile waits in the driver buffer.

use super::command::{hex_string, Command, PING_FRAME};
use super::input::{InputSource, InterruptFlag, Key};
use crate::config::{KeysConfig, SerialConfig};
use crate::port::{PortError, SerialPortAdapter};
use std::io::{self, Write};
use std::thread;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Prompt shown when the command key is pressed.
pub const COMMAND_PROMPT: &str = "Enter command (r<hex> or w<hex>): ";

/// Owns the one open serial connection and guarantees it is released.
///
/// The port is closed on drop, so unwinding out of the loop still releases it.
#[derive(Debug)]
pub struct SerialSession<P: SerialPortAdapter> {
    port: P,
}

impl<P: SerialPortAdapter> SerialSession<P> {
    pub fn new(port: P) -> Self {
        info!("Session started on {}", port.name());
        Self { port }
    }

    pub fn port(&self) -> &P {
        &self.port
    }

    pub fn port_mut(&mut self) -> &mut P {
        &mut self.port
    }

    /// Close the connection. Safe to call more than once.
    pub fn close(&mut self) -> Result<(), PortError> {
        if self.port.is_open() {
            info!("Closing {}", self.port.name());
        }
        self.port.close()
    }
}

impl<P: SerialPortAdapter> Drop for SerialSession<P> {
    fn drop(&mut self) {
        if let Err(e) = self.close() {
            warn!("Failed to close {}: {}", self.port.name(), e);
        }
    }
}

/// Which keys send what.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyMap {
    /// Keys that send [`PING_FRAME`].
    pub ping: Vec<char>,
    /// Key that opens the command prompt.
    pub command: char,
}

impl Default for KeyMap {
    fn default() -> Self {
        Self::from(&KeysConfig::default())
    }
}

impl From<&KeysConfig> for KeyMap {
    fn from(keys: &KeysConfig) -> Self {
        Self {
            ping: keys.ping.iter().map(|c| c.to_ascii_lowercase()).collect(),
            command: keys.command.to_ascii_lowercase(),
        }
    }
}

/// Loop pacing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoopTiming {
    /// Sleep at the end of every tick.
    pub poll_interval: Duration,
    /// Extra sleep after a frame was sent.
    pub debounce: Duration,
}

impl Default for LoopTiming {
    fn default() -> Self {
        Self::from(&SerialConfig::default())
    }
}

impl From<&SerialConfig> for LoopTiming {
    fn from(serial: &SerialConfig) -> Self {
        Self {
            poll_interval: serial.poll_interval(),
            debounce: serial.debounce(),
        }
    }
}

impl LoopTiming {
    /// No sleeping at all, for driving the loop in tests.
    pub const fn immediate() -> Self {
        Self {
            poll_interval: Duration::ZERO,
            debounce: Duration::ZERO,
        }
    }
}

/// What happened during one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tick {
    /// Inbound bytes were drained and displayed.
    Received(usize),
    /// A frame of this many bytes was written.
    Sent(usize),
    /// The typed command did not parse; nothing was written.
    Rejected,
    /// Nothing to do.
    Idle,
    /// The user asked to stop.
    Cancelled,
}

/// A fault that ends the session.
#[derive(Debug, Error)]
pub enum ConsoleError {
    #[error(transparent)]
    Port(#[from] PortError),

    #[error("Terminal error: {0}")]
    Terminal(#[from] io::Error),
}

/// How the loop ended.
#[derive(Debug)]
pub enum SessionEnd {
    /// Escape or interrupt.
    Cancelled,
    /// The connection or terminal failed.
    Faulted(ConsoleError),
}

/// The interactive loop over one serial session.
pub struct Console<P: SerialPortAdapter, I, W> {
    session: SerialSession<P>,
    input: I,
    out: W,
    keys: KeyMap,
    timing: LoopTiming,
    interrupt: InterruptFlag,
}

impl<P, I, W> Console<P, I, W>
where
    P: SerialPortAdapter,
    I: InputSource,
    W: Write,
{
    pub fn new(port: P, input: I, out: W) -> Self {
        Self {
            session: SerialSession::new(port),
            input,
            out,
            keys: KeyMap::default(),
            timing: LoopTiming::default(),
            interrupt: InterruptFlag::default(),
        }
    }

    pub fn with_keys(mut self, keys: KeyMap) -> Self {
        self.keys = keys;
        self
    }

    pub fn with_timing(mut self, timing: LoopTiming) -> Self {
        self.timing = timing;
        self
    }

    /// Stop at the next tick once `interrupt` is raised.
    pub fn with_interrupt(mut self, interrupt: InterruptFlag) -> Self {
        self.interrupt = interrupt;
        self
    }

    pub fn input(&self) -> &I {
        &self.input
    }

    pub fn output(&self) -> &W {
        &self.out
    }

    /// Run until the user cancels or the connection faults, then close the port.
    pub fn run(&mut self) -> SessionEnd {
        let _armed = self.interrupt.arm();
        let end = loop {
            match self.tick() {
                Ok(Tick::Cancelled) => {
                    if let Err(e) = self.line("Exiting program") {
                        warn!("Failed to print exit notice: {}", e);
                    }
                    break SessionEnd::Cancelled;
                }
                Ok(Tick::Sent(_)) => thread::sleep(self.timing.debounce),
                Ok(_) => {}
                Err(e) => {
                    debug!("Session on {} faulted: {}", self.session.port().name(), e);
                    break SessionEnd::Faulted(e);
                }
            }
            thread::sleep(self.timing.poll_interval);
        };

        if let Err(e) = self.session.close() {
            warn!("Failed to close {}: {}", self.session.port().name(), e);
        }
        end
    }

    /// One loop iteration: inbound first, keyboard only if nothing arrived.
    ///
    /// A raised interrupt flag ends the session before anything else.
    pub fn tick(&mut self) -> Result<Tick, ConsoleError> {
        if self.interrupt.take() {
            return Ok(Tick::Cancelled);
        }

        if let Some(n) = self.drain_inbound()? {
            return Ok(Tick::Received(n));
        }

        let key = match self.input.poll_key()? {
            Some(key) => key,
            None => return Ok(Tick::Idle),
        };

        match key {
            Key::Escape | Key::Interrupt => Ok(Tick::Cancelled),
            Key::Char(c) if self.keys.ping.contains(&c) => self.send(&PING_FRAME),
            Key::Char(c) if c == self.keys.command => self.prompt_command(),
            Key::Char(c) => {
                debug!("Ignoring key {:?}", c);
                Ok(Tick::Idle)
            }
        }
    }

    fn drain_inbound(&mut self) -> Result<Option<usize>, ConsoleError> {
        let pending = self.session.port().bytes_to_read()?;
        if pending == 0 {
            return Ok(None);
        }

        let mut buffer = vec![0u8; pending];
        let n = match self.session.port_mut().read_bytes(&mut buffer) {
            Ok(n) => n,
            Err(e) if e.is_timeout() => 0,
            Err(e) => return Err(e.into()),
        };
        if n == 0 {
            return Ok(None);
        }
        buffer.truncate(n);
        debug!("Received {} byte(s)", n);

        self.line(&format!("Number of bytes received: {n}"))?;
        for text in decode_lines(&buffer) {
            self.line(&text)?;
        }
        Ok(Some(n))
    }

    fn prompt_command(&mut self) -> Result<Tick, ConsoleError> {
        let text = self.input.read_line(COMMAND_PROMPT)?;
        match Command::parse(&text) {
            Ok(command) => self.send(command.payload()),
            Err(e) => {
                debug!("Dropping command {:?}: {}", text.trim(), e);
                self.line(&format!("Command not sent: {e}"))?;
                Ok(Tick::Rejected)
            }
        }
    }

    fn send(&mut self, frame: &[u8]) -> Result<Tick, ConsoleError> {
        let written = self.session.port_mut().write_bytes(frame)?;
        debug!("Wrote {} byte(s) to {}", written, self.session.port().name());
        self.line(&format!("Sent hex data: {}", hex_string(frame)))?;
        Ok(Tick::Sent(written))
    }

    /// Raw mode needs an explicit carriage return.
    fn line(&mut self, text: &str) -> io::Result<()> {
        write!(self.out, "{text}\r\n")?;
        self.out.flush()
    }
}

/// Decode inbound bytes leniently and split them on CRLF.
///
/// Invalid UTF-8 is replaced, never an error. A trailing CRLF yields a final
/// empty line.
pub fn decode_lines(bytes: &[u8]) -> Vec<String> {
    String::from_utf8_lossy(bytes)
        .split("\r\n")
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_lines_splits_on_crlf() {
        assert_eq!(decode_lines(b"OK\r\nREADY"), vec!["OK", "READY"]);
        assert_eq!(decode_lines(b"a\nb\r\n"), vec!["a\nb", ""]);
    }

    #[test]
    fn test_decode_lines_is_lossy() {
        let lines = decode_lines(b"temp=\xff\xfe21\r\n");
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("temp="));
        assert!(lines[0].ends_with("21"));
    }

    #[test]
    fn test_key_map_lowercases() {
        let keys = KeysConfig {
            ping: vec!['A'],
            command: 'C',
        };
        let map = KeyMap::from(&keys);
        assert_eq!(map.ping, vec!['a']);
        assert_eq!(map.command, 'c');
    }
}
