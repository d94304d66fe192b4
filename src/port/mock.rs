//! Mock serial port implementation for testing.
//!
//! Provides a `MockSerialPort` that simulates a device without requiring
//! hardware. Clones share state, so a test can keep one handle for
//! inspection while the console loop owns another.

use super::error::PortError;
use super::traits::SerialPortAdapter;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};

/// Inner state of the mock port, protected by a mutex for interior mutability.
#[derive(Debug, Default)]
struct MockPortState {
    /// Queue of bytes to be returned by read operations.
    read_queue: VecDeque<u8>,
    /// Log of all frames written to the port.
    write_log: Vec<Vec<u8>>,
    /// When set, every operation fails as if the device were unplugged.
    disconnected: bool,
    /// Whether `close` has released the port.
    closed: bool,
    /// How many times `close` actually released the port.
    close_count: usize,
    /// How many times `read_bytes` was called.
    read_calls: usize,
}

/// Mock serial port implementation for testing.
///
/// # Example
/// ```
/// use uart_kit::port::{MockSerialPort, SerialPortAdapter};
///
/// let mut port = MockSerialPort::new("MOCK0");
/// port.enqueue_read(b"Hello, World!");
///
/// let mut buffer = [0u8; 13];
/// let n = port.read_bytes(&mut buffer).unwrap();
/// assert_eq!(&buffer[..n], b"Hello, World!");
///
/// port.write_bytes(b"Response").unwrap();
/// assert_eq!(port.get_write_log(), vec![b"Response".to_vec()]);
/// ```
#[derive(Clone)]
pub struct MockSerialPort {
    /// The port name/identifier.
    name: String,
    /// The internal state, shared between clones.
    state: Arc<Mutex<MockPortState>>,
}

impl MockSerialPort {
    /// Create a new mock serial port with the given name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            state: Arc::new(Mutex::new(MockPortState::default())),
        }
    }

    fn state(&self) -> MutexGuard<'_, MockPortState> {
        // A poisoned lock only happens after a test already panicked.
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Enqueue bytes to be returned by subsequent read operations.
    pub fn enqueue_read(&self, data: &[u8]) {
        self.state().read_queue.extend(data);
    }

    /// Get a copy of all frames written to the port.
    pub fn get_write_log(&self) -> Vec<Vec<u8>> {
        self.state().write_log.clone()
    }

    /// Make every following operation fail as if the cable were pulled.
    pub fn disconnect(&self) {
        self.state().disconnected = true;
    }

    /// Number of times the port was actually released.
    pub fn close_count(&self) -> usize {
        self.state().close_count
    }

    /// Number of `read_bytes` calls made so far.
    pub fn read_calls(&self) -> usize {
        self.state().read_calls
    }

    /// Get the number of bytes available to read.
    pub fn available_bytes(&self) -> usize {
        self.state().read_queue.len()
    }

    fn check_usable(&self, state: &MockPortState) -> Result<(), PortError> {
        if state.closed {
            return Err(PortError::NotOpen);
        }
        if state.disconnected {
            return Err(PortError::Disconnected(self.name.clone()));
        }
        Ok(())
    }
}

impl SerialPortAdapter for MockSerialPort {
    fn write_bytes(&mut self, data: &[u8]) -> Result<usize, PortError> {
        let mut state = self.state();
        self.check_usable(&state)?;
        state.write_log.push(data.to_vec());
        Ok(data.len())
    }

    fn read_bytes(&mut self, buffer: &mut [u8]) -> Result<usize, PortError> {
        let mut state = self.state();
        self.check_usable(&state)?;
        state.read_calls += 1;

        let n = buffer.len().min(state.read_queue.len());
        for (slot, byte) in buffer.iter_mut().zip(state.read_queue.drain(..n)) {
            *slot = byte;
        }

        if n == 0 {
            Err(PortError::Io(std::io::Error::new(
                std::io::ErrorKind::TimedOut,
                "No data available",
            )))
        } else {
            Ok(n)
        }
    }

    fn bytes_to_read(&self) -> Result<usize, PortError> {
        let state = self.state();
        self.check_usable(&state)?;
        Ok(state.read_queue.len())
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn is_open(&self) -> bool {
        !self.state().closed
    }

    fn close(&mut self) -> Result<(), PortError> {
        let mut state = self.state();
        if !state.closed {
            state.closed = true;
            state.close_count += 1;
        }
        Ok(())
    }
}

impl std::fmt::Debug for MockSerialPort {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockSerialPort")
            .field("name", &self.name)
            .field("available_bytes", &self.available_bytes())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_enqueue_and_read() {
        let mut port = MockSerialPort::new("MOCK0");
        port.enqueue_read(b"Hello");

        let mut buffer = [0u8; 10];
        let n = port.read_bytes(&mut buffer).unwrap();
        assert_eq!(n, 5);
        assert_eq!(&buffer[..n], b"Hello");
    }

    #[test]
    fn test_partial_read() {
        let mut port = MockSerialPort::new("MOCK0");
        port.enqueue_read(b"Hello, World!");

        let mut buffer = [0u8; 5];
        let n = port.read_bytes(&mut buffer).unwrap();
        assert_eq!(&buffer[..n], b"Hello");
        assert_eq!(port.available_bytes(), 8);
    }

    #[test]
    fn test_empty_read_times_out() {
        let mut port = MockSerialPort::new("MOCK0");
        let mut buffer = [0u8; 10];
        let err = port.read_bytes(&mut buffer).unwrap_err();
        assert!(err.is_timeout());
    }

    #[test]
    fn test_write_logging() {
        let mut port = MockSerialPort::new("MOCK0");
        port.write_bytes(b"Test1").unwrap();
        port.write_bytes(b"Test2").unwrap();

        let log = port.get_write_log();
        assert_eq!(log, vec![b"Test1".to_vec(), b"Test2".to_vec()]);
    }

    #[test]
    fn test_disconnect_fails_everything() {
        let mut port = MockSerialPort::new("MOCK0");
        port.disconnect();

        assert!(matches!(port.bytes_to_read(), Err(PortError::Disconnected(_))));
        assert!(port.write_bytes(b"x").is_err());
    }

    #[test]
    fn test_close_is_idempotent() {
        let mut port = MockSerialPort::new("MOCK0");
        let observer = port.clone();

        port.close().unwrap();
        port.close().unwrap();

        assert!(!observer.is_open());
        assert_eq!(observer.close_count(), 1);
        assert!(matches!(port.write_bytes(b"x"), Err(PortError::NotOpen)));
    }
}
