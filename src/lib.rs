//! uart-kit library
//!
//! Core of two small bench tools: an interactive serial console for talking
//! to a microcontroller, and a sequential Telnet scanner.
//!
//! # Modules
//!
//! - `config`: Configuration management with TOML support
//! - `error`: Unified error handling
//! - `logging`: Tracing subscriber setup
//! - `port`: Serial transport abstraction, enumeration and port selection
//! - `console`: Command parsing and the serial I/O loop
//! - `scanner`: CIDR range enumeration and connect probes

pub mod config;
pub mod console;
pub mod error;
pub mod logging;
pub mod port;
pub mod scanner;

// Re-export commonly used types for convenience
pub use config::{Config, ConfigError, ConfigLoader, ConfigResult};
pub use console::{Command, Console, ConsoleError, Key, SessionEnd, PING_FRAME};
pub use error::{AppError, AppResult};
pub use port::{
    MockSerialPort, PortConfiguration, PortError, PortSelector, SerialPortAdapter,
    SerialPortDescriptor, SyncSerialPort,
};
pub use scanner::{ProbeResult, ScanError, ScanTarget, TcpProber};
