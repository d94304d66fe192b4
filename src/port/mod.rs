//! Port abstraction layer for serial communication.
//!
//! Provides the transport trait and its implementations, plus enumeration
//! and selection of the devices present on the system.

pub mod discovery;
pub mod error;
pub mod mock;
pub mod sync_port;
pub mod traits;

pub use discovery::{enumerate, list_ports, select, PortSelector, SelectionError, SerialPortDescriptor};
pub use error::PortError;
pub use mock::MockSerialPort;
pub use sync_port::*;
pub use traits::*;
