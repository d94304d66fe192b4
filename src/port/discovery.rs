//! Serial port enumeration and interactive selection.

use serialport::{SerialPortInfo, SerialPortType};
use std::fmt;
use std::io::{self, BufRead, Write};
use thiserror::Error;
use tracing::{debug, info};

/// One serial device reported by the operating system.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct SerialPortDescriptor {
    /// Platform device identifier, e.g. `COM3` or `/dev/ttyUSB0`.
    pub name: String,
    /// Human readable description.
    pub description: String,
    /// Hardware identifier (`USB VID:PID=...`, `PCI`, ...).
    pub hardware_id: String,
}

impl fmt::Display for SerialPortDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {} [{}]", self.name, self.description, self.hardware_id)
    }
}

impl From<SerialPortInfo> for SerialPortDescriptor {
    fn from(info: SerialPortInfo) -> Self {
        let (description, hardware_id) = match info.port_type {
            SerialPortType::UsbPort(usb) => {
                let description = usb
                    .product
                    .clone()
                    .or_else(|| usb.manufacturer.clone())
                    .unwrap_or_else(|| "USB Serial Device".to_string());
                let mut hwid = format!("USB VID:PID={:04X}:{:04X}", usb.vid, usb.pid);
                if let Some(serial) = usb.serial_number {
                    hwid.push_str(&format!(" SER={serial}"));
                }
                (description, hwid)
            }
            SerialPortType::PciPort => ("PCI Serial Port".to_string(), "PCI".to_string()),
            SerialPortType::BluetoothPort => {
                ("Bluetooth Serial Port".to_string(), "BTHENUM".to_string())
            }
            SerialPortType::Unknown => ("n/a".to_string(), "n/a".to_string()),
        };

        Self {
            name: info.port_name,
            description,
            hardware_id,
        }
    }
}

/// Enumerate the serial ports on this machine, sorted by name.
pub fn enumerate() -> io::Result<Vec<SerialPortDescriptor>> {
    let ports = serialport::available_ports().map_err(io::Error::from)?;
    let mut descriptors: Vec<SerialPortDescriptor> =
        ports.into_iter().map(SerialPortDescriptor::from).collect();
    descriptors.sort();
    debug!("Enumerated {} serial port(s)", descriptors.len());
    Ok(descriptors)
}

/// Write the candidate list, one port per line, followed by a blank line.
pub fn list_ports<W: Write>(candidates: &[SerialPortDescriptor], out: &mut W) -> io::Result<()> {
    for port in candidates {
        writeln!(out, "{port}")?;
    }
    writeln!(out)
}

/// The user asked for a port that is not in the candidate list.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid port '{requested}'. Please select a valid port from the list.")]
pub struct SelectionError {
    /// The full port name that was looked up.
    pub requested: String,
}

/// Pick a port by its numeric suffix.
///
/// `prefix` is prepended to the trimmed user text and the result must match
/// a candidate name exactly.
pub fn select(
    candidates: &[SerialPortDescriptor],
    prefix: &str,
    user_text: &str,
) -> Result<SerialPortDescriptor, SelectionError> {
    let requested = format!("{prefix}{}", user_text.trim());
    candidates
        .iter()
        .find(|port| port.name == requested)
        .cloned()
        .ok_or(SelectionError { requested })
}

/// Remembers which port the user picked between connection attempts.
#[derive(Debug, Clone, Default)]
pub struct PortSelector {
    prefix: String,
    selected: Option<String>,
}

impl PortSelector {
    /// Create a selector that builds names as `prefix` + user digits.
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            selected: None,
        }
    }

    /// Start from a preset port so the first connection skips the prompt.
    pub fn with_preset(mut self, port: Option<String>) -> Self {
        self.selected = port;
        self
    }

    /// The currently remembered port, if any.
    pub fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    /// Forget the remembered port so the next connection prompts again.
    pub fn reset(&mut self) {
        self.selected = None;
    }

    /// Try one user answer against the candidates.
    ///
    /// On success the port is remembered; on failure the previous state is kept.
    pub fn try_select(
        &mut self,
        candidates: &[SerialPortDescriptor],
        user_text: &str,
    ) -> Result<&str, SelectionError> {
        let port = select(candidates, &self.prefix, user_text)?;
        info!("Selected serial port {}", port.name);
        Ok(self.selected.insert(port.name).as_str())
    }

    /// Return the remembered port, or prompt until the user names a valid one.
    ///
    /// The prompt loop has no retry limit; it ends on a valid answer or when
    /// `input` reaches end of file.
    pub fn prompt<R: BufRead, W: Write>(
        &mut self,
        candidates: &[SerialPortDescriptor],
        input: &mut R,
        out: &mut W,
    ) -> io::Result<String> {
        if let Some(port) = &self.selected {
            return Ok(port.clone());
        }

        list_ports(candidates, out)?;
        loop {
            write!(out, "Please enter the port number (e.g., 1, 2): ")?;
            out.flush()?;

            let mut line = String::new();
            if input.read_line(&mut line)? == 0 {
                return Err(io::Error::new(
                    io::ErrorKind::UnexpectedEof,
                    "input closed before a port was selected",
                ));
            }

            match self.try_select(candidates, &line) {
                Ok(port) => {
                    let port = port.to_string();
                    writeln!(out, "Selected port: {port}\n")?;
                    return Ok(port);
                }
                Err(e) => {
                    writeln!(out, "{e}")?;
                    list_ports(candidates, out)?;
                }
            }
        }
    }
}
