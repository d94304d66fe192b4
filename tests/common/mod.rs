//! Shared test utilities for the console and scanner tests.
//!
//! This module provides common test infrastructure including:
//! - Console construction over a mock port and scripted keys
//! - Splitting captured display output into lines
//! - Port descriptor builders

#![allow(dead_code)]

use uart_kit::console::{Console, InputSource, LoopTiming, ScriptedInput};
use uart_kit::port::{MockSerialPort, SerialPortDescriptor};

/// A console over `port` that never sleeps and writes into a buffer.
pub fn mock_console(
    port: &MockSerialPort,
    input: ScriptedInput,
) -> Console<MockSerialPort, ScriptedInput, Vec<u8>> {
    mock_console_with(port, input)
}

/// Like [`mock_console`] with any input source.
pub fn mock_console_with<I: InputSource>(
    port: &MockSerialPort,
    input: I,
) -> Console<MockSerialPort, I, Vec<u8>> {
    Console::new(port.clone(), input, Vec::new()).with_timing(LoopTiming::immediate())
}

/// Split captured console output on the raw-mode line ending.
pub fn display_lines(output: &[u8]) -> Vec<String> {
    let text = String::from_utf8_lossy(output);
    let mut lines: Vec<String> = text.split("\r\n").map(str::to_string).collect();
    if lines.last().is_some_and(|l| l.is_empty()) {
        lines.pop();
    }
    lines
}

/// Descriptors for the given port names.
pub fn descriptors(names: &[&str]) -> Vec<SerialPortDescriptor> {
    names
        .iter()
        .map(|name| SerialPortDescriptor {
            name: name.to_string(),
            description: "USB Serial Device".to_string(),
            hardware_id: "USB VID:PID=0403:6001".to_string(),
        })
        .collect()
}
