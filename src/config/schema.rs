//! Configuration schema definitions.
//!
//! This module defines the structure of the configuration file using serde.
//! All configuration sections are defined here with appropriate defaults.

use super::error::{ConfigError, ConfigResult};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Root configuration structure.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Serial console configuration
    pub serial: SerialConfig,
    /// Console key bindings
    pub keys: KeysConfig,
    /// Telnet scanner configuration
    pub scanner: ScannerConfig,
    /// Logging configuration
    pub logging: LoggingConfig,
}

impl Config {
    /// Reject values that would make either tool misbehave.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.serial.baud_rate == 0 {
            return Err(ConfigError::validation(
                "serial.baud_rate",
                "must be greater than zero",
            ));
        }
        // Key events arrive lowercased, so compare the folded forms.
        let command = self.keys.command.to_ascii_lowercase();
        if self
            .keys
            .ping
            .iter()
            .any(|key| key.to_ascii_lowercase() == command)
        {
            return Err(ConfigError::validation(
                "keys.command",
                format!("'{}' is already a ping key", self.keys.command),
            ));
        }
        if self.scanner.timeout_ms == 0 {
            return Err(ConfigError::validation(
                "scanner.timeout_ms",
                "must be greater than zero",
            ));
        }
        if self.scanner.port == 0 {
            return Err(ConfigError::validation("scanner.port", "must not be zero"));
        }
        Ok(())
    }
}

/// Serial console section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SerialConfig {
    /// Baud rate every device is opened at
    pub baud_rate: u32,
    /// Read timeout in milliseconds
    pub timeout_ms: u64,
    /// Prepended to the digits typed at the port prompt
    pub port_prefix: String,
    /// Port to use without prompting on the first connection
    pub default_port: Option<String>,
    /// Sleep at the end of every loop iteration, in milliseconds
    pub poll_interval_ms: u64,
    /// Sleep after each send, in milliseconds
    pub debounce_ms: u64,
}

impl Default for SerialConfig {
    fn default() -> Self {
        Self {
            baud_rate: 115_200,
            timeout_ms: 1000,
            port_prefix: default_port_prefix().to_string(),
            default_port: None,
            poll_interval_ms: 1,
            debounce_ms: 100,
        }
    }
}

impl SerialConfig {
    /// Get the read timeout as Duration
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

fn default_port_prefix() -> &'static str {
    if cfg!(windows) {
        "COM"
    } else {
        "/dev/ttyUSB"
    }
}

/// Key bindings for the console loop. Escape always exits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeysConfig {
    /// Keys that send the ping frame
    pub ping: Vec<char>,
    /// Key that opens the command prompt
    pub command: char,
}

impl Default for KeysConfig {
    fn default() -> Self {
        Self {
            ping: vec!['1', '2'],
            command: 'c',
        }
    }
}

/// Telnet scanner section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScannerConfig {
    /// Network used when the prompt is left blank
    pub network: String,
    /// First host offset used when the prompt is blank or not a number
    pub start: u32,
    /// Last host offset used when the prompt is blank or not a number
    pub end: u32,
    /// TCP port to probe
    pub port: u16,
    /// Per-host connect timeout in milliseconds
    pub timeout_ms: u64,
}

impl Default for ScannerConfig {
    fn default() -> Self {
        Self {
            network: "192.168.1.0/24".to_string(),
            start: 1,
            end: 254,
            port: 23,
            timeout_ms: 1000,
        }
    }
}

impl ScannerConfig {
    /// Get the connect timeout as Duration
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

/// Logging configuration section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive used when `RUST_LOG` is not set
    pub level: String,
    /// Log format: "json", "pretty", "compact"
    pub format: LogFormat,
    /// Log file path; stderr when unset
    pub file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
            format: LogFormat::Compact,
            file: None,
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// JSON format
    Json,
    /// Pretty format with colors
    Pretty,
    /// Compact format
    #[default]
    Compact,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.serial.baud_rate, 115_200);
        assert_eq!(config.serial.timeout(), Duration::from_secs(1));
        assert_eq!(config.keys.ping, vec!['1', '2']);
        assert_eq!(config.scanner.network, "192.168.1.0/24");
        assert_eq!((config.scanner.start, config.scanner.end), (1, 254));
        assert_eq!(config.scanner.port, 23);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_serialization() {
        let config = Config::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        assert!(toml_str.contains("[serial]"));
        assert!(toml_str.contains("[scanner]"));
    }

    #[test]
    fn test_config_deserialization() {
        let toml_str = r#"
            [serial]
            port_prefix = "COM"
            default_port = "COM13"

            [keys]
            ping = ["p"]
            command = "x"

            [scanner]
            network = "10.0.0.0/24"
        "#;

        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.serial.default_port.as_deref(), Some("COM13"));
        assert_eq!(config.keys.ping, vec!['p']);
        assert_eq!(config.keys.command, 'x');
        assert_eq!(config.scanner.network, "10.0.0.0/24");
        // Defaults should still work
        assert_eq!(config.serial.baud_rate, 115_200);
        assert_eq!(config.scanner.end, 254);
    }

    #[test]
    fn test_validate_rejects_key_collision() {
        let mut config = Config::default();
        config.keys.command = '1';
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("keys.command"));
    }

    #[test]
    fn test_validate_key_collision_ignores_case() {
        let mut config = Config::default();
        config.keys.ping = vec!['C'];
        config.keys.command = 'c';
        assert!(config.validate().is_err());

        config.keys.ping = vec!['p'];
        config.keys.command = 'P';
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_zero_timeout() {
        let mut config = Config::default();
        config.scanner.timeout_ms = 0;
        assert!(config.validate().is_err());
    }
}
