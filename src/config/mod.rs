//! Configuration module for uart-kit.
//!
//! This module provides TOML-based configuration with environment variable overrides.
//!
//! # Configuration Resolution
//!
//! Configuration is loaded from the following locations (in order of priority):
//!
//! 1. `--config <path>` on the command line
//! 2. `UART_KIT_CONFIG` environment variable (explicit path)
//! 3. `./uart-kit.toml` (current directory)
//! 4. `~/.config/uart-kit/config.toml` (XDG on Linux/macOS)
//! 5. `%APPDATA%\uart-kit\config.toml` (Windows)
//! 6. Built-in defaults (no file required)
//!
//! # Environment Overrides
//!
//! The pattern is: `UART_KIT_<SECTION>_<KEY>`
//!
//! Examples:
//! - `UART_KIT_SERIAL_DEFAULT_PORT=COM13`
//! - `UART_KIT_SCANNER_NETWORK=10.0.0.0/24`
//! - `UART_KIT_LOGGING_LEVEL=debug`
//!
//! # Example
//!
//! ```rust,no_run
//! use uart_kit::config::ConfigLoader;
//!
//! let config = ConfigLoader::load()?.into_config();
//! println!("Baud: {}", config.serial.baud_rate);
//! # Ok::<(), uart_kit::config::ConfigError>(())
//! ```

mod error;
mod loader;
mod schema;

pub use error::{ConfigError, ConfigResult};
pub use loader::{resolve_config_path, ConfigLoader};
pub use schema::{Config, KeysConfig, LogFormat, LoggingConfig, ScannerConfig, SerialConfig};
