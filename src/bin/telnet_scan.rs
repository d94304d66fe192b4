//! Telnet scanner binary.
//!
//! Prompts for a CIDR block and an offset range, then probes each address in
//! turn for an open Telnet port.
//!
//! # Usage
//!
//! ```bash
//! telnet-scan
//! telnet-scan --config ./uart-kit.toml
//! ```

use clap::Parser;
use std::io;
use std::path::PathBuf;
use uart_kit::config::ConfigLoader;
use uart_kit::logging;
use uart_kit::scanner::{self, TcpProber};

#[derive(Parser, Debug)]
#[command(
    name = "telnet-scan",
    version,
    about = "Probe a range of IPv4 addresses for an open Telnet port, one host at a time."
)]
struct Args {
    /// Configuration file to use instead of the standard locations.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let config = ConfigLoader::load_with(args.config.as_deref())?.into_config();
    logging::init(&config.logging)?;

    let mut stdin = io::stdin().lock();
    let mut stdout = io::stdout();

    let target = match scanner::prompt_target(&config.scanner, &mut stdin, &mut stdout)? {
        Ok(target) => target,
        Err(e) => {
            println!("Invalid network address. {e}");
            return Ok(());
        }
    };

    let prober = TcpProber::new(config.scanner.timeout());
    scanner::run_scan(&target, config.scanner.port, prober, &mut stdout)?;
    Ok(())
}
