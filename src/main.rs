use clap::Parser;
use std::path::PathBuf;
use uart_kit::config::ConfigLoader;
use uart_kit::{console, logging};

// Command-line arguments
#[derive(Parser, Debug)]
#[command(
    name = "uart-console",
    version,
    about = "Relay key presses to a microcontroller over a serial port and print what it sends back.",
    long_about = "Pick a serial port, then press 1 or 2 to send a ping frame, c to type an r<hex>/w<hex> command, and Esc to quit. Incoming data is printed line by line."
)]
struct Args {
    /// Configuration file to use instead of the standard locations.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Serial port to open without prompting (e.g. COM13 or /dev/ttyUSB0).
    #[arg(short, long)]
    port: Option<String>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let config = ConfigLoader::load_with(args.config.as_deref())?.into_config();
    logging::init(&config.logging)?;

    console::run(&config, args.port)?;
    Ok(())
}
