//! Interactive serial console.
//!
//! Flow: pick a port, open it, run the [`Console`] loop until the user
//! cancels. A connection fault prints the error and offers one retry: a blank
//! answer exits, anything else goes back to port selection with the previous
//! choice forgotten.

pub mod command;
pub mod input;
pub mod session;

pub use command::{hex_string, Action, Command, ParseError, PING_FRAME};
pub use input::{ArmedInterrupt, InputSource, InterruptFlag, Key, ScriptedInput, TerminalInput};
pub use session::{
    decode_lines, Console, ConsoleError, KeyMap, LoopTiming, SerialSession, SessionEnd, Tick,
};

use crate::config::Config;
use crate::error::AppResult;
use crate::port::{self, PortConfiguration, PortSelector, SerialPortDescriptor, SyncSerialPort};
use std::io::{self, BufRead, Write};
use tracing::info;

/// Run the console against real hardware and the controlling terminal.
pub fn run(config: &Config, preset_port: Option<String>) -> AppResult<()> {
    let mut selector = PortSelector::new(config.serial.port_prefix.clone())
        .with_preset(preset_port.or_else(|| config.serial.default_port.clone()));

    if selector.selected().is_none() {
        println!("No default port selected, searching and displaying available ports...");
    }

    let port_config = PortConfiguration {
        baud_rate: config.serial.baud_rate,
        timeout: config.serial.timeout(),
    };
    let keys = KeyMap::from(&config.keys);
    let timing = LoopTiming::from(&config.serial);
    let interrupt = InterruptFlag::new();
    interrupt.install()?;

    let mut stdin = io::BufReader::new(io::stdin());
    let mut stdout = io::stdout();

    run_with(
        &mut selector,
        &mut stdin,
        &mut stdout,
        port::enumerate,
        |name| {
            let port = match SyncSerialPort::open(name, port_config) {
                Ok(port) => port,
                Err(e) => return SessionEnd::Faulted(e.into()),
            };
            println!("Using {name}");
            let input = match TerminalInput::new(interrupt.clone()) {
                Ok(input) => input,
                Err(e) => return SessionEnd::Faulted(e.into()),
            };
            Console::new(port, input, io::stdout())
                .with_keys(keys.clone())
                .with_timing(timing)
                .with_interrupt(interrupt.clone())
                .run()
        },
    )
}

/// Drive selection, sessions and the retry prompt.
///
/// `open_session` opens the named port and runs a session on it to the end.
pub fn run_with<R, W, E, S>(
    selector: &mut PortSelector,
    input: &mut R,
    out: &mut W,
    mut enumerate: E,
    mut open_session: S,
) -> AppResult<()>
where
    R: BufRead,
    W: Write,
    E: FnMut() -> io::Result<Vec<SerialPortDescriptor>>,
    S: FnMut(&str) -> SessionEnd,
{
    loop {
        let name = match selector.selected() {
            Some(name) => name.to_string(),
            None => {
                let candidates = enumerate()?;
                selector.prompt(&candidates, input, out)?
            }
        };

        match open_session(&name) {
            SessionEnd::Cancelled => {
                info!("Session on {} ended by user", name);
                return Ok(());
            }
            SessionEnd::Faulted(e) => {
                writeln!(out, "\nError: {e}")?;
                if !offer_retry(input, out)? {
                    info!("User declined retry after fault on {}", name);
                    return Ok(());
                }
                selector.reset();
            }
        }
    }
}

/// Ask once whether to pick another port. Blank input (or EOF) means no.
pub fn offer_retry<R: BufRead, W: Write>(input: &mut R, out: &mut W) -> io::Result<bool> {
    write!(
        out,
        "Would you like to try another port?\nPress Enter to exit, or type anything to choose again: "
    )?;
    out.flush()?;

    let mut answer = String::new();
    input.read_line(&mut answer)?;
    Ok(!answer.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_offer_retry() {
        let mut out = Vec::new();
        assert!(!offer_retry(&mut Cursor::new("\n"), &mut out).unwrap());
        assert!(!offer_retry(&mut Cursor::new(""), &mut out).unwrap());
        assert!(offer_retry(&mut Cursor::new("y\n"), &mut out).unwrap());
    }
}
