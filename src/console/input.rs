//! Keyboard input for the console loop.
//!
//! The loop only sees discrete key-down events through [`InputSource`]. The
//! terminal implementation reads them with crossterm in raw mode; tests use
//! [`ScriptedInput`].

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::terminal;
use std::collections::VecDeque;
use std::io::{self, Write};
use std::process;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

/// How long the command prompt waits for a key before rechecking for an interrupt.
const PROMPT_POLL: Duration = Duration::from_millis(50);

/// Exit status used when a signal arrives outside a session.
const SIGNAL_EXIT_CODE: i32 = 130;

/// A key press the console reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Char(char),
    Escape,
    /// Ctrl+C, or any other request from outside to stop.
    Interrupt,
}

#[derive(Debug, Default)]
struct InterruptState {
    armed: AtomicBool,
    raised: AtomicBool,
}

/// Carries SIGINT/SIGTERM into the console loop.
///
/// While armed, a signal only raises the flag and the loop winds down on its
/// next tick, so the exit notice is printed and the port and terminal are
/// restored. Outside a session the process exits as it normally would.
#[derive(Debug, Clone, Default)]
pub struct InterruptFlag {
    state: Arc<InterruptState>,
}

impl InterruptFlag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Route the process's interrupt and terminate signals to this flag.
    ///
    /// Only one handler can be installed per process.
    pub fn install(&self) -> Result<(), ctrlc::Error> {
        let flag = self.clone();
        ctrlc::set_handler(move || {
            if !flag.deliver() {
                process::exit(SIGNAL_EXIT_CODE);
            }
        })
    }

    /// Record a signal. Returns `false` when nothing is armed to handle it.
    pub fn deliver(&self) -> bool {
        if self.state.armed.load(Ordering::SeqCst) {
            info!("Interrupt signal received");
            self.raise();
            true
        } else {
            false
        }
    }

    /// Defer signals to the flag until the returned guard is dropped.
    pub fn arm(&self) -> ArmedInterrupt {
        self.state.armed.store(true, Ordering::SeqCst);
        ArmedInterrupt { flag: self.clone() }
    }

    pub fn raise(&self) {
        self.state.raised.store(true, Ordering::SeqCst);
    }

    pub fn is_raised(&self) -> bool {
        self.state.raised.load(Ordering::SeqCst)
    }

    /// Clear the flag, returning whether it was set.
    pub fn take(&self) -> bool {
        self.state.raised.swap(false, Ordering::SeqCst)
    }
}

/// Keeps an [`InterruptFlag`] armed for as long as it lives.
#[derive(Debug)]
pub struct ArmedInterrupt {
    flag: InterruptFlag,
}

impl Drop for ArmedInterrupt {
    fn drop(&mut self) {
        self.flag.state.armed.store(false, Ordering::SeqCst);
    }
}

/// Source of key presses and typed command lines.
pub trait InputSource {
    /// Return the next pending key press without blocking.
    fn poll_key(&mut self) -> io::Result<Option<Key>>;

    /// Block until the user types one line of text after `prompt`.
    fn read_line(&mut self, prompt: &str) -> io::Result<String>;
}

/// Puts the terminal in raw mode for as long as it lives.
#[derive(Debug)]
struct RawModeGuard;

impl RawModeGuard {
    fn enable() -> io::Result<Self> {
        terminal::enable_raw_mode()?;
        Ok(Self)
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        let _ = terminal::disable_raw_mode();
    }
}

/// Reads keys from the controlling terminal.
#[derive(Debug)]
pub struct TerminalInput {
    interrupt: InterruptFlag,
    _raw: RawModeGuard,
}

impl TerminalInput {
    /// Switch the terminal to raw mode so single key presses are delivered.
    ///
    /// A raised `interrupt` abandons the command prompt.
    pub fn new(interrupt: InterruptFlag) -> io::Result<Self> {
        Ok(Self {
            interrupt,
            _raw: RawModeGuard::enable()?,
        })
    }

    fn translate(key: KeyEvent) -> Option<Key> {
        if key.kind != KeyEventKind::Press {
            return None;
        }
        match key.code {
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                Some(Key::Interrupt)
            }
            KeyCode::Char(c) => Some(Key::Char(c.to_ascii_lowercase())),
            KeyCode::Esc => Some(Key::Escape),
            _ => None,
        }
    }
}

impl InputSource for TerminalInput {
    fn poll_key(&mut self) -> io::Result<Option<Key>> {
        while event::poll(Duration::ZERO)? {
            if let Event::Key(key) = event::read()? {
                if let Some(key) = Self::translate(key) {
                    return Ok(Some(key));
                }
            }
        }
        Ok(None)
    }

    fn read_line(&mut self, prompt: &str) -> io::Result<String> {
        // Raw mode stays on, so echo and backspace are handled here.
        let mut stdout = io::stdout();
        write!(stdout, "{prompt}")?;
        stdout.flush()?;

        let mut line = String::new();
        loop {
            if !event::poll(PROMPT_POLL)? {
                if self.interrupt.is_raised() {
                    line.clear();
                    break;
                }
                continue;
            }
            let key = match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => key,
                _ => continue,
            };
            match key.code {
                KeyCode::Enter => break,
                KeyCode::Esc => {
                    line.clear();
                    break;
                }
                KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                    line.clear();
                    break;
                }
                KeyCode::Backspace => {
                    if line.pop().is_some() {
                        write!(stdout, "\x08 \x08")?;
                    }
                }
                KeyCode::Char(c) => {
                    line.push(c);
                    write!(stdout, "{c}")?;
                }
                _ => {}
            }
            stdout.flush()?;
        }
        write!(stdout, "\r\n")?;
        stdout.flush()?;

        debug!("Command prompt read {} byte(s)", line.len());
        Ok(line)
    }
}

/// Replays a fixed sequence of keys and command lines.
///
/// `None` entries in the key script represent idle ticks.
#[derive(Debug, Default, Clone)]
pub struct ScriptedInput {
    keys: VecDeque<Option<Key>>,
    lines: VecDeque<String>,
    prompts: usize,
}

impl ScriptedInput {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a key press.
    pub fn key(mut self, key: Key) -> Self {
        self.keys.push_back(Some(key));
        self
    }

    /// Queue a tick with no key pressed.
    pub fn idle(mut self) -> Self {
        self.keys.push_back(None);
        self
    }

    /// Queue the text typed at the next command prompt.
    pub fn line(mut self, text: impl Into<String>) -> Self {
        self.lines.push_back(text.into());
        self
    }

    /// How many times a command line was requested.
    pub fn prompts(&self) -> usize {
        self.prompts
    }

    /// Keys that have not been consumed yet.
    pub fn remaining_keys(&self) -> usize {
        self.keys.len()
    }
}

impl InputSource for ScriptedInput {
    fn poll_key(&mut self) -> io::Result<Option<Key>> {
        // An exhausted script behaves like the user pressing Escape.
        Ok(self.keys.pop_front().unwrap_or(Some(Key::Escape)))
    }

    fn read_line(&mut self, _prompt: &str) -> io::Result<String> {
        self.prompts += 1;
        self.lines
            .pop_front()
            .ok_or_else(|| io::Error::new(io::ErrorKind::UnexpectedEof, "no scripted line"))
    }
}
