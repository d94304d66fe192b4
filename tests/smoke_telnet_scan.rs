//! End-to-end checks of the `telnet-scan` binary over piped stdin.

use std::io::Write;
use std::process::{Command, Stdio};

fn run_with_stdin(stdin: &str) -> String {
    let mut child = Command::new(env!("CARGO_BIN_EXE_telnet-scan"))
        .env_remove("UART_KIT_CONFIG")
        .env("RUST_LOG", "off")
        .current_dir(env!("CARGO_TARGET_TMPDIR"))
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .expect("spawn telnet-scan");

    child
        .stdin
        .take()
        .unwrap()
        .write_all(stdin.as_bytes())
        .unwrap();

    let output = child.wait_with_output().unwrap();
    assert!(output.status.success());
    String::from_utf8(output.stdout).unwrap()
}

#[test]
fn invalid_network_is_reported_and_nothing_is_scanned() {
    let stdout = run_with_stdin("banana\n\n\n");

    assert!(stdout.contains("Invalid network address."));
    assert!(!stdout.contains("checking"));
}

#[test]
fn reversed_offsets_are_refused() {
    let stdout = run_with_stdin("192.168.1.0/24\n9\n3\n");

    assert!(stdout.contains("Invalid range: start 9 is after end 3"));
    assert!(!stdout.contains("checking"));
}
