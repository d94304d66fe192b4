//! Port selection and the connect / fault / retry flow.

mod common;

use common::descriptors;
use std::io::{self, Cursor};
use uart_kit::console::{self, ConsoleError, SessionEnd};
use uart_kit::port::{select, PortError, PortSelector};

#[test]
fn numeric_suffix_selects_matching_port() {
    let candidates = descriptors(&["COM1", "COM3"]);
    let mut selector = PortSelector::new("COM");

    assert_eq!(selector.try_select(&candidates, "3").unwrap(), "COM3");
    assert_eq!(selector.selected(), Some("COM3"));
}

#[test]
fn unknown_suffix_leaves_selection_unchanged() {
    let candidates = descriptors(&["COM1", "COM3"]);

    let mut fresh = PortSelector::new("COM");
    let err = fresh.try_select(&candidates, "2").unwrap_err();
    assert_eq!(err.requested, "COM2");
    assert_eq!(fresh.selected(), None);

    let mut chosen = PortSelector::new("COM");
    chosen.try_select(&candidates, "1").unwrap();
    assert!(chosen.try_select(&candidates, "2").is_err());
    assert_eq!(chosen.selected(), Some("COM1"));
}

#[test]
fn match_is_exact() {
    let candidates = descriptors(&["COM1", "COM13"]);
    assert_eq!(select(&candidates, "COM", "1").unwrap().name, "COM1");
    assert!(select(&candidates, "COM", "3").is_err());
    assert!(select(&candidates, "com", "1").is_err());
}

#[test]
fn unix_style_prefix() {
    let candidates = descriptors(&["/dev/ttyUSB0", "/dev/ttyUSB1"]);
    assert_eq!(
        select(&candidates, "/dev/ttyUSB", "1").unwrap().name,
        "/dev/ttyUSB1"
    );
}

#[test]
fn cancelled_session_ends_the_program() {
    let mut selector = PortSelector::new("COM");
    let mut input = Cursor::new("3\n");
    let mut out = Vec::new();
    let mut opened = Vec::new();

    console::run_with(
        &mut selector,
        &mut input,
        &mut out,
        || Ok(descriptors(&["COM1", "COM3"])),
        |name| {
            opened.push(name.to_string());
            SessionEnd::Cancelled
        },
    )
    .unwrap();

    assert_eq!(opened, vec!["COM3"]);
}

#[test]
fn fault_then_blank_answer_exits() {
    let mut selector = PortSelector::new("COM").with_preset(Some("COM9".to_string()));
    let mut input = Cursor::new("\n");
    let mut out = Vec::new();
    let mut enumerations = 0;

    console::run_with(
        &mut selector,
        &mut input,
        &mut out,
        || {
            enumerations += 1;
            Ok(descriptors(&["COM1"]))
        },
        |name| SessionEnd::Faulted(ConsoleError::Port(PortError::not_found(name))),
    )
    .unwrap();

    // The preset skips enumeration entirely.
    assert_eq!(enumerations, 0);
    let text = String::from_utf8(out).unwrap();
    assert!(text.contains("Error: Serial port not found: COM9"));
    assert!(text.contains("Press Enter to exit"));
}

#[test]
fn fault_then_retry_prompts_again_with_selection_cleared() {
    let mut selector = PortSelector::new("COM").with_preset(Some("COM9".to_string()));
    let mut input = Cursor::new("y\n4\n1\n");
    let mut out = Vec::new();
    let mut opened = Vec::new();

    console::run_with(
        &mut selector,
        &mut input,
        &mut out,
        || Ok(descriptors(&["COM1", "COM3"])),
        |name| {
            opened.push(name.to_string());
            if name == "COM9" {
                SessionEnd::Faulted(ConsoleError::Terminal(io::Error::other("unplugged")))
            } else {
                SessionEnd::Cancelled
            }
        },
    )
    .unwrap();

    assert_eq!(opened, vec!["COM9", "COM1"]);
    let text = String::from_utf8(out).unwrap();
    assert!(text.contains("Invalid port 'COM4'"));
    assert!(text.contains("Selected port: COM1"));
}

#[test]
fn closed_input_during_selection_is_an_error() {
    let mut selector = PortSelector::new("COM");
    let mut out = Vec::new();

    let result = console::run_with(
        &mut selector,
        &mut Cursor::new(""),
        &mut out,
        || Ok(descriptors(&["COM1"])),
        |_| SessionEnd::Cancelled,
    );

    assert!(result.is_err());
}
