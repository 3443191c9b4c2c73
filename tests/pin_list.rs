//! Host-level tests for pin list parsing.

use matrix_pins::{Error, LED_PINS, parse_pin_list, read_pin_list};

#[test]
fn parses_the_reference_list_as_written_in_notes() {
    let text = "5 4 3 9 2 8 1 7 0 6 22 16 23 24 21 14 19 26 18 15 20 28 17 25 13 27 12 10 11 \n";
    assert_eq!(parse_pin_list(text).expect("valid list"), LED_PINS);
}

#[test]
fn commas_whitespace_and_comments_mix() {
    let text = "# top of display\n5, 4,3\n\t9 2 # rung 4\n\n8,,1\n";
    assert_eq!(parse_pin_list(text).expect("valid list"), [5, 4, 3, 9, 2, 8, 1]);
}

#[test]
fn invalid_token_reports_line() {
    let err = parse_pin_list("5 4\n3 x9\n").expect_err("x9 is not a pin");
    match &err {
        Error::InvalidPin { line, token } => {
            assert_eq!(*line, 2);
            assert_eq!(token, "x9");
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(err.to_string(), "invalid pin \"x9\" on line 2");
}

#[test]
fn pin_above_255_is_invalid() {
    let err = parse_pin_list("256").expect_err("pins are u8");
    assert!(matches!(err, Error::InvalidPin { line: 1, .. }));
}

#[test]
fn comment_only_list_is_empty() {
    let err = parse_pin_list("# nothing here\n\n").expect_err("no pins");
    assert!(matches!(err, Error::EmptyPinList));
}

#[test]
fn read_pin_list_from_file() {
    let dir = tempfile::tempdir().expect("failed to create temp dir");
    let path = dir.path().join("pins.txt");
    std::fs::write(&path, "5 4 3\n").expect("seed file");
    assert_eq!(read_pin_list(&path).expect("valid file"), [5, 4, 3]);

    let missing = dir.path().join("missing.txt");
    let err = read_pin_list(&missing).expect_err("file does not exist");
    assert!(matches!(err, Error::InputUnavailable { .. }));
}
