//! Host-level tests for the fixed-width pin table.

use matrix_pins::{
    Error, LED_PINS, MATRIX_COLS, MATRIX_PINS, MATRIX_ROWS, PinGrid, PinMatrix, PinPair, PinTable,
    read_pin_table, write_pin_table,
};
use std::path::{Path, PathBuf};

const REFERENCE_TABLE: &str = "tests/data/matrix_pins_28x20.txt";

fn reference_path() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join(REFERENCE_TABLE)
}

#[test]
fn reference_table_matches_golden_file() {
    let expected = read_pin_table(reference_path()).expect("golden table must exist");
    assert_eq!(PinTable(&MATRIX_PINS).to_string(), expected);
}

#[test]
fn table_has_one_line_per_row_and_fixed_width_cells() {
    let text = PinTable(&MATRIX_PINS).to_string();
    let lines: Vec<_> = text.lines().collect();
    assert_eq!(lines.len(), MATRIX_ROWS);
    for line in &lines {
        // "(PP,NN) " is eight characters.
        assert_eq!(line.len(), MATRIX_COLS * 8, "{line:?}");
    }
    assert!(lines[0].starts_with("( 5, 4) ( 5, 3) ( 3, 5) "));
    assert!(text.ends_with(") \n"));
}

#[test]
fn unset_terminals_print_as_zero() {
    const PINS: PinMatrix<3, 4> = PinMatrix::new(&[7, 8, 9]);
    assert_eq!(
        PinTable(&PINS).to_string(),
        "( 7, 8) ( 7, 9) ( 9, 7) ( 9, 0) \n\
         ( 8, 9) ( 9, 8) ( 7, 0) ( 0, 7) \n\
         ( 9, 0) ( 8, 0) ( 0, 8) ( 7, 8) \n"
    );
}

#[test]
fn three_digit_pins_widen_their_cell() {
    let pins = PinMatrix::<1, 1>::from_cells([[PinPair::new(128, 7)]]);
    assert_eq!(PinTable(&pins).to_string(), "(128, 7) \n");
}

#[test]
fn runtime_grid_renders_like_const_matrix() {
    let grid = PinGrid::try_new(&LED_PINS, MATRIX_ROWS, MATRIX_COLS).expect("pins fit");
    assert_eq!(
        PinTable(&grid).to_string(),
        PinTable(&MATRIX_PINS).to_string()
    );
}

#[test]
fn rendering_is_idempotent() {
    let table = PinTable(&MATRIX_PINS);
    assert_eq!(table.to_string(), table.to_string());
}

#[test]
fn write_pin_table_round_trips_through_file() {
    let dir = tempfile::tempdir().expect("failed to create temp dir");
    let path = dir.path().join("matrix_pins.txt");

    write_pin_table(&path, &MATRIX_PINS).expect("write must succeed");
    let first = std::fs::read(&path).expect("table must exist");
    write_pin_table(&path, &MATRIX_PINS).expect("rewrite must succeed");
    let second = std::fs::read(&path).expect("table must exist");

    assert_eq!(first, second);
    assert_eq!(
        String::from_utf8(first).expect("table is ASCII"),
        read_pin_table(reference_path()).expect("golden table must exist")
    );
    // Only the table itself is left behind.
    let entries = std::fs::read_dir(dir.path()).expect("dir readable").count();
    assert_eq!(entries, 1);
}

#[test]
fn write_pin_table_replaces_existing_file() {
    let dir = tempfile::tempdir().expect("failed to create temp dir");
    let path = dir.path().join("matrix_pins.txt");
    std::fs::write(&path, "stale").expect("seed file");

    let grid = PinGrid::try_new(&[1, 2, 3], 2, 3).expect("pins fit");
    write_pin_table(&path, &grid).expect("write must succeed");

    assert_eq!(
        std::fs::read_to_string(&path).expect("table must exist"),
        "( 1, 2) ( 1, 3) ( 3, 1) \n( 2, 3) ( 3, 2) ( 1, 2) \n"
    );
}

#[test]
fn missing_directory_is_output_unavailable() {
    let dir = tempfile::tempdir().expect("failed to create temp dir");
    let path = dir.path().join("no-such-dir").join("matrix_pins.txt");

    let err = write_pin_table(&path, &MATRIX_PINS).expect_err("directory does not exist");
    match &err {
        Error::OutputUnavailable { path: reported, .. } => assert_eq!(reported, &path),
        other => panic!("unexpected error: {other}"),
    }
    assert!(err.to_string().starts_with("cannot write pin table to "));
    assert!(!path.exists());
}
