//! Wiring of the 28×20 dual-pin display.

use crate::pin_matrix::PinMatrix;

// Rows top to bottom, columns left to right; (0,0) is the top-left LED.
pub const MATRIX_ROWS: usize = 28;
pub const MATRIX_COLS: usize = 20;

/// Connector pins in rung order, top of the display first.
///
/// One more rung than rows: the last rung only feeds the bottom row's negatives.
pub const LED_PINS: [u8; 29] = [
    5, 4, 3, 9, 2, 8, 1, 7, 0, 6, 22, 16, 23, 24, 21, 14, 19, 26, 18, 15, 20, 28, 17, 25, 13, 27,
    12, 10, 11,
];

/// Positive/negative pins of every LED, computed at compile time.
pub const MATRIX_PINS: PinMatrix<MATRIX_ROWS, MATRIX_COLS> = PinMatrix::new(&LED_PINS);

/// Where the generator writes the text table by default.
pub const DEFAULT_TABLE_FILE: &str = "matrix_pins.txt";
