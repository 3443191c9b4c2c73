//! Driver pin tables for serpentine-wired dual-pin LED matrices.
//!
//! [`PinMatrix`] computes, fully in const, which connector pin feeds the
//! positive and negative terminal of every LED; [`PinTable`] renders a grid as
//! the fixed-width text table. Enable `host` for runtime-sized grids, atomic
//! file output, and pin list files.
#![cfg_attr(not(any(test, feature = "host")), no_std)]

mod error;
pub mod led_pins;
pub mod pin_matrix;
#[cfg(feature = "host")]
mod pin_list;
pub mod pin_table;

// Re-export commonly used items
pub use error::{Error, Result};
pub use led_pins::{DEFAULT_TABLE_FILE, LED_PINS, MATRIX_COLS, MATRIX_PINS, MATRIX_ROWS};
#[cfg(feature = "host")]
pub use pin_list::{parse_pin_list, read_pin_list};
#[cfg(feature = "host")]
pub use pin_matrix::PinGrid;
pub use pin_matrix::{Direction, PinMatrix, PinPair, PinRows, Rung, RungStep, Terminal};
#[cfg(feature = "host")]
pub use pin_table::{read_pin_table, write_pin_table};
pub use pin_table::PinTable;
