//! Fixed-width text rendering of pin grids.
//!
//! One line per row, row 0 first. Each cell is `(PP,NN) ` with both pins
//! right-aligned in a two-character field; an unwired terminal prints as `0`.
//! The width is a minimum, so three-digit pins widen their cell.

use core::fmt;

#[cfg(feature = "host")]
use std::{fs, io::Write as _, path::Path};

use crate::pin_matrix::{PinPair, PinRows};
#[cfg(feature = "host")]
use crate::{Error, Result};

/// Displays a pin grid as the text table.
///
/// ```rust
/// use matrix_pins::{PinMatrix, PinTable};
///
/// const PINS: PinMatrix<2, 3> = PinMatrix::new(&[1, 2, 3]);
/// assert_eq!(
///     PinTable(&PINS).to_string(),
///     "( 1, 2) ( 1, 3) ( 3, 1) \n( 2, 3) ( 3, 2) ( 1, 2) \n"
/// );
/// ```
#[derive(Clone, Copy, Debug)]
pub struct PinTable<'a, T: ?Sized>(pub &'a T);

impl<T: PinRows + ?Sized> fmt::Display for PinTable<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.0.pin_rows() {
            for cell in row {
                write_cell(f, *cell)?;
            }
            f.write_str("\n")?;
        }
        Ok(())
    }
}

fn write_cell(f: &mut fmt::Formatter<'_>, cell: PinPair) -> fmt::Result {
    write!(
        f,
        "({:2},{:2}) ",
        cell.positive.unwrap_or(0),
        cell.negative.unwrap_or(0)
    )
}

/// Write the text table for `grid` to `path`, replacing any existing file.
///
/// The table is written to a temporary file beside `path` and renamed into
/// place, so `path` never holds a partial table.
///
/// # Errors
///
/// [`Error::OutputUnavailable`] if the temporary file cannot be created or
/// written, or cannot be moved onto `path`.
#[cfg(feature = "host")]
pub fn write_pin_table<T: PinRows + ?Sized>(path: impl AsRef<Path>, grid: &T) -> Result<()> {
    let path = path.as_ref();
    let unavailable = |source| Error::OutputUnavailable {
        path: path.to_path_buf(),
        source,
    };

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut file = tempfile::NamedTempFile::new_in(dir).map_err(unavailable)?;
    write!(file, "{}", PinTable(grid)).map_err(unavailable)?;
    file.as_file().sync_all().map_err(unavailable)?;
    file.persist(path).map_err(|err| unavailable(err.error))?;

    Ok(())
}

/// Read back a table written by [`write_pin_table`].
///
/// # Errors
///
/// [`Error::InputUnavailable`] if the file cannot be read.
#[cfg(feature = "host")]
pub fn read_pin_table(path: impl AsRef<Path>) -> Result<String> {
    let path = path.as_ref();
    fs::read_to_string(path).map_err(|source| Error::InputUnavailable {
        path: path.to_path_buf(),
        source,
    })
}
