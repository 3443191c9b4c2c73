//! Per-cell driver pins for serpentine-wired dual-pin LED matrices.
//!
//! Every connector pin drives one *rung*: a wire pair that snakes through the
//! matrix one column at a time, feeding the positive terminal of the row it
//! sits on and the negative terminal of the row above it. Successive rungs
//! enter one row further down and alternate their starting direction.
//!
//! See [`PinMatrix`] for the fully const form and `PinGrid` (feature `host`)
//! for grids whose size is only known at runtime. Both are filled by the same
//! [`Rung`] walk, so they agree cell for cell.

use crate::{Error, Result};

/// One side of an LED cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Terminal {
    Positive,
    Negative,
}

/// The pins wired to the two terminals of one LED cell.
///
/// A terminal no rung reached is `None`. The text table prints it as `0`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PinPair {
    pub positive: Option<u8>,
    pub negative: Option<u8>,
}

impl PinPair {
    /// A cell no rung has touched.
    pub const UNSET: Self = Self {
        positive: None,
        negative: None,
    };

    /// A fully wired cell.
    #[must_use]
    pub const fn new(positive: u8, negative: u8) -> Self {
        Self {
            positive: Some(positive),
            negative: Some(negative),
        }
    }

    /// The pin on one terminal, if any.
    #[must_use]
    pub const fn terminal(self, terminal: Terminal) -> Option<u8> {
        match terminal {
            Terminal::Positive => self.positive,
            Terminal::Negative => self.negative,
        }
    }

    /// `(high, low)` pins that light this LED, when both terminals are wired.
    ///
    /// ```rust
    /// use matrix_pins::PinPair;
    ///
    /// assert_eq!(PinPair::new(5, 4).drive(), Some((5, 4)));
    /// assert_eq!(PinPair::UNSET.drive(), None);
    /// ```
    #[must_use]
    pub const fn drive(self) -> Option<(u8, u8)> {
        match (self.positive, self.negative) {
            (Some(positive), Some(negative)) => Some((positive, negative)),
            _ => None,
        }
    }

    /// Const equality helper.
    #[must_use]
    pub const fn equals(self, other: Self) -> bool {
        same_pin(self.positive, other.positive) && same_pin(self.negative, other.negative)
    }
}

const fn same_pin(left: Option<u8>, right: Option<u8>) -> bool {
    match (left, right) {
        (Some(left), Some(right)) => left == right,
        (None, None) => true,
        _ => false,
    }
}

/// Which way a rung is currently walking through the rows.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Direction {
    /// Toward row 0.
    Ascending,
    /// Away from row 0.
    Descending,
}

impl Direction {
    /// Even rungs start ascending, odd rungs start descending.
    #[must_use]
    pub const fn for_rung(rung_index: usize) -> Self {
        if rung_index % 2 == 0 {
            Self::Ascending
        } else {
            Self::Descending
        }
    }
}

/// The writes one rung makes in one column.
///
/// Rows are reported as walked. A rung seeded past the last row reports rows
/// that do not exist; grids drop those writes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RungStep {
    pub positive_row: Option<usize>,
    pub negative_row: Option<usize>,
}

/// One connector pin's walk through the matrix, one column per [`Rung::step`].
///
/// Rung `i` starts on row `i`, heading in [`Direction::for_rung`]`(i)`. It
/// bounces off row 0 and off `rows` (one past the last row) without moving on
/// the step that turns it around.
///
/// ```rust
/// use matrix_pins::{Direction, Rung, RungStep};
///
/// // Rung 0 starts on the top row heading up, so it turns around at once.
/// let mut rung = Rung::new(0, 2);
/// assert_eq!(rung.step(), RungStep { positive_row: Some(0), negative_row: None });
/// assert_eq!(rung.direction(), Direction::Descending);
/// assert_eq!(rung.step(), RungStep { positive_row: Some(0), negative_row: None });
/// assert_eq!(rung.step(), RungStep { positive_row: Some(1), negative_row: Some(0) });
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Rung {
    row: usize,
    rows: usize,
    direction: Direction,
}

impl Rung {
    #[must_use]
    pub const fn new(rung_index: usize, rows: usize) -> Self {
        Self {
            row: rung_index,
            rows,
            direction: Direction::for_rung(rung_index),
        }
    }

    /// The row the rung sits on before its next step.
    #[must_use]
    pub const fn row(&self) -> usize {
        self.row
    }

    #[must_use]
    pub const fn direction(&self) -> Direction {
        self.direction
    }

    /// Advance one column.
    #[expect(
        clippy::arithmetic_side_effects,
        reason = "decrements only above row 0; increments are bounded by the column count"
    )]
    pub const fn step(&mut self) -> RungStep {
        match self.direction {
            Direction::Ascending => {
                // `row == rows` only right after bouncing off the bottom edge.
                let positive_row = if self.row == self.rows {
                    None
                } else {
                    Some(self.row)
                };
                let negative_row = if self.row == 0 {
                    self.direction = Direction::Descending;
                    None
                } else {
                    self.row -= 1;
                    Some(self.row)
                };
                RungStep {
                    positive_row,
                    negative_row,
                }
            }
            Direction::Descending => {
                // `row == 0` only right after bouncing off the top edge.
                let negative_row = if self.row == 0 {
                    None
                } else {
                    Some(self.row - 1)
                };
                let positive_row = if self.row == self.rows {
                    self.direction = Direction::Ascending;
                    None
                } else {
                    let row = self.row;
                    self.row += 1;
                    Some(row)
                };
                RungStep {
                    positive_row,
                    negative_row,
                }
            }
        }
    }
}

impl Iterator for Rung {
    type Item = RungStep;

    fn next(&mut self) -> Option<RungStep> {
        Some(self.step())
    }
}

/// Row-major access to the cells of a pin grid.
pub trait PinRows {
    /// Each row of cells, row 0 first.
    fn pin_rows(&self) -> impl Iterator<Item = &[PinPair]>;

    /// Every `(row, col)` whose `terminal` is wired to `pin`, in row-major order.
    fn cells_driven_by(
        &self,
        pin: u8,
        terminal: Terminal,
    ) -> impl Iterator<Item = (usize, usize)> {
        self.pin_rows()
            .enumerate()
            .flat_map(move |(row_index, cells)| {
                cells
                    .iter()
                    .enumerate()
                    .filter(move |(_, cell)| cell.terminal(terminal) == Some(pin))
                    .map(move |(col_index, _)| (row_index, col_index))
            })
    }
}

/// A fully const table of the positive/negative pins of every LED cell.
///
/// # Examples
///
/// ```rust
/// use matrix_pins::{PinMatrix, PinPair};
///
/// const PINS: PinMatrix<2, 3> = PinMatrix::new(&[1, 2, 3]);
/// const EXPECTED: PinMatrix<2, 3> = PinMatrix::from_cells([
///     [PinPair::new(1, 2), PinPair::new(1, 3), PinPair::new(3, 1)],
///     [PinPair::new(2, 3), PinPair::new(3, 2), PinPair::new(1, 2)],
/// ]);
/// const _: () = assert!(PINS.equals(&EXPECTED));
/// ```
///
/// ```text
/// 2×3 grid, pins [1, 2, 3] as (positive,negative):
///   ( 1, 2) ( 1, 3) ( 3, 1)
///   ( 2, 3) ( 3, 2) ( 1, 2)
/// ```
///
/// A short pin list is caught at compile time:
///
/// ```compile_fail
/// # use matrix_pins::PinMatrix;
/// // Three rows need at least three pins
/// const INVALID: PinMatrix<3, 2> = PinMatrix::new(&[1, 2]);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PinMatrix<const ROWS: usize, const COLS: usize> {
    cells: [[PinPair; COLS]; ROWS],
}

impl<const ROWS: usize, const COLS: usize> PinMatrix<ROWS, COLS> {
    /// Walk every rung of `pins` through the grid. Later rungs overwrite earlier ones.
    ///
    /// Panics (at compile time in a const) if `pins` has fewer than `ROWS` entries.
    #[must_use]
    pub const fn new(pins: &[u8]) -> Self {
        const { assert!(ROWS > 0 && COLS > 0, "ROWS and COLS must be positive") }
        assert!(pins.len() >= ROWS, "pin list must have at least ROWS entries");
        Self::walk(pins)
    }

    /// Runtime-checked form of [`PinMatrix::new`].
    ///
    /// Empty dimensions are still rejected at compile time:
    ///
    /// ```compile_fail
    /// # use matrix_pins::PinMatrix;
    /// let _ = PinMatrix::<0, 4>::try_new(&[1, 2]);
    /// ```
    ///
    /// # Errors
    ///
    /// [`Error::IndexOutOfRange`] if `pins` has fewer than `ROWS` entries.
    pub fn try_new(pins: &[u8]) -> Result<Self> {
        const { assert!(ROWS > 0 && COLS > 0, "ROWS and COLS must be positive") }
        if pins.len() < ROWS {
            return Err(Error::IndexOutOfRange {
                pins: pins.len(),
                rows: ROWS,
            });
        }
        Ok(Self::walk(pins))
    }

    /// Wrap cells computed elsewhere, e.g. a golden table.
    #[must_use]
    pub const fn from_cells(cells: [[PinPair; COLS]; ROWS]) -> Self {
        Self { cells }
    }

    #[expect(
        clippy::indexing_slicing,
        reason = "rung_index < pins.len(), and rows/cols are bounds-checked before each write"
    )]
    const fn walk(pins: &[u8]) -> Self {
        let mut cells = [[PinPair::UNSET; COLS]; ROWS];

        let mut rung_index = 0;
        while rung_index < pins.len() {
            let pin = pins[rung_index];
            let mut rung = Rung::new(rung_index, ROWS);

            let mut col = 0;
            while col < COLS {
                let step = rung.step();
                if let Some(row) = step.positive_row {
                    if row < ROWS {
                        cells[row][col].positive = Some(pin);
                    }
                }
                if let Some(row) = step.negative_row {
                    if row < ROWS {
                        cells[row][col].negative = Some(pin);
                    }
                }
                col += 1;
            }

            rung_index += 1;
        }

        Self { cells }
    }

    /// Access the checked cell table, row-major.
    #[must_use]
    pub const fn cells(&self) -> &[[PinPair; COLS]; ROWS] {
        &self.cells
    }

    #[must_use]
    pub const fn rows(&self) -> usize {
        ROWS
    }

    #[must_use]
    pub const fn cols(&self) -> usize {
        COLS
    }

    /// The pins of one cell, or `None` outside the grid.
    #[must_use]
    #[expect(clippy::indexing_slicing, reason = "bounds checked just above")]
    pub const fn cell(&self, row: usize, col: usize) -> Option<PinPair> {
        if row < ROWS && col < COLS {
            Some(self.cells[row][col])
        } else {
            None
        }
    }

    /// Const equality helper for doctests and const tables.
    #[must_use]
    #[expect(clippy::indexing_slicing, reason = "loops stay below ROWS and COLS")]
    pub const fn equals(&self, other: &Self) -> bool {
        let mut row = 0;
        while row < ROWS {
            let mut col = 0;
            while col < COLS {
                if !self.cells[row][col].equals(other.cells[row][col]) {
                    return false;
                }
                col += 1;
            }
            row += 1;
        }
        true
    }
}

impl<const ROWS: usize, const COLS: usize> PinRows for PinMatrix<ROWS, COLS> {
    fn pin_rows(&self) -> impl Iterator<Item = &[PinPair]> {
        self.cells.iter().map(<[PinPair; COLS]>::as_slice)
    }
}

/// A pin table whose dimensions are chosen at runtime.
///
/// Filled by the same rung walk as [`PinMatrix`]; the two agree for equal inputs.
///
/// ```rust
/// use matrix_pins::{PinGrid, PinMatrix, PinPair};
///
/// let grid = PinGrid::try_new(&[1, 2, 3], 2, 3)?;
/// assert_eq!(grid.cell(1, 0), Some(PinPair::new(2, 3)));
/// assert_eq!(grid.cell(2, 0), None);
/// assert_eq!(grid, PinGrid::from(&PinMatrix::<2, 3>::new(&[1, 2, 3])));
/// # Ok::<(), matrix_pins::Error>(())
/// ```
#[cfg(feature = "host")]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PinGrid {
    rows: usize,
    cols: usize,
    cells: Vec<PinPair>,
}

#[cfg(feature = "host")]
impl PinGrid {
    /// Walk every rung of `pins` through a `rows × cols` grid.
    ///
    /// # Errors
    ///
    /// [`Error::IndexOutOfRange`] if `pins` has fewer than `rows` entries.
    pub fn try_new(pins: &[u8], rows: usize, cols: usize) -> Result<Self> {
        if pins.len() < rows {
            return Err(Error::IndexOutOfRange {
                pins: pins.len(),
                rows,
            });
        }

        let mut grid = Self {
            rows,
            cols,
            cells: vec![PinPair::UNSET; rows.saturating_mul(cols)],
        };

        for (rung_index, &pin) in pins.iter().enumerate() {
            let rung = Rung::new(rung_index, rows);
            for (col, step) in rung.take(cols).enumerate() {
                if let Some(cell) = step.positive_row.and_then(|row| grid.cell_mut(row, col)) {
                    cell.positive = Some(pin);
                }
                if let Some(cell) = step.negative_row.and_then(|row| grid.cell_mut(row, col)) {
                    cell.negative = Some(pin);
                }
            }
        }

        Ok(grid)
    }

    #[must_use]
    pub const fn rows(&self) -> usize {
        self.rows
    }

    #[must_use]
    pub const fn cols(&self) -> usize {
        self.cols
    }

    /// The pins of one cell, or `None` outside the grid.
    #[must_use]
    pub fn cell(&self, row: usize, col: usize) -> Option<PinPair> {
        self.index_of(row, col)
            .and_then(|index| self.cells.get(index))
            .copied()
    }

    fn cell_mut(&mut self, row: usize, col: usize) -> Option<&mut PinPair> {
        self.index_of(row, col)
            .and_then(|index| self.cells.get_mut(index))
    }

    fn index_of(&self, row: usize, col: usize) -> Option<usize> {
        if row < self.rows && col < self.cols {
            row.checked_mul(self.cols)?.checked_add(col)
        } else {
            None
        }
    }
}

#[cfg(feature = "host")]
impl PinRows for PinGrid {
    fn pin_rows(&self) -> impl Iterator<Item = &[PinPair]> {
        (0..self.rows).map(move |row| {
            let start = row.saturating_mul(self.cols);
            self.cells
                .get(start..start.saturating_add(self.cols))
                .unwrap_or_default()
        })
    }
}

#[cfg(feature = "host")]
impl<const ROWS: usize, const COLS: usize> From<&PinMatrix<ROWS, COLS>> for PinGrid {
    fn from(matrix: &PinMatrix<ROWS, COLS>) -> Self {
        Self {
            rows: ROWS,
            cols: COLS,
            cells: matrix.cells.iter().flatten().copied().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Direction, Rung, RungStep};

    fn step(positive_row: Option<usize>, negative_row: Option<usize>) -> RungStep {
        RungStep {
            positive_row,
            negative_row,
        }
    }

    #[test]
    fn ascending_rung_climbs_then_turns_at_top() {
        let mut rung = Rung::new(2, 4);
        assert_eq!(rung.direction(), Direction::Ascending);
        assert_eq!(rung.step(), step(Some(2), Some(1)));
        assert_eq!(rung.step(), step(Some(1), Some(0)));
        assert_eq!(rung.step(), step(Some(0), None));
        assert_eq!(rung.direction(), Direction::Descending);
        assert_eq!(rung.row(), 0);
        assert_eq!(rung.step(), step(Some(0), None));
        assert_eq!(rung.step(), step(Some(1), Some(0)));
    }

    #[test]
    fn descending_rung_turns_one_past_bottom() {
        let mut rung = Rung::new(3, 4);
        assert_eq!(rung.direction(), Direction::Descending);
        assert_eq!(rung.step(), step(Some(3), Some(2)));
        assert_eq!(rung.row(), 4);
        // Sitting past the last row: only the last row's negative is fed.
        assert_eq!(rung.step(), step(None, Some(3)));
        assert_eq!(rung.direction(), Direction::Ascending);
        assert_eq!(rung.step(), step(None, Some(3)));
        assert_eq!(rung.step(), step(Some(3), Some(2)));
    }

    #[test]
    fn rung_seeded_past_grid_reports_rows_outside_it() {
        let mut rung = Rung::new(5, 4);
        assert_eq!(rung.step(), step(Some(5), Some(4)));
        assert_eq!(rung.step(), step(Some(6), Some(5)));
    }

    #[test]
    fn iterator_matches_step() {
        let stepped: Vec<RungStep> = {
            let mut rung = Rung::new(1, 3);
            (0..6).map(|_| rung.step()).collect()
        };
        let iterated: Vec<RungStep> = Rung::new(1, 3).take(6).collect();
        assert_eq!(stepped, iterated);
    }
}
