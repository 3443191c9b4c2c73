#[cfg(feature = "host")]
use std::{io, path::PathBuf};

use derive_more::derive::{Display, Error};

/// A specialized `Result` where the error is this crate's `Error` type.
pub type Result<T, E = Error> = core::result::Result<T, E>;

/// Define a unified error type for this crate.
#[derive(Debug, Display, Error)]
pub enum Error {
    /// The pin list has fewer entries than the grid has rows, so some row would
    /// seed its rung from a pin that does not exist.
    #[display("pin list has {pins} entries but the grid has {rows} rows")]
    IndexOutOfRange { pins: usize, rows: usize },

    /// The pin table destination could not be created, written, or moved into place.
    #[cfg(feature = "host")]
    #[display("cannot write pin table to {}: {source}", path.display())]
    OutputUnavailable { path: PathBuf, source: io::Error },

    /// A pin list file could not be read.
    #[cfg(feature = "host")]
    #[display("cannot read pin list from {}: {source}", path.display())]
    InputUnavailable { path: PathBuf, source: io::Error },

    /// A pin list token is not a pin number in `0..=255`.
    #[cfg(feature = "host")]
    #[display("invalid pin {token:?} on line {line}")]
    InvalidPin { line: usize, token: String },

    /// A pin list file or string holds no pins once comments are stripped.
    #[cfg(feature = "host")]
    #[display("pin list is empty")]
    EmptyPinList,
}
