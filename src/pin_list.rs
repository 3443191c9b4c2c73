//! Pin lists from text: `5 4 3, 9 2` with `#` comments.

use std::{fs, path::Path};

use crate::{Error, Result};

/// Parse pins separated by whitespace and/or commas. `#` comments out the rest of a line.
///
/// ```rust
/// use matrix_pins::parse_pin_list;
///
/// let pins = parse_pin_list("5 4 3  # top\n9,2, 8\n")?;
/// assert_eq!(pins, [5, 4, 3, 9, 2, 8]);
/// # Ok::<(), matrix_pins::Error>(())
/// ```
///
/// # Errors
///
/// [`Error::InvalidPin`] for a token that is not a number in `0..=255`
/// (lines count from 1), [`Error::EmptyPinList`] if no pins remain.
pub fn parse_pin_list(text: &str) -> Result<Vec<u8>> {
    let mut pins = Vec::new();

    for (line_index, line) in text.lines().enumerate() {
        let content = line.split_once('#').map_or(line, |(before, _)| before);
        for token in content
            .split(|c: char| c == ',' || c.is_whitespace())
            .filter(|token| !token.is_empty())
        {
            let pin = token.parse::<u8>().map_err(|_| Error::InvalidPin {
                line: line_index.saturating_add(1),
                token: token.to_owned(),
            })?;
            pins.push(pin);
        }
    }

    if pins.is_empty() {
        return Err(Error::EmptyPinList);
    }
    Ok(pins)
}

/// Read and parse a pin list file.
///
/// # Errors
///
/// [`Error::InputUnavailable`] if the file cannot be read, otherwise as
/// [`parse_pin_list`].
pub fn read_pin_list(path: impl AsRef<Path>) -> Result<Vec<u8>> {
    let path = path.as_ref();
    let text = fs::read_to_string(path).map_err(|source| Error::InputUnavailable {
        path: path.to_path_buf(),
        source,
    })?;
    parse_pin_list(&text)
}
