//! Cell address codec
//!
//! Conversions between spreadsheet column letters and 1-based column
//! numbers, and between `"B7"`-style strings and (row, column) pairs.
//! Everything here is 1-based, matching what is stored on disk.

use crate::error::{Error, Result};
use crate::{MAX_COLS, MAX_ROWS};
use std::fmt;
use std::str::FromStr;

/// Convert a 1-based column number to letters (1 = A, 26 = Z, 27 = AA, ...)
///
/// This is bijective base-26: there is no zero digit, so every multiple
/// of 26 ends in `Z` rather than carrying.
///
/// # Examples
/// ```
/// use sheetgrid_core::column_to_letters;
///
/// assert_eq!(column_to_letters(1).unwrap(), "A");
/// assert_eq!(column_to_letters(52).unwrap(), "AZ");
/// assert_eq!(column_to_letters(53).unwrap(), "BA");
/// ```
pub fn column_to_letters(col: u32) -> Result<String> {
    if col == 0 {
        return Err(Error::invalid_column(col));
    }

    let mut letters = Vec::with_capacity(3);
    let mut n = col;
    while n > 0 {
        n -= 1;
        letters.push(b'A' + (n % 26) as u8);
        n /= 26;
    }
    letters.reverse();

    Ok(letters.into_iter().map(char::from).collect())
}

/// Convert column letters to a 1-based column number (A = 1, Z = 26, AA = 27, ...)
///
/// Letters are case-insensitive.
pub fn letters_to_column(letters: &str) -> Result<u32> {
    if letters.is_empty() {
        return Err(Error::MalformedAddress("empty column letters".into()));
    }

    let mut col: u64 = 0;
    for c in letters.chars() {
        if !c.is_ascii_alphabetic() {
            return Err(Error::MalformedAddress(format!(
                "invalid column letter '{}' in '{}'",
                c, letters
            )));
        }
        col = col * 26 + (c.to_ascii_uppercase() as u64 - 'A' as u64 + 1);
        // Anything this long is already far past the column limit
        if col > u32::MAX as u64 {
            return Err(Error::MalformedAddress(format!(
                "column '{}' is too large",
                letters
            )));
        }
    }

    Ok(col as u32)
}

/// Split an address like `"B7"` into its row number and column letters
///
/// The column letters are returned upper-cased. `$` markers are accepted
/// and dropped, so `"$B$7"` splits the same way as `"B7"`.
pub fn split_address(address: &str) -> Result<(u32, String)> {
    let s = address.trim();
    let bytes = s.as_bytes();
    let mut pos = 0;

    if bytes.get(pos) == Some(&b'$') {
        pos += 1;
    }

    let col_start = pos;
    while pos < bytes.len() && bytes[pos].is_ascii_alphabetic() {
        pos += 1;
    }
    if pos == col_start {
        return Err(Error::MalformedAddress(format!(
            "no column letters in '{}'",
            address
        )));
    }
    let letters = s[col_start..pos].to_ascii_uppercase();

    if bytes.get(pos) == Some(&b'$') {
        pos += 1;
    }

    let digits = &s[pos..];
    if digits.is_empty() {
        return Err(Error::MalformedAddress(format!(
            "no row number in '{}'",
            address
        )));
    }
    if !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(Error::MalformedAddress(format!(
            "invalid row number in '{}'",
            address
        )));
    }

    let row: u32 = digits
        .parse()
        .map_err(|_| Error::MalformedAddress(format!("row number too large in '{}'", address)))?;

    Ok((row, letters))
}

/// Check that a row number is inside `1..=MAX_ROWS`
pub fn check_row(row: u32) -> Result<u32> {
    if row == 0 || row > MAX_ROWS {
        return Err(Error::invalid_row(row));
    }
    Ok(row)
}

/// Check that a column number is inside `1..=MAX_COLS`
pub fn check_column(col: u32) -> Result<u32> {
    if col == 0 || col > MAX_COLS {
        return Err(Error::invalid_column(col));
    }
    Ok(col)
}

/// A cell address (e.g., "A1", "XFD1048576")
///
/// Both components are 1-based, exactly as written in the address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CellAddress {
    /// Row number (1-based)
    pub row: u32,
    /// Column number (1-based, A = 1)
    pub col: u32,
}

impl CellAddress {
    /// Create an address from 1-based row and column numbers
    ///
    /// Fails with [`Error::InvalidCoordinate`] when either is out of range.
    pub fn new(row: u32, col: u32) -> Result<Self> {
        Ok(Self {
            row: check_row(row)?,
            col: check_column(col)?,
        })
    }

    /// Parse an address from A1-style notation
    ///
    /// # Examples
    /// ```
    /// use sheetgrid_core::CellAddress;
    ///
    /// let addr = CellAddress::parse("B7").unwrap();
    /// assert_eq!(addr.row, 7);
    /// assert_eq!(addr.col, 2);
    /// ```
    pub fn parse(s: &str) -> Result<Self> {
        let (row, letters) = split_address(s)?;
        let col = letters_to_column(&letters)?;
        Self::new(row, col)
    }

    /// Column letters of this address
    pub fn column_letters(&self) -> String {
        // `col` is validated on construction, so the conversion cannot fail
        column_to_letters(self.col).unwrap_or_default()
    }

    /// Format as A1-style string
    pub fn to_a1_string(&self) -> String {
        format!("{}{}", self.column_letters(), self.row)
    }
}

impl fmt::Display for CellAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_a1_string())
    }
}

impl FromStr for CellAddress {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}
