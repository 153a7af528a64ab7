//! Error types for sheetgrid-core

use thiserror::Error;

/// Result type alias using [`Error`]
pub type Result<T> = std::result::Result<T, Error>;

/// Which kind of 1-based key a coordinate is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    /// Row number (1-based)
    Row,
    /// Column number (1-based)
    Column,
    /// Workbook-wide sheet id (1-based)
    Sheet,
}

impl std::fmt::Display for Axis {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Axis::Row => write!(f, "row"),
            Axis::Column => write!(f, "column"),
            Axis::Sheet => write!(f, "sheet id"),
        }
    }
}

/// Errors that can occur in sheetgrid-core
#[derive(Debug, Error)]
pub enum Error {
    /// Row or column index outside `1..=max`
    #[error("Invalid {axis} index {index} (valid range: 1..={max})")]
    InvalidCoordinate { axis: Axis, index: u32, max: u32 },

    /// Address string without a letter run or a digit run
    #[error("Malformed cell address: {0}")]
    MalformedAddress(String),

    /// Index into a shared table (strings, cell formats) with no entry
    #[error("{table} index {index} out of range (len: {len})")]
    OutOfRangeReference {
        table: &'static str,
        index: usize,
        len: usize,
    },

    /// Text that cannot be read as a number
    #[error("Invalid number: {0:?}")]
    InvalidNumber(String),

    /// Text or serial that cannot be read as a date
    #[error("Invalid date: {0}")]
    InvalidDate(String),

    /// Value that cannot be coerced to the requested kind
    #[error("Invalid value type: expected {expected}, got {actual:?}")]
    InvalidValueType {
        expected: &'static str,
        actual: String,
    },

    /// Invalid sheet name
    #[error("Invalid sheet name: {0}")]
    InvalidSheetName(String),

    /// Duplicate sheet name
    #[error("Sheet name already exists: {0}")]
    DuplicateSheetName(String),
}

impl Error {
    pub(crate) fn invalid_row(index: u32) -> Self {
        Error::InvalidCoordinate {
            axis: Axis::Row,
            index,
            max: crate::MAX_ROWS,
        }
    }

    pub(crate) fn invalid_column(index: u32) -> Self {
        Error::InvalidCoordinate {
            axis: Axis::Column,
            index,
            max: crate::MAX_COLS,
        }
    }

    /// Error for a coordinate on the given axis
    pub fn invalid_coordinate(axis: Axis, index: u32) -> Self {
        match axis {
            Axis::Row => Self::invalid_row(index),
            Axis::Column => Self::invalid_column(index),
            Axis::Sheet => Error::InvalidCoordinate {
                axis,
                index,
                max: u32::MAX,
            },
        }
    }
}
