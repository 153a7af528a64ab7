//! # sheetgrid-core
//!
//! Format-independent building blocks for the sheetgrid spreadsheet library.
//!
//! This crate provides:
//! - [`CellAddress`] and the column-letter codec (`"B7"` ⇄ row 7, column 2)
//! - [`CellValue`] and [`ValueKind`] - typed cell values and their on-disk kinds
//! - [`date`] - serial date numbers (days since 1899-12-30)
//! - [`SparseIndex`] - the ordered, lazily-filled map behind rows and cells
//! - [`naming`] - sheet name validation and unique name generation
//!
//! ## Example
//!
//! ```rust
//! use sheetgrid_core::{column_to_letters, split_address, CellValue, ValueKind};
//!
//! assert_eq!(split_address("AA12").unwrap(), (12, "AA".to_string()));
//! assert_eq!(column_to_letters(27).unwrap(), "AA");
//!
//! let n = CellValue::text("3,5").coerce(ValueKind::Number).unwrap();
//! assert_eq!(n, CellValue::Number(3.5));
//! ```

pub mod cell;
pub mod date;
pub mod error;
pub mod index;
pub mod naming;

// Re-exports for convenience
pub use cell::{
    check_column, check_row, column_to_letters, format_number, letters_to_column, parse_number,
    split_address, CellAddress, CellValue, ValueKind,
};
pub use error::{Axis, Error, Result};
pub use index::{Placement, SparseIndex};

/// Maximum number of rows in a worksheet (Excel limit)
pub const MAX_ROWS: u32 = 1_048_576;

/// Maximum number of columns in a worksheet (Excel limit)
pub const MAX_COLS: u32 = 16_384;

/// Maximum length of a sheet name
pub const MAX_SHEET_NAME_LEN: usize = 31;
