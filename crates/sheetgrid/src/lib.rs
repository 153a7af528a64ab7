//! # sheetgrid
//!
//! Sparse, order-preserving read/write access to XLSX spreadsheets.
//!
//! Only the cells a program touches are created, each at its ordered place
//! in its row and each row at its ordered place in its sheet. Everything
//! else in the file is written back as it was read.
//!
//! ## Features
//!
//! - Open, create, save and close XLSX documents
//! - Address cells as `"B7"` or as numeric (row, column) pairs
//! - Typed reads and writes: text, numbers, booleans and dates
//! - Shared string pool and date formatting handled for you
//! - Sheet lookup by id or (case-insensitive) name, unique default names
//!
//! ## Example
//!
//! ```rust
//! use sheetgrid::prelude::*;
//!
//! let mut doc = Document::new().unwrap();
//! let mut sheet = doc.add_sheet("").unwrap();
//!
//! sheet.set("A1", "Hello").unwrap();
//! sheet.set("B1", 42.0).unwrap();
//! sheet.cell("C1").unwrap().write_as("3,5", ValueKind::Number).unwrap();
//!
//! assert_eq!(sheet.value("C1").unwrap(), CellValue::Number(3.5));
//!
//! // Save to file
//! // doc.save_as("output.xlsx").unwrap();
//! ```

pub mod prelude;

// Re-export core types
pub use sheetgrid_core::{
    check_column, check_row, column_to_letters, date, letters_to_column, naming, split_address,
    Axis, CellAddress, CellValue, Error, Result, SparseIndex, ValueKind, MAX_COLS, MAX_ROWS,
    MAX_SHEET_NAME_LEN,
};

// Re-export document types
pub use sheetgrid_xlsx::{
    CellMut, CellRef, Document, OpenOptions, RowMut, RowRef, SharedStringPool, SheetCollection,
    SheetMut, SheetRef, XlsxError, XlsxResult,
};
