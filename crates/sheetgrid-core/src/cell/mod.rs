//! Cell-related types and utilities
//!
//! This module contains:
//! - [`CellAddress`] and the column-letter codec
//! - [`CellValue`] - The typed value of a cell
//! - [`ValueKind`] - How a value is represented on disk

mod address;
mod value;

pub use address::{
    check_column, check_row, column_to_letters, letters_to_column, split_address, CellAddress,
};
pub use value::{format_number, parse_number, CellValue, ValueKind};
