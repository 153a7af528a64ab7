//! # sheetgrid-xlsx
//!
//! Sparse, order-preserving read/write access to XLSX (Office Open XML)
//! spreadsheets.
//!
//! The package is loaded into memory as a set of XML trees. Rows and cells
//! are indexed per sheet and created in the tree only when first asked
//! for, always at their ordered position, so untouched parts of a workbook
//! are written back as they were read.
//!
//! - [`Document`] - opens, creates and saves a workbook
//! - [`SheetCollection`] - sheet directory, lookup by id or name
//! - [`SheetRef`]/[`SheetMut`], [`RowRef`]/[`RowMut`], [`CellRef`]/[`CellMut`] -
//!   views that read and write cells with the document's shared strings and
//!   date style
//! - [`dom`] and [`package`] - the XML tree and OPC container underneath

pub mod cell;
pub mod document;
pub mod dom;
pub mod error;
pub mod package;
pub mod row;
pub mod shared_strings;
pub mod sheet;
pub mod styles;
pub mod workbook;

pub use cell::{CellMut, CellRef};
pub use document::{Document, OpenOptions};
pub use error::{XlsxError, XlsxResult};
pub use row::{CellIndex, Row, RowMut, RowRef};
pub use shared_strings::SharedStringPool;
pub use sheet::{RowIndex, Sheet, SheetMut, SheetRef};
pub use styles::StyleIndex;
pub use workbook::SheetCollection;
