//! Prelude module - common imports for sheetgrid users
//!
//! ```rust
//! use sheetgrid::prelude::*;
//! ```

pub use crate::{
    // Cell types
    CellAddress,
    CellMut,
    CellRef,
    CellValue,
    ValueKind,

    // Main types
    Document,
    OpenOptions,
    RowMut,
    RowRef,
    SheetMut,
    SheetRef,

    // Error types
    Error,
    XlsxError,
    XlsxResult,
};
