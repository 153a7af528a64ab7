//! End-to-end tests for sheetgrid-xlsx.
//!
//! Each test builds the archive it needs in memory, part by part, the way
//! other spreadsheet applications lay them out, then opens it with
//! `Document::read` and checks what comes back (and what is written out
//! again).

mod common;
mod loading;

// Re-export common utilities for submodules
pub use common::*;
