//! XLSX error types

use thiserror::Error;

/// Result type for XLSX operations
pub type XlsxResult<T> = std::result::Result<T, XlsxError>;

/// Errors that can occur while working with an XLSX document
#[derive(Debug, Error)]
pub enum XlsxError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// ZIP error
    #[error("ZIP error: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// XML error
    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),

    /// Invalid file format
    #[error("Invalid XLSX format: {0}")]
    InvalidFormat(String),

    /// Missing required part
    #[error("Missing required part: {0}")]
    MissingPart(String),

    /// No sheet with the given id or name
    #[error("Sheet not found: {0}")]
    SheetNotFound(String),

    /// Save requested for a document that has no file path
    #[error("Document has no file path; use save_as")]
    NoPath,

    /// The document was closed and can no longer be saved
    #[error("Document is closed")]
    Closed,

    /// Core error
    #[error("Core error: {0}")]
    Core(#[from] sheetgrid_core::Error),
}

impl From<quick_xml::events::attributes::AttrError> for XlsxError {
    fn from(e: quick_xml::events::attributes::AttrError) -> Self {
        XlsxError::Xml(e.into())
    }
}
