use std::path::PathBuf;

use thiserror::Error;

use crate::model::{CanonicalField, SourceKind};

/// Convenient alias for fallible results returned throughout the crate.
pub type Result<T> = std::result::Result<T, ToolError>;

/// Error type covering the different failure cases that can occur when the
/// tool loads, reconciles, or emits record sets.
///
/// Unparseable numbers and duplicate keys are absorbed by the reconciliation
/// engine and never show up here.
#[derive(Debug, Error)]
pub enum ToolError {
    /// Wrapper for IO failures such as reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Raised when JSON parsing or serialization fails.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Errors bubbled up from the Excel writer implementation.
    #[error("Excel write error: {0}")]
    ExcelWrite(#[from] rust_xlsxwriter::XlsxError),

    /// Errors bubbled up from the xlsx-specific reader.
    #[error("Excel read error: {0}")]
    ExcelRead(#[from] calamine::XlsxError),

    /// Errors bubbled up from the format-detecting workbook reader.
    #[error("workbook error: {0}")]
    Workbook(#[from] calamine::Error),

    /// Raised when a workbook has no usable worksheet.
    #[error("invalid workbook structure: {0}")]
    InvalidWorkbook(String),

    /// Raised when the merge is started without the primary record set.
    #[error("the primary source is required before records can be merged")]
    MissingPrimarySource,

    /// Raised when no header of a record set matches a required field.
    #[error(
        "no column found for {field} in the {role} source; tried {aliases:?}, available headers: {headers:?}"
    )]
    HeaderNotFound {
        role: SourceKind,
        field: CanonicalField,
        aliases: Vec<String>,
        headers: Vec<String>,
    },

    /// Raised when a manually selected column is not present in the record set.
    #[error("column '{header}' chosen for {field} does not exist in the {role} source")]
    UnknownColumn {
        role: SourceKind,
        field: CanonicalField,
        header: String,
    },

    /// Raised when a column override cannot be parsed.
    #[error("invalid column override '{0}', expected source:field=Header")]
    InvalidOverride(String),

    /// Raised when the user provides a path that does not exist.
    #[error("input file not found: {0}")]
    MissingInput(PathBuf),

    /// Raised when the tracing subscriber fails to initialise.
    #[error("failed to initialise logging: {0}")]
    Logging(String),
}
