//! Error types for the invoice pipeline.
//!
//! Each stage has its own error type:
//!
//! - [`CsvError`] - reading and decoding the delimited input
//! - [`SchemaError`] - required columns absent from the header row
//! - [`DataError`] - a field value that cannot be used
//! - [`SheetError`] - writing the formatted spreadsheet
//! - [`RenderError`] - markup conversion and the external PDF engine
//! - [`PipelineError`] - top-level orchestration errors
//!
//! Error conversion is automatic via `From` implementations,
//! allowing `?` to work across stage boundaries.

use std::fmt;
use std::path::PathBuf;

use serde::Serialize;
use thiserror::Error;

// =============================================================================
// CSV Parsing Errors
// =============================================================================

/// Errors while reading the delimited input.
#[derive(Debug, Error)]
pub enum CsvError {
    /// Failed to read file.
    #[error("Failed to read file: {0}")]
    IoError(#[from] std::io::Error),

    /// Content could not be decoded to text.
    #[error("Failed to decode content: {0}")]
    EncodingError(String),

    /// Invalid delimited text.
    #[error("Invalid CSV format: {0}")]
    ParseError(#[from] csv::Error),

    /// Delimiter outside the ASCII range.
    #[error("Delimiter must be a single ASCII character, got '{0}'")]
    InvalidDelimiter(char),

    /// Empty file.
    #[error("CSV file is empty")]
    EmptyFile,

    /// No headers found.
    #[error("No headers found in CSV")]
    NoHeaders,
}

// =============================================================================
// Schema Errors
// =============================================================================

/// Required columns are missing from the header row.
#[derive(Debug, Clone, Error)]
#[error("Missing required column(s): {} (found: {})", .missing.join(", "), .found.join(", "))]
pub struct SchemaError {
    /// Required column titles that were not found.
    pub missing: Vec<String>,
    /// Header titles present in the input, trimmed.
    pub found: Vec<String>,
}

// =============================================================================
// Data Errors
// =============================================================================

/// A field value that cannot be projected into an invoice row.
#[derive(Debug, Clone, Error)]
pub enum DataError {
    /// Required numeric field is empty.
    #[error("Line {line}: missing value for '{column}'")]
    MissingValue { line: usize, column: String },

    /// Numeric field does not hold a finite number.
    #[error("Line {line}, column '{column}' (value '{value}'): not a valid number")]
    InvalidNumber {
        line: usize,
        column: String,
        value: String,
    },
}

// =============================================================================
// Spreadsheet Errors
// =============================================================================

/// Errors while writing the formatted workbook.
#[derive(Debug, Error)]
pub enum SheetError {
    /// Output location not writable.
    #[error("Cannot write spreadsheet: {0}")]
    Io(#[from] std::io::Error),

    /// Workbook writer rejected the layout.
    #[error("Workbook error: {0}")]
    Workbook(String),
}

impl From<rust_xlsxwriter::XlsxError> for SheetError {
    fn from(err: rust_xlsxwriter::XlsxError) -> Self {
        match err {
            rust_xlsxwriter::XlsxError::IoError(e) => SheetError::Io(e),
            other => SheetError::Workbook(other.to_string()),
        }
    }
}

// =============================================================================
// Render Errors
// =============================================================================

/// Errors from markup conversion or the external PDF engine.
#[derive(Debug, Error)]
pub enum RenderError {
    /// Spreadsheet could not be read back.
    #[error("Cannot read spreadsheet: {0}")]
    Workbook(String),

    /// Engine binary missing.
    #[error("PDF engine not found at '{}'", .0.display())]
    EngineNotFound(PathBuf),

    /// Engine exited unsuccessfully.
    #[error("PDF engine failed ({status}): {stderr}")]
    EngineFailed { status: String, stderr: String },

    /// Engine exited cleanly but produced nothing.
    #[error("PDF engine produced no output")]
    EmptyOutput,

    /// IO error while talking to the engine or writing output.
    #[error("Render IO error: {0}")]
    Io(#[from] std::io::Error),
}

// =============================================================================
// Pipeline Errors (top-level)
// =============================================================================

/// Top-level pipeline orchestration errors.
///
/// This is the error type returned by [`crate::pipeline::InvoicePipeline::run`].
/// It wraps all stage errors; [`PipelineError::kind`] maps each onto the
/// four reported categories.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Input could not be read or parsed.
    #[error("CSV error: {0}")]
    Csv(#[from] CsvError),

    /// Required column missing.
    #[error("Schema error: {0}")]
    Schema(#[from] SchemaError),

    /// Invalid field value.
    #[error("Data error: {0}")]
    Data(#[from] DataError),

    /// Spreadsheet could not be written.
    #[error("Spreadsheet error: {0}")]
    Sheet(#[from] SheetError),

    /// Markup or PDF conversion failed.
    #[error("Render error: {0}")]
    Render(#[from] RenderError),

    /// Filesystem failure outside a specific stage.
    #[error("IO error on '{}': {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Reported error category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorKind {
    Schema,
    Data,
    Io,
    Render,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::Schema => "SchemaError",
            ErrorKind::Data => "DataError",
            ErrorKind::Io => "IOError",
            ErrorKind::Render => "RenderError",
        };
        f.write_str(name)
    }
}

impl PipelineError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        PipelineError::Io {
            path: path.into(),
            source,
        }
    }

    /// Category of this failure.
    pub fn kind(&self) -> ErrorKind {
        match self {
            PipelineError::Schema(_) => ErrorKind::Schema,
            PipelineError::Data(_) => ErrorKind::Data,
            PipelineError::Render(_) => ErrorKind::Render,
            PipelineError::Csv(_) | PipelineError::Sheet(_) | PipelineError::Io { .. } => {
                ErrorKind::Io
            }
        }
    }
}

// =============================================================================
// Server Errors
// =============================================================================

/// HTTP server errors.
#[derive(Debug, Error)]
pub enum ServerError {
    /// Pipeline error.
    #[error("Error processing file: {0}")]
    Pipeline(#[from] PipelineError),

    /// Invalid request.
    #[error("{0}")]
    BadRequest(String),

    /// Requested file does not exist.
    #[error("File not found: {0}")]
    NotFound(String),

    /// Server internal error.
    #[error("Internal server error: {0}")]
    Internal(String),
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result type for CSV operations.
pub type CsvResult<T> = Result<T, CsvError>;

/// Result type for spreadsheet operations.
pub type SheetResult<T> = Result<T, SheetError>;

/// Result type for render operations.
pub type RenderResult<T> = Result<T, RenderError>;

/// Result type for pipeline operations.
pub type PipelineResult<T> = Result<T, PipelineError>;

/// Result type for server operations.
pub type ServerResult<T> = Result<T, ServerError>;
