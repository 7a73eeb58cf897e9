//! # Vibes Invoice - CSV exports to styled invoice spreadsheets and PDFs
//!
//! Takes an order export, keeps the invoice columns, sorts and numbers the
//! rows, and produces a formatted `.xlsx` plus a print-ready `.pdf`.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │   CSV File  │────▶│   Parser    │────▶│  Transform  │────▶│    Sheet    │────▶│   Render    │
//! │ (UTF8/BOM)  │     │ (auto-delim)│     │ (sort + no.)│     │   (.xlsx)   │     │ (.html/.pdf)│
//! └─────────────┘     └─────────────┘     └─────────────┘     └─────────────┘     └─────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use vibes::{Config, InvoicePipeline};
//!
//! let output = InvoicePipeline::new(Config::default()).run("orders.csv".as_ref())?;
//! println!("{} rows, PDF at {}", output.rows.len(), output.document.display());
//! ```
//!
//! ## Modules
//!
//! - [`error`] - Error types per stage
//! - [`models`] - Raw records, invoice rows, quantities
//! - [`parser`] - CSV decoding and required-column lookup
//! - [`transform`] - Projection, sorting and numbering
//! - [`sheet`] - Formatted spreadsheet layout and writer
//! - [`render`] - HTML markup and PDF engines
//! - [`pipeline`] - End-to-end orchestration
//! - [`config`] - Paths and engine location
//! - [`api`] - HTTP API server

// Core modules
pub mod config;
pub mod error;
pub mod models;

// Parsing
pub mod parser;

// Transformation
pub mod transform;

// Formatting and rendering
pub mod render;
pub mod sheet;

// Orchestration
pub mod pipeline;

// HTTP API
pub mod api;

// =============================================================================
// Re-exports
// =============================================================================

pub use config::Config;

pub use error::{
    CsvError, DataError, ErrorKind, PipelineError, RenderError, SchemaError, ServerError,
    SheetError,
};

pub use models::{InvoiceKeyKind, InvoiceNumber, InvoiceRow, InvoiceTable, Quantity, RawRecord};

pub use parser::{
    detect_delimiter, detect_encoding, parse_bytes, parse_bytes_auto, parse_csv_file_auto,
    ColumnMap, ParseResult,
};

pub use transform::{build_invoice_table, order_and_number, project};

pub use sheet::{build_layout, write_workbook, SheetLayout};

pub use render::{render_document, workbook_to_html, ExternalEngine, RenderEngine, WkHtmlToPdf};

pub use pipeline::{
    generate_invoice, preview_bytes, Clock, CsvInfo, FixedClock, InvoicePipeline, OutputNames,
    RunOutput, SystemClock,
};

// Server
pub mod server {
    pub use crate::api::server::start_server;
}
