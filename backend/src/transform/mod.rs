//! Transformation module.
//!
//! Raw records to ordered invoice rows:
//! - Projection: select and validate the invoice fields
//! - Ordering: sort by invoice, assign serial numbers

pub mod ordering;
pub mod projection;

pub use ordering::{invoice_key_kind, order_and_number};
pub use projection::{project, ProjectedRow};

use crate::error::PipelineError;
use crate::models::InvoiceTable;
use crate::parser::ParseResult;

/// Resolve columns, project and order a parsed input.
///
/// Schema problems are reported before any row is looked at.
pub fn build_invoice_table(parsed: &ParseResult) -> Result<InvoiceTable, PipelineError> {
    let columns = parsed.required_columns()?;
    let projected = project(&parsed.records, &columns)?;
    Ok(order_and_number(projected))
}
