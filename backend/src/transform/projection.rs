//! Column projection: raw records to unnumbered invoice lines.

use crate::error::DataError;
use crate::models::{Quantity, RawRecord, COL_PRODUCT_QTY};
use crate::parser::ColumnMap;

/// A record reduced to the four invoice fields, before ordering.
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectedRow {
    pub invoice: String,
    pub customer_name: String,
    pub product_name: String,
    pub product_qty: Quantity,
}

/// Select the invoice fields of every record, in input order.
///
/// Text fields are trimmed. The quantity must be a finite number; the first
/// offending record aborts the projection.
pub fn project(records: &[RawRecord], columns: &ColumnMap) -> Result<Vec<ProjectedRow>, DataError> {
    records
        .iter()
        .map(|record| project_record(record, columns))
        .collect()
}

fn project_record(record: &RawRecord, columns: &ColumnMap) -> Result<ProjectedRow, DataError> {
    let raw_qty = record.get(columns.product_qty).trim();
    if raw_qty.is_empty() {
        return Err(DataError::MissingValue {
            line: record.line,
            column: COL_PRODUCT_QTY.to_string(),
        });
    }
    let product_qty = Quantity::parse(raw_qty).ok_or_else(|| DataError::InvalidNumber {
        line: record.line,
        column: COL_PRODUCT_QTY.to_string(),
        value: raw_qty.to_string(),
    })?;

    Ok(ProjectedRow {
        invoice: record.get(columns.invoice).trim().to_string(),
        customer_name: record.get(columns.customer_name).trim().to_string(),
        product_name: record.get(columns.product_name).trim().to_string(),
        product_qty,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const COLUMNS: ColumnMap = ColumnMap {
        invoice: 0,
        customer_name: 1,
        product_name: 2,
        product_qty: 3,
    };

    fn record(line: usize, fields: &[&str]) -> RawRecord {
        RawRecord::new(line, fields.iter().map(|s| s.to_string()).collect())
    }

    #[test]
    fn test_project_trims_and_parses() {
        let rows = project(&[record(2, &[" B2 ", "Bob ", " Pen", "3"])], &COLUMNS).unwrap();

        assert_eq!(rows[0].invoice, "B2");
        assert_eq!(rows[0].customer_name, "Bob");
        assert_eq!(rows[0].product_name, "Pen");
        assert_eq!(rows[0].product_qty.value(), 3.0);
    }

    #[test]
    fn test_trim_keeps_inner_whitespace() {
        let rows = project(&[record(2, &["\tINV 01 ", "  Mary  Ann ", "Pen", " 2 "])], &COLUMNS).unwrap();

        assert_eq!(rows[0].invoice, "INV 01");
        assert_eq!(rows[0].customer_name, "Mary  Ann");
        assert_eq!(rows[0].product_qty.to_string(), "2");
    }

    #[test]
    fn test_project_uses_column_map() {
        let columns = ColumnMap {
            invoice: 3,
            customer_name: 0,
            product_name: 2,
            product_qty: 1,
        };
        let rows = project(&[record(2, &["Alice", "5", "Pad", "A1", "ignored"])], &columns).unwrap();

        assert_eq!(rows[0].invoice, "A1");
        assert_eq!(rows[0].customer_name, "Alice");
        assert_eq!(rows[0].product_qty.to_string(), "5");
    }

    #[test]
    fn test_invalid_quantity_names_line_and_value() {
        let err = project(
            &[
                record(2, &["A1", "Alice", "Pad", "5"]),
                record(3, &["B2", "Bob", "Pen", "three"]),
            ],
            &COLUMNS,
        )
        .unwrap_err();

        match err {
            DataError::InvalidNumber { line, value, .. } => {
                assert_eq!(line, 3);
                assert_eq!(value, "three");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_missing_quantity() {
        let err = project(&[record(7, &["A1", "Alice", "Pad"])], &COLUMNS).unwrap_err();
        assert!(matches!(err, DataError::MissingValue { line: 7, .. }));
    }
}
