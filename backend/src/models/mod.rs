//! Domain models for the invoice pipeline.
//!
//! - [`RawRecord`] - One input row, fields aligned with the parsed headers
//! - [`Quantity`] - Finite numeric value with spreadsheet-style display
//! - [`InvoiceNumber`] - Numeric invoice value, exact for integers
//! - [`InvoiceRow`] - Projected, numbered row
//! - [`InvoiceTable`] - Ordered rows plus the natural type of the sort key

use serde::{Serialize, Serializer};
use std::fmt;

// =============================================================================
// Column Titles
// =============================================================================

pub const COL_INVOICE: &str = "Invoice";
pub const COL_CUSTOMER_NAME: &str = "Customer Name";
pub const COL_PRODUCT_NAME: &str = "Product Name";
pub const COL_PRODUCT_QTY: &str = "Product Qty";
pub const COL_SERIAL_NO: &str = "Serial No.";

/// Input columns every upload must carry, in projection order.
pub const REQUIRED_COLUMNS: [&str; 4] = [
    COL_INVOICE,
    COL_CUSTOMER_NAME,
    COL_PRODUCT_NAME,
    COL_PRODUCT_QTY,
];

/// Header row of the formatted spreadsheet.
pub const OUTPUT_COLUMNS: [&str; 5] = [
    COL_SERIAL_NO,
    COL_INVOICE,
    COL_CUSTOMER_NAME,
    COL_PRODUCT_NAME,
    COL_PRODUCT_QTY,
];

// =============================================================================
// Raw Record
// =============================================================================

/// One data row as read from the input.
#[derive(Debug, Clone, PartialEq)]
pub struct RawRecord {
    /// 1-based line number in the source file (header is line 1).
    pub line: usize,
    /// Field values, one per header; short rows are padded with "".
    pub fields: Vec<String>,
}

impl RawRecord {
    pub fn new(line: usize, fields: Vec<String>) -> Self {
        Self { line, fields }
    }

    /// Field at a header index, empty when out of range.
    pub fn get(&self, idx: usize) -> &str {
        self.fields.get(idx).map(String::as_str).unwrap_or("")
    }
}

// =============================================================================
// Quantity
// =============================================================================

/// A finite number as it appears in a cell.
///
/// Whole values display without a fractional part (`3`, not `3.0`).
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Quantity(f64);

impl Quantity {
    /// Parse a trimmed decimal string. Returns `None` for empty, non-numeric
    /// or non-finite input.
    pub fn parse(raw: &str) -> Option<Self> {
        let value: f64 = raw.trim().parse().ok()?;
        Self::new(value)
    }

    pub fn new(value: f64) -> Option<Self> {
        value.is_finite().then_some(Self(value))
    }

    pub fn value(self) -> f64 {
        self.0
    }

    fn is_whole(self) -> bool {
        self.0.fract() == 0.0 && self.0.abs() < 1e15
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_whole() {
            write!(f, "{:.0}", self.0)
        } else {
            write!(f, "{}", self.0)
        }
    }
}

impl Serialize for Quantity {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if self.is_whole() {
            serializer.serialize_i64(self.0 as i64)
        } else {
            serializer.serialize_f64(self.0)
        }
    }
}

// =============================================================================
// Invoice Number
// =============================================================================

/// Integers above this magnitude are written to cells as text: a spreadsheet
/// keeps only 15 significant digits.
pub const MAX_CELL_INTEGER: i128 = 999_999_999_999_999;

/// An invoice value that reads as a number.
///
/// Integers are held exactly, so long identifiers survive unchanged.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InvoiceNumber {
    Integer(i128),
    Decimal(Quantity),
}

impl InvoiceNumber {
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        let digits = trimmed.strip_prefix(['+', '-']).unwrap_or(trimmed);
        if !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()) {
            if let Ok(n) = trimmed.parse::<i128>() {
                return Some(Self::Integer(n));
            }
        }
        Quantity::parse(trimmed).map(Self::Decimal)
    }

    pub fn is_integer(self) -> bool {
        matches!(self, Self::Integer(_))
    }

    /// Nearest `f64`, possibly rounded for large integers.
    pub fn approx(self) -> f64 {
        match self {
            Self::Integer(n) => n as f64,
            Self::Decimal(q) => q.value(),
        }
    }

    /// Value for a number cell, `None` when a cell would not show it exactly.
    pub fn cell_value(self) -> Option<f64> {
        match self {
            Self::Integer(n) => (n.abs() <= MAX_CELL_INTEGER).then_some(n as f64),
            Self::Decimal(q) => Some(q.value()),
        }
    }
}

impl fmt::Display for InvoiceNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Integer(n) => write!(f, "{}", n),
            Self::Decimal(q) => write!(f, "{}", q),
        }
    }
}

// =============================================================================
// Invoice Row
// =============================================================================

/// A projected row, numbered in final sort order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InvoiceRow {
    #[serde(rename = "Serial No.")]
    pub serial_no: usize,
    #[serde(rename = "Invoice")]
    pub invoice: String,
    #[serde(rename = "Customer Name")]
    pub customer_name: String,
    #[serde(rename = "Product Name")]
    pub product_name: String,
    #[serde(rename = "Product Qty")]
    pub product_qty: Quantity,
}

/// How the `Invoice` column was compared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum InvoiceKeyKind {
    /// Every value parsed as a number.
    Numeric,
    /// At least one value is not numeric; plain string ordering.
    Text,
}

/// Ordered invoice rows.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InvoiceTable {
    pub rows: Vec<InvoiceRow>,
    pub invoice_kind: InvoiceKeyKind,
}

impl InvoiceTable {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quantity_display() {
        assert_eq!(Quantity::parse("3").unwrap().to_string(), "3");
        assert_eq!(Quantity::parse(" 3.0 ").unwrap().to_string(), "3");
        assert_eq!(Quantity::parse("2.5").unwrap().to_string(), "2.5");
        assert_eq!(Quantity::parse("-4").unwrap().to_string(), "-4");
    }

    #[test]
    fn test_quantity_rejects_garbage() {
        assert!(Quantity::parse("").is_none());
        assert!(Quantity::parse("three").is_none());
        assert!(Quantity::parse("inf").is_none());
        assert!(Quantity::parse("NaN").is_none());
    }

    #[test]
    fn test_invoice_number_keeps_long_integers_exact() {
        let n = InvoiceNumber::parse("12345678901234567").unwrap();
        assert_eq!(n, InvoiceNumber::Integer(12_345_678_901_234_567));
        assert_eq!(n.to_string(), "12345678901234567");
        assert_eq!(n.cell_value(), None);

        assert_eq!(InvoiceNumber::parse("007").unwrap().to_string(), "7");
        assert_eq!(InvoiceNumber::parse("-12").unwrap().cell_value(), Some(-12.0));
    }

    #[test]
    fn test_invoice_number_decimals() {
        let n = InvoiceNumber::parse(" 5.50 ").unwrap();
        assert!(!n.is_integer());
        assert_eq!(n.to_string(), "5.5");
        assert_eq!(n.cell_value(), Some(5.5));
        assert!(InvoiceNumber::parse("A1").is_none());
        assert!(InvoiceNumber::parse("+").is_none());
    }

    #[test]
    fn test_invoice_row_serializes_with_column_titles() {
        let row = InvoiceRow {
            serial_no: 1,
            invoice: "A1".into(),
            customer_name: "Alice".into(),
            product_name: "Pad".into(),
            product_qty: Quantity::parse("5").unwrap(),
        };
        let json = serde_json::to_value(&row).unwrap();
        assert_eq!(json["Serial No."], 1);
        assert_eq!(json["Invoice"], "A1");
        assert_eq!(json["Customer Name"], "Alice");
        assert_eq!(json["Product Qty"], 5);
    }

    #[test]
    fn test_raw_record_pads_missing_fields() {
        let rec = RawRecord::new(2, vec!["a".into()]);
        assert_eq!(rec.get(0), "a");
        assert_eq!(rec.get(3), "");
    }
}
