//! Sorting by invoice and serial numbering.
//!
//! The invoice column is compared by its natural type, decided once for the
//! whole column: numerically when every value is a number, otherwise as
//! plain strings. The sort is stable, so equal invoices keep input order.

use std::cmp::Ordering;

use super::projection::ProjectedRow;
use crate::models::{InvoiceKeyKind, InvoiceNumber, InvoiceRow, InvoiceTable};

/// Decide how the invoice column compares.
pub fn invoice_key_kind(rows: &[ProjectedRow]) -> InvoiceKeyKind {
    let all_numeric = !rows.is_empty()
        && rows
            .iter()
            .all(|row| InvoiceNumber::parse(&row.invoice).is_some());

    if all_numeric {
        InvoiceKeyKind::Numeric
    } else {
        InvoiceKeyKind::Text
    }
}

/// Sort rows by invoice and number them 1..N.
///
/// In numeric mode the invoice is rewritten in its number display form
/// (`"007"` becomes `"7"`). Integer columns compare exactly; a column
/// holding any decimal compares every value as `f64`.
pub fn order_and_number(rows: Vec<ProjectedRow>) -> InvoiceTable {
    let invoice_kind = invoice_key_kind(&rows);

    let mut keyed: Vec<(Option<InvoiceNumber>, ProjectedRow)> = rows
        .into_iter()
        .map(|row| {
            let key = match invoice_kind {
                InvoiceKeyKind::Numeric => InvoiceNumber::parse(&row.invoice),
                InvoiceKeyKind::Text => None,
            };
            (key, row)
        })
        .collect();

    let exact = keyed
        .iter()
        .all(|(key, _)| key.is_some_and(InvoiceNumber::is_integer));

    keyed.sort_by(|(ka, a), (kb, b)| match (ka, kb) {
        (Some(x), Some(y)) => compare_numbers(*x, *y, exact),
        _ => a.invoice.cmp(&b.invoice),
    });

    let rows = keyed
        .into_iter()
        .enumerate()
        .map(|(idx, (key, row))| InvoiceRow {
            serial_no: idx + 1,
            invoice: key.map(|n| n.to_string()).unwrap_or(row.invoice),
            customer_name: row.customer_name,
            product_name: row.product_name,
            product_qty: row.product_qty,
        })
        .collect();

    InvoiceTable { rows, invoice_kind }
}

fn compare_numbers(a: InvoiceNumber, b: InvoiceNumber, exact: bool) -> Ordering {
    match (a, b) {
        (InvoiceNumber::Integer(x), InvoiceNumber::Integer(y)) if exact => x.cmp(&y),
        _ => a.approx().total_cmp(&b.approx()),
    }
}
