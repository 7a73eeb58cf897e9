//! In-memory grid of the formatted invoice sheet.
//!
//! The layout is a plain value: every cell with its value and style, merged
//! ranges, column widths and row heights. [`super::writer`] turns it into an
//! `.xlsx` file; nothing here touches the filesystem.

use chrono::NaiveDate;

use crate::models::{InvoiceKeyKind, InvoiceNumber, InvoiceRow, InvoiceTable, Quantity, OUTPUT_COLUMNS};

pub const TITLE_PREFIX: &str = "Vibes";
/// Height of every row, in points.
pub const ROW_HEIGHT: f64 = 25.0;
/// Solid fill of the title and header bands.
pub const BAND_FILL: u32 = 0xFFF2CC;
pub const TITLE_FONT_SIZE: f64 = 14.0;
/// Added to the longest value of a column to get its width.
pub const WIDTH_PADDING: usize = 2;

/// Index of the title row.
pub const TITLE_ROW: usize = 0;
/// Index of the header row.
pub const HEADER_ROW: usize = 1;
/// Index of the first data row.
pub const FIRST_DATA_ROW: usize = 2;

#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Text(String),
    Number(f64),
}

impl CellValue {
    /// Text as the cell shows it.
    pub fn display(&self) -> String {
        match self {
            CellValue::Text(s) => s.clone(),
            CellValue::Number(n) => Quantity::new(*n)
                .map(|q| q.to_string())
                .unwrap_or_else(|| n.to_string()),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CellStyle {
    pub bold: bool,
    pub font_size: Option<f64>,
    pub fill: Option<u32>,
    pub centered: bool,
    pub wrap: bool,
    /// Thin border on all four sides.
    pub border: bool,
}

impl CellStyle {
    fn centered_wrapped() -> Self {
        Self {
            centered: true,
            wrap: true,
            ..Self::default()
        }
    }

    fn title() -> Self {
        Self {
            bold: true,
            font_size: Some(TITLE_FONT_SIZE),
            fill: Some(BAND_FILL),
            ..Self::centered_wrapped()
        }
    }

    fn header() -> Self {
        Self {
            bold: true,
            fill: Some(BAND_FILL),
            border: true,
            ..Self::centered_wrapped()
        }
    }

    fn data() -> Self {
        Self {
            border: true,
            ..Self::centered_wrapped()
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Cell {
    /// `None` for cells covered by a merge.
    pub value: Option<CellValue>,
    pub style: CellStyle,
}

impl Cell {
    fn new(value: CellValue, style: CellStyle) -> Self {
        Self {
            value: Some(value),
            style,
        }
    }

    fn covered(style: CellStyle) -> Self {
        Self { value: None, style }
    }

    pub fn display(&self) -> String {
        self.value.as_ref().map(CellValue::display).unwrap_or_default()
    }
}

/// Horizontal merge within one row; columns inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MergeRange {
    pub row: usize,
    pub first_col: usize,
    pub last_col: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SheetLayout {
    pub title: String,
    pub rows: Vec<Vec<Cell>>,
    pub merges: Vec<MergeRange>,
    pub column_widths: Vec<f64>,
    pub row_heights: Vec<f64>,
}

impl SheetLayout {
    pub fn n_cols(&self) -> usize {
        self.column_widths.len()
    }

    /// Number of data rows below the header.
    pub fn n_data_rows(&self) -> usize {
        self.rows.len().saturating_sub(FIRST_DATA_ROW)
    }

    /// Merge starting at `(row, col)`, if any.
    pub fn merge_at(&self, row: usize, col: usize) -> Option<&MergeRange> {
        self.merges
            .iter()
            .find(|m| m.row == row && m.first_col == col)
    }

    /// Whether `(row, col)` is covered by a merge it does not start.
    pub fn is_covered(&self, row: usize, col: usize) -> bool {
        self.merges
            .iter()
            .any(|m| m.row == row && col > m.first_col && col <= m.last_col)
    }
}

/// Title text for a run date.
pub fn title_for(date: NaiveDate) -> String {
    format!("{} - {}", TITLE_PREFIX, date.format("%Y-%m-%d"))
}

/// Lay out the invoice sheet for `table` on `date`.
pub fn build_layout(table: &InvoiceTable, date: NaiveDate) -> SheetLayout {
    let n_cols = OUTPUT_COLUMNS.len();
    let title = title_for(date);

    let mut rows: Vec<Vec<Cell>> = Vec::with_capacity(table.len() + FIRST_DATA_ROW);

    let mut title_row = vec![Cell::new(CellValue::Text(title.clone()), CellStyle::title())];
    title_row.extend((1..n_cols).map(|_| Cell::covered(CellStyle::title())));
    rows.push(title_row);

    rows.push(
        OUTPUT_COLUMNS
            .iter()
            .map(|name| Cell::new(CellValue::Text(name.to_string()), CellStyle::header()))
            .collect(),
    );

    for row in &table.rows {
        rows.push(
            data_values(row, table.invoice_kind)
                .into_iter()
                .map(|value| Cell::new(value, CellStyle::data()))
                .collect(),
        );
    }

    // Uniform border pass, independent of row type.
    for cell in rows.iter_mut().flatten() {
        cell.style.border = true;
    }

    let merges = if n_cols > 1 {
        vec![MergeRange {
            row: TITLE_ROW,
            first_col: 0,
            last_col: n_cols - 1,
        }]
    } else {
        Vec::new()
    };

    let text_grid: Vec<Vec<String>> = rows[HEADER_ROW..]
        .iter()
        .map(|row| row.iter().map(Cell::display).collect())
        .collect();
    let column_widths = column_widths(&text_grid, n_cols);
    let row_heights = vec![ROW_HEIGHT; rows.len()];

    SheetLayout {
        title,
        rows,
        merges,
        column_widths,
        row_heights,
    }
}

fn data_values(row: &InvoiceRow, invoice_kind: InvoiceKeyKind) -> Vec<CellValue> {
    let invoice = match invoice_kind {
        InvoiceKeyKind::Numeric => {
            match InvoiceNumber::parse(&row.invoice).and_then(InvoiceNumber::cell_value) {
                Some(n) => CellValue::Number(n),
                None => CellValue::Text(row.invoice.clone()),
            }
        }
        InvoiceKeyKind::Text => CellValue::Text(row.invoice.clone()),
    };

    vec![
        CellValue::Number(row.serial_no as f64),
        invoice,
        CellValue::Text(row.customer_name.clone()),
        CellValue::Text(row.product_name.clone()),
        CellValue::Number(row.product_qty.value()),
    ]
}

/// Width of each column: longest non-empty value (in characters) plus
/// [`WIDTH_PADDING`]. Pass only the rows that should count; the title row
/// is excluded by callers.
pub fn column_widths<S: AsRef<str>>(rows: &[Vec<S>], n_cols: usize) -> Vec<f64> {
    (0..n_cols)
        .map(|col| {
            let longest = rows
                .iter()
                .filter_map(|row| row.get(col))
                .map(|value| value.as_ref().chars().count())
                .filter(|len| *len > 0)
                .max()
                .unwrap_or(0);
            (longest + WIDTH_PADDING) as f64
        })
        .collect()
}
