//! Spreadsheet to HTML conversion.
//!
//! Reads the first worksheet of an `.xlsx` back with calamine (values and
//! merged regions) and emits a standalone HTML page whose stylesheet
//! reproduces the invoice bands: filled bold title and header rows, thin
//! borders, centered wrapped text, fixed row heights and content-sized
//! columns.

use std::fmt::Write as _;
use std::path::Path;

use calamine::{open_workbook, Data, Reader, Xlsx};

use crate::error::{RenderError, RenderResult};
use crate::models::Quantity;
use crate::sheet::layout::{column_widths, BAND_FILL, HEADER_ROW, ROW_HEIGHT, TITLE_FONT_SIZE, TITLE_ROW};

/// Approximate pixels per spreadsheet width unit.
const PX_PER_WIDTH_UNIT: f64 = 7.0;
const PX_CELL_PADDING: f64 = 5.0;

/// Rectangular merge, 0-based inclusive bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub first_row: usize,
    pub first_col: usize,
    pub last_row: usize,
    pub last_col: usize,
}

impl Span {
    fn contains(&self, row: usize, col: usize) -> bool {
        (self.first_row..=self.last_row).contains(&row) && (self.first_col..=self.last_col).contains(&col)
    }
}

/// Cell text and merges of one worksheet.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SheetGrid {
    pub name: String,
    /// Rectangular: every row has `n_cols` entries.
    pub rows: Vec<Vec<String>>,
    pub spans: Vec<Span>,
    pub n_cols: usize,
}

impl SheetGrid {
    fn span_at(&self, row: usize, col: usize) -> Option<&Span> {
        self.spans
            .iter()
            .find(|s| s.first_row == row && s.first_col == col)
    }

    fn is_covered(&self, row: usize, col: usize) -> bool {
        self.spans
            .iter()
            .any(|s| s.contains(row, col) && !(s.first_row == row && s.first_col == col))
    }
}

/// Read the first worksheet of an `.xlsx` file.
pub fn read_workbook(path: &Path) -> RenderResult<SheetGrid> {
    let mut workbook: Xlsx<_> = open_workbook(path)
        .map_err(|e: calamine::XlsxError| RenderError::Workbook(format!("{}: {e}", path.display())))?;

    workbook
        .load_merged_regions()
        .map_err(|e| RenderError::Workbook(format!("Failed to load merged regions: {e}")))?;

    let name = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or_else(|| RenderError::Workbook("workbook has no worksheets".to_string()))?;

    let range = workbook
        .worksheet_range(&name)
        .map_err(|e| RenderError::Workbook(format!("Failed to read sheet '{name}': {e}")))?;

    let merged = workbook
        .worksheet_merge_cells(&name)
        .unwrap_or(Ok(Vec::new()))
        .map_err(|e| RenderError::Workbook(format!("Failed to read merged cells: {e}")))?;

    let spans: Vec<Span> = merged
        .iter()
        .map(|d| Span {
            first_row: d.start.0 as usize,
            first_col: d.start.1 as usize,
            last_row: d.end.0 as usize,
            last_col: d.end.1 as usize,
        })
        .collect();

    let (mut n_rows, mut n_cols) = range
        .end()
        .map(|(r, c)| (r as usize + 1, c as usize + 1))
        .unwrap_or((0, 0));
    for span in &spans {
        n_rows = n_rows.max(span.last_row + 1);
        n_cols = n_cols.max(span.last_col + 1);
    }

    let rows = (0..n_rows)
        .map(|r| {
            (0..n_cols)
                .map(|c| {
                    range
                        .get_value((r as u32, c as u32))
                        .map(display_data)
                        .unwrap_or_default()
                })
                .collect()
        })
        .collect();

    Ok(SheetGrid {
        name,
        rows,
        spans,
        n_cols,
    })
}

/// Text of a cell as the spreadsheet displays it.
fn display_data(data: &Data) -> String {
    match data {
        Data::Empty => String::new(),
        Data::String(s) => s.clone(),
        Data::Float(f) => Quantity::new(*f)
            .map(|q| q.to_string())
            .unwrap_or_else(|| f.to_string()),
        Data::Int(i) => i.to_string(),
        Data::Bool(b) => (if *b { "TRUE" } else { "FALSE" }).to_string(),
        other => other.to_string(),
    }
}

fn row_class(row: usize) -> &'static str {
    match row {
        TITLE_ROW => "title",
        HEADER_ROW => "header",
        _ => "data",
    }
}

/// Render a grid as a standalone HTML document.
pub fn grid_to_html(grid: &SheetGrid) -> String {
    let counted = if grid.rows.len() > HEADER_ROW {
        &grid.rows[HEADER_ROW..]
    } else {
        &grid.rows[..]
    };
    let widths = column_widths(counted, grid.n_cols);
    let page_title = grid
        .rows
        .first()
        .and_then(|row| row.first())
        .filter(|s| !s.is_empty())
        .map(String::as_str)
        .unwrap_or(grid.name.as_str());

    let mut html = String::new();
    html.push_str("<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n");
    let _ = writeln!(html, "<title>{}</title>", escape_html(page_title));
    html.push_str(&stylesheet());
    html.push_str("</head>\n<body>\n<table>\n<colgroup>\n");
    for width in &widths {
        let px = width * PX_PER_WIDTH_UNIT + PX_CELL_PADDING;
        let _ = writeln!(html, "<col style=\"width: {px:.0}px\">");
    }
    html.push_str("</colgroup>\n<tbody>\n");

    for (r, row) in grid.rows.iter().enumerate() {
        let _ = write!(html, "<tr class=\"{}\">", row_class(r));
        for (c, text) in row.iter().enumerate() {
            if grid.is_covered(r, c) {
                continue;
            }
            html.push_str("<td");
            if let Some(span) = grid.span_at(r, c) {
                let cols = span.last_col - span.first_col + 1;
                let rows = span.last_row - span.first_row + 1;
                if cols > 1 {
                    let _ = write!(html, " colspan=\"{cols}\"");
                }
                if rows > 1 {
                    let _ = write!(html, " rowspan=\"{rows}\"");
                }
            }
            let _ = write!(html, ">{}</td>", escape_html(text));
        }
        html.push_str("</tr>\n");
    }

    html.push_str("</tbody>\n</table>\n</body>\n</html>\n");
    html
}

fn stylesheet() -> String {
    format!(
        "<style>\n\
         body {{ font-family: Calibri, Arial, sans-serif; font-size: 11pt; }}\n\
         table {{ border-collapse: collapse; table-layout: fixed; }}\n\
         td {{ border: 1px solid #000000; text-align: center; vertical-align: middle; \
         white-space: normal; word-wrap: break-word; height: {height}pt; padding: 0 2px; }}\n\
         tr.title td {{ font-weight: bold; font-size: {title_size}pt; background-color: #{fill:06X}; }}\n\
         tr.header td {{ font-weight: bold; background-color: #{fill:06X}; }}\n\
         </style>\n",
        height = ROW_HEIGHT,
        title_size = TITLE_FONT_SIZE,
        fill = BAND_FILL,
    )
}

/// Escape text for HTML element content and attribute values.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

/// Convert an `.xlsx` file to HTML markup.
pub fn workbook_to_html(path: &Path) -> RenderResult<String> {
    let grid = read_workbook(path)?;
    Ok(grid_to_html(&grid))
}
