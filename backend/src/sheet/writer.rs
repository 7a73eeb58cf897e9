//! XLSX output for a [`SheetLayout`] via `rust_xlsxwriter`.

use std::path::Path;

use rust_xlsxwriter::{Color, Format, FormatAlign, FormatBorder, FormatPattern, Workbook, Worksheet};

use super::layout::{Cell, CellStyle, CellValue, SheetLayout};
use crate::error::SheetResult;

pub const SHEET_NAME: &str = "Invoice";

/// Write `layout` as a single-sheet workbook at `path`, replacing any
/// existing file.
pub fn write_workbook(layout: &SheetLayout, path: &Path) -> SheetResult<()> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name(SHEET_NAME)?;

    write_sheet(worksheet, layout)?;

    workbook.save(path)?;
    Ok(())
}

fn write_sheet(worksheet: &mut Worksheet, layout: &SheetLayout) -> SheetResult<()> {
    for (col, width) in layout.column_widths.iter().enumerate() {
        worksheet.set_column_width(col as u16, *width)?;
    }
    for (row, height) in layout.row_heights.iter().enumerate() {
        worksheet.set_row_height(row as u32, *height)?;
    }

    for (row_idx, row) in layout.rows.iter().enumerate() {
        for (col_idx, cell) in row.iter().enumerate() {
            if layout.is_covered(row_idx, col_idx) {
                continue;
            }

            let format = derive_format(&cell.style);
            let (r, c) = (row_idx as u32, col_idx as u16);

            if let Some(merge) = layout.merge_at(row_idx, col_idx) {
                worksheet.merge_range(
                    r,
                    c,
                    r,
                    merge.last_col as u16,
                    &cell.display(),
                    &format,
                )?;
                continue;
            }

            write_cell(worksheet, r, c, cell, &format)?;
        }
    }

    Ok(())
}

fn write_cell(
    worksheet: &mut Worksheet,
    row: u32,
    col: u16,
    cell: &Cell,
    format: &Format,
) -> SheetResult<()> {
    match &cell.value {
        Some(CellValue::Text(text)) => {
            worksheet.write_string_with_format(row, col, text, format)?;
        }
        Some(CellValue::Number(n)) => {
            worksheet.write_number_with_format(row, col, *n, format)?;
        }
        None => {
            worksheet.write_blank(row, col, format)?;
        }
    }
    Ok(())
}

/// Map a layout style onto an xlsx cell format.
fn derive_format(style: &CellStyle) -> Format {
    let mut format = Format::new();
    if style.bold {
        format = format.set_bold();
    }
    if let Some(size) = style.font_size {
        format = format.set_font_size(size);
    }
    if let Some(rgb) = style.fill {
        format = format
            .set_pattern(FormatPattern::Solid)
            .set_background_color(Color::RGB(rgb));
    }
    if style.centered {
        format = format
            .set_align(FormatAlign::Center)
            .set_align(FormatAlign::VerticalCenter);
    }
    if style.wrap {
        format = format.set_text_wrap();
    }
    if style.border {
        format = format.set_border(FormatBorder::Thin);
    }
    format
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{InvoiceKeyKind, InvoiceRow, InvoiceTable, Quantity};
    use crate::sheet::layout::build_layout;
    use calamine::{open_workbook, Data, Reader, Xlsx};
    use chrono::NaiveDate;

    fn sample_layout() -> SheetLayout {
        let table = InvoiceTable {
            rows: vec![
                InvoiceRow {
                    serial_no: 1,
                    invoice: "A1".into(),
                    customer_name: "Alice".into(),
                    product_name: "Pad".into(),
                    product_qty: Quantity::parse("5").unwrap(),
                },
                InvoiceRow {
                    serial_no: 2,
                    invoice: "B2".into(),
                    customer_name: "Bob".into(),
                    product_name: "Pen".into(),
                    product_qty: Quantity::parse("3").unwrap(),
                },
            ],
            invoice_kind: InvoiceKeyKind::Text,
        };
        build_layout(&table, NaiveDate::from_ymd_opt(2024, 3, 9).unwrap())
    }

    #[test]
    fn test_written_workbook_reads_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.xlsx");
        write_workbook(&sample_layout(), &path).unwrap();

        let mut workbook: Xlsx<_> = open_workbook(&path).unwrap();
        let range = workbook.worksheet_range(SHEET_NAME).unwrap();

        assert_eq!(
            range.get_value((0, 0)),
            Some(&Data::String("Vibes - 2024-03-09".into()))
        );
        assert_eq!(range.get_value((1, 2)), Some(&Data::String("Customer Name".into())));
        assert_eq!(range.get_value((2, 0)), Some(&Data::Float(1.0)));
        assert_eq!(range.get_value((2, 1)), Some(&Data::String("A1".into())));
        assert_eq!(range.get_value((3, 4)), Some(&Data::Float(3.0)));
    }

    #[test]
    fn test_title_is_merged() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.xlsx");
        write_workbook(&sample_layout(), &path).unwrap();

        let mut workbook: Xlsx<_> = open_workbook(&path).unwrap();
        workbook.load_merged_regions().unwrap();
        let merges = workbook.worksheet_merge_cells(SHEET_NAME).unwrap().unwrap();

        assert_eq!(merges.len(), 1);
        assert_eq!(merges[0].start, (0, 0));
        assert_eq!(merges[0].end, (0, 4));
    }

    #[test]
    fn test_unwritable_location_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("out.xlsx");
        let err = write_workbook(&sample_layout(), &path).unwrap_err();
        assert!(matches!(err, crate::error::SheetError::Io(_)));
    }
}
