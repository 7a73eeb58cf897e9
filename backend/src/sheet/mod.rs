//! Presentation formatting: invoice rows to a styled spreadsheet.
//!
//! - [`layout`] - Pure grid model (values, styles, merges, sizes)
//! - [`writer`] - XLSX serialization of a layout

pub mod layout;
pub mod writer;

pub use layout::{build_layout, column_widths, title_for, Cell, CellStyle, CellValue, MergeRange, SheetLayout};
pub use writer::{write_workbook, SHEET_NAME};
