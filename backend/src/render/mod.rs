//! Document rendering: formatted spreadsheet to HTML to PDF.
//!
//! - [`markup`] - `.xlsx` to standalone HTML
//! - [`engine`] - HTML to PDF behind the [`RenderEngine`] trait

pub mod engine;
pub mod markup;

pub use engine::{ExternalEngine, RenderEngine, WkHtmlToPdf};
pub use markup::{escape_html, grid_to_html, read_workbook, workbook_to_html, SheetGrid, Span};

use std::path::{Path, PathBuf};

use crate::error::RenderResult;

pub const MARKUP_EXT: &str = "html";
pub const DOCUMENT_EXT: &str = "pdf";

/// Files produced from one spreadsheet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedFiles {
    pub markup: PathBuf,
    pub document: PathBuf,
}

/// Convert `spreadsheet` to `<stem>.html` and `<stem>.pdf` beside it.
///
/// The markup file is written before the engine runs and is left on disk
/// when the engine fails.
pub fn render_document(spreadsheet: &Path, engine: &dyn RenderEngine) -> RenderResult<RenderedFiles> {
    let markup_path = spreadsheet.with_extension(MARKUP_EXT);
    let document_path = spreadsheet.with_extension(DOCUMENT_EXT);

    let html = workbook_to_html(spreadsheet)?;
    std::fs::write(&markup_path, &html)?;

    let bytes = engine.render(&html)?;
    std::fs::write(&document_path, bytes)?;

    Ok(RenderedFiles {
        markup: markup_path,
        document: document_path,
    })
}

#[cfg(test)]
mod tests {
    use super::engine::FakeEngine;
    use super::*;
    use crate::error::RenderError;
    use crate::models::{InvoiceKeyKind, InvoiceTable};
    use crate::sheet::{build_layout, write_workbook};
    use chrono::NaiveDate;

    fn write_sample(dir: &Path) -> PathBuf {
        let table = InvoiceTable {
            rows: Vec::new(),
            invoice_kind: InvoiceKeyKind::Text,
        };
        let layout = build_layout(&table, NaiveDate::from_ymd_opt(2024, 3, 9).unwrap());
        let path = dir.join("Vibes_Invoice_2024-03-09.xlsx");
        write_workbook(&layout, &path).unwrap();
        path
    }

    #[test]
    fn test_render_writes_markup_and_document() {
        let dir = tempfile::tempdir().unwrap();
        let xlsx = write_sample(dir.path());

        let files = render_document(&xlsx, &FakeEngine::ok()).unwrap();

        assert_eq!(files.markup, dir.path().join("Vibes_Invoice_2024-03-09.html"));
        assert_eq!(files.document, dir.path().join("Vibes_Invoice_2024-03-09.pdf"));
        let html = std::fs::read_to_string(&files.markup).unwrap();
        assert!(html.contains("<td colspan=\"5\">Vibes - 2024-03-09</td>"));
        assert!(html.contains("<td>Product Qty</td>"));
        let pdf = std::fs::read(&files.document).unwrap();
        assert!(pdf.starts_with(FakeEngine::HEADER));
    }

    #[test]
    fn test_engine_failure_keeps_markup() {
        let dir = tempfile::tempdir().unwrap();
        let xlsx = write_sample(dir.path());

        let err = render_document(&xlsx, &FakeEngine::failing()).unwrap_err();

        assert!(matches!(err, RenderError::EngineFailed { .. }));
        assert!(xlsx.with_extension(MARKUP_EXT).exists());
        assert!(!xlsx.with_extension(DOCUMENT_EXT).exists());
    }
}
