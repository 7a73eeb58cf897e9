//! High-level pipeline API: CSV export to styled spreadsheet and PDF.
//!
//! One [`InvoicePipeline::run`] performs, in order and exactly once:
//! parsing, projection and ordering, spreadsheet formatting, markup
//! conversion and PDF rendering. The first failing step aborts the run;
//! files written by earlier steps stay on disk.
//!
//! # Example
//!
//! ```rust,ignore
//! use vibes::{Config, InvoicePipeline};
//! use std::path::Path;
//!
//! let pipeline = InvoicePipeline::new(Config::from_env());
//! let output = pipeline.run(Path::new("orders.csv"))?;
//! println!("{} rows -> {}", output.rows.len(), output.document.display());
//! ```

pub mod clock;
pub mod naming;

pub use clock::{Clock, FixedClock, SystemClock};
pub use naming::OutputNames;

use chrono::NaiveDate;
use serde::Serialize;
use std::path::{Path, PathBuf};

use crate::api::logs::{log_error, log_info, log_info_indent, log_success};
use crate::config::Config;
use crate::error::{CsvError, PipelineError, PipelineResult};
use crate::models::{InvoiceKeyKind, InvoiceRow, InvoiceTable};
use crate::parser::{parse_bytes, ParseResult};
use crate::render::{render_document, RenderEngine, WkHtmlToPdf};
use crate::sheet::{build_layout, write_workbook};
use crate::transform::build_invoice_table;

/// CSV file information
#[derive(Debug, Clone, Serialize)]
pub struct CsvInfo {
    pub encoding: String,
    pub delimiter: char,
    pub headers: Vec<String>,
    pub row_count: usize,
}

impl From<&ParseResult> for CsvInfo {
    fn from(parsed: &ParseResult) -> Self {
        Self {
            encoding: parsed.encoding.clone(),
            delimiter: parsed.delimiter,
            headers: parsed.headers.clone(),
            row_count: parsed.records.len(),
        }
    }
}

/// Result of a complete pipeline run
#[derive(Debug, Clone, Serialize)]
pub struct RunOutput {
    /// Invoice rows in sheet order
    pub rows: Vec<InvoiceRow>,
    /// How the invoice column was sorted
    pub invoice_kind: InvoiceKeyKind,
    /// Run date used in the title and file names
    pub date: NaiveDate,
    /// Formatted spreadsheet
    pub spreadsheet: PathBuf,
    /// Intermediate HTML
    pub markup: PathBuf,
    /// Rendered PDF
    pub document: PathBuf,
    /// CSV parsing metadata
    pub csv_info: CsvInfo,
}

impl RunOutput {
    pub fn spreadsheet_name(&self) -> String {
        file_name(&self.spreadsheet)
    }

    pub fn document_name(&self) -> String {
        file_name(&self.document)
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Pipeline bound to a configuration, a date source and a PDF engine.
pub struct InvoicePipeline {
    config: Config,
    clock: Box<dyn Clock>,
    engine: Box<dyn RenderEngine>,
}

impl InvoicePipeline {
    /// Pipeline using the local date and `wkhtmltopdf` from `config`.
    pub fn new(config: Config) -> Self {
        let engine = WkHtmlToPdf::new(config.wkhtmltopdf.clone());
        Self {
            config,
            clock: Box::new(SystemClock),
            engine: Box::new(engine),
        }
    }

    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    pub fn with_engine(mut self, engine: impl RenderEngine + 'static) -> Self {
        self.engine = Box::new(engine);
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Run the pipeline on a CSV file.
    pub fn run(&self, csv_path: &Path) -> PipelineResult<RunOutput> {
        log_info(format!("📄 Processing: {}", csv_path.display()));
        let bytes = std::fs::read(csv_path).map_err(CsvError::IoError)?;
        self.run_bytes(&bytes)
    }

    /// Run the pipeline on raw CSV bytes.
    pub fn run_bytes(&self, bytes: &[u8]) -> PipelineResult<RunOutput> {
        let parsed = parse_bytes(bytes, None)?;
        self.run_parsed(&parsed)
    }

    /// Run the pipeline on an already-parsed input.
    pub fn run_parsed(&self, parsed: &ParseResult) -> PipelineResult<RunOutput> {
        let result = self.execute(parsed);
        if let Err(ref e) = result {
            log_error(format!("{}: {}", e.kind(), e));
        }
        result
    }

    fn execute(&self, parsed: &ParseResult) -> PipelineResult<RunOutput> {
        let csv_info = CsvInfo::from(parsed);
        log_info("📖 Reading CSV file...");
        log_success(format!("Encoding: {}", csv_info.encoding));
        log_success(format!("Separator: '{}'", format_delimiter(csv_info.delimiter)));
        log_success(format!("Read {} rows", csv_info.row_count));

        log_info("🔄 Selecting and sorting invoice columns...");
        let table = build_invoice_table(parsed)?;
        log_success(format!(
            "{} invoice rows ({} sort)",
            table.len(),
            match table.invoice_kind {
                InvoiceKeyKind::Numeric => "numeric",
                InvoiceKeyKind::Text => "text",
            }
        ));

        let date = self.clock.today();
        let names = OutputNames::for_date(date);
        let output_dir = &self.config.output_dir;
        std::fs::create_dir_all(output_dir).map_err(|e| PipelineError::io(output_dir, e))?;

        log_info("📊 Writing spreadsheet...");
        let spreadsheet = names.spreadsheet_path(output_dir);
        write_formatted_sheet(&table, date, &spreadsheet)?;
        log_success(format!("Saved {}", names.spreadsheet()));

        log_info(format!("🖨️  Rendering PDF with {}...", self.engine.name()));
        let rendered = render_document(&spreadsheet, self.engine.as_ref())?;
        log_info_indent(format!("markup: {}", names.markup()), 1);
        log_success(format!("Saved {}", names.document()));

        Ok(RunOutput {
            rows: table.rows,
            invoice_kind: table.invoice_kind,
            date,
            spreadsheet,
            markup: rendered.markup,
            document: rendered.document,
            csv_info,
        })
    }
}

/// Lay out and write the formatted spreadsheet for `table`.
pub fn write_formatted_sheet(table: &InvoiceTable, date: NaiveDate, path: &Path) -> PipelineResult<()> {
    let layout = build_layout(table, date);
    write_workbook(&layout, path)?;
    Ok(())
}

/// Parse and project a CSV without writing anything.
pub fn preview_bytes(bytes: &[u8], delimiter: Option<char>) -> PipelineResult<InvoiceTable> {
    let parsed = parse_bytes(bytes, delimiter)?;
    build_invoice_table(&parsed)
}

/// Run the default pipeline (local date, `wkhtmltopdf`) on a CSV file.
pub fn generate_invoice(csv_path: &Path, config: Config) -> PipelineResult<RunOutput> {
    InvoicePipeline::new(config).run(csv_path)
}

/// Format delimiter for display
fn format_delimiter(d: char) -> String {
    match d {
        '\t' => "TAB".to_string(),
        c => c.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::render::engine::FakeEngine;

    const SAMPLE: &str = "Invoice,Customer Name,Product Name,Product Qty,Notes\n\
                          B2,Bob,Pen,3,rush\n\
                          A1,Alice,Pad,5,\n";

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 9).unwrap()
    }

    fn pipeline(output_dir: &Path) -> InvoicePipeline {
        InvoicePipeline::new(Config::default().with_output_dir(output_dir))
            .with_clock(FixedClock(date()))
            .with_engine(FakeEngine::ok())
    }

    #[test]
    fn test_run_produces_all_outputs() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("outputs");
        let output = pipeline(&out).run_bytes(SAMPLE.as_bytes()).unwrap();

        assert_eq!(output.rows.len(), 2);
        assert_eq!(output.rows[0].invoice, "A1");
        assert_eq!(output.rows[0].serial_no, 1);
        assert_eq!(output.rows[1].invoice, "B2");
        assert_eq!(output.rows[1].serial_no, 2);

        assert_eq!(output.spreadsheet_name(), "Vibes_Invoice_2024-03-09.xlsx");
        assert_eq!(output.document_name(), "Vibes_Invoice_2024-03-09.pdf");
        assert!(output.spreadsheet.exists());
        assert!(output.markup.exists());
        assert!(output.document.exists());
        assert_eq!(output.csv_info.row_count, 2);
    }

    #[test]
    fn test_run_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let csv = dir.path().join("orders.csv");
        std::fs::write(&csv, SAMPLE).unwrap();

        let output = pipeline(&dir.path().join("out")).run(&csv).unwrap();
        assert_eq!(output.rows.len(), 2);
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = pipeline(dir.path()).run(&dir.path().join("nope.csv")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Io);
    }

    #[test]
    fn test_schema_error_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("outputs");
        let csv = "Invoice,Customer Name,Product Name\nA1,Alice,Pad\n";

        let err = pipeline(&out).run_bytes(csv.as_bytes()).unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Schema);
        assert!(!out.exists());
    }

    #[test]
    fn test_data_error_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("outputs");
        let csv = "Invoice,Customer Name,Product Name,Product Qty\nA1,Alice,Pad,many\n";

        let err = pipeline(&out).run_bytes(csv.as_bytes()).unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Data);
        assert!(!out.exists());
    }

    #[test]
    fn test_header_only_input() {
        let dir = tempfile::tempdir().unwrap();
        let csv = "Invoice,Customer Name,Product Name,Product Qty\n";

        let output = pipeline(dir.path()).run_bytes(csv.as_bytes()).unwrap();

        assert!(output.rows.is_empty());
        assert!(output.spreadsheet.exists());
        let html = std::fs::read_to_string(&output.markup).unwrap();
        assert_eq!(html.matches("<tr").count(), 2);
    }

    #[test]
    fn test_same_day_runs_are_identical_and_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let p = pipeline(dir.path());

        let first = p.run_bytes(SAMPLE.as_bytes()).unwrap();
        let second = p.run_bytes(SAMPLE.as_bytes()).unwrap();

        assert_eq!(first.rows, second.rows);
        assert_eq!(first.spreadsheet, second.spreadsheet);
        let files = std::fs::read_dir(dir.path()).unwrap().count();
        assert_eq!(files, 3);
    }

    #[test]
    fn test_unwritable_output_then_recovery() {
        let dir = tempfile::tempdir().unwrap();
        // a regular file where the output directory should be
        let blocked = dir.path().join("blocked");
        std::fs::write(&blocked, b"not a directory").unwrap();

        let err = pipeline(&blocked).run_bytes(SAMPLE.as_bytes()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Io);

        let ok = pipeline(&dir.path().join("fine")).run_bytes(SAMPLE.as_bytes());
        assert!(ok.is_ok());
    }

    #[test]
    fn test_render_failure_keeps_earlier_files() {
        let dir = tempfile::tempdir().unwrap();
        let p = InvoicePipeline::new(Config::default().with_output_dir(dir.path()))
            .with_clock(FixedClock(date()))
            .with_engine(FakeEngine::failing());

        let err = p.run_bytes(SAMPLE.as_bytes()).unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Render);
        let names = OutputNames::for_date(date());
        assert!(dir.path().join(names.spreadsheet()).exists());
        assert!(dir.path().join(names.markup()).exists());
        assert!(!dir.path().join(names.document()).exists());
    }

    #[test]
    fn test_missing_engine_binary_is_render_error() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::default()
            .with_output_dir(dir.path())
            .with_wkhtmltopdf(dir.path().join("no-wkhtmltopdf"));
        let p = InvoicePipeline::new(config).with_clock(FixedClock(date()));

        let err = p.run_bytes(SAMPLE.as_bytes()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Render);
    }

    #[test]
    fn test_preview_writes_nothing() {
        let table = preview_bytes(SAMPLE.as_bytes(), None).unwrap();
        assert_eq!(table.rows[0].invoice, "A1");
    }

    #[test]
    fn test_long_numeric_invoices_survive_preview() {
        let csv = "Invoice,Customer Name,Product Name,Product Qty\n\
                   12345678901234567,Bob,Pen,1\n\
                   12345678901234566,Al,Pad,2\n";

        let table = preview_bytes(csv.as_bytes(), None).unwrap();

        let got: Vec<(&str, &str)> = table
            .rows
            .iter()
            .map(|r| (r.invoice.as_str(), r.customer_name.as_str()))
            .collect();
        assert_eq!(
            got,
            vec![("12345678901234566", "Al"), ("12345678901234567", "Bob")]
        );
    }
}
