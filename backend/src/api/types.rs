//! REST API payloads.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::error::ErrorKind;
use crate::models::{InvoiceKeyKind, InvoiceRow};
use crate::pipeline::RunOutput;

/// Route prefix under which output files are served.
pub const DOWNLOAD_PREFIX: &str = "/downloads";

/// Response sent after a CSV upload was transformed and rendered.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    /// Unique job identifier
    pub job_id: String,

    /// Always "ready" for a successful run
    pub status: String,

    /// Transformed rows, in sheet order
    pub preview: Vec<InvoiceRow>,

    /// Download links for the generated files
    pub files: DownloadLinks,

    pub metadata: ResponseMetadata,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DownloadLinks {
    pub spreadsheet: String,
    pub document: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseMetadata {
    /// Run date, YYYY-MM-DD
    pub date: String,
    pub total_rows: usize,
    pub invoice_sort: InvoiceKeyKind,
    pub csv_info: CsvMetadata,
}

/// CSV file metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CsvMetadata {
    pub encoding: String,
    pub delimiter: String,
    pub row_count: usize,
    pub columns: Vec<String>,
}

/// Link to a file in the output directory.
pub fn download_url(file_name: &str) -> String {
    format!("{}/{}", DOWNLOAD_PREFIX, file_name)
}

impl From<RunOutput> for UploadResponse {
    fn from(output: RunOutput) -> Self {
        let files = DownloadLinks {
            spreadsheet: download_url(&output.spreadsheet_name()),
            document: download_url(&output.document_name()),
        };

        UploadResponse {
            job_id: Uuid::new_v4().to_string(),
            status: "ready".to_string(),
            files,
            metadata: ResponseMetadata {
                date: output.date.format("%Y-%m-%d").to_string(),
                total_rows: output.rows.len(),
                invoice_sort: output.invoice_kind,
                csv_info: CsvMetadata {
                    encoding: output.csv_info.encoding,
                    delimiter: output.csv_info.delimiter.to_string(),
                    row_count: output.csv_info.row_count,
                    columns: output.csv_info.headers,
                },
            },
            preview: output.rows,
        }
    }
}

/// Create an error response
pub fn error_response(error: &str, kind: Option<ErrorKind>) -> Value {
    json!({
        "jobId": Uuid::new_v4().to_string(),
        "status": "error",
        "error": error,
        "errorKind": kind,
        "preview": [],
        "files": null,
    })
}
