//! Date-derived output names.
//!
//! All files of one run share the stem `Vibes_Invoice_<YYYY-MM-DD>`, so a
//! second run on the same day overwrites the first.

use chrono::NaiveDate;
use std::path::{Path, PathBuf};

use crate::render::{DOCUMENT_EXT, MARKUP_EXT};

pub const STEM_PREFIX: &str = "Vibes_Invoice_";
pub const SPREADSHEET_EXT: &str = "xlsx";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputNames {
    pub stem: String,
}

impl OutputNames {
    pub fn for_date(date: NaiveDate) -> Self {
        Self {
            stem: format!("{}{}", STEM_PREFIX, date.format("%Y-%m-%d")),
        }
    }

    pub fn spreadsheet(&self) -> String {
        format!("{}.{}", self.stem, SPREADSHEET_EXT)
    }

    pub fn markup(&self) -> String {
        format!("{}.{}", self.stem, MARKUP_EXT)
    }

    pub fn document(&self) -> String {
        format!("{}.{}", self.stem, DOCUMENT_EXT)
    }

    pub fn spreadsheet_path(&self, dir: &Path) -> PathBuf {
        dir.join(self.spreadsheet())
    }
}
