//! Runtime configuration.
//!
//! Paths are passed into the pipeline explicitly. [`Config::from_env`] reads
//! `VIBES_*` variables (a `.env` file is loaded by the binary through
//! `dotenvy`); command-line flags override both.

use std::path::PathBuf;

pub const ENV_UPLOAD_DIR: &str = "VIBES_UPLOAD_DIR";
pub const ENV_OUTPUT_DIR: &str = "VIBES_OUTPUT_DIR";
pub const ENV_WKHTMLTOPDF: &str = "VIBES_WKHTMLTOPDF";

pub const DEFAULT_UPLOAD_DIR: &str = "uploads";
pub const DEFAULT_OUTPUT_DIR: &str = "outputs";
pub const DEFAULT_WKHTMLTOPDF: &str = "/usr/bin/wkhtmltopdf";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Where uploaded CSV files are stored.
    pub upload_dir: PathBuf,
    /// Where spreadsheets, markup and documents are written and served from.
    pub output_dir: PathBuf,
    /// Location of the `wkhtmltopdf` binary.
    pub wkhtmltopdf: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            upload_dir: PathBuf::from(DEFAULT_UPLOAD_DIR),
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            wkhtmltopdf: PathBuf::from(DEFAULT_WKHTMLTOPDF),
        }
    }
}

impl Config {
    /// Defaults overridden by any `VIBES_*` variables that are set.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(dir) = non_empty(ENV_UPLOAD_DIR) {
            config.upload_dir = PathBuf::from(dir);
        }
        if let Some(dir) = non_empty(ENV_OUTPUT_DIR) {
            config.output_dir = PathBuf::from(dir);
        }
        if let Some(bin) = non_empty(ENV_WKHTMLTOPDF) {
            config.wkhtmltopdf = PathBuf::from(bin);
        }
        config
    }

    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = dir.into();
        self
    }

    pub fn with_upload_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.upload_dir = dir.into();
        self
    }

    pub fn with_wkhtmltopdf(mut self, binary: impl Into<PathBuf>) -> Self {
        self.wkhtmltopdf = binary.into();
        self
    }
}
