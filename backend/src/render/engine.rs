//! PDF engines.
//!
//! The pipeline only needs `markup in, document bytes out`; [`RenderEngine`]
//! is that capability. [`WkHtmlToPdf`] drives the external `wkhtmltopdf`
//! binary through stdin/stdout.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use crate::error::{RenderError, RenderResult};

/// Converts HTML markup into print-ready document bytes.
pub trait RenderEngine: Send + Sync {
    fn render(&self, markup: &str) -> RenderResult<Vec<u8>>;

    /// Short engine name for logs.
    fn name(&self) -> &str;
}

/// A command that reads markup on stdin and writes the document to stdout.
#[derive(Debug, Clone)]
pub struct ExternalEngine {
    binary: PathBuf,
    args: Vec<String>,
}

impl ExternalEngine {
    pub fn new(binary: impl Into<PathBuf>, args: Vec<String>) -> Self {
        Self {
            binary: binary.into(),
            args,
        }
    }

    pub fn binary(&self) -> &Path {
        &self.binary
    }
}

impl RenderEngine for ExternalEngine {
    fn render(&self, markup: &str) -> RenderResult<Vec<u8>> {
        let mut child = Command::new(&self.binary)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| match e.kind() {
                std::io::ErrorKind::NotFound => RenderError::EngineNotFound(self.binary.clone()),
                _ => RenderError::Io(e),
            })?;

        // Feed stdin from a separate thread so a large document on stdout
        // cannot block the writer.
        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| RenderError::Io(std::io::Error::other("engine stdin unavailable")))?;
        let input = markup.as_bytes().to_vec();
        let feeder = std::thread::spawn(move || stdin.write_all(&input));

        let output = child.wait_with_output()?;
        let fed = feeder
            .join()
            .map_err(|_| RenderError::Io(std::io::Error::other("engine stdin writer panicked")))?;

        if !output.status.success() {
            return Err(RenderError::EngineFailed {
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        // A broken pipe only matters if the engine also failed.
        if let Err(e) = fed {
            if e.kind() != std::io::ErrorKind::BrokenPipe {
                return Err(RenderError::Io(e));
            }
        }
        if output.stdout.is_empty() {
            return Err(RenderError::EmptyOutput);
        }

        Ok(output.stdout)
    }

    fn name(&self) -> &str {
        "external"
    }
}

/// `wkhtmltopdf` reading HTML from stdin, A4 portrait.
#[derive(Debug, Clone)]
pub struct WkHtmlToPdf {
    inner: ExternalEngine,
}

impl WkHtmlToPdf {
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        let args = [
            "--quiet",
            "--encoding",
            "utf-8",
            "--page-size",
            "A4",
            "--orientation",
            "Portrait",
            "-",
            "-",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect();

        Self {
            inner: ExternalEngine::new(binary, args),
        }
    }

    pub fn binary(&self) -> &Path {
        self.inner.binary()
    }
}

impl RenderEngine for WkHtmlToPdf {
    fn render(&self, markup: &str) -> RenderResult<Vec<u8>> {
        self.inner.render(markup)
    }

    fn name(&self) -> &str {
        "wkhtmltopdf"
    }
}

/// Test engine: returns a fixed PDF-looking payload, or fails on demand.
#[cfg(test)]
pub(crate) struct FakeEngine {
    pub fail: bool,
}

#[cfg(test)]
impl FakeEngine {
    pub const HEADER: &'static [u8] = b"%PDF-fake\n";

    pub fn ok() -> Self {
        Self { fail: false }
    }

    pub fn failing() -> Self {
        Self { fail: true }
    }
}

#[cfg(test)]
impl RenderEngine for FakeEngine {
    fn render(&self, markup: &str) -> RenderResult<Vec<u8>> {
        if self.fail {
            return Err(RenderError::EngineFailed {
                status: "exit status: 1".into(),
                stderr: "fake failure".into(),
            });
        }
        let mut bytes = Self::HEADER.to_vec();
        bytes.extend_from_slice(markup.as_bytes());
        Ok(bytes)
    }

    fn name(&self) -> &str {
        "fake"
    }
}
