//! Report generation for scan results.
//!
//! This module provides export functionality in multiple formats:
//! - HTML reports
//! - CSV spreadsheets
//! - Plain text
//! - JSON export
//!
//! [`ReportWriter`] places each artifact in the report directory as
//! `<base_name>_<n>.<ext>` and never overwrites an existing file.

pub mod csv;
pub mod html;
pub mod text;

use crate::core::config::Config;
use crate::core::error::{Error, Result};
use crate::core::types::{BatchReport, ReportFormat};
use std::collections::HashSet;
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

pub use csv::CsvExporter;
pub use html::HtmlReporter;
pub use text::TextReporter;

/// Give up after this many consecutive name collisions.
const MAX_NAME_ATTEMPTS: u32 = 10_000;

/// Render a report into memory.
pub fn render_bytes(report: &BatchReport, format: ReportFormat) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    match format {
        ReportFormat::Html => out.extend_from_slice(HtmlReporter::new().render(report).as_bytes()),
        ReportFormat::Csv => CsvExporter::new().export(report, &mut out)?,
        ReportFormat::Text => TextReporter::new().write(report, &mut out)?,
        ReportFormat::Json => serde_json::to_writer_pretty(&mut out, report)?,
    }
    Ok(out)
}

/// Render a report to a string without touching the filesystem.
pub fn render_to_string(report: &BatchReport, format: ReportFormat) -> Result<String> {
    let bytes = render_bytes(report, format)?;
    String::from_utf8(bytes).map_err(|e| Error::Internal(format!("Report is not UTF-8: {}", e)))
}

/// Format bytes for display.
pub fn format_bytes(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.2} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.2} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.2} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} bytes", bytes)
    }
}

/// Writes auto-numbered report artifacts into a directory.
#[derive(Debug, Clone)]
pub struct ReportWriter {
    output_dir: PathBuf,
    base_name: String,
    format: ReportFormat,
}

impl ReportWriter {
    /// Create a writer for `output_dir`.
    pub fn new(output_dir: impl Into<PathBuf>, base_name: impl Into<String>, format: ReportFormat) -> Self {
        Self {
            output_dir: output_dir.into(),
            base_name: base_name.into(),
            format,
        }
    }

    /// Create a writer from the report settings.
    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.report.output_dir.clone(),
            config.report.base_name.clone(),
            config.report.format,
        )
    }

    /// Change the artifact format.
    pub fn with_format(mut self, format: ReportFormat) -> Self {
        self.format = format;
        self
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    pub fn format(&self) -> ReportFormat {
        self.format
    }

    /// Path of the artifact numbered `n`.
    pub fn artifact_path(&self, n: u32) -> PathBuf {
        self.output_dir.join(format!(
            "{}_{}.{}",
            self.base_name,
            n,
            self.format.extension()
        ))
    }

    /// Parse the number out of an artifact file name produced by this writer.
    fn artifact_number(&self, file_name: &str) -> Option<u32> {
        let suffix = format!(".{}", self.format.extension());
        file_name
            .strip_prefix(self.base_name.as_str())?
            .strip_prefix('_')?
            .strip_suffix(suffix.as_str())?
            .parse()
            .ok()
    }

    /// Smallest number, starting at 1, with no artifact in the directory.
    pub fn next_available_number(&self) -> Result<u32> {
        if !self.output_dir.exists() {
            return Ok(1);
        }

        let entries =
            fs::read_dir(&self.output_dir).map_err(|e| Error::render(&self.output_dir, e))?;
        let taken: HashSet<u32> = entries
            .flatten()
            .filter_map(|entry| self.artifact_number(&entry.file_name().to_string_lossy()))
            .collect();

        Ok((1..).find(|n| !taken.contains(n)).unwrap_or(1))
    }

    /// Path the next render would be written to, if no other writer races it.
    pub fn next_available_path(&self) -> Result<PathBuf> {
        Ok(self.artifact_path(self.next_available_number()?))
    }

    /// Render `report` into a new numbered artifact and return its path.
    ///
    /// The file is created with create-exclusive semantics; if another writer
    /// takes the chosen number first, the next free number is tried.
    pub fn render(&self, report: &BatchReport) -> Result<PathBuf> {
        fs::create_dir_all(&self.output_dir).map_err(|e| Error::render(&self.output_dir, e))?;

        let body = render_bytes(report, self.format)?;
        let mut n = self.next_available_number()?;

        for _ in 0..MAX_NAME_ATTEMPTS {
            let path = self.artifact_path(n);
            match OpenOptions::new().write(true).create_new(true).open(&path) {
                Ok(mut file) => {
                    let written = file.write_all(&body).and_then(|_| file.sync_all());
                    if let Err(e) = written {
                        drop(file);
                        // Only the file created above is removed.
                        let _ = fs::remove_file(&path);
                        return Err(Error::render(path, e));
                    }
                    log::info!("{} report written to {}", self.format, path.display());
                    return Ok(path);
                }
                Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
                    log::debug!("{} already exists, trying next number", path.display());
                    n += 1;
                }
                Err(e) => return Err(Error::render(path, e)),
            }
        }

        Err(Error::render(
            &self.output_dir,
            io::Error::new(
                io::ErrorKind::AlreadyExists,
                "no free report number available",
            ),
        ))
    }
}
