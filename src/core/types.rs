//! Core type definitions used throughout unmask.

use crate::core::error::Error;
use chrono::{DateTime, Local, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Sentinel for a classifier that found no matching signature.
pub const UNKNOWN: &str = "unknown";

/// Sentinel for a classifier that failed to run.
pub const ERROR: &str = "error";

/// Number of hex characters kept in a digest preview.
pub const HASH_PREVIEW_LEN: usize = 12;

/// Display format for file timestamps.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Groups of extensions that name the same format. The first entry is canonical.
const EXTENSION_ALIASES: &[&[&str]] = &[
    &["jpg", "jpeg", "jpe", "jfif"],
    &["tif", "tiff"],
    &["htm", "html"],
    &["mpg", "mpeg"],
    &["mid", "midi"],
    &["gz", "tgz", "gzip"],
    &["aif", "aiff"],
    &["heic", "heif"],
    &["m4a", "m4b"],
    &["ogg", "oga"],
];

/// Disguise status of a scanned file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DisguiseStatus {
    /// Declared and detected extensions agree
    Normal,
    /// Content signature contradicts the declared extension
    Disguised,
    /// No reliable detected type, no declared extension, or the file was unreadable
    Unverifiable,
}

impl DisguiseStatus {
    /// Derive the status from the declared and detected extensions.
    ///
    /// `detected` may be one of the [`UNKNOWN`] or [`ERROR`] sentinels. With
    /// `match_aliases`, extensions of the same format (e.g. `jpg`/`jpeg`) are
    /// treated as equal.
    pub fn derive(declared: &str, detected: &str, match_aliases: bool) -> Self {
        if detected.is_empty()
            || detected.eq_ignore_ascii_case(UNKNOWN)
            || detected.eq_ignore_ascii_case(ERROR)
            || declared.is_empty()
        {
            return DisguiseStatus::Unverifiable;
        }

        let same = if match_aliases {
            canonical_extension(declared) == canonical_extension(detected)
        } else {
            declared.eq_ignore_ascii_case(detected)
        };

        if same {
            DisguiseStatus::Normal
        } else {
            DisguiseStatus::Disguised
        }
    }

    /// Get string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            DisguiseStatus::Normal => "normal",
            DisguiseStatus::Disguised => "disguised",
            DisguiseStatus::Unverifiable => "unverifiable",
        }
    }
}

impl std::fmt::Display for DisguiseStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DisguiseStatus::Normal => write!(f, "Normal"),
            DisguiseStatus::Disguised => write!(f, "Disguised"),
            DisguiseStatus::Unverifiable => write!(f, "Unverifiable"),
        }
    }
}

/// Map an extension to the canonical member of its alias group (lower-cased).
pub fn canonical_extension(ext: &str) -> String {
    let lower = ext.to_ascii_lowercase();
    EXTENSION_ALIASES
        .iter()
        .find(|group| group.contains(&lower.as_str()))
        .map(|group| group[0].to_string())
        .unwrap_or(lower)
}

/// Lower-cased extension of a file name; empty if it has none.
pub fn declared_extension(path: &Path) -> String {
    path.extension()
        .map(|ext| ext.to_string_lossy().to_lowercase())
        .unwrap_or_default()
}

/// First [`HASH_PREVIEW_LEN`] characters of a digest.
pub fn digest_preview(digest: &str) -> &str {
    digest.get(..HASH_PREVIEW_LEN).unwrap_or(digest)
}

/// Verification outcome for one scanned file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisResult {
    /// Path as supplied to the scanner
    pub path: PathBuf,
    /// Base name of the file
    pub file_name: String,
    /// Extension taken from the file name (lower-cased, may be empty)
    pub declared_extension: String,
    /// Extension inferred from content, or a sentinel
    pub detected_extension: String,
    /// MIME type inferred from content, or a sentinel
    pub detected_mime: String,
    /// Disguise status
    pub status: DisguiseStatus,
    /// File size in bytes
    pub size_bytes: u64,
    /// Creation time, where the platform records one
    pub created_at: Option<DateTime<Utc>>,
    /// Last modification time
    pub modified_at: Option<DateTime<Utc>>,
    /// Full MD5 digest (empty for degraded results)
    pub md5: String,
    /// Full SHA256 digest (empty for degraded results)
    pub sha256: String,
    /// MD5 preview
    pub md5_prefix: String,
    /// SHA256 preview
    pub sha256_prefix: String,
    /// Why the file could not be analyzed, for degraded results
    pub failure: Option<String>,
}

impl AnalysisResult {
    /// Build a degraded result for a file that could not be analyzed.
    pub fn degraded(path: &Path, error: &Error) -> Self {
        Self {
            path: path.to_path_buf(),
            file_name: file_name_of(path),
            declared_extension: declared_extension(path),
            detected_extension: ERROR.to_string(),
            detected_mime: ERROR.to_string(),
            status: DisguiseStatus::Unverifiable,
            size_bytes: 0,
            created_at: None,
            modified_at: None,
            md5: String::new(),
            sha256: String::new(),
            md5_prefix: String::new(),
            sha256_prefix: String::new(),
            failure: Some(error.to_string()),
        }
    }

    /// Whether this result is a placeholder for a failed analysis.
    pub fn is_degraded(&self) -> bool {
        self.failure.is_some()
    }

    /// Whether the file is disguised.
    pub fn is_disguised(&self) -> bool {
        self.status == DisguiseStatus::Disguised
    }

    /// Creation time formatted for display.
    pub fn created_display(&self) -> String {
        format_timestamp(self.created_at)
    }

    /// Modification time formatted for display.
    pub fn modified_display(&self) -> String {
        format_timestamp(self.modified_at)
    }
}

/// Base name of a path, lossily converted.
pub fn file_name_of(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn format_timestamp(ts: Option<DateTime<Utc>>) -> String {
    ts.map(|t| t.with_timezone(&Local).format(TIMESTAMP_FORMAT).to_string())
        .unwrap_or_else(|| "-".to_string())
}

/// Current status of a batch scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScanStatus {
    /// Scan is currently running
    Running,
    /// Every requested path was analyzed
    Completed,
    /// Scan was stopped by user request
    Cancelled,
}

impl std::fmt::Display for ScanStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ScanStatus::Running => write!(f, "Running"),
            ScanStatus::Completed => write!(f, "Completed"),
            ScanStatus::Cancelled => write!(f, "Cancelled"),
        }
    }
}

/// Ordered results of one scan invocation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchReport {
    /// Unique report identifier
    pub report_id: String,
    /// When the scan started
    pub started_at: DateTime<Utc>,
    /// When the scan ended
    pub finished_at: Option<DateTime<Utc>>,
    /// Final status
    pub status: ScanStatus,
    /// Number of paths handed to the scanner
    pub requested: usize,
    /// Results in input order
    pub results: Vec<AnalysisResult>,
}

impl BatchReport {
    /// Create a new, empty report for `requested` paths.
    pub fn new(requested: usize) -> Self {
        Self {
            report_id: uuid::Uuid::new_v4().to_string(),
            started_at: Utc::now(),
            finished_at: None,
            status: ScanStatus::Running,
            requested,
            results: Vec::with_capacity(requested),
        }
    }

    /// Mark the scan as completed.
    pub fn complete(&mut self) {
        self.finished_at = Some(Utc::now());
        self.status = ScanStatus::Completed;
    }

    /// Mark the scan as cancelled.
    pub fn cancel(&mut self) {
        self.finished_at = Some(Utc::now());
        self.status = ScanStatus::Cancelled;
    }

    /// Calculate scan duration in seconds.
    pub fn duration_secs(&self) -> Option<f64> {
        self.finished_at
            .map(|end| (end - self.started_at).num_milliseconds() as f64 / 1000.0)
    }

    /// Number of files with a result.
    pub fn processed(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    /// Count results with the given status.
    pub fn count(&self, status: DisguiseStatus) -> usize {
        self.results.iter().filter(|r| r.status == status).count()
    }

    /// Number of degraded results.
    pub fn failed(&self) -> usize {
        self.results.iter().filter(|r| r.is_degraded()).count()
    }

    /// True when there is at least one result and every one is degraded.
    pub fn all_failed(&self) -> bool {
        !self.results.is_empty() && self.failed() == self.results.len()
    }

    /// Total bytes across analyzed files.
    pub fn total_bytes(&self) -> u64 {
        self.results.iter().map(|r| r.size_bytes).sum()
    }

    /// Results flagged as disguised.
    pub fn disguised(&self) -> impl Iterator<Item = &AnalysisResult> {
        self.results.iter().filter(|r| r.is_disguised())
    }
}

/// Output format of a rendered report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    /// Styled HTML document
    Html,
    /// Spreadsheet-friendly CSV
    Csv,
    /// Machine-readable JSON
    Json,
    /// Plain text
    Text,
}

impl ReportFormat {
    /// File extension used for artifacts of this format.
    pub fn extension(&self) -> &'static str {
        match self {
            ReportFormat::Html => "html",
            ReportFormat::Csv => "csv",
            ReportFormat::Json => "json",
            ReportFormat::Text => "txt",
        }
    }
}

impl std::fmt::Display for ReportFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReportFormat::Html => write!(f, "HTML"),
            ReportFormat::Csv => write!(f, "CSV"),
            ReportFormat::Json => write!(f, "JSON"),
            ReportFormat::Text => write!(f, "Text"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn test_status_derivation() {
        assert_eq!(DisguiseStatus::derive("png", "png", false), DisguiseStatus::Normal);
        assert_eq!(DisguiseStatus::derive("PNG", "png", false), DisguiseStatus::Normal);
        assert_eq!(DisguiseStatus::derive("txt", "jpg", false), DisguiseStatus::Disguised);
        assert_eq!(DisguiseStatus::derive("dat", UNKNOWN, false), DisguiseStatus::Unverifiable);
        assert_eq!(DisguiseStatus::derive("dat", ERROR, true), DisguiseStatus::Unverifiable);
        assert_eq!(DisguiseStatus::derive("", "png", true), DisguiseStatus::Unverifiable);
    }

    #[test]
    fn test_alias_matching() {
        assert_eq!(DisguiseStatus::derive("jpeg", "jpg", true), DisguiseStatus::Normal);
        assert_eq!(DisguiseStatus::derive("jpeg", "jpg", false), DisguiseStatus::Disguised);
        assert_eq!(DisguiseStatus::derive("tiff", "tif", true), DisguiseStatus::Normal);
        assert_eq!(DisguiseStatus::derive("jpeg", "png", true), DisguiseStatus::Disguised);
        assert_eq!(canonical_extension("JFIF"), "jpg");
        assert_eq!(canonical_extension("exe"), "exe");
    }

    #[test]
    fn test_declared_extension() {
        assert_eq!(declared_extension(Path::new("dir/Photo.JPG")), "jpg");
        assert_eq!(declared_extension(Path::new("archive.tar.gz")), "gz");
        assert_eq!(declared_extension(Path::new("README")), "");
        assert_eq!(declared_extension(Path::new(".bashrc")), "");
    }

    #[test]
    fn test_digest_preview() {
        let digest = "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855";
        assert_eq!(digest_preview(digest), "e3b0c44298fc");
        assert_eq!(digest_preview("abc"), "abc");
    }

    #[test]
    fn test_degraded_result() {
        let err = Error::file_access("/gone/file.pdf", io::Error::from(io::ErrorKind::NotFound));
        let result = AnalysisResult::degraded(Path::new("/gone/file.pdf"), &err);

        assert_eq!(result.file_name, "file.pdf");
        assert_eq!(result.declared_extension, "pdf");
        assert_eq!(result.detected_extension, ERROR);
        assert_eq!(result.status, DisguiseStatus::Unverifiable);
        assert!(result.md5.is_empty());
        assert!(result.is_degraded());
        assert_eq!(result.created_display(), "-");
    }

    #[test]
    fn test_batch_report_counts() {
        let mut report = BatchReport::new(2);
        let err = Error::NotAFile(PathBuf::from("a"));
        report.results.push(AnalysisResult::degraded(Path::new("a"), &err));
        report.results.push(AnalysisResult::degraded(Path::new("b"), &err));

        assert_eq!(report.processed(), 2);
        assert_eq!(report.count(DisguiseStatus::Unverifiable), 2);
        assert_eq!(report.failed(), 2);
        assert!(report.all_failed());
        assert_eq!(report.disguised().count(), 0);

        report.complete();
        assert_eq!(report.status, ScanStatus::Completed);
        assert!(report.duration_secs().is_some());
        assert!(!BatchReport::new(0).all_failed());
    }
}
