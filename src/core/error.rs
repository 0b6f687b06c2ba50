//! Error types and result handling for unmask.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using our custom Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for unmask operations.
#[derive(Error, Debug)]
pub enum Error {
    // ===== Per-file Errors =====
    #[error("Cannot access file: {path}")]
    FileAccess {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Path not found: {0}")]
    PathNotFound(PathBuf),

    #[error("Not a regular file: {0}")]
    NotAFile(PathBuf),

    #[error("Analysis of {path} timed out after {timeout_secs}s")]
    ScanTimeout { path: PathBuf, timeout_secs: u64 },

    #[error("Signature classification failed: {path} - {reason}")]
    Classification { path: PathBuf, reason: String },

    #[error("Failed to read directory: {path}")]
    DirectoryAccess {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ===== Batch Errors =====
    #[error("Scan was cancelled")]
    ScanCancelled,

    #[error("No files found to analyze")]
    NoFilesFound,

    #[error("All {count} file(s) failed analysis")]
    AllFilesFailed { count: usize },

    // ===== Report Errors =====
    #[error("Failed to write report: {path}")]
    Render {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ===== Configuration Errors =====
    #[error("Failed to load configuration: {0}")]
    ConfigLoad(String),

    #[error("Failed to save configuration: {0}")]
    ConfigSave(String),

    #[error("Invalid configuration value: {field} - {message}")]
    ConfigInvalid { field: String, message: String },

    // ===== Concurrency Errors =====
    #[error("Lock poisoned: {context}")]
    LockPoisoned { context: String },

    #[error("Analysis worker failed: {0}")]
    WorkerFailed(String),

    // ===== Serialization Errors =====
    #[error("JSON serialization error")]
    JsonSerialize(#[from] serde_json::Error),

    // ===== Generic Errors =====
    #[error("I/O error: {0}")]
    Io(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err.to_string())
    }
}

impl Error {
    /// Create a file access error, mapping `NotFound` to [`Error::PathNotFound`].
    pub fn file_access(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        if source.kind() == std::io::ErrorKind::NotFound {
            return Self::PathNotFound(path);
        }
        Self::FileAccess { path, source }
    }

    /// Create a report rendering error.
    pub fn render(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Render {
            path: path.into(),
            source,
        }
    }

    /// Create a classification error.
    pub fn classification(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::Classification {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Create a lock poisoned error.
    pub fn lock_poisoned(context: impl Into<String>) -> Self {
        Self::LockPoisoned {
            context: context.into(),
        }
    }

    /// Check if this error is confined to a single file (the batch can continue).
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Error::FileAccess { .. }
                | Error::PathNotFound(_)
                | Error::NotAFile(_)
                | Error::ScanTimeout { .. }
                | Error::Classification { .. }
                | Error::WorkerFailed(_)
        )
    }

    /// Check if this error is a cancellation.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Error::ScanCancelled)
    }

    /// Get a user-friendly suggestion for how to resolve this error.
    pub fn suggestion(&self) -> Option<&'static str> {
        match self {
            Error::FileAccess { .. } | Error::DirectoryAccess { .. } => {
                Some("Check file permissions, or run with elevated privileges")
            }
            Error::PathNotFound(_) => Some("Check that the path exists and is accessible"),
            Error::ScanTimeout { .. } => {
                Some("Increase scan.file_timeout_secs or pass --timeout 0 to disable it")
            }
            Error::NoFilesFound => Some("Pass a file or a directory containing regular files"),
            Error::Render { .. } => {
                Some("Check that the report directory is writable; scan results were kept")
            }
            Error::ConfigLoad(_) | Error::ConfigInvalid { .. } => {
                Some("Check your configuration file for syntax errors or missing fields")
            }
            Error::LockPoisoned { .. } => Some("Internal error: restart the application"),
            Error::ScanCancelled => Some("Scan was interrupted by user request"),
            _ => None,
        }
    }

    /// Get the error category for logging.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Error::FileAccess { .. }
            | Error::PathNotFound(_)
            | Error::NotAFile(_)
            | Error::DirectoryAccess { .. }
            | Error::Io(_) => ErrorCategory::Io,

            Error::Classification { .. } => ErrorCategory::Classification,

            Error::ScanTimeout { .. }
            | Error::ScanCancelled
            | Error::NoFilesFound
            | Error::AllFilesFailed { .. } => ErrorCategory::Scanning,

            Error::Render { .. } => ErrorCategory::Rendering,

            Error::ConfigLoad(_) | Error::ConfigSave(_) | Error::ConfigInvalid { .. } => {
                ErrorCategory::Configuration
            }

            Error::LockPoisoned { .. } | Error::WorkerFailed(_) => ErrorCategory::Concurrency,

            Error::JsonSerialize(_) => ErrorCategory::Serialization,

            Error::Internal(_) => ErrorCategory::Other,
        }
    }
}

/// Error category for classification and logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    Io,
    Classification,
    Scanning,
    Rendering,
    Configuration,
    Concurrency,
    Serialization,
    Other,
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io => write!(f, "I/O"),
            Self::Classification => write!(f, "Classification"),
            Self::Scanning => write!(f, "Scanning"),
            Self::Rendering => write!(f, "Rendering"),
            Self::Configuration => write!(f, "Configuration"),
            Self::Concurrency => write!(f, "Concurrency"),
            Self::Serialization => write!(f, "Serialization"),
            Self::Other => write!(f, "Other"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn test_error_display() {
        let err = Error::PathNotFound(PathBuf::from("/test/path"));
        assert_eq!(err.to_string(), "Path not found: /test/path");
    }

    #[test]
    fn test_file_access_maps_not_found() {
        let err = Error::file_access("/missing", io::Error::from(io::ErrorKind::NotFound));
        assert!(matches!(err, Error::PathNotFound(_)));

        let err = Error::file_access(
            "/locked",
            io::Error::from(io::ErrorKind::PermissionDenied),
        );
        assert!(matches!(err, Error::FileAccess { .. }));
    }

    #[test]
    fn test_recoverable_errors() {
        let err = Error::classification("/test", "corrupt header");
        assert!(err.is_recoverable());

        let err = Error::render("/reports/a.html", io::Error::from(io::ErrorKind::Other));
        assert!(!err.is_recoverable());

        assert!(!Error::ScanCancelled.is_recoverable());
        assert!(Error::ScanCancelled.is_cancelled());
    }

    #[test]
    fn test_error_category() {
        let err = Error::render("/reports", io::Error::from(io::ErrorKind::Other));
        assert_eq!(err.category(), ErrorCategory::Rendering);
        assert_eq!(Error::NoFilesFound.category(), ErrorCategory::Scanning);
        assert_eq!(ErrorCategory::Io.to_string(), "I/O");
    }
}
