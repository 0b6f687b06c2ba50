//! Content signature classification.
//!
//! Detection is delegated to an external magic-number sniffer behind the
//! [`SignatureClassifier`] trait, so the analyzer never looks at file names to
//! decide what a file really is.

use crate::core::types::{ERROR, UNKNOWN};
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Default number of header bytes handed to the sniffer.
pub const DEFAULT_SNIFF_BYTES: usize = 8192;

/// Outcome of classifying a file by its content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    /// A known signature matched
    Match { extension: String, mime: String },
    /// No known signature matched
    NoMatch,
    /// The classifier could not inspect the file
    Failed { reason: String },
}

impl Classification {
    /// Create a match outcome.
    pub fn matched(extension: impl Into<String>, mime: impl Into<String>) -> Self {
        Self::Match {
            extension: extension.into(),
            mime: mime.into(),
        }
    }

    /// Detected extension, or the `unknown`/`error` sentinel.
    pub fn extension(&self) -> &str {
        match self {
            Classification::Match { extension, .. } => extension,
            Classification::NoMatch => UNKNOWN,
            Classification::Failed { .. } => ERROR,
        }
    }

    /// Detected MIME type, or the `unknown`/`error` sentinel.
    pub fn mime(&self) -> &str {
        match self {
            Classification::Match { mime, .. } => mime,
            Classification::NoMatch => UNKNOWN,
            Classification::Failed { .. } => ERROR,
        }
    }

    pub fn is_match(&self) -> bool {
        matches!(self, Classification::Match { .. })
    }
}

/// Identifies a file's real type from its content.
pub trait SignatureClassifier: Send + Sync {
    /// Short name for logs and `info` output.
    fn name(&self) -> &'static str;

    /// Classify the file at `path`. Failures are reported as
    /// [`Classification::Failed`], never as a panic or error.
    fn classify(&self, path: &Path) -> Classification;
}

/// Classifier backed by the `infer` crate's magic-number tables.
#[derive(Debug, Clone)]
pub struct InferClassifier {
    sniff_bytes: usize,
}

impl Default for InferClassifier {
    fn default() -> Self {
        Self::new()
    }
}

impl InferClassifier {
    /// Create a classifier reading [`DEFAULT_SNIFF_BYTES`] of each file.
    pub fn new() -> Self {
        Self {
            sniff_bytes: DEFAULT_SNIFF_BYTES,
        }
    }

    /// Set how many header bytes are read.
    pub fn with_sniff_bytes(mut self, sniff_bytes: usize) -> Self {
        self.sniff_bytes = sniff_bytes.max(1);
        self
    }

    /// Classify an in-memory header.
    pub fn classify_bytes(&self, header: &[u8]) -> Classification {
        match infer::get(header) {
            Some(kind) => Classification::matched(kind.extension(), kind.mime_type()),
            None => Classification::NoMatch,
        }
    }

    fn read_header(&self, path: &Path) -> std::io::Result<Vec<u8>> {
        let file = File::open(path)?;
        let mut header = Vec::with_capacity(self.sniff_bytes);
        file.take(self.sniff_bytes as u64).read_to_end(&mut header)?;
        Ok(header)
    }
}

impl SignatureClassifier for InferClassifier {
    fn name(&self) -> &'static str {
        "infer"
    }

    fn classify(&self, path: &Path) -> Classification {
        match self.read_header(path) {
            Ok(header) => self.classify_bytes(&header),
            Err(e) => Classification::Failed {
                reason: e.to_string(),
            },
        }
    }
}
