//! Single-file disguise analysis.

use crate::core::config::Config;
use crate::core::error::{Error, Result};
use crate::core::types::{
    declared_extension, digest_preview, file_name_of, AnalysisResult, DisguiseStatus,
};
use crate::scanner::signature::{Classification, InferClassifier, SignatureClassifier};
use crate::utils::hash::HashCalculator;
use chrono::{DateTime, Utc};
use std::path::Path;
use std::sync::Arc;

/// Analyzes one file: metadata, content signature, digests and status.
///
/// The analyzer holds no mutable state, so a single instance is shared by
/// every worker of a batch.
#[derive(Clone)]
pub struct FileAnalyzer {
    classifier: Arc<dyn SignatureClassifier>,
    match_aliases: bool,
}

impl Default for FileAnalyzer {
    fn default() -> Self {
        Self::new(Arc::new(InferClassifier::new()))
    }
}

impl FileAnalyzer {
    /// Create an analyzer around the given classifier.
    pub fn new(classifier: Arc<dyn SignatureClassifier>) -> Self {
        Self {
            classifier,
            match_aliases: true,
        }
    }

    /// Create an analyzer from the scan settings.
    pub fn from_config(config: &Config) -> Self {
        let classifier = InferClassifier::new().with_sniff_bytes(config.scan.sniff_bytes);
        Self::new(Arc::new(classifier)).with_alias_matching(config.scan.match_extension_aliases)
    }

    /// Enable or disable alias-aware extension comparison.
    pub fn with_alias_matching(mut self, enabled: bool) -> Self {
        self.match_aliases = enabled;
        self
    }

    /// Name of the underlying classifier.
    pub fn classifier_name(&self) -> &'static str {
        self.classifier.name()
    }

    /// Analyze a single file.
    ///
    /// Classifier failures are folded into the `error` sentinel. Failures to
    /// stat or hash the file are returned to the caller.
    pub fn analyze(&self, path: &Path) -> Result<AnalysisResult> {
        let metadata = std::fs::metadata(path).map_err(|e| Error::file_access(path, e))?;
        if !metadata.is_file() {
            return Err(Error::NotAFile(path.to_path_buf()));
        }

        let declared = declared_extension(path);

        let classification = self.classifier.classify(path);
        if let Classification::Failed { reason } = &classification {
            let err = Error::classification(path, reason.as_str());
            log::warn!("[{}] {}", err.category(), err);
        }

        let digests = HashCalculator::digest_file(path)?;
        let status = DisguiseStatus::derive(&declared, classification.extension(), self.match_aliases);

        log::debug!(
            "{}: declared={:?} detected={} status={}",
            path.display(),
            declared,
            classification.extension(),
            status
        );

        Ok(AnalysisResult {
            path: path.to_path_buf(),
            file_name: file_name_of(path),
            declared_extension: declared,
            detected_extension: classification.extension().to_string(),
            detected_mime: classification.mime().to_string(),
            status,
            size_bytes: metadata.len(),
            created_at: metadata.created().ok().map(DateTime::<Utc>::from),
            modified_at: metadata.modified().ok().map(DateTime::<Utc>::from),
            md5_prefix: digest_preview(&digests.md5).to_string(),
            sha256_prefix: digest_preview(&digests.sha256).to_string(),
            md5: digests.md5,
            sha256: digests.sha256,
            failure: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::{ERROR, UNKNOWN};
    use std::fs;
    use tempfile::tempdir;

    const JPEG_HEADER: &[u8] = b"\xff\xd8\xff\xe0\x00\x10JFIF\x00\x01\x01\x00\x00\x01";
    const PNG_HEADER: &[u8] = b"\x89PNG\r\n\x1a\n\x00\x00\x00\rIHDR";

    struct BrokenClassifier;

    impl SignatureClassifier for BrokenClassifier {
        fn name(&self) -> &'static str {
            "broken"
        }

        fn classify(&self, _path: &Path) -> Classification {
            Classification::Failed {
                reason: "sniffer crashed".to_string(),
            }
        }
    }

    /// Classifies the file, then removes it before it can be hashed.
    struct DeletingClassifier;

    impl SignatureClassifier for DeletingClassifier {
        fn name(&self) -> &'static str {
            "deleting"
        }

        fn classify(&self, path: &Path) -> Classification {
            let classification = InferClassifier::new().classify(path);
            fs::remove_file(path).unwrap();
            classification
        }
    }

    #[test]
    fn test_jpeg_renamed_to_txt_is_disguised() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("document.txt");
        fs::write(&path, JPEG_HEADER).unwrap();

        let result = FileAnalyzer::default().analyze(&path).unwrap();
        assert_eq!(result.file_name, "document.txt");
        assert_eq!(result.declared_extension, "txt");
        assert_eq!(result.detected_extension, "jpg");
        assert_eq!(result.detected_mime, "image/jpeg");
        assert_eq!(result.status, DisguiseStatus::Disguised);
        assert_eq!(result.size_bytes, JPEG_HEADER.len() as u64);
        assert_eq!(result.sha256, HashCalculator::sha256_bytes(JPEG_HEADER));
        assert_eq!(result.md5_prefix.len(), 12);
        assert!(result.modified_at.is_some());
        assert!(!result.is_degraded());
    }

    #[test]
    fn test_png_renamed_to_txt_is_disguised() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("photo.txt");
        fs::write(&path, PNG_HEADER).unwrap();

        let result = FileAnalyzer::default().analyze(&path).unwrap();
        assert_eq!(result.detected_extension, "png");
        assert!(result.is_disguised());
    }

    #[test]
    fn test_matching_extension_is_normal() {
        let dir = tempdir().unwrap();
        let png = dir.path().join("image.PNG");
        fs::write(&png, PNG_HEADER).unwrap();
        let jpeg = dir.path().join("photo.jpeg");
        fs::write(&jpeg, JPEG_HEADER).unwrap();

        let analyzer = FileAnalyzer::default();
        assert_eq!(analyzer.analyze(&png).unwrap().status, DisguiseStatus::Normal);
        assert_eq!(analyzer.analyze(&jpeg).unwrap().status, DisguiseStatus::Normal);

        let strict = FileAnalyzer::default().with_alias_matching(false);
        assert_eq!(strict.analyze(&jpeg).unwrap().status, DisguiseStatus::Disguised);
    }

    #[test]
    fn test_empty_file_is_unverifiable() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("empty.dat");
        fs::write(&path, b"").unwrap();

        let result = FileAnalyzer::default().analyze(&path).unwrap();
        assert_eq!(result.detected_extension, UNKNOWN);
        assert_eq!(result.status, DisguiseStatus::Unverifiable);
        assert_eq!(
            result.sha256,
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
        assert_eq!(result.size_bytes, 0);
    }

    #[test]
    fn test_analysis_is_idempotent() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("report.pdf");
        fs::write(&path, b"%PDF-1.7\nsome body bytes").unwrap();

        let analyzer = FileAnalyzer::default();
        let first = analyzer.analyze(&path).unwrap();
        let second = analyzer.analyze(&path).unwrap();
        assert_eq!(first.md5, second.md5);
        assert_eq!(first.sha256, second.sha256);
        assert_eq!(first.status, second.status);
        assert_eq!(first.status, DisguiseStatus::Normal);
    }

    #[test]
    fn test_classifier_failure_is_captured() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("notes.txt");
        fs::write(&path, b"hello").unwrap();

        let analyzer = FileAnalyzer::new(Arc::new(BrokenClassifier));
        let result = analyzer.analyze(&path).unwrap();
        assert_eq!(result.detected_extension, ERROR);
        assert_eq!(result.detected_mime, ERROR);
        assert_eq!(result.status, DisguiseStatus::Unverifiable);
        assert_eq!(result.md5, "5d41402abc4b2a76b9719d911017c592");
        assert_eq!(analyzer.classifier_name(), "broken");
    }

    #[test]
    fn test_missing_path_is_error() {
        let dir = tempdir().unwrap();
        let err = FileAnalyzer::default()
            .analyze(&dir.path().join("gone.png"))
            .unwrap_err();
        assert!(matches!(err, Error::PathNotFound(_)));
        assert!(err.is_recoverable());
    }

    #[test]
    fn test_hash_failure_after_classification_is_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("x.png");
        fs::write(&path, PNG_HEADER).unwrap();

        let err = FileAnalyzer::new(Arc::new(DeletingClassifier))
            .analyze(&path)
            .unwrap_err();
        assert!(matches!(err, Error::PathNotFound(ref p) if p == &path));
        assert!(err.is_recoverable());
        assert!(!path.exists());
    }

    #[test]
    fn test_directory_is_not_a_file() {
        let dir = tempdir().unwrap();
        let err = FileAnalyzer::default().analyze(dir.path()).unwrap_err();
        assert!(matches!(err, Error::NotAFile(_)));
    }

    #[test]
    fn test_no_extension_is_unverifiable() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("README");
        fs::write(&path, PNG_HEADER).unwrap();

        let result = FileAnalyzer::default().analyze(&path).unwrap();
        assert_eq!(result.declared_extension, "");
        assert_eq!(result.detected_extension, "png");
        assert_eq!(result.status, DisguiseStatus::Unverifiable);
    }
}
