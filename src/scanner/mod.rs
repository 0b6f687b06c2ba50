//! Disguise scanning functionality.
//!
//! This module provides the scanning pipeline:
//! - Content signature classification via magic bytes
//! - Single-file analysis (metadata, digests, disguise status)
//! - Ordered batch scanning on a bounded worker pool
//! - Progress tracking and reporting

pub mod analyzer;
pub mod batch;
pub mod progress;
pub mod signature;

pub use analyzer::FileAnalyzer;
pub use batch::{collect_paths, BatchScanner};
pub use progress::{ConsoleProgressReporter, ProgressTracker, ScanProgress};
pub use signature::{Classification, InferClassifier, SignatureClassifier};
