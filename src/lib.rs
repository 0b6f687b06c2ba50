//! unmask: detect files whose extension disguises their real content.
//!
//! Each file's declared extension is compared with the type identified from
//! its magic-number signature. The crate also records MD5 and SHA-256 digests
//! and file metadata, scans batches concurrently while keeping input order, and
//! writes auto-numbered reports in HTML, CSV, JSON or plain text.

pub mod core;
pub mod scanner;
pub mod ui;
pub mod utils;

// Re-export commonly used types
pub use crate::core::config::Config;
pub use crate::core::error::{Error, Result};
pub use crate::core::types::*;
pub use crate::scanner::{BatchScanner, FileAnalyzer};
pub use crate::ui::report::ReportWriter;
