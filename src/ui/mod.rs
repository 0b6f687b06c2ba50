//! User interface components.
//!
//! This module provides:
//! - CLI interface
//! - Report generation (HTML, CSV, JSON, text)

pub mod cli;
pub mod report;

pub use cli::Cli;
pub use report::{render_to_string, CsvExporter, HtmlReporter, ReportWriter, TextReporter};
