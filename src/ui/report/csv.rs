//! CSV export functionality.
//!
//! One row per scanned file, preceded by `#` comment lines with the batch
//! summary so the file still opens cleanly in a spreadsheet.

use crate::core::types::{BatchReport, DisguiseStatus};
use std::io::{self, Write};

const COLUMNS: &[&str] = &[
    "Index",
    "File Name",
    "Path",
    "Declared Extension",
    "Detected Extension",
    "MIME Type",
    "Status",
    "Size (bytes)",
    "Created",
    "Modified",
    "MD5",
    "SHA256",
    "Failure",
];

/// CSV exporter for scan results.
pub struct CsvExporter {
    /// Delimiter character
    delimiter: char,
    /// Include header row
    include_header: bool,
    /// Include the `#` summary block
    include_summary: bool,
}

impl CsvExporter {
    /// Create a new CSV exporter.
    pub fn new() -> Self {
        Self {
            delimiter: ',',
            include_header: true,
            include_summary: true,
        }
    }

    /// Set the delimiter character.
    pub fn with_delimiter(mut self, delimiter: char) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Set whether to include headers.
    pub fn with_header(mut self, include: bool) -> Self {
        self.include_header = include;
        self
    }

    /// Set whether to include the summary comment block.
    pub fn with_summary(mut self, include: bool) -> Self {
        self.include_summary = include;
        self
    }

    /// Export scan results as CSV.
    pub fn export<W: Write>(&self, report: &BatchReport, out: &mut W) -> io::Result<()> {
        if self.include_summary {
            writeln!(out, "# unmask disguise report")?;
            writeln!(out, "# Report ID: {}", report.report_id)?;
            writeln!(out, "# Status: {}", report.status)?;
            writeln!(out, "# Start Time: {}", report.started_at.to_rfc3339())?;
            if let Some(end_time) = report.finished_at {
                writeln!(out, "# End Time: {}", end_time.to_rfc3339())?;
            }
            writeln!(out, "# Processed: {} of {}", report.processed(), report.requested)?;
            writeln!(out, "# Normal: {}", report.count(DisguiseStatus::Normal))?;
            writeln!(out, "# Disguised: {}", report.count(DisguiseStatus::Disguised))?;
            writeln!(out, "# Unverifiable: {}", report.count(DisguiseStatus::Unverifiable))?;
            writeln!(out, "# Failed: {}", report.failed())?;
            writeln!(out)?;
        }

        let delimiter = self.delimiter.to_string();

        if self.include_header {
            writeln!(out, "{}", COLUMNS.join(delimiter.as_str()))?;
        }

        for (index, result) in report.results.iter().enumerate() {
            let fields = [
                (index + 1).to_string(),
                self.escape_csv(&result.file_name),
                self.escape_csv(&result.path.display().to_string()),
                self.escape_csv(&result.declared_extension),
                self.escape_csv(&result.detected_extension),
                self.escape_csv(&result.detected_mime),
                result.status.as_str().to_string(),
                result.size_bytes.to_string(),
                result.created_at.map(|t| t.to_rfc3339()).unwrap_or_default(),
                result.modified_at.map(|t| t.to_rfc3339()).unwrap_or_default(),
                result.md5.clone(),
                result.sha256.clone(),
                self.escape_csv(result.failure.as_deref().unwrap_or("")),
            ];
            writeln!(out, "{}", fields.join(delimiter.as_str()))?;
        }

        Ok(())
    }

    /// Escape a CSV field.
    fn escape_csv(&self, field: &str) -> String {
        if field.contains(self.delimiter)
            || field.contains('"')
            || field.contains('\n')
            || field.contains('\r')
        {
            format!("\"{}\"", field.replace('"', "\"\""))
        } else {
            field.to_string()
        }
    }
}

impl Default for CsvExporter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::Error;
    use crate::core::types::AnalysisResult;
    use std::path::Path;

    fn render(exporter: &CsvExporter, report: &BatchReport) -> String {
        let mut out = Vec::new();
        exporter.export(report, &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_escape_csv() {
        let exporter = CsvExporter::new();
        assert_eq!(exporter.escape_csv("simple"), "simple");
        assert_eq!(exporter.escape_csv("with,comma"), "\"with,comma\"");
        assert_eq!(exporter.escape_csv("with\"quote"), "\"with\"\"quote\"");
        assert_eq!(exporter.escape_csv("with\nnewline"), "\"with\nnewline\"");

        let semicolon = CsvExporter::new().with_delimiter(';');
        assert_eq!(semicolon.escape_csv("a;b"), "\"a;b\"");
        assert_eq!(semicolon.escape_csv("a,b"), "a,b");
    }

    #[test]
    fn test_rows_follow_report_order() {
        let mut report = BatchReport::new(2);
        for name in ["first, copy.doc", "second.pdf"] {
            report
                .results
                .push(AnalysisResult::degraded(Path::new(name), &Error::NotAFile(name.into())));
        }
        report.complete();

        let csv = render(&CsvExporter::new().with_summary(false), &report);
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("Index,File Name,Path"));
        assert!(lines[1].starts_with("1,\"first, copy.doc\""));
        assert!(lines[1].contains(",unverifiable,"));
        assert!(lines[2].starts_with("2,second.pdf"));
    }

    #[test]
    fn test_summary_block() {
        let mut report = BatchReport::new(0);
        report.complete();
        let csv = render(&CsvExporter::new().with_header(false), &report);
        assert!(csv.contains("# Processed: 0 of 0"));
        assert!(csv.contains("# Status: Completed"));
    }
}
