//! Plain-text report for terminals and log attachments.

use crate::core::types::{BatchReport, DisguiseStatus};
use crate::ui::report::format_bytes;
use std::io::{self, Write};

/// Width of the file name column in the summary table.
const NAME_WIDTH: usize = 32;

/// Plain-text report generator.
#[derive(Default)]
pub struct TextReporter;

impl TextReporter {
    pub fn new() -> Self {
        Self
    }

    /// Write the report as aligned plain text.
    pub fn write<W: Write>(&self, report: &BatchReport, out: &mut W) -> io::Result<()> {
        let rule = "=".repeat(78);

        writeln!(out, "{}", rule)?;
        writeln!(out, "FILE DISGUISE REPORT  {}", report.report_id)?;
        writeln!(out, "{}", rule)?;
        writeln!(out, "Status:       {}", report.status)?;
        writeln!(
            out,
            "Started:      {}",
            report
                .started_at
                .with_timezone(&chrono::Local)
                .format("%Y-%m-%d %H:%M:%S")
        )?;
        if let Some(secs) = report.duration_secs() {
            writeln!(out, "Duration:     {:.2}s", secs)?;
        }
        writeln!(out, "Processed:    {} of {}", report.processed(), report.requested)?;
        writeln!(out, "Normal:       {}", report.count(DisguiseStatus::Normal))?;
        writeln!(out, "Disguised:    {}", report.count(DisguiseStatus::Disguised))?;
        writeln!(out, "Unverifiable: {}", report.count(DisguiseStatus::Unverifiable))?;
        writeln!(out, "Failed:       {}", report.failed())?;
        writeln!(out, "Data:         {}", format_bytes(report.total_bytes()))?;
        writeln!(out)?;

        writeln!(
            out,
            "{:>4}  {:<width$}  {:<9}  {:<9}  {}",
            "#",
            "FILE",
            "DECLARED",
            "DETECTED",
            "STATUS",
            width = NAME_WIDTH
        )?;
        writeln!(out, "{}", "-".repeat(78))?;
        for (index, result) in report.results.iter().enumerate() {
            let declared = if result.declared_extension.is_empty() {
                "-"
            } else {
                result.declared_extension.as_str()
            };
            writeln!(
                out,
                "{:>4}  {:<width$}  {:<9}  {:<9}  {}",
                index + 1,
                truncate(&result.file_name, NAME_WIDTH),
                declared,
                result.detected_extension,
                result.status,
                width = NAME_WIDTH
            )?;
        }

        if report.is_empty() {
            writeln!(out, "(no files analyzed)")?;
            return Ok(());
        }

        writeln!(out)?;
        writeln!(out, "DETAILS")?;
        writeln!(out, "{}", rule)?;
        for (index, result) in report.results.iter().enumerate() {
            writeln!(out, "[{}] {}", index + 1, result.path.display())?;
            writeln!(out, "    Status:   {}", result.status)?;
            writeln!(out, "    Size:     {}", format_bytes(result.size_bytes))?;
            writeln!(out, "    MIME:     {}", result.detected_mime)?;
            writeln!(out, "    MD5:      {}", or_dash(&result.md5_prefix))?;
            writeln!(out, "    SHA-256:  {}", or_dash(&result.sha256_prefix))?;
            writeln!(out, "    Created:  {}", result.created_display())?;
            writeln!(out, "    Modified: {}", result.modified_display())?;
            if let Some(reason) = &result.failure {
                writeln!(out, "    Failure:  {}", reason)?;
            }
        }

        Ok(())
    }
}

fn or_dash(value: &str) -> &str {
    if value.is_empty() {
        "-"
    } else {
        value
    }
}

/// Shorten `s` to at most `max` characters, marking the cut with `~`.
fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out: String = s.chars().take(max.saturating_sub(1)).collect();
    out.push('~');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::Error;
    use crate::core::types::AnalysisResult;
    use std::path::Path;

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short.txt", 32), "short.txt");
        let long = "a".repeat(40);
        let cut = truncate(&long, 10);
        assert_eq!(cut.chars().count(), 10);
        assert!(cut.ends_with('~'));
    }

    #[test]
    fn test_text_report() {
        let mut report = BatchReport::new(1);
        report.results.push(AnalysisResult::degraded(
            Path::new("missing.mp3"),
            &Error::PathNotFound("missing.mp3".into()),
        ));
        report.complete();

        let mut out = Vec::new();
        TextReporter::new().write(&report, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();

        assert!(text.contains("Processed:    1 of 1"));
        assert!(text.contains("missing.mp3"));
        assert!(text.contains("Failure:  Path not found: missing.mp3"));
        assert!(text.contains("MD5:      -"));
    }
}
