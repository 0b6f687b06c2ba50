//! HTML report generator.
//!
//! Generates a styled, self-contained HTML page with a summary table and one
//! detail block per scanned file.

use crate::core::types::{AnalysisResult, BatchReport, DisguiseStatus, ScanStatus};
use crate::ui::report::format_bytes;

/// HTML report generator.
pub struct HtmlReporter {
    /// Include CSS inline
    inline_css: bool,
}

impl HtmlReporter {
    /// Create a new HTML reporter.
    pub fn new() -> Self {
        Self { inline_css: true }
    }

    /// Leave out the embedded stylesheet.
    pub fn without_css(mut self) -> Self {
        self.inline_css = false;
        self
    }

    /// Render the HTML content.
    pub fn render(&self, report: &BatchReport) -> String {
        let css = if self.inline_css {
            self.default_css()
        } else {
            ""
        };

        let status_class = match report.status {
            ScanStatus::Completed if report.disguised().count() == 0 => "status-clean",
            ScanStatus::Completed => "status-disguised",
            ScanStatus::Cancelled => "status-cancelled",
            ScanStatus::Running => "status-unknown",
        };

        let summary_html = if report.is_empty() {
            "<p class=\"no-files\">No files were analyzed.</p>".to_string()
        } else {
            let mut html = String::from("<table class=\"results\">\n");
            html.push_str("<thead><tr><th>#</th><th>File</th><th>Declared</th><th>Detected</th><th>Status</th></tr></thead>\n");
            html.push_str("<tbody>\n");
            for (index, result) in report.results.iter().enumerate() {
                html.push_str(&format!(
                    "<tr class=\"{}\"><td>{}</td><td><a href=\"#file-{}\">{}</a></td><td>{}</td><td>{}</td><td>{}</td></tr>\n",
                    Self::row_class(result),
                    index + 1,
                    index + 1,
                    Self::escape_html(&result.file_name),
                    Self::escape_html(&Self::or_dash(&result.declared_extension)),
                    Self::escape_html(&result.detected_extension),
                    result.status,
                ));
            }
            html.push_str("</tbody>\n</table>");
            html
        };

        let details_html: String = report
            .results
            .iter()
            .enumerate()
            .map(|(index, result)| Self::detail_block(index + 1, result))
            .collect();

        let duration = report
            .duration_secs()
            .map(|secs| format!("{:.2}s", secs))
            .unwrap_or_else(|| "N/A".to_string());

        format!(
            r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Disguise Report - {report_id}</title>
    <style>{css}</style>
</head>
<body>
    <div class="container">
        <header>
            <h1>File Disguise Report</h1>
            <p class="subtitle">Declared extensions checked against content signatures</p>
        </header>

        <section class="summary">
            <h2>Scan Summary</h2>
            <div class="summary-grid">
                <div class="summary-card">
                    <span class="label">Report ID</span>
                    <span class="value">{report_id}</span>
                </div>
                <div class="summary-card {status_class}">
                    <span class="label">Status</span>
                    <span class="value">{status}</span>
                </div>
                <div class="summary-card">
                    <span class="label">Start Time</span>
                    <span class="value">{start_time}</span>
                </div>
                <div class="summary-card">
                    <span class="label">Duration</span>
                    <span class="value">{duration}</span>
                </div>
            </div>
        </section>

        <section class="statistics">
            <h2>Statistics</h2>
            <div class="stats-grid">
                <div class="stat-card">
                    <span class="stat-value">{processed} / {requested}</span>
                    <span class="stat-label">Files Processed</span>
                </div>
                <div class="stat-card">
                    <span class="stat-value">{normal}</span>
                    <span class="stat-label">Normal</span>
                </div>
                <div class="stat-card disguised">
                    <span class="stat-value">{disguised}</span>
                    <span class="stat-label">Disguised</span>
                </div>
                <div class="stat-card">
                    <span class="stat-value">{unverifiable}</span>
                    <span class="stat-label">Unverifiable</span>
                </div>
                <div class="stat-card failed">
                    <span class="stat-value">{failed}</span>
                    <span class="stat-label">Failed</span>
                </div>
                <div class="stat-card">
                    <span class="stat-value">{total_bytes}</span>
                    <span class="stat-label">Data Analyzed</span>
                </div>
            </div>
        </section>

        <section class="results">
            <h2>Results</h2>
            {summary_html}
        </section>

        <section class="details">
            <h2>Details</h2>
            {details_html}
        </section>

        <footer>
            <p>Generated by unmask v{version}</p>
            <p>Report generated at {generated_at}</p>
        </footer>
    </div>
</body>
</html>"#,
            report_id = report.report_id,
            css = css,
            status_class = status_class,
            status = report.status,
            start_time = report
                .started_at
                .with_timezone(&chrono::Local)
                .format("%Y-%m-%d %H:%M:%S"),
            duration = duration,
            processed = report.processed(),
            requested = report.requested,
            normal = report.count(DisguiseStatus::Normal),
            disguised = report.count(DisguiseStatus::Disguised),
            unverifiable = report.count(DisguiseStatus::Unverifiable),
            failed = report.failed(),
            total_bytes = format_bytes(report.total_bytes()),
            summary_html = summary_html,
            details_html = details_html,
            version = env!("CARGO_PKG_VERSION"),
            generated_at = chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
        )
    }

    fn detail_block(number: usize, result: &AnalysisResult) -> String {
        let failure = result
            .failure
            .as_deref()
            .map(|reason| {
                format!(
                    "<dt>Failure</dt><dd class=\"failure\">{}</dd>",
                    Self::escape_html(reason)
                )
            })
            .unwrap_or_default();

        format!(
            r#"<div class="detail {row_class}" id="file-{number}">
                <h3>{number}. {file_name} <span class="badge">{status}</span></h3>
                <dl>
                    <dt>Path</dt><dd><code>{path}</code></dd>
                    <dt>Size</dt><dd>{size}</dd>
                    <dt>MIME type</dt><dd>{mime}</dd>
                    <dt>MD5</dt><dd><code title="{md5}">{md5_prefix}</code></dd>
                    <dt>SHA-256</dt><dd><code title="{sha256}">{sha256_prefix}</code></dd>
                    <dt>Created</dt><dd>{created}</dd>
                    <dt>Modified</dt><dd>{modified}</dd>
                    {failure}
                </dl>
            </div>
"#,
            row_class = Self::row_class(result),
            number = number,
            file_name = Self::escape_html(&result.file_name),
            status = result.status,
            path = Self::escape_html(&result.path.display().to_string()),
            size = format_bytes(result.size_bytes),
            mime = Self::escape_html(&result.detected_mime),
            md5 = result.md5,
            md5_prefix = Self::or_dash(&result.md5_prefix),
            sha256 = result.sha256,
            sha256_prefix = Self::or_dash(&result.sha256_prefix),
            created = result.created_display(),
            modified = result.modified_display(),
            failure = failure,
        )
    }

    fn row_class(result: &AnalysisResult) -> &'static str {
        if result.is_degraded() {
            return "row-failed";
        }
        match result.status {
            DisguiseStatus::Normal => "row-normal",
            DisguiseStatus::Disguised => "row-disguised",
            DisguiseStatus::Unverifiable => "row-unverifiable",
        }
    }

    fn or_dash(value: &str) -> String {
        if value.is_empty() {
            "-".to_string()
        } else {
            value.to_string()
        }
    }

    /// Default CSS styles.
    fn default_css(&self) -> &'static str {
        r#"
        * {
            margin: 0;
            padding: 0;
            box-sizing: border-box;
        }
        body {
            font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, Ubuntu, sans-serif;
            background: #f4f6f8;
            color: #2d3748;
            line-height: 1.6;
        }
        .container {
            max-width: 1100px;
            margin: 0 auto;
            padding: 20px;
        }
        header {
            text-align: center;
            padding: 32px 0;
            background: linear-gradient(135deg, #2b6cb0 0%, #2c5282 100%);
            color: white;
            border-radius: 8px;
            margin-bottom: 24px;
        }
        header h1 { font-size: 2.2em; }
        .subtitle { opacity: 0.85; }
        section {
            background: white;
            border-radius: 8px;
            padding: 24px;
            margin-bottom: 20px;
            box-shadow: 0 1px 3px rgba(0,0,0,0.1);
        }
        h2 {
            color: #4a5568;
            margin-bottom: 16px;
            padding-bottom: 8px;
            border-bottom: 2px solid #e2e8f0;
        }
        .summary-grid, .stats-grid {
            display: grid;
            grid-template-columns: repeat(auto-fit, minmax(160px, 1fr));
            gap: 12px;
        }
        .summary-card, .stat-card {
            background: #f8f9fa;
            padding: 14px;
            border-radius: 6px;
            text-align: center;
        }
        .summary-card .label, .stat-label {
            display: block;
            color: #718096;
            font-size: 0.8em;
            text-transform: uppercase;
            letter-spacing: 0.5px;
        }
        .summary-card .value {
            display: block;
            font-weight: 600;
            word-break: break-all;
        }
        .stat-value {
            display: block;
            font-size: 1.8em;
            font-weight: 600;
        }
        .stat-card.disguised .stat-value { color: #c53030; }
        .stat-card.failed .stat-value { color: #c05621; }
        .status-clean { background: #c6f6d5; }
        .status-disguised { background: #fed7d7; }
        .status-cancelled { background: #feebc8; }
        .no-files {
            text-align: center;
            padding: 32px;
            color: #718096;
        }
        table.results {
            width: 100%;
            border-collapse: collapse;
        }
        table.results th, table.results td {
            padding: 10px 12px;
            text-align: left;
            border-bottom: 1px solid #e2e8f0;
        }
        table.results th { background: #f7fafc; }
        .row-disguised { background: #fed7d7; }
        .row-unverifiable { background: #fefcbf; }
        .row-failed { background: #feebc8; }
        .detail {
            border-left: 4px solid #cbd5e0;
            padding: 10px 16px;
            margin-bottom: 14px;
        }
        .detail.row-disguised { border-left-color: #c53030; }
        .detail.row-failed { border-left-color: #c05621; }
        .detail dl {
            display: grid;
            grid-template-columns: 120px 1fr;
            gap: 4px 12px;
        }
        .detail dt { color: #718096; }
        .badge {
            font-size: 0.7em;
            padding: 2px 8px;
            border-radius: 10px;
            background: #e2e8f0;
        }
        .failure { color: #c05621; }
        code {
            background: #edf2f7;
            padding: 2px 6px;
            border-radius: 3px;
            font-family: 'Monaco', 'Menlo', monospace;
            font-size: 0.9em;
            word-break: break-all;
        }
        footer {
            text-align: center;
            padding: 24px;
            color: #718096;
            font-size: 0.9em;
        }
        "#
    }

    /// Escape HTML special characters.
    pub fn escape_html(s: &str) -> String {
        s.replace('&', "&amp;")
            .replace('<', "&lt;")
            .replace('>', "&gt;")
            .replace('"', "&quot;")
            .replace('\'', "&#39;")
    }
}

impl Default for HtmlReporter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::Error;
    use std::path::Path;

    #[test]
    fn test_escape_html() {
        assert_eq!(HtmlReporter::escape_html("<script>"), "&lt;script&gt;");
        assert_eq!(HtmlReporter::escape_html("A & B"), "A &amp; B");
    }

    #[test]
    fn test_render_contains_rows_and_details() {
        let mut report = BatchReport::new(2);
        let mut disguised = AnalysisResult::degraded(Path::new("<evil>&.txt"), &Error::NoFilesFound);
        disguised.failure = None;
        disguised.status = DisguiseStatus::Disguised;
        disguised.detected_extension = "exe".to_string();
        report.results.push(disguised);
        report.results.push(AnalysisResult::degraded(
            Path::new("gone.pdf"),
            &Error::PathNotFound("gone.pdf".into()),
        ));
        report.complete();

        let html = HtmlReporter::new().render(&report);
        assert!(html.contains("&lt;evil&gt;&amp;.txt"));
        assert!(!html.contains("<evil>"));
        assert!(html.contains("row-disguised"));
        assert!(html.contains("id=\"file-2\""));
        assert!(html.contains("Path not found: gone.pdf"));
        assert!(html.contains("status-disguised"));
    }

    #[test]
    fn test_render_empty_report() {
        let mut report = BatchReport::new(0);
        report.cancel();
        let html = HtmlReporter::new().without_css().render(&report);
        assert!(html.contains("No files were analyzed."));
        assert!(html.contains("Cancelled"));
    }
}
