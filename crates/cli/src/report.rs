//! JSON, markdown and HTML renderings of a validation report.

use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::{DateTime, Utc};
use pulldown_cmark::{html, Options, Parser};
use serde::Serialize;

use gridval_core::validation::{GroupCount, NullStat, Pass, ValidationSummary};
use gridval_core::{ValidationError, ValidationReport};

pub const JSON_REPORT_FILE: &str = "validation_results.json";
pub const MARKDOWN_REPORT_FILE: &str = "summary.md";
pub const HTML_REPORT_FILE: &str = "summary.html";

/// Findings listed per pass in the markdown summary.
pub const MARKDOWN_SAMPLE_SIZE: usize = 10;

#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    #[error("Failed to create report directory {}: {source}", .path.display())]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to serialize JSON report: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Where the reports of one run were written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportPaths {
    pub json: PathBuf,
    pub markdown: PathBuf,
    pub html: PathBuf,
}

#[derive(Debug, Serialize)]
struct Metadata<'a> {
    generated_at: DateTime<Utc>,
    validator_version: &'static str,
    input: &'a str,
    /// Load plus validation wall time.
    duration_seconds: f64,
    quality_score: f64,
}

/// Shape of `validation_results.json`.
#[derive(Debug, Serialize)]
struct JsonReport<'a> {
    metadata: Metadata<'a>,
    summary: ValidationSummary,
    by_column_and_kind: Vec<GroupCount>,
    errors: &'a [ValidationError],
    null_summary: &'a [NullStat],
}

/// Write the JSON, markdown and HTML reports into `dir`, creating it if needed.
///
/// `elapsed` is the time spent before reporting, recorded in the JSON metadata.
pub fn write_reports(
    dir: &Path,
    input: &Path,
    report: &ValidationReport,
    nulls: &[NullStat],
    elapsed: Duration,
) -> Result<ReportPaths, ReportError> {
    std::fs::create_dir_all(dir).map_err(|source| ReportError::CreateDir {
        path: dir.to_path_buf(),
        source,
    })?;

    let generated_at = Utc::now();
    let input = input.display().to_string();

    let json = serde_json::to_string_pretty(&JsonReport {
        metadata: Metadata {
            generated_at,
            validator_version: env!("CARGO_PKG_VERSION"),
            input: &input,
            duration_seconds: (elapsed.as_secs_f64() * 1000.0).round() / 1000.0,
            quality_score: report.quality_score(),
        },
        summary: report.summary(),
        by_column_and_kind: report.count_by_column_and_kind(),
        errors: report.errors(),
        null_summary: nulls,
    })?;
    let paths = ReportPaths {
        json: dir.join(JSON_REPORT_FILE),
        markdown: dir.join(MARKDOWN_REPORT_FILE),
        html: dir.join(HTML_REPORT_FILE),
    };
    write_file(&paths.json, &json)?;
    let markdown = render_markdown(report, nulls, &input, generated_at);
    write_file(&paths.markdown, &markdown)?;
    write_file(&paths.html, &render_html(&markdown))?;

    tracing::info!(
        json = %paths.json.display(),
        markdown = %paths.markdown.display(),
        html = %paths.html.display(),
        "Reports written",
    );
    Ok(paths)
}

fn write_file(path: &Path, contents: &str) -> Result<(), ReportError> {
    std::fs::write(path, contents).map_err(|source| ReportError::Write {
        path: path.to_path_buf(),
        source,
    })
}

fn pass_title(pass: Pass) -> &'static str {
    match pass {
        Pass::Required => "Required fields",
        Pass::Format => "Formats",
        Pass::Rules => "Business rules",
    }
}

/// Render the human-readable summary.
pub fn render_markdown(
    report: &ValidationReport,
    nulls: &[NullStat],
    input: &str,
    generated_at: DateTime<Utc>,
) -> String {
    let summary = report.summary();
    let mut lines = Vec::new();

    lines.push("# Validation Report".to_string());
    lines.push(String::new());
    lines.push(format!(
        "Generated: {}",
        generated_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    lines.push(format!("Input: `{input}`"));
    lines.push(String::new());

    lines.push("## Summary".to_string());
    lines.push(String::new());
    lines.push(format!("- Rows analysed: {}", summary.total_rows));
    lines.push(format!("- Findings: {}", summary.total_errors));
    lines.push(format!("- Status: {}", summary.status.as_str()));
    lines.push(format!("- Quality score: {:.2}%", report.quality_score()));
    let structural = report.structural_count();
    if structural > 0 {
        lines.push(format!("- Missing required columns: {structural}"));
    }
    lines.push(String::new());

    if !summary.by_kind.is_empty() {
        lines.push("## Findings by kind".to_string());
        lines.push(String::new());
        lines.push("| Kind | Count |".to_string());
        lines.push("|------|-------|".to_string());
        for (kind, count) in &summary.by_kind {
            lines.push(format!("| {kind} | {count} |"));
        }
        lines.push(String::new());

        lines.push("## Findings by column".to_string());
        lines.push(String::new());
        lines.push("| Column | Kind | Count |".to_string());
        lines.push("|--------|------|-------|".to_string());
        for group in report.count_by_column_and_kind() {
            lines.push(format!("| {} | {} | {} |", group.column, group.kind, group.count));
        }
        lines.push(String::new());
    }

    for pass in Pass::ALL {
        let findings = report.pass(pass);
        lines.push(format!("## {} ({})", pass_title(pass), findings.len()));
        lines.push(String::new());
        if findings.is_empty() {
            lines.push("No findings.".to_string());
        } else {
            lines.extend(
                findings
                    .iter()
                    .take(MARKDOWN_SAMPLE_SIZE)
                    .map(|err| format!("- {err}")),
            );
            if findings.len() > MARKDOWN_SAMPLE_SIZE {
                lines.push(format!(
                    "- ... and {} more",
                    findings.len() - MARKDOWN_SAMPLE_SIZE
                ));
            }
        }
        lines.push(String::new());
    }

    lines.push("## Null profile".to_string());
    lines.push(String::new());
    lines.push("| Column | Nulls | % |".to_string());
    lines.push("|--------|-------|---|".to_string());
    for stat in nulls {
        lines.push(format!(
            "| {} | {} | {:.2} |",
            stat.column, stat.null_count, stat.null_percentage
        ));
    }
    lines.push(String::new());

    lines.join("\n")
}

/// Wrap the markdown summary in a standalone HTML page.
pub fn render_html(markdown: &str) -> String {
    let mut body = String::new();
    html::push_html(&mut body, Parser::new_ext(markdown, Options::ENABLE_TABLES));

    let lines = [
        "<!DOCTYPE html>",
        "<html>",
        "<head>",
        "<meta charset=\"utf-8\">",
        "<title>Validation Report</title>",
        "<style>",
        "body { font-family: sans-serif; max-width: 1200px; margin: 0 auto; padding: 20px; }",
        "table { border-collapse: collapse; margin: 15px 0; }",
        "th, td { padding: 6px 12px; border: 1px solid #ddd; text-align: left; }",
        "</style>",
        "</head>",
        "<body>",
        body.as_str(),
        "</body>",
        "</html>",
        "",
    ];
    lines.join("\n")
}
