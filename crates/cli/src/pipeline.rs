use std::time::Instant;

use anyhow::Context;

use gridval_core::schema::limitation;
use gridval_core::validation::{null_summary, ValidationSummary};
use gridval_core::Validator;

use crate::config::CliConfig;
use crate::loader::load_dataset;
use crate::report::{write_reports, ReportPaths};

/// Result of one end-to-end run.
#[derive(Debug, Clone)]
pub struct RunOutcome {
    pub summary: ValidationSummary,
    pub quality_score: f64,
    pub reports: ReportPaths,
}

/// Load, validate against the limitation registry, and write reports.
///
/// Findings never make this fail; only unreadable input, an invalid
/// registry, or an unwritable report directory do.
pub fn execute(config: &CliConfig) -> anyhow::Result<RunOutcome> {
    let started = Instant::now();
    let schema = limitation::registry().context("Default schema registry is invalid")?;
    let dataset = load_dataset(&config.input)
        .with_context(|| format!("Failed to load {}", config.input.display()))?;

    let report = Validator::new(&schema)
        .parallel(config.parallel)
        .validate(&dataset);
    let nulls = null_summary(&dataset);

    let reports = write_reports(
        &config.report_dir,
        &config.input,
        &report,
        &nulls,
        started.elapsed(),
    )
    .context("Failed to write reports")?;

    let summary = report.summary();
    if summary.total_errors > 0 {
        tracing::warn!(
            total_errors = summary.total_errors,
            "Validation finished with findings",
        );
    }
    Ok(RunOutcome {
        summary,
        quality_score: report.quality_score(),
        reports,
    })
}
