//! `gridval` -- validate a grid-operations limitation export.
//!
//! Loads the dataset, runs every validation pass against the built-in
//! limitation schema, and writes `validation_results.json`, `summary.md`
//! and `summary.html` to the report directory.
//!
//! Usage: `gridval [INPUT]` (the argument overrides `GRIDVAL_INPUT`).
//!
//! # Environment variables
//!
//! | Variable             | Required | Default           | Description                               |
//! |----------------------|----------|-------------------|-------------------------------------------|
//! | `GRIDVAL_INPUT`      | no       | `data/export.csv` | Dataset to validate (.csv / .json / .xlsx) |
//! | `GRIDVAL_REPORT_DIR` | no       | `rapports`        | Output directory for reports              |
//! | `GRIDVAL_PARALLEL`   | no       | `true`            | Run validators on the rayon pool          |
//! | `RUST_LOG`           | no       | `gridval=info,..` | Tracing filter                            |

use std::process::ExitCode;

use anyhow::Context;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use gridval_cli::{execute, CliConfig, RunOutcome};

fn main() -> ExitCode {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "gridval=info,gridval_core=info,gridval_cli=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    match run() {
        Ok(outcome) => {
            println!("Status: {}", outcome.summary.status.as_str());
            println!("Total errors: {}", outcome.summary.total_errors);
            println!("Quality score: {:.2}%", outcome.quality_score);
            println!("Reports:");
            println!("- {}", outcome.reports.json.display());
            println!("- {}", outcome.reports.markdown.display());
            println!("- {}", outcome.reports.html.display());
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!(error = %e, "Fatal error");
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> anyhow::Result<RunOutcome> {
    let mut config = CliConfig::from_env().context("Invalid configuration")?;
    if let Some(input) = std::env::args_os().nth(1) {
        config = config.with_input(input);
    }

    tracing::info!(
        input = %config.input.display(),
        report_dir = %config.report_dir.display(),
        parallel = config.parallel,
        "Starting gridval",
    );
    execute(&config)
}
