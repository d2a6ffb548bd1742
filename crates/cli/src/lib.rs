//! `gridval` library crate.
//!
//! The collaborators around the validation core: configuration, dataset
//! loading, report writing, and the pipeline that ties them together. The
//! binary entrypoint lives in `main.rs`.

pub mod config;
pub mod loader;
pub mod pipeline;
pub mod report;

pub use config::{CliConfig, ConfigError};
pub use loader::{load_dataset, InputFormat, LoadError};
pub use pipeline::{execute, RunOutcome};
pub use report::{write_reports, ReportError, ReportPaths};
