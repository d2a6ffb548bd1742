//! Required-field and conditional-null checks, plus the per-column null
//! profile used by reports.

use serde::{Deserialize, Serialize};

use super::finding::{ErrorKind, ValidationError};
use super::{collect_rows, Execution};
use crate::dataset::{Dataset, Row};
use crate::schema::{PresenceRequirement, SchemaRegistry};

/// Report missing required columns and null cells in required or
/// conditionally required columns.
///
/// Order: every `missing_column` finding first (declaration order), then the
/// cell findings by ascending row, then by column declaration order within a
/// row. Nothing stops the scan early.
pub fn check_required(dataset: &Dataset, schema: &SchemaRegistry) -> Vec<ValidationError> {
    run(dataset, schema, Execution::Sequential)
}

/// A column checked on every row, with its within-row ordering rank.
struct Check<'s> {
    rank: usize,
    column: &'s str,
    condition: Option<&'s PresenceRequirement>,
}

pub(crate) fn run(
    dataset: &Dataset,
    schema: &SchemaRegistry,
    execution: Execution,
) -> Vec<ValidationError> {
    let mut errors: Vec<ValidationError> = schema
        .required_columns()
        .into_iter()
        .filter(|column| !dataset.has_column(column))
        .map(|column| {
            ValidationError::dataset(
                column,
                ErrorKind::MissingColumn,
                format!("Required column '{column}' is missing"),
            )
        })
        .collect();

    let rank = |column: &str| schema.position(column).unwrap_or(usize::MAX);

    let mut checks: Vec<Check<'_>> = schema
        .required_columns()
        .into_iter()
        .filter(|column| dataset.has_column(column))
        .map(|column| Check {
            rank: rank(column),
            column,
            condition: None,
        })
        .collect();

    for requirement in schema.conditional_nulls() {
        if !dataset.has_column(&requirement.status_column) {
            continue;
        }
        checks.extend(
            requirement
                .columns
                .iter()
                .filter(|column| dataset.has_column(column))
                .map(|column| Check {
                    rank: rank(column),
                    column: column.as_str(),
                    condition: Some(requirement),
                }),
        );
    }
    // Stable: a required check stays ahead of a conditional one on the same column.
    checks.sort_by_key(|check| check.rank);

    errors.extend(collect_rows(dataset, execution, |row| check_row(&row, &checks)));
    errors
}

fn check_row(row: &Row<'_>, checks: &[Check<'_>]) -> Vec<ValidationError> {
    checks
        .iter()
        .filter(|check| row.is_null(check.column))
        .filter_map(|check| match check.condition {
            None => Some(ValidationError::cell(
                check.column,
                row.index(),
                ErrorKind::NullValue,
                format!("Null value in required column '{}'", check.column),
            )),
            Some(requirement) if requirement.applies_to(row) => {
                let status = row
                    .get(&requirement.status_column)
                    .map(|v| v.to_string())
                    .unwrap_or_default();
                Some(ValidationError::cell(
                    check.column,
                    row.index(),
                    ErrorKind::ConditionalNull,
                    format!(
                        "'{}' may not be null when '{}' is '{}'",
                        check.column, requirement.status_column, status
                    ),
                ))
            }
            Some(_) => None,
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Null profile
// ---------------------------------------------------------------------------

/// Null count and share for one dataset column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NullStat {
    pub column: String,
    pub null_count: usize,
    /// Percentage of rows, rounded to two decimals.
    pub null_percentage: f64,
}

/// Per-column null counts, most-null first (ties keep dataset column order).
pub fn null_summary(dataset: &Dataset) -> Vec<NullStat> {
    let mut counts = vec![0usize; dataset.columns().len()];
    for row in dataset.rows() {
        for (pos, column) in dataset.columns().iter().enumerate() {
            if row.is_null(column) {
                counts[pos] += 1;
            }
        }
    }

    let total = dataset.len();
    let mut stats: Vec<NullStat> = dataset
        .columns()
        .iter()
        .zip(counts)
        .map(|(column, null_count)| NullStat {
            column: column.clone(),
            null_count,
            null_percentage: if total == 0 {
                0.0
            } else {
                (null_count as f64 / total as f64 * 10_000.0).round() / 100.0
            },
        })
        .collect();
    stats.sort_by(|a, b| b.null_count.cmp(&a.null_count));
    stats
}
