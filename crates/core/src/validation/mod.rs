//! Data validation engine.
//!
//! Three independent passes (required fields, formats, business rules) read
//! the same immutable dataset and registry; the aggregator concatenates their
//! findings in that order. All of it is pure logic with no I/O.

pub mod aggregate;
pub mod engine;
pub mod evaluator;
pub mod finding;
pub mod format;
pub mod required;

pub use aggregate::{
    aggregate, GroupCount, Pass, ValidationReport, ValidationStatus, ValidationSummary,
};
pub use engine::Validator;
pub use evaluator::{check_rules, find_duplicates};
pub use finding::{ErrorKind, ValidationError};
pub use format::{check_types, conforms};
pub use required::{check_required, null_summary, NullStat};

use rayon::prelude::*;

use crate::dataset::{Dataset, Row};

/// How a pass walks the dataset rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Execution {
    Sequential,
    #[default]
    Parallel,
}

/// Run `check` on every row and concatenate the per-row buffers in row order.
///
/// Both modes produce the same sequence; the parallel one partitions rows
/// across the rayon pool and relies on the order-preserving `collect`.
pub(crate) fn collect_rows<F>(
    dataset: &Dataset,
    execution: Execution,
    check: F,
) -> Vec<finding::ValidationError>
where
    F: Fn(Row<'_>) -> Vec<finding::ValidationError> + Sync + Send,
{
    match execution {
        Execution::Sequential => dataset.rows().flat_map(check).collect(),
        Execution::Parallel => dataset
            .par_rows()
            .map(check)
            .collect::<Vec<_>>()
            .into_iter()
            .flatten()
            .collect(),
    }
}
