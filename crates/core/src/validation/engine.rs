//! Entry point that runs the three passes and aggregates them.

use super::aggregate::{Pass, ValidationReport};
use super::{evaluator, format, required, Execution};
use crate::dataset::Dataset;
use crate::schema::SchemaRegistry;

/// Runs every validation pass against a registry.
///
/// The passes are independent and may run concurrently; the report is
/// identical in both modes.
#[derive(Debug, Clone, Copy)]
pub struct Validator<'s> {
    schema: &'s SchemaRegistry,
    execution: Execution,
}

impl<'s> Validator<'s> {
    pub fn new(schema: &'s SchemaRegistry) -> Self {
        Self {
            schema,
            execution: Execution::default(),
        }
    }

    /// Toggle rayon-backed execution (on by default).
    pub fn parallel(mut self, enabled: bool) -> Self {
        self.execution = if enabled {
            Execution::Parallel
        } else {
            Execution::Sequential
        };
        self
    }

    pub fn is_parallel(&self) -> bool {
        self.execution == Execution::Parallel
    }

    pub fn validate(&self, dataset: &Dataset) -> ValidationReport {
        tracing::info!(
            rows = dataset.len(),
            columns = dataset.columns().len(),
            parallel = self.is_parallel(),
            "Starting validation",
        );

        let schema = self.schema;
        let execution = self.execution;
        let (null_errors, (type_errors, rule_errors)) = match execution {
            Execution::Sequential => (
                required::run(dataset, schema, execution),
                (
                    format::run(dataset, schema, execution),
                    evaluator::run(dataset, schema, execution),
                ),
            ),
            Execution::Parallel => rayon::join(
                || required::run(dataset, schema, execution),
                || {
                    rayon::join(
                        || format::run(dataset, schema, execution),
                        || evaluator::run(dataset, schema, execution),
                    )
                },
            ),
        };

        let report =
            ValidationReport::from_passes(dataset.len(), null_errors, type_errors, rule_errors);
        for pass in Pass::ALL {
            tracing::debug!(
                pass = pass.as_str(),
                count = report.pass(pass).len(),
                "Pass complete"
            );
        }
        tracing::info!(
            total_errors = report.total_errors(),
            status = report.status().as_str(),
            "Validation complete",
        );
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{ColumnDefinition, FormatKind};
    use crate::validation::ErrorKind;
    use crate::value::CellValue;

    fn schema() -> SchemaRegistry {
        SchemaRegistry::builder()
            .column(ColumnDefinition::required("id", FormatKind::String))
            .column(ColumnDefinition::optional("n", FormatKind::Int))
            .build()
            .unwrap()
    }

    #[test]
    fn defaults_to_parallel() {
        let schema = schema();
        assert!(Validator::new(&schema).is_parallel());
        assert!(!Validator::new(&schema).parallel(false).is_parallel());
    }

    #[test]
    fn passes_are_concatenated_in_order() {
        let schema = schema();
        let ds = Dataset::from_records(vec![
            vec![("n", Some(CellValue::text("x"))), ("id", None)],
            vec![("n", Some(CellValue::Integer(1))), ("id", None)],
        ])
        .unwrap();

        let report = Validator::new(&schema).validate(&ds);
        let got: Vec<_> = report.errors().iter().map(|e| (e.kind, e.row)).collect();
        assert_eq!(
            got,
            vec![
                (ErrorKind::NullValue, Some(0)),
                (ErrorKind::NullValue, Some(1)),
                (ErrorKind::TypeMismatch, Some(0)),
            ]
        );
        assert_eq!(report.total_rows(), 2);
        assert_eq!(report.pass(Pass::Format).len(), 1);
        assert_eq!(report, Validator::new(&schema).parallel(false).validate(&ds));
    }

    #[test]
    fn empty_dataset_is_clean() {
        let schema = schema();
        let ds = Dataset::new(vec!["id".into(), "n".into()], vec![]).unwrap();
        assert!(Validator::new(&schema).validate(&ds).is_clean());
    }
}
