use crate::types::RowIndex;

/// Precondition failures raised while constructing engine inputs.
///
/// Validation findings are never reported through this type; they are
/// returned as [`crate::validation::ValidationError`] values.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Row {row} has {found} values, expected {expected} (one per column)")]
    RowWidth {
        row: RowIndex,
        expected: usize,
        found: usize,
    },

    #[error("Row {row} does not share the dataset column set: {reason}")]
    InconsistentColumns { row: RowIndex, reason: String },

    #[error("Duplicate column '{0}' in dataset")]
    DuplicateDatasetColumn(String),

    #[error("Schema must declare at least one column")]
    EmptySchema,

    #[error("Column '{0}' is declared more than once in the schema")]
    DuplicateColumnDefinition(String),

    #[error("Rule references undeclared column '{0}'")]
    UnknownRuleColumn(String),

    #[error("Invalid rule: {0}")]
    InvalidRule(String),
}
