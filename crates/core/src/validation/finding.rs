//! Finding types produced by the validators.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::types::RowIndex;

/// Closed set of finding categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    MissingColumn,
    NullValue,
    ConditionalNull,
    TypeMismatch,
    DuplicateRecord,
    InvalidEnumValue,
    StatusMismatch,
    MissingDuration,
}

impl ErrorKind {
    pub const ALL: [ErrorKind; 8] = [
        Self::MissingColumn,
        Self::NullValue,
        Self::ConditionalNull,
        Self::TypeMismatch,
        Self::DuplicateRecord,
        Self::InvalidEnumValue,
        Self::StatusMismatch,
        Self::MissingDuration,
    ];

    /// Stable string representation matching serde's `rename_all = "snake_case"`.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MissingColumn => "missing_column",
            Self::NullValue => "null_value",
            Self::ConditionalNull => "conditional_null",
            Self::TypeMismatch => "type_mismatch",
            Self::DuplicateRecord => "duplicate_record",
            Self::InvalidEnumValue => "invalid_enum_value",
            Self::StatusMismatch => "status_mismatch",
            Self::MissingDuration => "missing_duration",
        }
    }

    /// Structural findings mean the dataset cannot satisfy the schema at all;
    /// everything else is a cell-level finding.
    pub fn is_structural(&self) -> bool {
        matches!(self, Self::MissingColumn)
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One reported violation. Pure data: never thrown, never deduplicated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationError {
    pub column: String,
    /// `None` for dataset-level findings such as a missing column.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub row: Option<RowIndex>,
    pub kind: ErrorKind,
    pub message: String,
    /// Offending raw value rendered as text, when there is one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

impl ValidationError {
    /// A finding about the dataset as a whole.
    pub fn dataset(column: impl Into<String>, kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            row: None,
            kind,
            message: message.into(),
            value: None,
        }
    }

    /// A finding about one cell.
    pub fn cell(
        column: impl Into<String>,
        row: RowIndex,
        kind: ErrorKind,
        message: impl Into<String>,
    ) -> Self {
        Self {
            column: column.into(),
            row: Some(row),
            kind,
            message: message.into(),
            value: None,
        }
    }

    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.row {
            Some(row) => write!(f, "[{}] row {} '{}': {}", self.kind, row, self.column, self.message),
            None => write!(f, "[{}] '{}': {}", self.kind, self.column, self.message),
        }
    }
}
