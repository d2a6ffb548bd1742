//! Rule shapes stored as data in the registry.
//!
//! New rule instances are added by constructing values of these types, not by
//! adding code branches to the validators.

use serde::{Deserialize, Serialize};

use crate::dataset::Row;

// ---------------------------------------------------------------------------
// Predicates
// ---------------------------------------------------------------------------

/// A condition over one record. A null cell never satisfies a predicate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Predicate {
    StartsWith { column: String, prefix: String },
    Equals { column: String, value: String },
    OneOf { column: String, values: Vec<String> },
}

impl Predicate {
    pub fn column(&self) -> &str {
        match self {
            Self::StartsWith { column, .. }
            | Self::Equals { column, .. }
            | Self::OneOf { column, .. } => column,
        }
    }

    pub fn evaluate(&self, row: &Row<'_>) -> bool {
        let Some(value) = row.get(self.column()) else {
            return false;
        };
        match self {
            Self::StartsWith { prefix, .. } => value.as_text().starts_with(prefix.as_str()),
            Self::Equals { value: expected, .. } => value.matches_literal(expected),
            Self::OneOf { values, .. } => values.iter().any(|v| value.matches_literal(v)),
        }
    }
}

// ---------------------------------------------------------------------------
// Column-specific rules
// ---------------------------------------------------------------------------

/// A rule attached to one target column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SpecificRule {
    /// The non-null value must be one of `values`.
    Enumeration { column: String, values: Vec<String> },
    /// When `when` holds, the non-null target must equal `expected`;
    /// otherwise it must equal `otherwise` (if given).
    ConditionalExpected {
        target: String,
        when: Predicate,
        expected: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        otherwise: Option<String>,
    },
}

impl SpecificRule {
    /// The column a violation of this rule is reported on.
    pub fn target(&self) -> &str {
        match self {
            Self::Enumeration { column, .. } => column,
            Self::ConditionalExpected { target, .. } => target,
        }
    }

    /// Every column this rule reads.
    pub fn columns(&self) -> Vec<&str> {
        match self {
            Self::Enumeration { column, .. } => vec![column.as_str()],
            Self::ConditionalExpected { target, when, .. } => vec![target.as_str(), when.column()],
        }
    }

    /// The literal the target must hold for this row, if the rule sets one.
    pub fn expected_for(&self, row: &Row<'_>) -> Option<&str> {
        match self {
            Self::Enumeration { .. } => None,
            Self::ConditionalExpected {
                when,
                expected,
                otherwise,
                ..
            } => {
                if when.evaluate(row) {
                    Some(expected.as_str())
                } else {
                    otherwise.as_deref()
                }
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Cross-column rules
// ---------------------------------------------------------------------------

/// Columns that must be non-null while a status column holds one of
/// `statuses`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PresenceRequirement {
    pub status_column: String,
    pub statuses: Vec<String>,
    pub columns: Vec<String>,
}

impl PresenceRequirement {
    pub fn applies_to(&self, row: &Row<'_>) -> bool {
        row.get(&self.status_column)
            .is_some_and(|status| self.statuses.iter().any(|s| status.matches_literal(s)))
    }
}

/// Expected status computed from the presence of two date columns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusDerivation {
    pub status_column: String,
    pub first_date: String,
    pub second_date: String,
    /// Expected when both dates are present.
    pub both: String,
    /// Expected when only `first_date` is present.
    pub first_only: String,
    /// Expected when only `second_date` is present.
    pub second_only: String,
}

impl StatusDerivation {
    /// `None` when neither date is present: no expectation exists.
    pub fn expected_for(&self, row: &Row<'_>) -> Option<&str> {
        let first = !row.is_null(&self.first_date);
        let second = !row.is_null(&self.second_date);
        match (first, second) {
            (true, true) => Some(self.both.as_str()),
            (true, false) => Some(self.first_only.as_str()),
            (false, true) => Some(self.second_only.as_str()),
            (false, false) => None,
        }
    }

    pub fn columns(&self) -> [&str; 3] {
        [&self.status_column, &self.first_date, &self.second_date]
    }
}

/// Composite key used for cross-row duplicate detection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DuplicateKey {
    pub columns: Vec<String>,
    /// Column duplicate findings are tagged on.
    pub report_column: String,
}
