//! Merging of the three passes and the summaries handed to reporting.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::finding::{ErrorKind, ValidationError};

/// Concatenate findings in the fixed order required → format → rules.
///
/// No re-sorting happens: each pass keeps its own internal order.
pub fn aggregate(
    null_errors: Vec<ValidationError>,
    type_errors: Vec<ValidationError>,
    rule_errors: Vec<ValidationError>,
) -> Vec<ValidationError> {
    let mut all = null_errors;
    all.reserve(type_errors.len() + rule_errors.len());
    all.extend(type_errors);
    all.extend(rule_errors);
    all
}

/// The pass a finding came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Pass {
    Required,
    Format,
    Rules,
}

impl Pass {
    pub const ALL: [Pass; 3] = [Self::Required, Self::Format, Self::Rules];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Required => "required",
            Self::Format => "format",
            Self::Rules => "rules",
        }
    }
}

/// Zero findings is success; anything else is a warning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValidationStatus {
    Success,
    Warnings,
}

impl ValidationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Warnings => "warnings",
        }
    }
}

/// Totals for reporting collaborators.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationSummary {
    pub total_rows: usize,
    pub total_errors: usize,
    pub status: ValidationStatus,
    pub by_kind: BTreeMap<ErrorKind, usize>,
    pub by_column: BTreeMap<String, usize>,
}

/// Count of findings for one `(column, kind)` pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupCount {
    pub column: String,
    pub kind: ErrorKind,
    pub count: usize,
}

/// Ordered findings of one validation run.
///
/// Findings are read-only once built, so the per-pass split always matches
/// the concatenated sequence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    total_rows: usize,
    errors: Vec<ValidationError>,
    /// Number of findings contributed by each pass, in [`Pass::ALL`] order.
    #[serde(skip)]
    pass_counts: [usize; 3],
}

impl ValidationReport {
    pub fn from_passes(
        total_rows: usize,
        null_errors: Vec<ValidationError>,
        type_errors: Vec<ValidationError>,
        rule_errors: Vec<ValidationError>,
    ) -> Self {
        let pass_counts = [null_errors.len(), type_errors.len(), rule_errors.len()];
        Self {
            total_rows,
            errors: aggregate(null_errors, type_errors, rule_errors),
            pass_counts,
        }
    }

    pub fn total_rows(&self) -> usize {
        self.total_rows
    }

    /// Every finding in aggregate order.
    pub fn errors(&self) -> &[ValidationError] {
        &self.errors
    }

    pub fn into_errors(self) -> Vec<ValidationError> {
        self.errors
    }

    /// Dataset-level findings (a required column absent altogether).
    pub fn structural_count(&self) -> usize {
        self.errors.iter().filter(|e| e.kind.is_structural()).count()
    }

    /// `(1 - findings / (rows * 3)) * 100`, rounded to two decimals.
    ///
    /// One row-check per pass. Zero for an empty dataset, and negative once
    /// findings outnumber row-checks.
    pub fn quality_score(&self) -> f64 {
        let checks = self.total_rows * Pass::ALL.len();
        if checks == 0 {
            return 0.0;
        }
        let score = (1.0 - self.errors.len() as f64 / checks as f64) * 100.0;
        (score * 100.0).round() / 100.0
    }

    pub fn total_errors(&self) -> usize {
        self.errors.len()
    }

    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn status(&self) -> ValidationStatus {
        if self.is_clean() {
            ValidationStatus::Success
        } else {
            ValidationStatus::Warnings
        }
    }

    /// Findings produced by one pass, in emission order.
    pub fn pass(&self, pass: Pass) -> &[ValidationError] {
        let [required, format, _] = self.pass_counts;
        match pass {
            Pass::Required => &self.errors[..required],
            Pass::Format => &self.errors[required..required + format],
            Pass::Rules => &self.errors[required + format..],
        }
    }

    pub fn count_by_kind(&self) -> BTreeMap<ErrorKind, usize> {
        let mut counts = BTreeMap::new();
        for err in &self.errors {
            *counts.entry(err.kind).or_insert(0) += 1;
        }
        counts
    }

    pub fn count_by_column(&self) -> BTreeMap<String, usize> {
        let mut counts = BTreeMap::new();
        for err in &self.errors {
            *counts.entry(err.column.clone()).or_insert(0) += 1;
        }
        counts
    }

    /// Counts per `(column, kind)`, largest first; ties by column then kind.
    pub fn count_by_column_and_kind(&self) -> Vec<GroupCount> {
        let mut counts: BTreeMap<(&str, ErrorKind), usize> = BTreeMap::new();
        for err in &self.errors {
            *counts.entry((err.column.as_str(), err.kind)).or_insert(0) += 1;
        }
        let mut groups: Vec<GroupCount> = counts
            .into_iter()
            .map(|((column, kind), count)| GroupCount {
                column: column.to_string(),
                kind,
                count,
            })
            .collect();
        // BTreeMap order already breaks ties; the sort is stable.
        groups.sort_by(|a, b| b.count.cmp(&a.count));
        groups
    }

    pub fn summary(&self) -> ValidationSummary {
        ValidationSummary {
            total_rows: self.total_rows,
            total_errors: self.total_errors(),
            status: self.status(),
            by_kind: self.count_by_kind(),
            by_column: self.count_by_column(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn err(column: &str, row: usize, kind: ErrorKind) -> ValidationError {
        ValidationError::cell(column, row, kind, "m")
    }

    fn report() -> ValidationReport {
        ValidationReport::from_passes(
            10,
            vec![err("a", 3, ErrorKind::NullValue), err("a", 5, ErrorKind::NullValue)],
            vec![err("b", 0, ErrorKind::TypeMismatch)],
            vec![
                err("c", 1, ErrorKind::DuplicateRecord),
                err("b", 2, ErrorKind::InvalidEnumValue),
            ],
        )
    }

    #[test]
    fn aggregate_keeps_pass_order_without_sorting() {
        let r = report();
        let rows: Vec<_> = r.errors().iter().map(|e| e.row.unwrap()).collect();
        assert_eq!(rows, vec![3, 5, 0, 1, 2]);
    }

    #[test]
    fn pass_slices() {
        let r = report();
        assert_eq!(r.pass(Pass::Required).len(), 2);
        assert_eq!(r.pass(Pass::Format).len(), 1);
        assert_eq!(r.pass(Pass::Rules).len(), 2);
        assert_eq!(r.pass(Pass::Format)[0].column, "b");
    }

    #[test]
    fn counts() {
        let r = report();
        assert_eq!(r.count_by_kind()[&ErrorKind::NullValue], 2);
        assert_eq!(r.count_by_column()["b"], 2);

        let groups = r.count_by_column_and_kind();
        assert_eq!(groups[0].column, "a");
        assert_eq!(groups[0].count, 2);
        let rest: Vec<_> = groups[1..].iter().map(|g| (g.column.as_str(), g.kind)).collect();
        assert_eq!(
            rest,
            vec![
                ("b", ErrorKind::TypeMismatch),
                ("b", ErrorKind::InvalidEnumValue),
                ("c", ErrorKind::DuplicateRecord),
            ]
        );
    }

    #[test]
    fn summary_status() {
        let clean = ValidationReport::from_passes(4, vec![], vec![], vec![]);
        assert_eq!(clean.summary().status, ValidationStatus::Success);
        assert!(clean.pass(Pass::Rules).is_empty());

        let summary = report().summary();
        assert_eq!(summary.status, ValidationStatus::Warnings);
        assert_eq!(summary.total_errors, 5);
        assert_eq!(summary.total_rows, 10);
    }

    #[test]
    fn pass_split_survives_taking_the_findings() {
        let r = ValidationReport::from_passes(
            3,
            vec![err("a", 0, ErrorKind::NullValue)],
            vec![err("b", 1, ErrorKind::TypeMismatch)],
            vec![err("c", 2, ErrorKind::StatusMismatch)],
        );
        let mut owned = r.clone().into_errors();
        owned.retain(|e| e.kind != ErrorKind::NullValue);
        assert_eq!(owned.len(), 2);

        assert_eq!(r.pass(Pass::Format)[0].kind, ErrorKind::TypeMismatch);
        assert_eq!(r.pass(Pass::Rules)[0].kind, ErrorKind::StatusMismatch);
        assert_eq!(r.errors().len(), 3);
    }

    #[test]
    fn serialized_report_has_no_pass_counts() {
        let json = serde_json::to_value(report()).unwrap();
        assert_eq!(json["total_rows"], 10);
        assert_eq!(json["errors"].as_array().unwrap().len(), 5);
        assert!(json.get("pass_counts").is_none());
    }

    #[test]
    fn quality_score() {
        assert_eq!(report().quality_score(), 83.33);
        assert_eq!(report().structural_count(), 0);
        let clean = ValidationReport::from_passes(4, vec![], vec![], vec![]);
        assert_eq!(clean.quality_score(), 100.0);
        let empty = ValidationReport::from_passes(0, vec![], vec![], vec![]);
        assert_eq!(empty.quality_score(), 0.0);

        let swamped = ValidationReport::from_passes(
            1,
            vec![ValidationError::dataset("x", ErrorKind::MissingColumn, "m")],
            vec![err("a", 0, ErrorKind::TypeMismatch); 5],
            vec![],
        );
        assert_eq!(swamped.quality_score(), -100.0);
        assert_eq!(swamped.structural_count(), 1);
    }

    #[test]
    fn summary_serializes_kind_keys_as_strings() {
        let json = serde_json::to_value(report().summary()).unwrap();
        assert_eq!(json["by_kind"]["null_value"], 2);
        assert_eq!(json["status"], "warnings");
    }
}
