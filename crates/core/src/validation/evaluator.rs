//! Business rule evaluator: pure logic over the whole dataset.
//!
//! Rule classes, in the order they report within a row:
//!
//! 1. duplicate records (cross-row, composite key)
//! 2. column-specific rules (enumerations and conditional expected values,
//!    in registration order; the compensation flag rule is one of these)
//! 3. derived-status consistency
//! 4. status-dependent required durations
//!
//! A value outside its column's enumeration is reported once: conditional
//! expectations on that same cell are not evaluated.
//!
//! Every class runs over every record. A rule whose columns are not all in
//! the dataset is skipped; the missing column is reported by the
//! required-field pass when it matters.

use std::collections::hash_map::Entry;
use std::collections::{BTreeMap, HashMap};

use super::finding::{ErrorKind, ValidationError};
use super::{collect_rows, Execution};
use crate::dataset::{Dataset, Row};
use crate::schema::{
    DuplicateKey, Predicate, PresenceRequirement, SchemaRegistry, SpecificRule, StatusDerivation,
};
use crate::types::RowIndex;
use crate::value::CellValue;

/// Apply every business rule in the registry to the dataset.
///
/// Findings are ordered by row, then by rule class.
pub fn check_rules(dataset: &Dataset, schema: &SchemaRegistry) -> Vec<ValidationError> {
    run(dataset, schema, Execution::Sequential)
}

pub(crate) fn run(
    dataset: &Dataset,
    schema: &SchemaRegistry,
    execution: Execution,
) -> Vec<ValidationError> {
    let plan = RulePlan::new(dataset, schema);
    collect_rows(dataset, execution, |row| plan.check_row(&row))
}

// ---------------------------------------------------------------------------
// Duplicate detection
// ---------------------------------------------------------------------------

/// Map each redundant row to the first row sharing its key.
///
/// Rows with a null key field never join a group. The first member of a
/// group (lowest row index) is kept; the other `k - 1` members are returned.
/// An empty map is returned if any key column is absent from the dataset.
pub fn find_duplicates(dataset: &Dataset, key: &DuplicateKey) -> BTreeMap<RowIndex, RowIndex> {
    let mut duplicates = BTreeMap::new();
    if !key.columns.iter().all(|c| dataset.has_column(c)) {
        return duplicates;
    }

    let mut first_seen: HashMap<Vec<String>, RowIndex> = HashMap::new();
    for row in dataset.rows() {
        let group: Option<Vec<String>> = key
            .columns
            .iter()
            .map(|column| row.get(column).and_then(CellValue::grouping_key))
            .collect();
        let Some(group) = group else {
            continue;
        };

        match first_seen.entry(group) {
            Entry::Occupied(first) => {
                duplicates.insert(row.index(), *first.get());
            }
            Entry::Vacant(slot) => {
                slot.insert(row.index());
            }
        }
    }
    duplicates
}

// ---------------------------------------------------------------------------
// Rule plan
// ---------------------------------------------------------------------------

/// The rules that apply to this dataset, resolved once before the row scan.
struct RulePlan<'s> {
    duplicates: BTreeMap<RowIndex, RowIndex>,
    duplicate_column: Option<&'s str>,
    specific: Vec<&'s SpecificRule>,
    derivation: Option<&'s StatusDerivation>,
    durations: Vec<(&'s PresenceRequirement, Vec<&'s str>)>,
}

impl<'s> RulePlan<'s> {
    fn new(dataset: &Dataset, schema: &'s SchemaRegistry) -> Self {
        let (duplicates, duplicate_column) = match schema.duplicate_key() {
            Some(key) => (find_duplicates(dataset, key), Some(key.report_column.as_str())),
            None => (BTreeMap::new(), None),
        };
        tracing::debug!(count = duplicates.len(), "Duplicate grouping done");

        let specific = schema
            .specific_rules()
            .iter()
            .filter(|rule| rule.columns().iter().all(|c| dataset.has_column(c)))
            .collect();

        let derivation = schema
            .status_derivation()
            .filter(|d| d.columns().iter().all(|c| dataset.has_column(c)));

        let durations = schema
            .duration_requirements()
            .iter()
            .filter(|req| dataset.has_column(&req.status_column))
            .map(|req| {
                let present = req
                    .columns
                    .iter()
                    .map(String::as_str)
                    .filter(|c| dataset.has_column(c))
                    .collect();
                (req, present)
            })
            .collect();

        Self {
            duplicates,
            duplicate_column,
            specific,
            derivation,
            durations,
        }
    }

    fn check_row(&self, row: &Row<'_>) -> Vec<ValidationError> {
        let mut errors = Vec::new();

        if let (Some(column), Some(first)) =
            (self.duplicate_column, self.duplicates.get(&row.index()))
        {
            let mut err = ValidationError::cell(
                column,
                row.index(),
                ErrorKind::DuplicateRecord,
                format!("Duplicate of row {first} on the limitation key"),
            );
            if let Some(number) = row.get(column) {
                err = err.with_value(number.to_string());
            }
            errors.push(err);
        }

        let specific: Vec<(&SpecificRule, ValidationError)> = self
            .specific
            .iter()
            .filter_map(|rule| check_specific(rule, row).map(|err| (*rule, err)))
            .collect();
        let out_of_domain: Vec<&str> = specific
            .iter()
            .filter(|(rule, _)| is_enumeration(rule))
            .map(|&(rule, _)| rule.target())
            .collect();
        errors.extend(
            specific
                .into_iter()
                .filter(|(rule, _)| {
                    is_enumeration(rule) || !out_of_domain.contains(&rule.target())
                })
                .map(|(_, err)| err),
        );

        if let Some(err) = self.derivation.and_then(|d| check_status(d, row)) {
            errors.push(err);
        }

        for (requirement, columns) in &self.durations {
            if !requirement.applies_to(row) {
                continue;
            }
            let status = row
                .get(&requirement.status_column)
                .map(|v| v.to_string())
                .unwrap_or_default();
            errors.extend(columns.iter().filter(|c| row.is_null(c)).map(|column| {
                ValidationError::cell(
                    *column,
                    row.index(),
                    ErrorKind::MissingDuration,
                    format!("'{column}' is required when status is '{status}'"),
                )
            }));
        }

        errors
    }
}

// ---------------------------------------------------------------------------
// Row-level rules
// ---------------------------------------------------------------------------

fn is_enumeration(rule: &SpecificRule) -> bool {
    matches!(rule, SpecificRule::Enumeration { .. })
}

fn check_specific(rule: &SpecificRule, row: &Row<'_>) -> Option<ValidationError> {
    let value = row.get(rule.target())?;
    let message = match rule {
        SpecificRule::Enumeration { column, values } => {
            if values.iter().any(|v| value.matches_literal(v)) {
                return None;
            }
            format!("'{column}' must be one of: {}", values.join(", "))
        }
        SpecificRule::ConditionalExpected { target, when, .. } => {
            let expected = rule.expected_for(row)?;
            if value.matches_literal(expected) {
                return None;
            }
            format!(
                "'{target}' must be '{expected}' when {}",
                describe(when, when.evaluate(row))
            )
        }
    };

    Some(
        ValidationError::cell(rule.target(), row.index(), ErrorKind::InvalidEnumValue, message)
            .with_value(value.to_string()),
    )
}

fn check_status(derivation: &StatusDerivation, row: &Row<'_>) -> Option<ValidationError> {
    let status = row.get(&derivation.status_column)?;
    let expected = derivation.expected_for(row)?;
    if status.matches_literal(expected) {
        return None;
    }
    Some(
        ValidationError::cell(
            &derivation.status_column,
            row.index(),
            ErrorKind::StatusMismatch,
            format!(
                "Status should be '{expected}' given '{}' and '{}'",
                derivation.first_date, derivation.second_date
            ),
        )
        .with_value(status.to_string()),
    )
}

fn describe(predicate: &Predicate, holds: bool) -> String {
    let not = if holds { "" } else { "not " };
    match predicate {
        Predicate::StartsWith { column, prefix } => {
            format!("'{column}' does {not}start with '{prefix}'")
        }
        Predicate::Equals { column, value } => format!("'{column}' is {not}'{value}'"),
        Predicate::OneOf { column, values } => {
            format!("'{column}' is {not}one of: {}", values.join(", "))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::limitation::*;
    use crate::schema::{limitation, ColumnDefinition, FormatKind};

    type Cells = Vec<(&'static str, Option<CellValue>)>;

    fn text(s: &str) -> Option<CellValue> {
        Some(CellValue::text(s))
    }

    /// A fully consistent manual, planned-and-executed record.
    fn clean_record() -> Cells {
        vec![
            (COL_LIMITATION_NUMBER, text("MAN - 001")),
            (COL_REQUEST_TYPE, text(REQUEST_MANUAL)),
            (COL_NAZA_REQUEST, text(NEGATIVE)),
            (COL_STATUS, text(STATUS_PLANNED_EXECUTED)),
            (COL_COMPENSABLE, text(AFFIRMATIVE)),
            (COL_REQUESTED_START, text("2024-01-01")),
            (COL_PLANNED_START, text("2024-01-02")),
            (COL_LIMIT_MW, Some(CellValue::Float(12.0))),
            (COL_REALIZED_START, text("2024-01-03")),
            (COL_REALIZED_END, text("2024-01-04")),
            (COL_SITE_ID, text("POSTE1")),
            (COL_PLANNED_HOURS, Some(CellValue::Float(2.0))),
            (COL_REQUESTED_HOURS, Some(CellValue::Float(2.0))),
            (COL_REALIZED_HOURS, Some(CellValue::Float(2.0))),
        ]
    }

    fn with(mut record: Cells, column: &'static str, value: Option<CellValue>) -> Cells {
        match record.iter().position(|(c, _)| *c == column) {
            Some(pos) => record[pos].1 = value,
            None => record.push((column, value)),
        }
        record
    }

    fn rules(records: Vec<Cells>) -> Vec<ValidationError> {
        let ds = Dataset::from_records(records).unwrap();
        check_rules(&ds, &limitation::registry().unwrap())
    }

    fn kinds(errors: &[ValidationError]) -> Vec<(Option<RowIndex>, &str, ErrorKind)> {
        errors
            .iter()
            .map(|e| (e.row, e.column.as_str(), e.kind))
            .collect()
    }

    #[test]
    fn clean_record_passes() {
        assert!(rules(vec![clean_record()]).is_empty());
    }

    #[test]
    fn automatic_id_requires_automatic_request() {
        let record = with(clean_record(), COL_LIMITATION_NUMBER, text("ALZ - 77"));
        let record = with(record, COL_NAZA_REQUEST, text(AFFIRMATIVE));
        let errors = rules(vec![record]);
        assert_eq!(
            kinds(&errors),
            vec![(Some(0), COL_REQUEST_TYPE, ErrorKind::InvalidEnumValue)]
        );
        assert_eq!(errors[0].value.as_deref(), Some(REQUEST_MANUAL));
        assert!(errors[0].message.contains(REQUEST_AUTOMATIC));
    }

    #[test]
    fn naza_flag_follows_prefix() {
        let record = with(clean_record(), COL_NAZA_REQUEST, text(AFFIRMATIVE));
        let errors = rules(vec![record]);
        assert_eq!(
            kinds(&errors),
            vec![(Some(0), COL_NAZA_REQUEST, ErrorKind::InvalidEnumValue)]
        );
    }

    #[test]
    fn null_target_is_not_checked() {
        let record = with(clean_record(), COL_REQUEST_TYPE, None);
        assert!(rules(vec![record]).is_empty());
    }

    #[test]
    fn request_type_outside_enumeration_is_reported_once() {
        let record = with(clean_record(), COL_REQUEST_TYPE, text("Auto"));
        let errors = rules(vec![record]);
        assert_eq!(
            kinds(&errors),
            vec![(Some(0), COL_REQUEST_TYPE, ErrorKind::InvalidEnumValue)]
        );
        assert!(errors[0].message.contains("must be one of"));
        assert_eq!(errors[0].value.as_deref(), Some("Auto"));
    }

    #[test]
    fn enumeration_suppresses_conditional_only_on_its_own_cell() {
        let record = with(clean_record(), COL_REQUEST_TYPE, text("Auto"));
        let record = with(record, COL_NAZA_REQUEST, text(AFFIRMATIVE));
        let errors = rules(vec![record]);
        assert_eq!(
            kinds(&errors),
            vec![
                (Some(0), COL_REQUEST_TYPE, ErrorKind::InvalidEnumValue),
                (Some(0), COL_NAZA_REQUEST, ErrorKind::InvalidEnumValue),
            ]
        );
    }

    #[test]
    fn status_without_dates_has_no_expectation() {
        let record = with(clean_record(), COL_REQUESTED_START, None);
        let record = with(record, COL_PLANNED_START, None);
        let errors = rules(vec![record]);
        assert!(errors.iter().all(|e| e.kind != ErrorKind::StatusMismatch));
    }

    #[test]
    fn status_diverging_from_dates() {
        let record = with(clean_record(), COL_PLANNED_START, None);
        let errors = rules(vec![record]);
        let status: Vec<_> = errors
            .iter()
            .filter(|e| e.kind == ErrorKind::StatusMismatch)
            .collect();
        assert_eq!(status.len(), 1);
        assert!(status[0].message.contains(STATUS_REAL_TIME));
    }

    #[test]
    fn compensation_negative_for_other_statuses() {
        let record = with(clean_record(), COL_STATUS, text("annulée"));
        let errors = rules(vec![record]);
        assert!(errors
            .iter()
            .any(|e| e.column == COL_COMPENSABLE && e.kind == ErrorKind::InvalidEnumValue));

        let record = with(clean_record(), COL_STATUS, None);
        let errors = rules(vec![record]);
        assert_eq!(
            kinds(&errors),
            vec![(Some(0), COL_COMPENSABLE, ErrorKind::InvalidEnumValue)]
        );
    }

    #[test]
    fn durations_depend_on_status() {
        let record = with(clean_record(), COL_PLANNED_HOURS, None);
        let record = with(record, COL_REALIZED_HOURS, None);
        let errors = rules(vec![record]);
        assert_eq!(
            kinds(&errors),
            vec![
                (Some(0), COL_PLANNED_HOURS, ErrorKind::MissingDuration),
                (Some(0), COL_REALIZED_HOURS, ErrorKind::MissingDuration),
            ]
        );

        let real_time = with(clean_record(), COL_STATUS, text(STATUS_REAL_TIME));
        let real_time = with(real_time, COL_PLANNED_START, None);
        let real_time = with(real_time, COL_COMPENSABLE, text(NEGATIVE));
        let real_time = with(real_time, COL_PLANNED_HOURS, None);
        assert!(rules(vec![real_time]).is_empty());
    }

    #[test]
    fn duplicates_report_extra_members_only() {
        let errors = rules(vec![clean_record(), clean_record(), clean_record()]);
        assert_eq!(
            kinds(&errors),
            vec![
                (Some(1), COL_LIMITATION_NUMBER, ErrorKind::DuplicateRecord),
                (Some(2), COL_LIMITATION_NUMBER, ErrorKind::DuplicateRecord),
            ]
        );
        assert!(errors[1].message.contains("row 0"));
    }

    #[test]
    fn null_key_field_excludes_from_grouping() {
        let partial = with(clean_record(), COL_SITE_ID, None);
        assert!(rules(vec![clean_record(), partial.clone()]).is_empty());
        assert!(rules(vec![partial.clone(), partial]).is_empty());
    }

    #[test]
    fn numeric_key_compares_by_value() {
        let as_int = with(clean_record(), COL_LIMIT_MW, Some(CellValue::Integer(12)));
        let errors = rules(vec![clean_record(), as_int]);
        assert_eq!(errors.len(), 1);
    }

    #[test]
    fn rules_skip_when_columns_absent() {
        let schema = SchemaRegistry::builder()
            .column(ColumnDefinition::optional("a", FormatKind::String))
            .column(ColumnDefinition::optional("b", FormatKind::String))
            .rule(SpecificRule::ConditionalExpected {
                target: "b".into(),
                when: Predicate::Equals {
                    column: "a".into(),
                    value: "x".into(),
                },
                expected: "y".into(),
                otherwise: None,
            })
            .duplicate_key(DuplicateKey {
                columns: vec!["a".into()],
                report_column: "a".into(),
            })
            .build()
            .unwrap();
        let ds = Dataset::from_records(vec![vec![("b", text("z"))], vec![("b", text("z"))]])
            .unwrap();
        assert!(check_rules(&ds, &schema).is_empty());
    }

    #[test]
    fn otherwise_none_means_no_expectation() {
        let schema = SchemaRegistry::builder()
            .column(ColumnDefinition::optional("a", FormatKind::String))
            .column(ColumnDefinition::optional("b", FormatKind::String))
            .rule(SpecificRule::ConditionalExpected {
                target: "b".into(),
                when: Predicate::OneOf {
                    column: "a".into(),
                    values: vec!["x".into(), "w".into()],
                },
                expected: "y".into(),
                otherwise: None,
            })
            .build()
            .unwrap();
        let ds = Dataset::from_records(vec![
            vec![("a", text("w")), ("b", text("z"))],
            vec![("a", text("q")), ("b", text("z"))],
        ])
        .unwrap();
        let errors = check_rules(&ds, &schema);
        assert_eq!(kinds(&errors), vec![(Some(0), "b", ErrorKind::InvalidEnumValue)]);
        assert!(errors[0].message.contains("is one of: x, w"));
    }

    #[test]
    fn parallel_matches_sequential() {
        let records: Vec<Cells> = (0..300)
            .map(|i| {
                let mut r = clean_record();
                if i % 4 == 0 {
                    r = with(r, COL_LIMITATION_NUMBER, text("ALZ - 9"));
                }
                if i % 6 == 0 {
                    r = with(r, COL_PLANNED_HOURS, None);
                }
                if i % 5 != 0 {
                    r = with(r, COL_SITE_ID, Some(CellValue::Integer(i)));
                }
                r
            })
            .collect();
        let ds = Dataset::from_records(records).unwrap();
        let schema = limitation::registry().unwrap();
        assert_eq!(
            run(&ds, &schema, Execution::Sequential),
            run(&ds, &schema, Execution::Parallel)
        );
    }
}
