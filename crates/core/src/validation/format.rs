//! Type-conformance checks against each column's declared format.
//!
//! Null cells are skipped here: null-ness belongs to the required-field pass,
//! so a single cell is never reported under both kinds.

use super::finding::{ErrorKind, ValidationError};
use super::{collect_rows, Execution};
use crate::dataset::{Dataset, Row};
use crate::schema::{ColumnDefinition, FormatKind, SchemaRegistry};
use crate::value::{parse_timestamp, CellValue};

/// Report non-null values that cannot be coerced to their column's format.
///
/// Findings are ordered by row, then by column declaration order.
pub fn check_types(dataset: &Dataset, schema: &SchemaRegistry) -> Vec<ValidationError> {
    run(dataset, schema, Execution::Sequential)
}

pub(crate) fn run(
    dataset: &Dataset,
    schema: &SchemaRegistry,
    execution: Execution,
) -> Vec<ValidationError> {
    let typed: Vec<&ColumnDefinition> = schema
        .definitions()
        .iter()
        .filter(|def| def.format != FormatKind::String && dataset.has_column(&def.name))
        .collect();

    let literals = schema.boolean_literals();

    collect_rows(dataset, execution, |row| check_row(&row, &typed, literals))
}

fn check_row(
    row: &Row<'_>,
    typed: &[&ColumnDefinition],
    boolean_literals: &[String],
) -> Vec<ValidationError> {
    typed
        .iter()
        .filter_map(|def| {
            let value = row.get(&def.name)?;
            if conforms(def.format, value, boolean_literals) {
                return None;
            }
            Some(
                ValidationError::cell(
                    &def.name,
                    row.index(),
                    ErrorKind::TypeMismatch,
                    format!(
                        "Value '{value}' ({}) is not a valid {}",
                        value.kind_name(),
                        def.format
                    ),
                )
                .with_value(value.to_string()),
            )
        })
        .collect()
}

/// Whether `value` can be coerced to `format`.
///
/// `boolean_literals` is the exact text a boolean column accepts (see
/// [`SchemaRegistry::boolean_literals`]); surrounding whitespace is ignored.
pub fn conforms(format: FormatKind, value: &CellValue, boolean_literals: &[String]) -> bool {
    match format {
        FormatKind::String => true,
        FormatKind::Datetime | FormatKind::Date => match value {
            CellValue::Timestamp(_) => true,
            CellValue::Text(s) => parse_timestamp(s).is_some(),
            _ => false,
        },
        FormatKind::Int => match value {
            CellValue::Integer(_) => true,
            CellValue::Float(f) => is_integral(*f),
            CellValue::Text(s) => parse_number(s).is_some_and(is_integral),
            _ => false,
        },
        FormatKind::Float => match value {
            CellValue::Integer(_) | CellValue::Float(_) => true,
            CellValue::Text(s) => parse_number(s).is_some(),
            _ => false,
        },
        FormatKind::Boolean => match value {
            CellValue::Boolean(_) => true,
            CellValue::Integer(i) => *i == 0 || *i == 1,
            CellValue::Float(f) => *f == 0.0 || *f == 1.0,
            CellValue::Text(s) => {
                let s = s.trim();
                boolean_literals.iter().any(|l| l == s)
            }
            CellValue::Timestamp(_) => false,
        },
    }
}

fn parse_number(text: &str) -> Option<f64> {
    text.trim().parse::<f64>().ok()
}

fn is_integral(f: f64) -> bool {
    f.is_finite() && f.fract() == 0.0
}
