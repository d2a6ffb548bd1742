//! Column names, literals, and the default registry for the grid-operations
//! limitation export.

use super::definition::{ColumnDefinition, FormatKind};
use super::registry::SchemaRegistry;
use super::rules::{DuplicateKey, Predicate, PresenceRequirement, SpecificRule, StatusDerivation};
use crate::error::CoreError;

// ---------------------------------------------------------------------------
// Column names (literal export headers)
// ---------------------------------------------------------------------------

pub const COL_CENTRALISATION_DATE: &str = "DATE CENTRALISATION";
pub const COL_REGION: &str = "REGION";
pub const COL_LIMITATION_NUMBER: &str = "N° LIMITATION";
pub const COL_SITE_ID: &str = "IDR POSTE";
pub const COL_REQUEST_TYPE: &str = "TYPE REQUETE";
pub const COL_STATUS: &str = "STATUT LIMITATION";
pub const COL_LIMIT_MW: &str = "CONSIGNE LIMITATION (MW)";
pub const COL_REQUESTED_START: &str = "DATE DEBUT DEMANDEE";
pub const COL_PLANNED_START: &str = "DATE DEBUT PREVUE";
pub const COL_PLANNED_END: &str = "DATE FIN PREVUE";
pub const COL_REALIZED_START: &str = "DATE DEBUT REALISEE";
pub const COL_REALIZED_END: &str = "DATE FIN REALISEE";
pub const COL_PLANNED_HOURS: &str = "DUREE PREVUE (HEURES)";
pub const COL_REQUESTED_HOURS: &str = "DUREE DEMANDEE (HEURES)";
pub const COL_REALIZED_HOURS: &str = "DUREE REALISEE (HEURES)";
pub const COL_NAZA_REQUEST: &str = "REQUETE NAZA (VRAI/FAUX)";
pub const COL_COMPENSABLE: &str = "INDEMNISABLE (VRAI/FAUX)";

// ---------------------------------------------------------------------------
// Literals
// ---------------------------------------------------------------------------

pub const STATUS_PLANNED_EXECUTED: &str = "planifiée et mise en œuvre";
pub const STATUS_REAL_TIME: &str = "mise en œuvre en temps réel";
pub const STATUS_PLANNED_NOT_EXECUTED: &str = "planifiée et non mise en œuvre";
pub const VALID_STATUSES: &[&str] = &[
    STATUS_PLANNED_EXECUTED,
    STATUS_REAL_TIME,
    STATUS_PLANNED_NOT_EXECUTED,
];

pub const REQUEST_AUTOMATIC: &str = "Automatique";
pub const REQUEST_MANUAL: &str = "Manuelle";
pub const VALID_REQUEST_TYPES: &[&str] = &[REQUEST_AUTOMATIC, REQUEST_MANUAL];

/// Identifier prefix of limitations raised by the automatic system.
pub const AUTOMATIC_ID_PREFIX: &str = "ALZ -";

pub const AFFIRMATIVE: &str = "VRAI";
pub const NEGATIVE: &str = "FAUX";

// ---------------------------------------------------------------------------
// Registry
// ---------------------------------------------------------------------------

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|s| s.to_string()).collect()
}

fn automatic_id() -> Predicate {
    Predicate::StartsWith {
        column: COL_LIMITATION_NUMBER.into(),
        prefix: AUTOMATIC_ID_PREFIX.into(),
    }
}

/// Column definitions of the export, in declaration order.
pub fn column_definitions() -> Vec<ColumnDefinition> {
    vec![
        ColumnDefinition::required(COL_CENTRALISATION_DATE, FormatKind::Datetime)
            .with_description("Date the record was centralised"),
        ColumnDefinition::required(COL_REGION, FormatKind::String).with_description("Region concerned"),
        ColumnDefinition::required(COL_LIMITATION_NUMBER, FormatKind::String)
            .with_description("Limitation number"),
        ColumnDefinition::optional(COL_SITE_ID, FormatKind::String).with_description("Substation identifier"),
        ColumnDefinition::optional(COL_REQUEST_TYPE, FormatKind::String)
            .with_description("Automatic or manual request"),
        ColumnDefinition::optional(COL_STATUS, FormatKind::String).with_description("Limitation status"),
        ColumnDefinition::optional(COL_LIMIT_MW, FormatKind::Float)
            .with_description("Limitation set point in MW"),
        ColumnDefinition::optional(COL_REQUESTED_START, FormatKind::Datetime),
        ColumnDefinition::optional(COL_PLANNED_START, FormatKind::Datetime),
        ColumnDefinition::optional(COL_PLANNED_END, FormatKind::Datetime),
        ColumnDefinition::optional(COL_REALIZED_START, FormatKind::Datetime),
        ColumnDefinition::optional(COL_REALIZED_END, FormatKind::Datetime),
        ColumnDefinition::optional(COL_PLANNED_HOURS, FormatKind::Float),
        ColumnDefinition::optional(COL_REQUESTED_HOURS, FormatKind::Float),
        ColumnDefinition::optional(COL_REALIZED_HOURS, FormatKind::Float),
        ColumnDefinition::optional(COL_NAZA_REQUEST, FormatKind::Boolean),
        ColumnDefinition::optional(COL_COMPENSABLE, FormatKind::Boolean),
    ]
}

/// Build the registry for the limitation export.
pub fn registry() -> Result<SchemaRegistry, CoreError> {
    let builder = column_definitions()
        .into_iter()
        .fold(SchemaRegistry::builder(), |b, def| b.column(def));

    builder
        .boolean_literals([AFFIRMATIVE, NEGATIVE, "1", "0"])
        .rule(SpecificRule::Enumeration {
            column: COL_REQUEST_TYPE.into(),
            values: strings(VALID_REQUEST_TYPES),
        })
        .rule(SpecificRule::Enumeration {
            column: COL_STATUS.into(),
            values: strings(VALID_STATUSES),
        })
        .rule(SpecificRule::ConditionalExpected {
            target: COL_REQUEST_TYPE.into(),
            when: automatic_id(),
            expected: REQUEST_AUTOMATIC.into(),
            otherwise: Some(REQUEST_MANUAL.into()),
        })
        .rule(SpecificRule::ConditionalExpected {
            target: COL_NAZA_REQUEST.into(),
            when: automatic_id(),
            expected: AFFIRMATIVE.into(),
            otherwise: Some(NEGATIVE.into()),
        })
        .rule(SpecificRule::ConditionalExpected {
            target: COL_COMPENSABLE.into(),
            when: Predicate::Equals {
                column: COL_STATUS.into(),
                value: STATUS_PLANNED_EXECUTED.into(),
            },
            expected: AFFIRMATIVE.into(),
            otherwise: Some(NEGATIVE.into()),
        })
        .conditional_null(PresenceRequirement {
            status_column: COL_STATUS.into(),
            statuses: strings(&[STATUS_PLANNED_EXECUTED]),
            columns: strings(&[COL_PLANNED_START, COL_PLANNED_END]),
        })
        .duplicate_key(DuplicateKey {
            columns: strings(&[
                COL_LIMIT_MW,
                COL_REALIZED_START,
                COL_REALIZED_END,
                COL_SITE_ID,
            ]),
            report_column: COL_LIMITATION_NUMBER.into(),
        })
        .status_derivation(StatusDerivation {
            status_column: COL_STATUS.into(),
            first_date: COL_REQUESTED_START.into(),
            second_date: COL_PLANNED_START.into(),
            both: STATUS_PLANNED_EXECUTED.into(),
            first_only: STATUS_REAL_TIME.into(),
            second_only: STATUS_PLANNED_NOT_EXECUTED.into(),
        })
        .duration_requirement(PresenceRequirement {
            status_column: COL_STATUS.into(),
            statuses: strings(&[STATUS_PLANNED_EXECUTED, STATUS_PLANNED_NOT_EXECUTED]),
            columns: strings(&[COL_PLANNED_HOURS]),
        })
        .duration_requirement(PresenceRequirement {
            status_column: COL_STATUS.into(),
            statuses: strings(&[STATUS_PLANNED_EXECUTED, STATUS_REAL_TIME]),
            columns: strings(&[COL_REQUESTED_HOURS, COL_REALIZED_HOURS]),
        })
        .build()
}
