//! The schema registry and its builder.

use std::collections::HashMap;

use serde::Serialize;

use super::definition::{ColumnDefinition, DEFAULT_BOOLEAN_LITERALS};
use super::rules::{DuplicateKey, PresenceRequirement, SpecificRule, StatusDerivation};
use crate::error::CoreError;

/// Immutable mapping from column name to definition, plus every rule the
/// validators apply. Lookups are pure; "absent" is a valid answer.
#[derive(Debug, Clone, Serialize)]
pub struct SchemaRegistry {
    definitions: Vec<ColumnDefinition>,
    #[serde(skip)]
    positions: HashMap<String, usize>,
    specific_rules: Vec<SpecificRule>,
    conditional_nulls: Vec<PresenceRequirement>,
    duplicate_key: Option<DuplicateKey>,
    status_derivation: Option<StatusDerivation>,
    duration_requirements: Vec<PresenceRequirement>,
    boolean_literals: Vec<String>,
}

impl SchemaRegistry {
    pub fn builder() -> SchemaRegistryBuilder {
        SchemaRegistryBuilder::default()
    }

    pub fn definition_for(&self, column: &str) -> Option<&ColumnDefinition> {
        self.positions.get(column).map(|&pos| &self.definitions[pos])
    }

    /// Declaration position of `column`; used as the within-row ordering key.
    pub fn position(&self, column: &str) -> Option<usize> {
        self.positions.get(column).copied()
    }

    /// Definitions in declaration order.
    pub fn definitions(&self) -> &[ColumnDefinition] {
        &self.definitions
    }

    /// Required column names in declaration order.
    pub fn required_columns(&self) -> Vec<&str> {
        self.definitions
            .iter()
            .filter(|d| d.required)
            .map(|d| d.name.as_str())
            .collect()
    }

    /// Rules whose findings are reported on `column`, in registration order.
    pub fn rules_for(&self, column: &str) -> Vec<&SpecificRule> {
        self.specific_rules
            .iter()
            .filter(|r| r.target() == column)
            .collect()
    }

    pub fn specific_rules(&self) -> &[SpecificRule] {
        &self.specific_rules
    }

    pub fn conditional_nulls(&self) -> &[PresenceRequirement] {
        &self.conditional_nulls
    }

    pub fn duplicate_key(&self) -> Option<&DuplicateKey> {
        self.duplicate_key.as_ref()
    }

    pub fn status_derivation(&self) -> Option<&StatusDerivation> {
        self.status_derivation.as_ref()
    }

    pub fn duration_requirements(&self) -> &[PresenceRequirement] {
        &self.duration_requirements
    }

    /// Exact texts a boolean column accepts, besides native booleans and 0/1.
    pub fn boolean_literals(&self) -> &[String] {
        &self.boolean_literals
    }
}

// ---------------------------------------------------------------------------
// Builder
// ---------------------------------------------------------------------------

/// Collects definitions and rules, then checks them once in [`build`].
///
/// [`build`]: SchemaRegistryBuilder::build
#[derive(Debug, Default)]
pub struct SchemaRegistryBuilder {
    definitions: Vec<ColumnDefinition>,
    specific_rules: Vec<SpecificRule>,
    conditional_nulls: Vec<PresenceRequirement>,
    duplicate_key: Option<DuplicateKey>,
    status_derivation: Option<StatusDerivation>,
    duration_requirements: Vec<PresenceRequirement>,
    boolean_literals: Option<Vec<String>>,
}

impl SchemaRegistryBuilder {
    pub fn column(mut self, definition: ColumnDefinition) -> Self {
        self.definitions.push(definition);
        self
    }

    pub fn rule(mut self, rule: SpecificRule) -> Self {
        self.specific_rules.push(rule);
        self
    }

    pub fn conditional_null(mut self, requirement: PresenceRequirement) -> Self {
        self.conditional_nulls.push(requirement);
        self
    }

    pub fn duplicate_key(mut self, key: DuplicateKey) -> Self {
        self.duplicate_key = Some(key);
        self
    }

    pub fn status_derivation(mut self, derivation: StatusDerivation) -> Self {
        self.status_derivation = Some(derivation);
        self
    }

    pub fn duration_requirement(mut self, requirement: PresenceRequirement) -> Self {
        self.duration_requirements.push(requirement);
        self
    }

    /// Replace [`DEFAULT_BOOLEAN_LITERALS`] with the export's own spelling.
    pub fn boolean_literals<I, S>(mut self, literals: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.boolean_literals = Some(literals.into_iter().map(Into::into).collect());
        self
    }

    /// Validate the collected schema and freeze it.
    ///
    /// Fails when no column is declared, a column is declared twice, a rule
    /// reads an undeclared column, or a rule is empty (no accepted values, no
    /// key columns, no statuses, no boolean literals).
    pub fn build(self) -> Result<SchemaRegistry, CoreError> {
        if self.definitions.is_empty() {
            return Err(CoreError::EmptySchema);
        }

        let mut positions = HashMap::with_capacity(self.definitions.len());
        for (pos, def) in self.definitions.iter().enumerate() {
            if positions.insert(def.name.clone(), pos).is_some() {
                return Err(CoreError::DuplicateColumnDefinition(def.name.clone()));
            }
        }

        let declared = |column: &str| -> Result<(), CoreError> {
            if positions.contains_key(column) {
                Ok(())
            } else {
                Err(CoreError::UnknownRuleColumn(column.to_string()))
            }
        };

        for rule in &self.specific_rules {
            for column in rule.columns() {
                declared(column)?;
            }
            if let SpecificRule::Enumeration { column, values } = rule {
                if values.is_empty() {
                    return Err(CoreError::InvalidRule(format!(
                        "enumeration on '{column}' accepts no values"
                    )));
                }
            }
        }

        for req in self
            .conditional_nulls
            .iter()
            .chain(self.duration_requirements.iter())
        {
            declared(&req.status_column)?;
            for column in &req.columns {
                declared(column)?;
            }
            if req.statuses.is_empty() || req.columns.is_empty() {
                return Err(CoreError::InvalidRule(format!(
                    "presence requirement on '{}' needs statuses and columns",
                    req.status_column
                )));
            }
        }

        if let Some(key) = &self.duplicate_key {
            if key.columns.is_empty() {
                return Err(CoreError::InvalidRule(
                    "duplicate key needs at least one column".into(),
                ));
            }
            declared(&key.report_column)?;
            for column in &key.columns {
                declared(column)?;
            }
        }

        if let Some(derivation) = &self.status_derivation {
            for column in derivation.columns() {
                declared(column)?;
            }
        }

        let boolean_literals = match self.boolean_literals {
            Some(literals) if literals.is_empty() => {
                return Err(CoreError::InvalidRule(
                    "boolean columns need at least one accepted literal".into(),
                ));
            }
            Some(literals) => literals,
            None => DEFAULT_BOOLEAN_LITERALS.iter().map(|l| l.to_string()).collect(),
        };

        Ok(SchemaRegistry {
            definitions: self.definitions,
            positions,
            specific_rules: self.specific_rules,
            conditional_nulls: self.conditional_nulls,
            duplicate_key: self.duplicate_key,
            status_derivation: self.status_derivation,
            duration_requirements: self.duration_requirements,
            boolean_literals,
        })
    }
}
