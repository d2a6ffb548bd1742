//! Column definitions.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Text accepted in a boolean column when the schema sets no literals of its own.
pub const DEFAULT_BOOLEAN_LITERALS: &[&str] = &["true", "false", "1", "0"];

/// Declared storage format of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FormatKind {
    Datetime,
    Date,
    String,
    Int,
    Float,
    Boolean,
}

impl FormatKind {
    /// Stable string representation matching serde's `rename_all = "lowercase"`.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Datetime => "datetime",
            Self::Date => "date",
            Self::String => "string",
            Self::Int => "int",
            Self::Float => "float",
            Self::Boolean => "boolean",
        }
    }
}

impl fmt::Display for FormatKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Expected shape of one column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnDefinition {
    pub name: String,
    pub format: FormatKind,
    pub required: bool,
    #[serde(default)]
    pub description: String,
}

impl ColumnDefinition {
    pub fn new(name: impl Into<String>, format: FormatKind, required: bool) -> Self {
        Self {
            name: name.into(),
            format,
            required,
            description: String::new(),
        }
    }

    pub fn required(name: impl Into<String>, format: FormatKind) -> Self {
        Self::new(name, format, true)
    }

    pub fn optional(name: impl Into<String>, format: FormatKind) -> Self {
        Self::new(name, format, false)
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }
}
