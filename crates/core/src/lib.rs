//! Validation rule engine for grid-operations limitation exports.
//!
//! Consumes an already-loaded [`dataset::Dataset`] and an immutable
//! [`schema::SchemaRegistry`], and produces a complete, ordered list of
//! [`validation::ValidationError`] findings. No I/O happens here.

pub mod dataset;
pub mod error;
pub mod schema;
pub mod types;
pub mod validation;
pub mod value;

pub use dataset::{Dataset, Row};
pub use error::CoreError;
pub use schema::{ColumnDefinition, FormatKind, SchemaRegistry, SpecificRule};
pub use validation::{ErrorKind, ValidationError, ValidationReport, Validator};
pub use value::CellValue;
