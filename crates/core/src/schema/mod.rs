//! Schema registry: the immutable source of truth for column formats,
//! requiredness, and the domain rules applied by the validators.
//!
//! Built once (see [`limitation::registry`] for the grid-operations export)
//! and passed by reference into every validator call.

pub mod definition;
pub mod limitation;
pub mod registry;
pub mod rules;

pub use definition::{ColumnDefinition, FormatKind, DEFAULT_BOOLEAN_LITERALS};
pub use registry::{SchemaRegistry, SchemaRegistryBuilder};
pub use rules::{DuplicateKey, Predicate, PresenceRequirement, SpecificRule, StatusDerivation};
