//! Typed cell values and the textual date patterns shared by the type
//! validator and loaders.

use std::borrow::Cow;
use std::fmt;

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::types::Timestamp;

// ---------------------------------------------------------------------------
// Date patterns
// ---------------------------------------------------------------------------

/// Accepted textual date layouts, tried in order. The first match wins.
pub const DATE_PATTERNS: &[&str] = &[
    "%Y-%m-%d",
    "%d/%m/%Y",
    "%Y-%m-%d %H:%M:%S",
    "%d/%m/%Y %H:%M:%S",
];

/// Canonical rendering used when a timestamp is shown as text.
pub const TIMESTAMP_DISPLAY_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Parse `text` against [`DATE_PATTERNS`].
///
/// Date-only layouts resolve to midnight. Surrounding whitespace is ignored.
pub fn parse_timestamp(text: &str) -> Option<Timestamp> {
    let text = text.trim();
    DATE_PATTERNS.iter().find_map(|pattern| {
        if pattern.contains("%H") {
            NaiveDateTime::parse_from_str(text, pattern).ok()
        } else {
            NaiveDate::parse_from_str(text, pattern)
                .ok()
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        }
    })
}

// ---------------------------------------------------------------------------
// Cell values
// ---------------------------------------------------------------------------

/// A non-null scalar held by one cell. Null cells are `None` at the
/// [`crate::dataset::Dataset`] level.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum CellValue {
    Text(String),
    Integer(i64),
    Float(f64),
    Boolean(bool),
    Timestamp(Timestamp),
}

impl CellValue {
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }

    /// Short name of the variant, quoted in type-mismatch messages.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Text(_) => "text",
            Self::Integer(_) => "integer",
            Self::Float(_) => "float",
            Self::Boolean(_) => "boolean",
            Self::Timestamp(_) => "timestamp",
        }
    }

    /// Textual rendering of the value, borrowed when it already is text.
    pub fn as_text(&self) -> Cow<'_, str> {
        match self {
            Self::Text(s) => Cow::Borrowed(s.as_str()),
            other => Cow::Owned(other.to_string()),
        }
    }

    /// True when the cell holds exactly `literal` once rendered as text.
    pub fn matches_literal(&self, literal: &str) -> bool {
        self.as_text() == literal
    }

    /// Equality key used for cross-row grouping.
    ///
    /// Numbers compare by value across the integer/float split (`5` and
    /// `5.0` share a key); otherwise variants never compare equal to each
    /// other. NaN has no key and therefore never matches anything.
    pub fn grouping_key(&self) -> Option<String> {
        match self {
            Self::Text(s) => Some(format!("s:{s}")),
            Self::Integer(i) => Some(format!("n:{i}")),
            Self::Float(f) if f.is_nan() => None,
            Self::Float(f) => {
                if f.fract() == 0.0 && f.abs() < i64::MAX as f64 {
                    Some(format!("n:{}", *f as i64))
                } else {
                    Some(format!("n:{f}"))
                }
            }
            Self::Boolean(b) => Some(format!("b:{b}")),
            Self::Timestamp(ts) => Some(format!("t:{}", ts.format(TIMESTAMP_DISPLAY_FORMAT))),
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(s) => f.write_str(s),
            Self::Integer(i) => write!(f, "{i}"),
            Self::Float(x) => write!(f, "{x}"),
            Self::Boolean(b) => write!(f, "{b}"),
            Self::Timestamp(ts) => write!(f, "{}", ts.format(TIMESTAMP_DISPLAY_FORMAT)),
        }
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for CellValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<i64> for CellValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<f64> for CellValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<bool> for CellValue {
    fn from(value: bool) -> Self {
        Self::Boolean(value)
    }
}

impl From<Timestamp> for CellValue {
    fn from(value: Timestamp) -> Self {
        Self::Timestamp(value)
    }
}
