//! The validated input: an ordered, immutable sequence of records sharing one
//! column set.
//!
//! Records are stored column-aligned, so "every record exposes the same column
//! keys" holds by construction once [`Dataset::new`] or
//! [`Dataset::from_records`] has accepted the input.

use std::collections::{HashMap, HashSet};

use rayon::prelude::*;

use crate::error::CoreError;
use crate::types::RowIndex;
use crate::value::CellValue;

/// Cells of one record, aligned with [`Dataset::columns`].
pub type RecordValues = Vec<Option<CellValue>>;

#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    columns: Vec<String>,
    positions: HashMap<String, usize>,
    rows: Vec<RecordValues>,
}

impl Dataset {
    /// Build a dataset from a header and column-aligned rows.
    ///
    /// Fails if a column name repeats or a row's width differs from the
    /// header. Row identities are the positions in `rows`.
    pub fn new(columns: Vec<String>, rows: Vec<RecordValues>) -> Result<Self, CoreError> {
        let positions = index_columns(&columns)?;

        for (row, values) in rows.iter().enumerate() {
            if values.len() != columns.len() {
                return Err(CoreError::RowWidth {
                    row,
                    expected: columns.len(),
                    found: values.len(),
                });
            }
        }

        Ok(Self {
            columns,
            positions,
            rows,
        })
    }

    /// Build a dataset from keyed records.
    ///
    /// The first record fixes the column set and order; every later record
    /// must carry exactly the same keys (in any order). Absent values must be
    /// explicit `None`, never missing keys.
    pub fn from_records<K>(records: Vec<Vec<(K, Option<CellValue>)>>) -> Result<Self, CoreError>
    where
        K: Into<String>,
    {
        let mut records = records.into_iter();
        let Some(first) = records.next() else {
            return Self::new(Vec::new(), Vec::new());
        };

        let (columns, first_values): (Vec<String>, RecordValues) =
            first.into_iter().map(|(k, v)| (k.into(), v)).unzip();
        let positions = index_columns(&columns)?;

        let mut rows = vec![first_values];
        for (offset, record) in records.enumerate() {
            let row = offset + 1;
            let mut values: RecordValues = vec![None; columns.len()];
            let mut seen = vec![false; columns.len()];

            for (key, value) in record {
                let key = key.into();
                let Some(&pos) = positions.get(&key) else {
                    return Err(CoreError::InconsistentColumns {
                        row,
                        reason: format!("unexpected column '{key}'"),
                    });
                };
                if seen[pos] {
                    return Err(CoreError::InconsistentColumns {
                        row,
                        reason: format!("column '{key}' appears twice"),
                    });
                }
                seen[pos] = true;
                values[pos] = value;
            }

            if let Some(pos) = seen.iter().position(|s| !s) {
                return Err(CoreError::InconsistentColumns {
                    row,
                    reason: format!("missing column '{}'", columns[pos]),
                });
            }
            rows.push(values);
        }

        Ok(Self {
            columns,
            positions,
            rows,
        })
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn has_column(&self, column: &str) -> bool {
        self.positions.contains_key(column)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn row(&self, index: RowIndex) -> Option<Row<'_>> {
        self.rows.get(index).map(|values| Row {
            index,
            positions: &self.positions,
            values,
        })
    }

    /// Rows in ascending identity order.
    pub fn rows(&self) -> impl Iterator<Item = Row<'_>> + '_ {
        self.rows.iter().enumerate().map(|(index, values)| Row {
            index,
            positions: &self.positions,
            values,
        })
    }

    /// Rows as an indexed parallel iterator; `collect` preserves row order.
    pub fn par_rows(&self) -> impl IndexedParallelIterator<Item = Row<'_>> + '_ {
        let positions = &self.positions;
        self.rows
            .par_iter()
            .enumerate()
            .map(move |(index, values)| Row {
                index,
                positions,
                values,
            })
    }
}

fn index_columns(columns: &[String]) -> Result<HashMap<String, usize>, CoreError> {
    let mut seen = HashSet::with_capacity(columns.len());
    for column in columns {
        if !seen.insert(column.as_str()) {
            return Err(CoreError::DuplicateDatasetColumn(column.clone()));
        }
    }
    Ok(columns
        .iter()
        .enumerate()
        .map(|(pos, name)| (name.clone(), pos))
        .collect())
}

// ---------------------------------------------------------------------------
// Row view
// ---------------------------------------------------------------------------

/// Borrowed view of one record with its stable identity.
#[derive(Debug, Clone, Copy)]
pub struct Row<'a> {
    index: RowIndex,
    positions: &'a HashMap<String, usize>,
    values: &'a [Option<CellValue>],
}

impl<'a> Row<'a> {
    pub fn index(&self) -> RowIndex {
        self.index
    }

    /// The non-null value of `column`. `None` covers both a null cell and a
    /// column the dataset does not have; use [`Row::has_column`] to tell them
    /// apart.
    pub fn get(&self, column: &str) -> Option<&'a CellValue> {
        let pos = *self.positions.get(column)?;
        self.values[pos].as_ref()
    }

    pub fn has_column(&self, column: &str) -> bool {
        self.positions.contains_key(column)
    }

    pub fn is_null(&self, column: &str) -> bool {
        self.get(column).is_none()
    }
}
