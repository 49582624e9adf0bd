//! In-memory tabular dataset
//!
//! A `Dataset` is an immutable, columnar table of named columns. Values are
//! numbers, text, or null; null is a first-class value that participates in
//! grouping as its own category rather than being dropped or coalesced.
//! Dirty data is expected input, not an error.

pub mod grouping;

use crate::error::ValidatorError;
use indexmap::IndexMap;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::hash::{Hash, Hasher};

/// A single cell value.
///
/// Serializes to plain JSON: `Null` as `null`, `Number` as a number,
/// `Text` as a string.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Null,
    Number(f64),
    Text(String),
}

/// Canonical bit pattern so that grouping over floats is total:
/// all NaNs compare equal, and -0.0 folds into 0.0.
fn canonical_bits(n: f64) -> u64 {
    if n.is_nan() {
        f64::NAN.to_bits()
    } else if n == 0.0 {
        0.0f64.to_bits()
    } else {
        n.to_bits()
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Number(a), Value::Number(b)) => canonical_bits(*a) == canonical_bits(*b),
            (Value::Text(a), Value::Text(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for Value {}

impl Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        match self {
            Value::Null => state.write_u8(0),
            Value::Number(n) => {
                state.write_u8(1);
                state.write_u64(canonical_bits(*n));
            }
            Value::Text(s) => {
                state.write_u8(2);
                s.hash(state);
            }
        }
    }
}

impl Value {
    /// True for `Null`.
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Numeric view of the value, `None` for text, null, and NaN. NaN is a
    /// missing-value marker: it participates in grouping as its own
    /// category but never in numeric analysis.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Number(n) if !n.is_nan() => Some(*n),
            _ => None,
        }
    }
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Number(n) => write!(f, "{n}"),
            Value::Text(s) => write!(f, "{s}"),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Number(n as f64)
    }
}

/// Inferred role of a column's value domain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    /// Every non-null value is a number, and at least one non-null value exists.
    Numeric,
    /// Anything else, including all-null columns.
    Categorical,
}

/// Immutable columnar table.
///
/// Built once, then only read. All analyzers hold a shared reference and
/// never mutate it, so a bound validator is safe to use from one thread and
/// safe to share as long as nobody mutates the underlying data.
#[derive(Debug, Clone)]
pub struct Dataset {
    columns: Vec<String>,
    data: Vec<Vec<Value>>,
    index: FxHashMap<String, usize>,
    n_rows: usize,
}

impl Dataset {
    /// Build a dataset from named columns. All columns must have equal
    /// length and distinct names.
    pub fn from_columns(columns: Vec<(String, Vec<Value>)>) -> Result<Self, ValidatorError> {
        let n_rows = columns.first().map(|(_, v)| v.len()).unwrap_or(0);
        let mut names = Vec::with_capacity(columns.len());
        let mut data = Vec::with_capacity(columns.len());
        let mut index = FxHashMap::default();

        for (name, values) in columns {
            if values.len() != n_rows {
                return Err(ValidatorError::RaggedColumn {
                    column: name,
                    len: values.len(),
                    expected: n_rows,
                });
            }
            if index.insert(name.clone(), names.len()).is_some() {
                return Err(ValidatorError::DuplicateColumn(name));
            }
            names.push(name);
            data.push(values);
        }

        Ok(Self {
            columns: names,
            data,
            index,
            n_rows,
        })
    }

    /// Build a dataset from row tuples matching the given column order.
    pub fn from_rows(
        columns: Vec<String>,
        rows: Vec<Vec<Value>>,
    ) -> Result<Self, ValidatorError> {
        let n_cols = columns.len();
        let mut data: Vec<Vec<Value>> = vec![Vec::with_capacity(rows.len()); n_cols];
        for (i, row) in rows.into_iter().enumerate() {
            if row.len() != n_cols {
                return Err(ValidatorError::RaggedRow {
                    row: i,
                    len: row.len(),
                    expected: n_cols,
                });
            }
            for (c, value) in row.into_iter().enumerate() {
                data[c].push(value);
            }
        }
        Self::from_columns(columns.into_iter().zip(data).collect())
    }

    pub fn n_rows(&self) -> usize {
        self.n_rows
    }

    pub fn n_cols(&self) -> usize {
        self.columns.len()
    }

    /// Column names in declaration order.
    pub fn column_names(&self) -> &[String] {
        &self.columns
    }

    /// Values of a column, if it exists.
    pub fn column(&self, name: &str) -> Option<&[Value]> {
        self.index.get(name).map(|&i| self.data[i].as_slice())
    }

    /// Values of a column, erroring when absent.
    pub fn require_column(&self, name: &str) -> Result<&[Value], ValidatorError> {
        self.column(name)
            .ok_or_else(|| ValidatorError::MissingColumn(name.to_string()))
    }

    /// Inferred kind of a column.
    pub fn column_kind(&self, name: &str) -> Option<ColumnKind> {
        let values = self.column(name)?;
        let mut saw_number = false;
        for v in values {
            match v {
                Value::Number(_) => saw_number = true,
                Value::Null => {}
                Value::Text(_) => return Some(ColumnKind::Categorical),
            }
        }
        Some(if saw_number {
            ColumnKind::Numeric
        } else {
            ColumnKind::Categorical
        })
    }

    /// Fraction of null values in a column, 0.0 for an empty table.
    pub fn missing_rate(&self, name: &str) -> Option<f64> {
        let values = self.column(name)?;
        if values.is_empty() {
            return Some(0.0);
        }
        let nulls = values.iter().filter(|v| v.is_null()).count();
        Some(nulls as f64 / values.len() as f64)
    }

    /// One row as an ordered column → value record.
    pub fn row_record(&self, row: usize) -> IndexMap<String, Value> {
        self.columns
            .iter()
            .enumerate()
            .map(|(c, name)| (name.clone(), self.data[c][row].clone()))
            .collect()
    }
}
