//! Equivalence-class partitioning
//!
//! Partitions rows into equivalence classes keyed by the tuple of
//! quasi-identifier values. Nulls are a distinct, stable key component:
//! two rows with the same missing-QI pattern land in the same class.
//! Classes iterate in first-appearance order so metric output is
//! reproducible, while the partition itself is independent of row order.

use crate::dataset::{Dataset, Value};
use crate::error::ValidatorError;
use indexmap::IndexMap;

/// Tuple of QI values identifying one equivalence class.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct GroupKey(pub Vec<Value>);

/// Rows partitioned by QI value tuple.
#[derive(Debug)]
pub struct EquivalenceClasses {
    qi_cols: Vec<String>,
    groups: IndexMap<GroupKey, Vec<usize>>,
}

impl EquivalenceClasses {
    /// Partition `df` by the given QI columns.
    ///
    /// Fails when the QI list is empty or names a column the dataset does
    /// not have.
    pub fn partition(df: &Dataset, qi_cols: &[String]) -> Result<Self, ValidatorError> {
        if qi_cols.is_empty() {
            return Err(ValidatorError::NoQuasiIdentifiers);
        }
        let columns: Vec<&[Value]> = qi_cols
            .iter()
            .map(|name| df.require_column(name))
            .collect::<Result<_, _>>()?;

        let mut groups: IndexMap<GroupKey, Vec<usize>> = IndexMap::new();
        for row in 0..df.n_rows() {
            let key = GroupKey(columns.iter().map(|col| col[row].clone()).collect());
            groups.entry(key).or_default().push(row);
        }

        Ok(Self {
            qi_cols: qi_cols.to_vec(),
            groups,
        })
    }

    /// Number of equivalence classes.
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Class sizes in first-appearance order.
    pub fn sizes(&self) -> impl Iterator<Item = usize> + '_ {
        self.groups.values().map(|rows| rows.len())
    }

    /// Classes as (key, member row indices) in first-appearance order.
    pub fn iter(&self) -> impl Iterator<Item = (&GroupKey, &[usize])> {
        self.groups.iter().map(|(k, v)| (k, v.as_slice()))
    }

    /// Pair a class key back with its QI column names.
    pub fn qi_values(&self, key: &GroupKey) -> IndexMap<String, Value> {
        self.qi_cols
            .iter()
            .cloned()
            .zip(key.0.iter().cloned())
            .collect()
    }
}
