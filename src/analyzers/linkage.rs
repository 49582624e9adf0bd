//! Linkage-attack simulator
//!
//! Joins an auxiliary dataset (presumed attacker knowledge) against the
//! bound dataset on QI equality and counts how many dataset rows each
//! auxiliary record reaches. A record reaching exactly one row is treated
//! as re-identified. Null matches null, mirroring the grouping rules.

use crate::dataset::grouping::GroupKey;
use crate::dataset::{Dataset, Value};
use crate::error::ValidatorError;
use crate::models::LinkageAttackResult;
use rustc_hash::FxHashMap;

/// Simulate a row-level linkage attack of `aux` against `df` on `qi_cols`.
///
/// Both datasets must carry every QI column; the auxiliary rows keep all
/// of their original fields in the flagged output.
pub fn simulate(
    df: &Dataset,
    aux: &Dataset,
    qi_cols: &[String],
) -> Result<LinkageAttackResult, ValidatorError> {
    if qi_cols.is_empty() {
        return Err(ValidatorError::NoQuasiIdentifiers);
    }
    let target_cols: Vec<&[Value]> = qi_cols
        .iter()
        .map(|name| df.require_column(name))
        .collect::<Result<_, _>>()?;
    let aux_cols: Vec<&[Value]> = qi_cols
        .iter()
        .map(|name| {
            aux.column(name)
                .ok_or_else(|| ValidatorError::MissingAuxColumn(name.clone()))
        })
        .collect::<Result<_, _>>()?;

    let mut class_sizes: FxHashMap<GroupKey, usize> = FxHashMap::default();
    for row in 0..df.n_rows() {
        let key = GroupKey(target_cols.iter().map(|col| col[row].clone()).collect());
        *class_sizes.entry(key).or_insert(0) += 1;
    }

    let mut unique = 0;
    let mut multiple = 0;
    let mut none = 0;
    let mut flagged = Vec::new();
    for row in 0..aux.n_rows() {
        let key = GroupKey(aux_cols.iter().map(|col| col[row].clone()).collect());
        match class_sizes.get(&key).copied().unwrap_or(0) {
            0 => none += 1,
            1 => {
                unique += 1;
                flagged.push(aux.row_record(row));
            }
            _ => multiple += 1,
        }
    }

    let records_tested = aux.n_rows();
    let reid_probability = if records_tested > 0 {
        unique as f64 / records_tested as f64
    } else {
        0.0
    };

    Ok(LinkageAttackResult {
        unique,
        multiple,
        none,
        flagged,
        records_tested,
        reid_probability,
    })
}
