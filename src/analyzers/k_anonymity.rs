//! k-anonymity analyzer
//!
//! k is the size of the smallest equivalence class: an attacker who knows a
//! record's QI values cannot narrow it down past k candidates.

use crate::dataset::grouping::EquivalenceClasses;
use crate::dataset::Dataset;
use crate::models::KAnonymityReport;
use anyhow::Result;
use std::collections::BTreeMap;

/// Compute equivalence-class size statistics for the given QI columns.
///
/// An empty dataset yields `k_min = 0`, `k_avg = 0.0` and an empty
/// histogram.
pub fn analyze(df: &Dataset, qi_cols: &[String]) -> Result<KAnonymityReport> {
    let classes = EquivalenceClasses::partition(df, qi_cols)?;

    let mut size_histogram: BTreeMap<usize, usize> = BTreeMap::new();
    let mut k_min = usize::MAX;
    let mut total = 0usize;
    for size in classes.sizes() {
        *size_histogram.entry(size).or_insert(0) += 1;
        k_min = k_min.min(size);
        total += size;
    }

    if classes.is_empty() {
        return Ok(KAnonymityReport {
            k_min: 0,
            k_avg: 0.0,
            size_histogram,
        });
    }

    Ok(KAnonymityReport {
        k_min,
        k_avg: total as f64 / classes.len() as f64,
        size_histogram,
    })
}
