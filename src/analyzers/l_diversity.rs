//! l-diversity analyzer
//!
//! Diversity of the sensitive attribute within each equivalence class.
//! Two interchangeable methods:
//! - `distinct`: count of distinct sensitive values per class (null counts
//!   as one distinct value)
//! - `entropy`: Shannon entropy (base 2) of the within-class value
//!   distribution, plus the exponentiated "effective diversity" 2^entropy,
//!   which reads on the same scale as a distinct count

use crate::dataset::grouping::EquivalenceClasses;
use crate::dataset::{Dataset, Value};
use crate::models::{LDiversityMethod, LDiversityReport};
use crate::stats;
use anyhow::Result;
use rustc_hash::FxHashMap;
use std::collections::HashSet;

/// Per-class distinct count and entropy of the sensitive attribute.
fn class_diversity(sensitive: &[Value], rows: &[usize]) -> (usize, f64) {
    let mut counts: FxHashMap<&Value, usize> = FxHashMap::default();
    for &row in rows {
        *counts.entry(&sensitive[row]).or_insert(0) += 1;
    }
    let total = rows.len() as f64;
    let probs: Vec<f64> = counts.values().map(|&c| c as f64 / total).collect();
    (counts.len(), stats::shannon_entropy(&probs))
}

/// Compute l-diversity for the given QI columns and sensitive column.
pub fn analyze(
    df: &Dataset,
    qi_cols: &[String],
    sensitive_col: &str,
    method: LDiversityMethod,
) -> Result<LDiversityReport> {
    let classes = EquivalenceClasses::partition(df, qi_cols)?;
    let sensitive = df.require_column(sensitive_col)?;

    let mut distinct_counts: Vec<usize> = Vec::with_capacity(classes.len());
    let mut entropies: Vec<f64> = Vec::with_capacity(classes.len());
    for (_, rows) in classes.iter() {
        match method {
            LDiversityMethod::Distinct => {
                let distinct: HashSet<&Value> = rows.iter().map(|&r| &sensitive[r]).collect();
                distinct_counts.push(distinct.len());
            }
            LDiversityMethod::Entropy => {
                let (distinct, entropy) = class_diversity(sensitive, rows);
                distinct_counts.push(distinct);
                entropies.push(entropy);
            }
        }
    }

    let l_min = distinct_counts.iter().copied().min().unwrap_or(0) as f64;
    let l_avg = if distinct_counts.is_empty() {
        0.0
    } else {
        distinct_counts.iter().sum::<usize>() as f64 / distinct_counts.len() as f64
    };

    match method {
        LDiversityMethod::Distinct => Ok(LDiversityReport {
            method,
            l_min,
            l_avg,
            entropy_min: None,
            entropy_avg: None,
            entropy_effective_min: None,
            entropy_effective_avg: None,
        }),
        LDiversityMethod::Entropy => {
            let entropy_min = entropies.iter().copied().fold(f64::INFINITY, f64::min);
            let entropy_min = if entropy_min.is_finite() { entropy_min } else { 0.0 };
            let entropy_avg = if entropies.is_empty() {
                0.0
            } else {
                entropies.iter().sum::<f64>() / entropies.len() as f64
            };
            Ok(LDiversityReport {
                method,
                l_min,
                l_avg,
                entropy_min: Some(entropy_min),
                entropy_avg: Some(entropy_avg),
                entropy_effective_min: Some(entropy_min.exp2()),
                entropy_effective_avg: Some(entropy_avg.exp2()),
            })
        }
    }
}
