//! Behaviour-pattern detector
//!
//! Flags structural disclosure patterns the headline metrics miss:
//! - rare QI combinations (classes at or below `rare_threshold` members)
//! - sensitive-value skew (a class dominated by one sensitive value)
//! - QI/sensitive association (Pearson for numeric pairs, chi-square +
//!   Cramér's V for categorical contingency)
//!
//! Association failures are captured into `correlation_error` instead of
//! aborting the detector; rare-combination and skew scans always complete.

use crate::dataset::grouping::EquivalenceClasses;
use crate::dataset::{ColumnKind, Dataset, Value};
use crate::models::{BehaviourPatterns, QiAssociation, RareCombination, SensitiveSkew};
use crate::stats;
use anyhow::Result;
use indexmap::IndexMap;

/// Pearson |r| above which a numeric QI/sensitive pair is reported.
const CORRELATION_THRESHOLD: f64 = 0.5;
/// Cramér's V above which a categorical association is reported.
const CRAMERS_V_THRESHOLD: f64 = 0.2;

/// Modal sensitive value and its share within one class, ties broken by
/// first appearance. Nulls count as a category of their own.
fn class_mode(sensitive: &[Value], rows: &[usize]) -> Option<(Value, f64)> {
    let mut counts: IndexMap<&Value, usize> = IndexMap::new();
    for &row in rows {
        *counts.entry(&sensitive[row]).or_insert(0) += 1;
    }
    let mut best: Option<(&Value, usize)> = None;
    for (value, count) in counts {
        // Strictly greater keeps the first-seen value on ties.
        if best.map_or(true, |(_, c)| count > c) {
            best = Some((value, count));
        }
    }
    let (value, count) = best?;
    Some((value.clone(), count as f64 / rows.len() as f64))
}

/// Pearson correlations between each numeric QI column and a numeric
/// sensitive column, over pairwise non-null observations.
fn numeric_associations(
    df: &Dataset,
    qi_cols: &[String],
    sensitive_col: &str,
) -> Result<Vec<QiAssociation>> {
    let sensitive = df.require_column(sensitive_col)?;
    let mut out = Vec::new();
    for qi in qi_cols {
        if df.column_kind(qi) != Some(ColumnKind::Numeric) {
            continue;
        }
        let column = df.require_column(qi)?;
        let mut xs = Vec::new();
        let mut ys = Vec::new();
        for (a, b) in column.iter().zip(sensitive.iter()) {
            if let (Some(x), Some(y)) = (a.as_f64(), b.as_f64()) {
                xs.push(x);
                ys.push(y);
            }
        }
        if let Some(r) = stats::pearson(&xs, &ys) {
            if r.abs() > CORRELATION_THRESHOLD {
                out.push(QiAssociation::Pearson {
                    qi: qi.clone(),
                    sensitive: sensitive_col.to_string(),
                    correlation: r,
                });
            }
        }
    }
    Ok(out)
}

/// Chi-square / Cramér's V association between each QI column and a
/// categorical sensitive column, over rows where both values are present.
fn categorical_associations(
    df: &Dataset,
    qi_cols: &[String],
    sensitive_col: &str,
) -> Result<Vec<QiAssociation>> {
    let sensitive = df.require_column(sensitive_col)?;
    let n_total = df.n_rows();
    let mut out = Vec::new();
    for qi in qi_cols {
        let column = df.require_column(qi)?;

        let mut row_index: IndexMap<&Value, usize> = IndexMap::new();
        let mut col_index: IndexMap<&Value, usize> = IndexMap::new();
        let mut cells: Vec<(usize, usize)> = Vec::new();
        for (a, b) in column.iter().zip(sensitive.iter()) {
            if a.is_null() || b.is_null() {
                continue;
            }
            let next = row_index.len();
            let r = *row_index.entry(a).or_insert(next);
            let next = col_index.len();
            let c = *col_index.entry(b).or_insert(next);
            cells.push((r, c));
        }
        let (rows, cols) = (row_index.len(), col_index.len());
        if rows == 0 || cols == 0 {
            continue;
        }
        let mut table = vec![vec![0.0; cols]; rows];
        for (r, c) in cells {
            table[r][c] += 1.0;
        }

        // Cramér's V is undefined for a 1 x k (or k x 1) table.
        let dof = rows.min(cols) - 1;
        if dof == 0 {
            continue;
        }
        let chi2 = stats::chi_square(&table)?;
        let cramers_v = (chi2 / (n_total as f64 * dof as f64)).sqrt();
        if cramers_v > CRAMERS_V_THRESHOLD {
            out.push(QiAssociation::CramersV {
                qi: qi.clone(),
                sensitive: sensitive_col.to_string(),
                association_cramers_v: cramers_v,
                chi2,
            });
        }
    }
    Ok(out)
}

/// Scan equivalence classes for rare combinations, sensitive skew, and
/// QI/sensitive association.
pub fn detect(
    df: &Dataset,
    qi_cols: &[String],
    sensitive_col: &str,
    rare_threshold: usize,
    dominance_threshold: f64,
) -> Result<BehaviourPatterns> {
    let classes = EquivalenceClasses::partition(df, qi_cols)?;
    let sensitive = df.require_column(sensitive_col)?;

    let mut patterns = BehaviourPatterns::default();
    for (key, rows) in classes.iter() {
        if rows.len() <= rare_threshold {
            patterns.rare_combinations.push(RareCombination {
                qi_values: classes.qi_values(key),
                count: rows.len(),
            });
        }
        if let Some((dominant_value, frequency)) = class_mode(sensitive, rows) {
            if frequency > dominance_threshold {
                patterns.sensitive_skew.push(SensitiveSkew {
                    qi_values: classes.qi_values(key),
                    dominant_value,
                    frequency,
                });
            }
        }
    }

    let associations = match df.column_kind(sensitive_col) {
        Some(ColumnKind::Numeric) => numeric_associations(df, qi_cols, sensitive_col),
        _ => categorical_associations(df, qi_cols, sensitive_col),
    };
    match associations {
        Ok(found) => patterns.qi_sensitive_correlation = found,
        Err(e) => patterns.correlation_error = Some(e.to_string()),
    }

    Ok(patterns)
}
