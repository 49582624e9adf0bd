//! t-closeness analyzer
//!
//! Distributional distance between each equivalence class and the
//! whole-dataset sensitive-attribute distribution. Numeric sensitive
//! columns are compared over shared histogram bins (or bin-free via the
//! Wasserstein distance); categorical columns over the global observed
//! category set. The sensitive column's kind is decided once per call.

use crate::dataset::grouping::EquivalenceClasses;
use crate::dataset::{ColumnKind, Dataset, Value};
use crate::error::ValidatorError;
use crate::models::{BinningMethod, TClosenessReport, TMethod};
use crate::stats;
use anyhow::Result;
use indexmap::IndexMap;

/// Global reference distribution, fixed once from the full dataset.
enum Reference {
    /// Shared bin edges and the global histogram over them.
    NumericBinned {
        edges: Vec<f64>,
        global_counts: Vec<f64>,
    },
    /// Raw sorted global values for bin-free earth mover's distance.
    NumericRaw { sorted: Vec<f64> },
    /// Observed category positions and global per-category counts.
    Categorical {
        positions: IndexMap<Value, usize>,
        global_counts: Vec<f64>,
    },
}

impl Reference {
    fn class_distance(&self, sensitive: &[Value], rows: &[usize]) -> f64 {
        match self {
            Reference::NumericBinned {
                edges,
                global_counts,
            } => {
                let vals: Vec<f64> = rows.iter().filter_map(|&r| sensitive[r].as_f64()).collect();
                let counts = stats::histogram(&vals, edges);
                stats::total_variation(&counts, global_counts)
            }
            Reference::NumericRaw { sorted } => {
                let vals: Vec<f64> = rows.iter().filter_map(|&r| sensitive[r].as_f64()).collect();
                stats::wasserstein_1d(&vals, sorted)
            }
            Reference::Categorical {
                positions,
                global_counts,
            } => {
                let mut counts = vec![0.0; global_counts.len()];
                for &r in rows {
                    if let Some(&i) = positions.get(&sensitive[r]) {
                        counts[i] += 1.0;
                    }
                }
                stats::total_variation(&counts, global_counts)
            }
        }
    }
}

/// Compute t-closeness for the given QI columns and sensitive column.
///
/// `t_max`/`t_avg` lie in [0,1] for the TVD method; the EMD method is on
/// the sensitive column's own scale. When every sensitive value is missing
/// the distance is 0 for every class. EMD is undefined for unordered
/// categories, so a categorical sensitive column is always measured with
/// TVD.
pub fn analyze(
    df: &Dataset,
    qi_cols: &[String],
    sensitive_col: &str,
    numeric_bins: usize,
    binning_method: BinningMethod,
    t_method: TMethod,
) -> Result<TClosenessReport> {
    let classes = EquivalenceClasses::partition(df, qi_cols)?;
    let sensitive = df.require_column(sensitive_col)?;
    let kind = df
        .column_kind(sensitive_col)
        .ok_or_else(|| ValidatorError::MissingColumn(sensitive_col.to_string()))?;

    let (reference, method, bin_edges) = match kind {
        ColumnKind::Numeric => {
            // NaN is filtered along with nulls, so a column whose every
            // number is NaN leaves `x` empty: the reference degenerates and
            // every class distance is 0, like the all-null case.
            let mut x: Vec<f64> = sensitive.iter().filter_map(Value::as_f64).collect();
            x.sort_by(f64::total_cmp);
            match t_method {
                TMethod::Emd => (Reference::NumericRaw { sorted: x }, TMethod::Emd, None),
                TMethod::Tvd if x.is_empty() => (
                    Reference::NumericBinned {
                        edges: Vec::new(),
                        global_counts: Vec::new(),
                    },
                    TMethod::Tvd,
                    None,
                ),
                TMethod::Tvd => {
                    let edges = match binning_method {
                        BinningMethod::Fd => stats::fd_bin_edges(&x, numeric_bins),
                        BinningMethod::Quantile => stats::quantile_bin_edges(&x, numeric_bins),
                    };
                    let global_counts = stats::histogram(&x, &edges);
                    (
                        Reference::NumericBinned {
                            edges: edges.clone(),
                            global_counts,
                        },
                        TMethod::Tvd,
                        Some(edges),
                    )
                }
            }
        }
        ColumnKind::Categorical => {
            let mut positions: IndexMap<Value, usize> = IndexMap::new();
            let mut global_counts: Vec<f64> = Vec::new();
            for value in sensitive.iter().filter(|v| !v.is_null()) {
                let next = positions.len();
                let i = *positions.entry(value.clone()).or_insert(next);
                if i == global_counts.len() {
                    global_counts.push(0.0);
                }
                global_counts[i] += 1.0;
            }
            (
                Reference::Categorical {
                    positions,
                    global_counts,
                },
                TMethod::Tvd,
                None,
            )
        }
    };

    let distances: Vec<f64> = classes
        .iter()
        .map(|(_, rows)| reference.class_distance(sensitive, rows))
        .collect();

    let t_max = distances.iter().copied().fold(0.0, f64::max);
    let t_avg = if distances.is_empty() {
        0.0
    } else {
        distances.iter().sum::<f64>() / distances.len() as f64
    };

    Ok(TClosenessReport {
        t_max,
        t_avg,
        bin_edges,
        method,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn qi(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    fn fixture() -> Dataset {
        Dataset::from_columns(vec![
            (
                "age_band".to_string(),
                vec![
                    Value::from("20-29"),
                    Value::from("20-29"),
                    Value::from("30-39"),
                    Value::from("30-39"),
                    Value::from("30-39"),
                ],
            ),
            (
                "disease".to_string(),
                vec![
                    Value::from("HIV"),
                    Value::from("Flu"),
                    Value::from("HIV"),
                    Value::from("HIV"),
                    Value::from("Cancer"),
                ],
            ),
            (
                "income".to_string(),
                vec![
                    Value::from(50i64),
                    Value::from(60i64),
                    Value::from(70i64),
                    Value::from(80i64),
                    Value::from(90i64),
                ],
            ),
        ])
        .expect("valid dataset")
    }

    #[test]
    fn test_categorical_tvd() {
        let report = analyze(
            &fixture(),
            &qi(&["age_band"]),
            "disease",
            10,
            BinningMethod::Fd,
            TMethod::Tvd,
        )
        .expect("analyze");
        // Global: HIV .6, Flu .2, Cancer .2.
        // Class 1 (HIV .5, Flu .5): TVD .3; class 2 (HIV 2/3, Cancer 1/3): TVD .2.
        assert!((report.t_max - 0.3).abs() < 1e-9);
        assert!((report.t_avg - 0.25).abs() < 1e-9);
        assert!(report.bin_edges.is_none());
        assert_eq!(report.method, TMethod::Tvd);
    }

    #[test]
    fn test_categorical_ignores_emd_request() {
        let report = analyze(
            &fixture(),
            &qi(&["age_band"]),
            "disease",
            10,
            BinningMethod::Fd,
            TMethod::Emd,
        )
        .expect("analyze");
        assert_eq!(report.method, TMethod::Tvd);
        assert!(report.t_max <= 1.0);
    }

    #[test]
    fn test_numeric_fd_tvd() {
        let report = analyze(
            &fixture(),
            &qi(&["age_band"]),
            "income",
            10,
            BinningMethod::Fd,
            TMethod::Tvd,
        )
        .expect("analyze");
        // FD gives edges [50,70,90]; global histogram [.4,.6].
        // Class 1 {50,60} → [1,0]: TVD .6; class 2 {70,80,90} → [0,1]: TVD .4.
        let edges = report.bin_edges.as_ref().expect("numeric TVD path");
        assert_eq!(edges.len(), 3);
        assert!((report.t_max - 0.6).abs() < 1e-9);
        assert!((report.t_avg - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_numeric_quantile_tvd_in_bounds() {
        let report = analyze(
            &fixture(),
            &qi(&["age_band"]),
            "income",
            3,
            BinningMethod::Quantile,
            TMethod::Tvd,
        )
        .expect("analyze");
        assert!(report.t_max >= 0.0 && report.t_max <= 1.0);
        assert!(report.t_avg >= 0.0 && report.t_avg <= report.t_max + 1e-12);
        assert!(report.bin_edges.is_some());
    }

    #[test]
    fn test_numeric_emd_is_bin_free() {
        let report = analyze(
            &fixture(),
            &qi(&["age_band"]),
            "income",
            10,
            BinningMethod::Fd,
            TMethod::Emd,
        )
        .expect("analyze");
        assert_eq!(report.method, TMethod::Emd);
        assert!(report.bin_edges.is_none());
        // Class 1 {50,60} vs global {50..90}: shifts mass right by 15.
        assert!((report.t_max - 15.0).abs() < 1e-9);
    }

    #[test]
    fn test_all_missing_sensitive_is_distance_zero() {
        let df = Dataset::from_columns(vec![
            (
                "zip".to_string(),
                vec![Value::from("1"), Value::from("2")],
            ),
            ("income".to_string(), vec![Value::Null, Value::Null]),
        ])
        .expect("valid dataset");
        let report = analyze(
            &df,
            &qi(&["zip"]),
            "income",
            10,
            BinningMethod::Fd,
            TMethod::Tvd,
        )
        .expect("analyze");
        assert_eq!(report.t_max, 0.0);
        assert_eq!(report.t_avg, 0.0);
        assert!(report.bin_edges.is_none());
    }

    #[test]
    fn test_nan_sensitive_values_are_treated_as_missing() {
        let df = Dataset::from_columns(vec![
            (
                "zip".to_string(),
                vec![
                    Value::from("1"),
                    Value::from("1"),
                    Value::from("2"),
                    Value::from("2"),
                ],
            ),
            (
                "income".to_string(),
                vec![
                    Value::from(1.0),
                    Value::from(2.0),
                    Value::Number(f64::NAN),
                    Value::from(3.0),
                ],
            ),
        ])
        .expect("valid dataset");

        let tvd = analyze(&df, &qi(&["zip"]), "income", 10, BinningMethod::Fd, TMethod::Tvd)
            .expect("analyze");
        assert!(tvd.t_max.is_finite());
        assert!(tvd.t_max >= 0.0 && tvd.t_max <= 1.0);

        let emd = analyze(&df, &qi(&["zip"]), "income", 10, BinningMethod::Fd, TMethod::Emd)
            .expect("analyze");
        assert!(emd.t_max.is_finite());
        assert!(emd.t_avg.is_finite());
    }

    #[test]
    fn test_all_nan_sensitive_is_distance_zero() {
        let df = Dataset::from_columns(vec![
            (
                "zip".to_string(),
                vec![Value::from("1"), Value::from("2")],
            ),
            (
                "income".to_string(),
                vec![Value::Number(f64::NAN), Value::Number(f64::NAN)],
            ),
        ])
        .expect("valid dataset");
        for t_method in [TMethod::Tvd, TMethod::Emd] {
            let report = analyze(&df, &qi(&["zip"]), "income", 10, BinningMethod::Fd, t_method)
                .expect("analyze");
            assert_eq!(report.t_max, 0.0);
            assert_eq!(report.t_avg, 0.0);
            assert!(report.bin_edges.is_none());
        }
    }

    #[test]
    fn test_tvd_bounds_hold_for_any_bin_count() {
        for bins in [1, 2, 5, 50] {
            let report = analyze(
                &fixture(),
                &qi(&["age_band"]),
                "income",
                bins,
                BinningMethod::Quantile,
                TMethod::Tvd,
            )
            .expect("analyze");
            assert!(report.t_max >= 0.0 && report.t_max <= 1.0, "bins={bins}");
            assert!(report.t_avg >= 0.0 && report.t_avg <= 1.0, "bins={bins}");
        }
    }
}
