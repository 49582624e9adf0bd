//! Threshold advisor
//!
//! Suggests default k / l / t / re-identification thresholds from dataset
//! size and sensitive-column characteristics. Pure function of the bound
//! dataset; the suggestions are advisory and only become requirements when
//! the caller opts in (`ReportParams::use_suggested_defaults`).

use crate::dataset::{ColumnKind, Dataset, Value};
use crate::error::ValidatorError;
use crate::models::SuggestedThresholds;
use std::collections::HashSet;

/// Suggest thresholds for the given sensitive column.
pub fn suggest(df: &Dataset, sensitive_col: &str) -> Result<SuggestedThresholds, ValidatorError> {
    let sensitive = df.require_column(sensitive_col)?;
    let n_rows = df.n_rows();

    let k = if n_rows < 1_000 {
        5
    } else if n_rows < 10_000 {
        10
    } else {
        20
    };

    // Distinct non-null sensitive values.
    let distinct: HashSet<&Value> = sensitive.iter().filter(|v| !v.is_null()).collect();
    let l = if distinct.len() <= 10 { 2 } else { 3 };

    let t = match df.column_kind(sensitive_col) {
        Some(ColumnKind::Numeric) => 0.2,
        _ => 0.3,
    };

    let reid_probability = if n_rows > 1_000 { 0.05 } else { 0.1 };

    Ok(SuggestedThresholds {
        k,
        l,
        t,
        reid_probability,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dataset_of(n_rows: usize, distinct_sensitive: usize) -> Dataset {
        let values: Vec<Value> = (0..n_rows)
            .map(|i| Value::from(format!("v{}", i % distinct_sensitive.max(1))))
            .collect();
        Dataset::from_columns(vec![("s".to_string(), values)]).expect("valid dataset")
    }

    #[test]
    fn test_k_bands() {
        assert_eq!(suggest(&dataset_of(100, 3), "s").expect("suggest").k, 5);
        assert_eq!(suggest(&dataset_of(5_000, 3), "s").expect("suggest").k, 10);
        assert_eq!(suggest(&dataset_of(20_000, 3), "s").expect("suggest").k, 20);
    }

    #[test]
    fn test_l_by_cardinality() {
        assert_eq!(suggest(&dataset_of(100, 3), "s").expect("suggest").l, 2);
        assert_eq!(suggest(&dataset_of(100, 40), "s").expect("suggest").l, 3);
    }

    #[test]
    fn test_t_by_column_kind() {
        let categorical = dataset_of(100, 3);
        assert!((suggest(&categorical, "s").expect("suggest").t - 0.3).abs() < 1e-12);

        let numeric = Dataset::from_columns(vec![(
            "s".to_string(),
            (0..100).map(|i| Value::from(i as i64)).collect(),
        )])
        .expect("valid dataset");
        assert!((suggest(&numeric, "s").expect("suggest").t - 0.2).abs() < 1e-12);
    }

    #[test]
    fn test_reid_by_size() {
        let small = suggest(&dataset_of(100, 3), "s").expect("suggest");
        assert!((small.reid_probability - 0.1).abs() < 1e-12);
        let large = suggest(&dataset_of(2_000, 3), "s").expect("suggest");
        assert!((large.reid_probability - 0.05).abs() < 1e-12);
    }

    #[test]
    fn test_missing_sensitive_column() {
        let err = suggest(&dataset_of(10, 2), "nope").unwrap_err();
        assert!(matches!(err, ValidatorError::MissingColumn(_)));
    }
}
