//! Privacy metric analyzers
//!
//! Each analyzer is a standalone computation over the dataset:
//! - `k_anonymity` — equivalence-class size statistics
//! - `l_diversity` — sensitive-value diversity per class
//! - `t_closeness` — distributional distance per class
//! - `linkage` — linkage-attack simulation against an auxiliary dataset
//! - `behaviour` — rare combinations, sensitive skew, QI/sensitive association
//!
//! Analyzers run to completion one after another with no shared mutable
//! state. The assembler runs each through [`isolate`] so a failing metric
//! becomes an error placeholder in the report instead of aborting the call.

pub mod behaviour;
pub mod k_anonymity;
pub mod l_diversity;
pub mod linkage;
pub mod t_closeness;

use crate::models::{MetricFailure, MetricOutcome};
use tracing::warn;

/// Capture an analyzer result, turning failure into a report placeholder.
pub fn isolate<T>(name: &str, result: anyhow::Result<T>) -> MetricOutcome<T> {
    match result {
        Ok(value) => MetricOutcome::Ok(value),
        Err(e) => {
            warn!(analyzer = name, error = %e, "analyzer failed, substituting error placeholder");
            MetricOutcome::Failed(MetricFailure {
                error: e.to_string(),
            })
        }
    }
}
