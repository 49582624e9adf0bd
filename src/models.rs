//! Report data models
//!
//! These models form the structured report contract consumed by downstream
//! collaborators (summary generation, HTTP services). Field names and
//! nesting are stable across versions; bump `SCHEMA_VERSION` on any
//! breaking change.

use crate::dataset::Value;
use crate::error::ValidatorError;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::str::FromStr;

/// Version of the report JSON shape.
pub const SCHEMA_VERSION: &str = "1.0.0";

/// l-diversity computation method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LDiversityMethod {
    #[default]
    Distinct,
    Entropy,
}

impl FromStr for LDiversityMethod {
    type Err = ValidatorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "distinct" => Ok(LDiversityMethod::Distinct),
            "entropy" => Ok(LDiversityMethod::Entropy),
            other => Err(ValidatorError::UnknownLDiversityMethod(other.to_string())),
        }
    }
}

/// t-closeness distance method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TMethod {
    #[default]
    Tvd,
    Emd,
}

impl FromStr for TMethod {
    type Err = ValidatorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "tvd" => Ok(TMethod::Tvd),
            "emd" => Ok(TMethod::Emd),
            other => Err(ValidatorError::UnknownTMethod(other.to_string())),
        }
    }
}

/// Numeric binning method for t-closeness.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum BinningMethod {
    /// Freedman–Diaconis-like bin width.
    #[default]
    Fd,
    /// Evenly spaced quantile cut points.
    Quantile,
}

impl FromStr for BinningMethod {
    type Err = ValidatorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "fd" => Ok(BinningMethod::Fd),
            "quantile" => Ok(BinningMethod::Quantile),
            other => Err(ValidatorError::UnknownBinningMethod(other.to_string())),
        }
    }
}

/// Equivalence-class size statistics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KAnonymityReport {
    /// Smallest equivalence-class size; 0 for an empty dataset.
    pub k_min: usize,
    /// Mean equivalence-class size.
    pub k_avg: f64,
    /// Class size → number of classes with that size, ascending.
    pub size_histogram: BTreeMap<usize, usize>,
}

/// Sensitive-attribute diversity statistics per equivalence class.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LDiversityReport {
    pub method: LDiversityMethod,
    /// Minimum distinct sensitive-value count across classes.
    pub l_min: f64,
    /// Mean distinct sensitive-value count across classes.
    pub l_avg: f64,
    /// Minimum Shannon entropy (bits); entropy method only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entropy_min: Option<f64>,
    /// Mean Shannon entropy (bits); entropy method only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entropy_avg: Option<f64>,
    /// 2^entropy_min, comparable to distinct-count l.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entropy_effective_min: Option<f64>,
    /// 2^entropy_avg, comparable to distinct-count l.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entropy_effective_avg: Option<f64>,
}

/// Distributional distance between each class and the global
/// sensitive-attribute distribution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TClosenessReport {
    pub t_max: f64,
    pub t_avg: f64,
    /// Shared histogram bin edges; numeric TVD path only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bin_edges: Option<Vec<f64>>,
    pub method: TMethod,
}

/// Outcome of joining an auxiliary dataset against the bound dataset on
/// QI columns.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinkageAttackResult {
    /// Auxiliary rows matching exactly one dataset row.
    pub unique: usize,
    /// Auxiliary rows matching more than one dataset row.
    pub multiple: usize,
    /// Auxiliary rows matching nothing.
    pub none: usize,
    /// The uniquely matched auxiliary rows, with their original field
    /// values. These are the records at highest re-identification risk.
    pub flagged: Vec<IndexMap<String, Value>>,
    pub records_tested: usize,
    /// unique / records_tested, 0.0 for an empty auxiliary dataset.
    pub reid_probability: f64,
}

/// An equivalence class small enough to single out individuals.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RareCombination {
    pub qi_values: IndexMap<String, Value>,
    pub count: usize,
}

/// A class whose modal sensitive value dominates the class.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SensitiveSkew {
    pub qi_values: IndexMap<String, Value>,
    pub dominant_value: Value,
    /// Share of the class holding the dominant value, in (0,1].
    pub frequency: f64,
}

/// Association between one QI column and the sensitive column.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum QiAssociation {
    /// Pearson correlation; numeric QI against numeric sensitive.
    Pearson {
        qi: String,
        sensitive: String,
        correlation: f64,
    },
    /// Chi-square association; categorical contingency.
    CramersV {
        qi: String,
        sensitive: String,
        association_cramers_v: f64,
        chi2: f64,
    },
}

/// Structural disclosure patterns beyond the headline metrics.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BehaviourPatterns {
    pub rare_combinations: Vec<RareCombination>,
    pub sensitive_skew: Vec<SensitiveSkew>,
    pub qi_sensitive_correlation: Vec<QiAssociation>,
    /// Set instead of raised when association computation fails.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub correlation_error: Option<String>,
}

/// Default thresholds suggested from dataset size and sensitive-column
/// characteristics. Advisory only; callers opt in via
/// `ReportParams::use_suggested_defaults`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuggestedThresholds {
    pub k: usize,
    pub l: usize,
    pub t: f64,
    pub reid_probability: f64,
}

/// Dataset shape and missingness echoed into the report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataSummary {
    pub n_rows: usize,
    pub n_cols: usize,
    /// Per-column fraction of null values, in column order.
    pub missing_rates: IndexMap<String, f64>,
}

/// Per-metric result wrapper: the sub-report on success, an error
/// placeholder on failure. A failed metric never aborts report assembly.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum MetricOutcome<T> {
    Ok(T),
    Failed(MetricFailure),
}

// Manual untagged deserialization: the derived impl buffers through
// serde's internal `Content`, which keeps map keys as strings and so
// cannot rebuild integer-keyed maps like `size_histogram`. Buffering
// through `serde_json::Value` instead keeps the round trip symmetric
// with the serialized shape; variants are tried in declaration order,
// matching the derived untagged behaviour.
impl<'de, T> Deserialize<'de> for MetricOutcome<T>
where
    T: serde::de::DeserializeOwned,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let value = serde_json::Value::deserialize(deserializer)?;
        if let Ok(ok) = T::deserialize(value.clone()) {
            return Ok(MetricOutcome::Ok(ok));
        }
        match MetricFailure::deserialize(value) {
            Ok(failed) => Ok(MetricOutcome::Failed(failed)),
            Err(_) => Err(serde::de::Error::custom(
                "data did not match any variant of untagged enum MetricOutcome",
            )),
        }
    }
}

/// Placeholder serialized in place of a sub-report when its analyzer
/// failed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricFailure {
    pub error: String,
}

impl<T> MetricOutcome<T> {
    pub fn is_ok(&self) -> bool {
        matches!(self, MetricOutcome::Ok(_))
    }

    /// The sub-report, when the analyzer succeeded.
    pub fn as_ok(&self) -> Option<&T> {
        match self {
            MetricOutcome::Ok(value) => Some(value),
            MetricOutcome::Failed(_) => None,
        }
    }

    /// The captured error, when the analyzer failed.
    pub fn error(&self) -> Option<&str> {
        match self {
            MetricOutcome::Ok(_) => None,
            MetricOutcome::Failed(f) => Some(&f.error),
        }
    }
}

/// Parameters for one full-report call.
///
/// Optional `*_required` thresholds drive risk flagging; when omitted the
/// corresponding comparison is skipped entirely unless
/// `use_suggested_defaults` is set, in which case the advisor's values
/// stand in.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportParams {
    pub qi: Vec<String>,
    pub sensitive: String,
    pub k_required: Option<usize>,
    pub l_required: Option<f64>,
    pub l_method: LDiversityMethod,
    pub t_required: Option<f64>,
    pub numeric_bins: usize,
    pub reid_required: Option<f64>,
    pub dominance_threshold: f64,
    pub rare_threshold: usize,
    pub binning_method: BinningMethod,
    pub t_method: TMethod,
    pub use_suggested_defaults: bool,
}

impl ReportParams {
    /// Parameters with default knobs for the given QI set and sensitive
    /// column.
    pub fn new(qi: Vec<String>, sensitive: impl Into<String>) -> Self {
        Self {
            qi,
            sensitive: sensitive.into(),
            k_required: None,
            l_required: None,
            l_method: LDiversityMethod::default(),
            t_required: None,
            numeric_bins: 15,
            reid_required: None,
            dominance_threshold: 0.9,
            rare_threshold: 1,
            binning_method: BinningMethod::default(),
            t_method: TMethod::default(),
            use_suggested_defaults: false,
        }
    }

    pub fn with_k_required(mut self, k: usize) -> Self {
        self.k_required = Some(k);
        self
    }

    pub fn with_l_required(mut self, l: f64) -> Self {
        self.l_required = Some(l);
        self
    }

    pub fn with_l_method(mut self, method: LDiversityMethod) -> Self {
        self.l_method = method;
        self
    }

    pub fn with_t_required(mut self, t: f64) -> Self {
        self.t_required = Some(t);
        self
    }

    pub fn with_numeric_bins(mut self, bins: usize) -> Self {
        self.numeric_bins = bins;
        self
    }

    pub fn with_reid_required(mut self, reid: f64) -> Self {
        self.reid_required = Some(reid);
        self
    }

    pub fn with_dominance_threshold(mut self, threshold: f64) -> Self {
        self.dominance_threshold = threshold;
        self
    }

    pub fn with_rare_threshold(mut self, threshold: usize) -> Self {
        self.rare_threshold = threshold;
        self
    }

    pub fn with_binning_method(mut self, method: BinningMethod) -> Self {
        self.binning_method = method;
        self
    }

    pub fn with_t_method(mut self, method: TMethod) -> Self {
        self.t_method = method;
        self
    }

    pub fn with_suggested_defaults(mut self) -> Self {
        self.use_suggested_defaults = true;
        self
    }
}

/// The assembled privacy risk report.
///
/// Top-level keys are fixed regardless of which individual metrics failed;
/// `attack_simulation` appears only when an auxiliary dataset was supplied.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FullReport {
    pub schema_version: String,
    pub params: ReportParams,
    pub suggested_thresholds: SuggestedThresholds,
    pub data_summary: DataSummary,
    pub k_anonymity: MetricOutcome<KAnonymityReport>,
    pub l_diversity: MetricOutcome<LDiversityReport>,
    pub t_closeness: MetricOutcome<TClosenessReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attack_simulation: Option<MetricOutcome<LinkageAttackResult>>,
    pub risk_flags: Vec<String>,
    pub repair_suggestions: Vec<String>,
    pub behaviour_patterns: MetricOutcome<BehaviourPatterns>,
}

impl FullReport {
    /// Pretty-printed JSON, the shape downstream collaborators consume.
    pub fn to_json(&self) -> anyhow::Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Compact single-line JSON.
    pub fn to_json_compact(&self) -> anyhow::Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}
