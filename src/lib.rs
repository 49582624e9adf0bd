//! Privacy-disclosure risk metrics for tabular datasets
//!
//! This crate is the metrics engine behind a privacy validation pipeline:
//! it measures how exposed a (pseudo-)anonymised table is to
//! re-identification and attribute disclosure, and assembles the results
//! into one structured report.
//!
//! - `k-anonymity` — equivalence-class size statistics
//! - `l-diversity` — sensitive-value diversity per class (distinct or entropy)
//! - `t-closeness` — distributional distance per class (TVD or EMD)
//! - linkage-attack simulation against an auxiliary dataset
//! - behaviour patterns: rare QI combinations, sensitive skew, QI/sensitive
//!   association
//!
//! The caller decides which columns are quasi-identifiers and which column
//! is sensitive; the engine neither transforms data nor persists reports.
//!
//! ```
//! use privrisk::models::ReportParams;
//! use privrisk::{Dataset, Validator, Value};
//!
//! let df = Dataset::from_columns(vec![
//!     (
//!         "age_band".to_string(),
//!         vec!["20-29".into(), "20-29".into(), "30-39".into()],
//!     ),
//!     (
//!         "disease".to_string(),
//!         vec!["flu".into(), "hiv".into(), "flu".into()],
//!     ),
//! ])
//! .unwrap();
//!
//! let validator = Validator::new(&df);
//! let params = ReportParams::new(vec!["age_band".to_string()], "disease").with_k_required(2);
//! let report = validator.full_report(&params, None).unwrap();
//! assert_eq!(report.schema_version, "1.0.0");
//! ```

pub mod analyzers;
pub mod dataset;
pub mod error;
pub mod models;
pub mod report;
pub mod stats;
pub mod thresholds;

pub use dataset::{ColumnKind, Dataset, Value};
pub use error::ValidatorError;
pub use models::{FullReport, MetricOutcome, ReportParams};
pub use report::Validator;
