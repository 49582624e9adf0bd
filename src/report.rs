//! Report assembly
//!
//! `Validator` binds to one immutable dataset and orchestrates the
//! analyzers into a `FullReport`. Each analyzer runs in isolation: a
//! failing metric is captured as an error placeholder and never prevents
//! the remaining metrics or the assembled report from being emitted.
//! Partial results always beat no result.

use crate::analyzers::{behaviour, isolate, k_anonymity, l_diversity, linkage, t_closeness};
use crate::dataset::Dataset;
use crate::error::ValidatorError;
use crate::models::{
    BehaviourPatterns, BinningMethod, DataSummary, FullReport, KAnonymityReport,
    LDiversityMethod, LDiversityReport, LinkageAttackResult, ReportParams, SuggestedThresholds,
    TClosenessReport, TMethod, SCHEMA_VERSION,
};
use crate::thresholds;
use indexmap::IndexMap;
use tracing::{debug, info};

/// Privacy risk validator bound to one dataset.
///
/// Stateless across calls and read-only over the bound dataset, so a
/// single instance may serve multiple metric computations. The engine is
/// synchronous: analyzers execute to completion one after another.
pub struct Validator<'a> {
    df: &'a Dataset,
}

impl<'a> Validator<'a> {
    pub fn new(df: &'a Dataset) -> Self {
        Self { df }
    }

    pub fn dataset(&self) -> &Dataset {
        self.df
    }

    /// Equivalence-class size statistics for the given QI columns.
    pub fn k_anonymity(&self, qi_cols: &[String]) -> anyhow::Result<KAnonymityReport> {
        k_anonymity::analyze(self.df, qi_cols)
    }

    /// Sensitive-value diversity per equivalence class.
    pub fn l_diversity(
        &self,
        qi_cols: &[String],
        sensitive_col: &str,
        method: LDiversityMethod,
    ) -> anyhow::Result<LDiversityReport> {
        l_diversity::analyze(self.df, qi_cols, sensitive_col, method)
    }

    /// Distributional distance between each class and the global
    /// sensitive-attribute distribution.
    pub fn t_closeness(
        &self,
        qi_cols: &[String],
        sensitive_col: &str,
        numeric_bins: usize,
        binning_method: BinningMethod,
        t_method: TMethod,
    ) -> anyhow::Result<TClosenessReport> {
        t_closeness::analyze(
            self.df,
            qi_cols,
            sensitive_col,
            numeric_bins,
            binning_method,
            t_method,
        )
    }

    /// Linkage-attack simulation against an auxiliary dataset.
    pub fn simulate_linkage_attack(
        &self,
        aux: &Dataset,
        qi_cols: &[String],
    ) -> Result<LinkageAttackResult, ValidatorError> {
        linkage::simulate(self.df, aux, qi_cols)
    }

    /// Suggested default thresholds for this dataset.
    pub fn suggest_thresholds(
        &self,
        sensitive_col: &str,
    ) -> Result<SuggestedThresholds, ValidatorError> {
        thresholds::suggest(self.df, sensitive_col)
    }

    /// Behaviour-pattern scan (rare combinations, skew, association).
    pub fn behaviour_patterns(
        &self,
        qi_cols: &[String],
        sensitive_col: &str,
        rare_threshold: usize,
        dominance_threshold: f64,
    ) -> anyhow::Result<BehaviourPatterns> {
        behaviour::detect(
            self.df,
            qi_cols,
            sensitive_col,
            rare_threshold,
            dominance_threshold,
        )
    }

    /// Fatal configuration checks, run before any computation.
    fn validate(
        &self,
        params: &ReportParams,
        external_df: Option<&Dataset>,
    ) -> Result<(), ValidatorError> {
        if params.qi.is_empty() {
            return Err(ValidatorError::NoQuasiIdentifiers);
        }
        for col in &params.qi {
            self.df.require_column(col)?;
        }
        self.df.require_column(&params.sensitive)?;
        if let Some(aux) = external_df {
            for col in &params.qi {
                if aux.column(col).is_none() {
                    return Err(ValidatorError::MissingAuxColumn(col.clone()));
                }
            }
        }
        Ok(())
    }

    /// Assemble the full privacy risk report.
    ///
    /// Configuration errors (missing columns, empty QI set) are fatal;
    /// individual metric failures are captured into the report instead.
    /// Threshold comparisons use the caller's explicit requirements, or
    /// the advisor's suggestions when `use_suggested_defaults` is set,
    /// and are skipped for metrics that failed.
    pub fn full_report(
        &self,
        params: &ReportParams,
        external_df: Option<&Dataset>,
    ) -> Result<FullReport, ValidatorError> {
        self.validate(params, external_df)?;
        debug!(qi = ?params.qi, sensitive = %params.sensitive, "assembling privacy risk report");

        let suggested = thresholds::suggest(self.df, &params.sensitive)?;
        let (k_required, l_required, t_required, reid_required) = if params.use_suggested_defaults
        {
            (
                params.k_required.or(Some(suggested.k)),
                params.l_required.or(Some(suggested.l as f64)),
                params.t_required.or(Some(suggested.t)),
                params.reid_required.or(Some(suggested.reid_probability)),
            )
        } else {
            (
                params.k_required,
                params.l_required,
                params.t_required,
                params.reid_required,
            )
        };

        let missing_rates: IndexMap<String, f64> = self
            .df
            .column_names()
            .iter()
            .map(|name| (name.clone(), self.df.missing_rate(name).unwrap_or(0.0)))
            .collect();
        let data_summary = DataSummary {
            n_rows: self.df.n_rows(),
            n_cols: self.df.n_cols(),
            missing_rates,
        };

        let k_outcome = isolate("k_anonymity", self.k_anonymity(&params.qi));
        debug!(result = ?k_outcome, "k-anonymity");
        let l_outcome = isolate(
            "l_diversity",
            self.l_diversity(&params.qi, &params.sensitive, params.l_method),
        );
        debug!(result = ?l_outcome, "l-diversity");
        let t_outcome = isolate(
            "t_closeness",
            self.t_closeness(
                &params.qi,
                &params.sensitive,
                params.numeric_bins,
                params.binning_method,
                params.t_method,
            ),
        );
        debug!(result = ?t_outcome, "t-closeness");

        let attack_outcome = external_df.map(|aux| {
            isolate(
                "attack_simulation",
                self.simulate_linkage_attack(aux, &params.qi)
                    .map_err(anyhow::Error::from),
            )
        });
        let behaviour_outcome = isolate(
            "behaviour_patterns",
            self.behaviour_patterns(
                &params.qi,
                &params.sensitive,
                params.rare_threshold,
                params.dominance_threshold,
            ),
        );

        let mut risk_flags = Vec::new();
        let mut repair_suggestions = Vec::new();

        if let (Some(k), Some(required)) = (k_outcome.as_ok(), k_required) {
            if k.k_min < required {
                risk_flags.push(format!(
                    "k-anonymity below threshold: {} < {}",
                    k.k_min, required
                ));
                repair_suggestions.push(format!(
                    "Consider generalising or suppressing quasi-identifiers: {}",
                    params.qi.join(", ")
                ));
            }
        }

        if let (Some(l), Some(required)) = (l_outcome.as_ok(), l_required) {
            match l.method {
                LDiversityMethod::Entropy => {
                    if let Some(effective) = l.entropy_effective_min {
                        if effective < required {
                            risk_flags.push(format!(
                                "entropy l-diversity (effective) below threshold: {effective:.3} < {required}"
                            ));
                            repair_suggestions.push(
                                "Consider generalising quasi-identifiers or grouping sensitive values to increase entropy.".to_string(),
                            );
                        }
                    }
                }
                LDiversityMethod::Distinct => {
                    if l.l_min < required {
                        risk_flags.push(format!(
                            "l-diversity (distinct) below threshold: {} < {}",
                            l.l_min, required
                        ));
                        repair_suggestions.push(
                            "Consider generalising quasi-identifiers to increase diversity."
                                .to_string(),
                        );
                    }
                }
            }
        }

        if let (Some(t), Some(required)) = (t_outcome.as_ok(), t_required) {
            if t.t_max > required {
                risk_flags.push(format!(
                    "t-closeness above threshold: {:.4} > {}",
                    t.t_max, required
                ));
                repair_suggestions.push(
                    "Consider generalising quasi-identifiers or binning the sensitive variable differently.".to_string(),
                );
            }
        }

        if let Some(outcome) = &attack_outcome {
            if let (Some(attack), Some(required)) = (outcome.as_ok(), reid_required) {
                if attack.reid_probability > required {
                    risk_flags.push(format!(
                        "Re-identification probability too high: {:.2} > {}",
                        attack.reid_probability, required
                    ));
                    repair_suggestions.push(
                        "Consider suppressing unique QI combinations or generalising quasi-identifiers.".to_string(),
                    );
                }
            }
        }

        info!(
            risk_flags = risk_flags.len(),
            n_rows = data_summary.n_rows,
            "privacy risk report assembled"
        );

        Ok(FullReport {
            schema_version: SCHEMA_VERSION.to_string(),
            params: params.clone(),
            suggested_thresholds: suggested,
            data_summary,
            k_anonymity: k_outcome,
            l_diversity: l_outcome,
            t_closeness: t_outcome,
            attack_simulation: attack_outcome,
            risk_flags,
            repair_suggestions,
            behaviour_patterns: behaviour_outcome,
        })
    }
}
