//! End-to-end tests for the assembled privacy risk report.

use privrisk::models::{LDiversityMethod, ReportParams};
use privrisk::{Dataset, Validator, Value};

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
}

/// Two equivalence classes: (20-29, 12345) x2 and (30-39, 54321) x3.
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
            "zip".to_string(),
            vec![
                Value::from("12345"),
                Value::from("12345"),
                Value::from("54321"),
                Value::from("54321"),
                Value::from("54321"),
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

fn qi() -> Vec<String> {
    vec!["age_band".to_string(), "zip".to_string()]
}

#[test]
fn full_report_has_fixed_key_set() {
    init_tracing();
    let df = fixture();
    let validator = Validator::new(&df);
    let params = ReportParams::new(qi(), "disease")
        .with_k_required(2)
        .with_l_required(2.0)
        .with_t_required(0.5)
        .with_numeric_bins(5);
    let report = validator.full_report(&params, None).expect("report");

    let json: serde_json::Value =
        serde_json::from_str(&report.to_json().expect("render")).expect("parse");
    for key in [
        "schema_version",
        "params",
        "suggested_thresholds",
        "data_summary",
        "k_anonymity",
        "l_diversity",
        "t_closeness",
        "risk_flags",
        "repair_suggestions",
        "behaviour_patterns",
    ] {
        assert!(json.get(key).is_some(), "missing key {key}");
    }
    // No auxiliary dataset, no attack_simulation key.
    assert!(json.get("attack_simulation").is_none());
    assert_eq!(json["schema_version"], "1.0.0");
    assert_eq!(json["data_summary"]["n_rows"], 5);
    assert_eq!(json["data_summary"]["n_cols"], 4);
    assert_eq!(json["data_summary"]["missing_rates"]["disease"], 0.0);
}

#[test]
fn k_anonymity_matches_worked_example() {
    let df = fixture();
    let validator = Validator::new(&df);
    let report = validator.k_anonymity(&qi()).expect("k-anonymity");
    assert_eq!(report.k_min, 2);
    assert!((report.k_avg - 2.5).abs() < 1e-12);
    assert_eq!(report.size_histogram.get(&2), Some(&1));
    assert_eq!(report.size_histogram.get(&3), Some(&1));

    // Histogram mass accounts for every row.
    let mass: usize = report.size_histogram.iter().map(|(s, c)| s * c).sum();
    assert_eq!(mass, df.n_rows());
}

#[test]
fn l_diversity_matches_worked_example() {
    let df = fixture();
    let validator = Validator::new(&df);
    let report = validator
        .l_diversity(&qi(), "disease", LDiversityMethod::Distinct)
        .expect("l-diversity");
    // {HIV,Flu} = 2 distinct, {HIV,HIV,Cancer} = 2 distinct.
    assert_eq!(report.l_min, 2.0);
    assert_eq!(report.l_avg, 2.0);
}

#[test]
fn entropy_effective_diversity_never_exceeds_distinct() {
    let df = fixture();
    let validator = Validator::new(&df);
    let distinct = validator
        .l_diversity(&qi(), "disease", LDiversityMethod::Distinct)
        .expect("distinct");
    let entropy = validator
        .l_diversity(&qi(), "disease", LDiversityMethod::Entropy)
        .expect("entropy");
    assert!(entropy.entropy_effective_min.expect("entropy mode") <= distinct.l_min);
    assert!(entropy.entropy_effective_avg.expect("entropy mode") <= distinct.l_avg);
}

#[test]
fn linkage_attack_literal_join_counts() {
    let df = fixture();
    let validator = Validator::new(&df);
    let aux = Dataset::from_columns(vec![
        (
            "age_band".to_string(),
            vec![
                Value::from("20-29"),
                Value::from("30-39"),
                Value::from("30-39"),
                Value::from("99-99"),
            ],
        ),
        (
            "zip".to_string(),
            vec![
                Value::from("12345"),
                Value::from("54321"),
                Value::from("54321"),
                Value::from("00000"),
            ],
        ),
    ])
    .expect("valid dataset");

    let result = validator
        .simulate_linkage_attack(&aux, &qi())
        .expect("simulate");
    assert_eq!(result.records_tested, 4);
    assert_eq!(
        result.unique + result.multiple + result.none,
        result.records_tested
    );
    // Every aux row lands in a class of size >= 2 or nowhere.
    assert_eq!(result.unique, 0);
    assert_eq!(result.multiple, 3);
    assert_eq!(result.none, 1);
    assert!(result.reid_probability >= 0.0 && result.reid_probability <= 1.0);
}

#[test]
fn attack_simulation_key_appears_with_aux_dataset() {
    init_tracing();
    let df = fixture();
    let validator = Validator::new(&df);
    let aux = Dataset::from_columns(vec![
        ("age_band".to_string(), vec![Value::from("20-29")]),
        ("zip".to_string(), vec![Value::from("12345")]),
    ])
    .expect("valid dataset");
    let params = ReportParams::new(qi(), "disease");
    let report = validator.full_report(&params, Some(&aux)).expect("report");

    let json: serde_json::Value =
        serde_json::from_str(&report.to_json().expect("render")).expect("parse");
    assert_eq!(json["attack_simulation"]["records_tested"], 1);
}

#[test]
fn behaviour_patterns_respect_thresholds() {
    let df = fixture();
    let validator = Validator::new(&df);
    let params = ReportParams::new(qi(), "disease")
        .with_rare_threshold(2)
        .with_dominance_threshold(0.5);
    let report = validator.full_report(&params, None).expect("report");

    let patterns = report.behaviour_patterns.as_ok().expect("patterns");
    assert!(!patterns.rare_combinations.is_empty());
    for rare in &patterns.rare_combinations {
        assert!(rare.count <= 2);
    }
    for skew in &patterns.sensitive_skew {
        assert!(skew.frequency > 0.5);
    }
}

#[test]
fn numeric_sensitive_full_report_in_bounds() {
    let df = fixture();
    let validator = Validator::new(&df);
    let params = ReportParams::new(qi(), "income").with_numeric_bins(3);
    let report = validator.full_report(&params, None).expect("report");

    let t = report.t_closeness.as_ok().expect("t-closeness");
    assert!(t.t_max >= 0.0 && t.t_max <= 1.0);
    assert!(t.t_avg >= 0.0 && t.t_avg <= 1.0);
    assert!(t.bin_edges.is_some());

    // Numeric sensitive column draws the stricter suggested t.
    assert!((report.suggested_thresholds.t - 0.2).abs() < 1e-12);
}

#[test]
fn report_json_round_trips() {
    let df = fixture();
    let validator = Validator::new(&df);
    let params = ReportParams::new(qi(), "disease").with_k_required(10);
    let report = validator.full_report(&params, None).expect("report");

    let json = report.to_json_compact().expect("render");
    let back: privrisk::FullReport = serde_json::from_str(&json).expect("parse");
    assert_eq!(back.schema_version, report.schema_version);
    assert_eq!(back.risk_flags, report.risk_flags);
    assert_eq!(
        back.k_anonymity.as_ok().expect("ok").k_min,
        report.k_anonymity.as_ok().expect("ok").k_min
    );
}

#[test]
fn rows_with_missing_qi_values_form_their_own_classes() {
    let df = Dataset::from_columns(vec![
        (
            "age_band".to_string(),
            vec![Value::Null, Value::Null, Value::from("30-39")],
        ),
        (
            "zip".to_string(),
            vec![Value::from("12345"), Value::from("12345"), Value::Null],
        ),
        (
            "disease".to_string(),
            vec![Value::from("HIV"), Value::from("Flu"), Value::from("HIV")],
        ),
    ])
    .expect("valid dataset");
    let validator = Validator::new(&df);
    let report = validator.k_anonymity(&qi()).expect("k-anonymity");
    // (null, 12345) x2 and (30-39, null) x1.
    assert_eq!(report.k_min, 1);
    assert_eq!(report.size_histogram.get(&2), Some(&1));
    assert_eq!(report.size_histogram.get(&1), Some(&1));
}

#[test]
fn nan_numeric_values_never_abort_the_report() {
    init_tracing();
    let df = Dataset::from_columns(vec![
        (
            "age_band".to_string(),
            vec![
                Value::from("20-29"),
                Value::from("20-29"),
                Value::from("30-39"),
            ],
        ),
        (
            "zip".to_string(),
            vec![Value::from("12345"), Value::from("12345"), Value::from("54321")],
        ),
        (
            "income".to_string(),
            vec![Value::from(1.0), Value::from(2.0), Value::Number(f64::NAN)],
        ),
    ])
    .expect("valid dataset");
    let validator = Validator::new(&df);
    let params = ReportParams::new(qi(), "income");
    let report = validator.full_report(&params, None).expect("report");

    let t = report.t_closeness.as_ok().expect("t-closeness");
    assert!(t.t_max.is_finite());
    assert!(report.behaviour_patterns.is_ok());
    assert!(report.to_json().is_ok());
}

#[test]
fn empty_dataset_still_produces_a_complete_report() {
    let df = Dataset::from_columns(vec![
        ("age_band".to_string(), vec![]),
        ("zip".to_string(), vec![]),
        ("disease".to_string(), vec![]),
    ])
    .expect("valid dataset");
    let validator = Validator::new(&df);
    let params = ReportParams::new(qi(), "disease");
    let report = validator.full_report(&params, None).expect("report");

    let k = report.k_anonymity.as_ok().expect("k-anonymity");
    assert_eq!(k.k_min, 0);
    assert_eq!(k.k_avg, 0.0);
    assert!(k.size_histogram.is_empty());
    assert!(report.risk_flags.is_empty());

    let json: serde_json::Value =
        serde_json::from_str(&report.to_json().expect("render")).expect("parse");
    assert!(json.get("behaviour_patterns").is_some());
}
