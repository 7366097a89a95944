//! Reduction of recorded indexation scenarios loaded from JSON fixtures.
//!
//! Each case lists the raw candidates of one scan position together with the
//! expected best phase, orientation and reliability metrics.

use orimap::{
    crystal_from_template_matching, crystal_from_vector_matching, Euler, MatchCandidate, MatchSet,
    TemplateMatches,
};
use serde::Deserialize;
use std::fs;
use std::path::PathBuf;

/// Metric tolerance in percent.
const RELIABILITY_TOLERANCE: f64 = 1e-9;

/// Angle tolerance in degrees.
const ANGLE_TOLERANCE_DEG: f64 = 1e-9;

#[derive(Debug, Deserialize)]
struct Candidate {
    phase: usize,
    euler_deg: [f64; 3],
    total_error: f64,
    #[serde(default)]
    match_rate: f64,
}

#[derive(Debug, Deserialize)]
struct VectorExpected {
    phase: usize,
    euler_deg: [f64; 3],
    total_error: f64,
    match_rate: f64,
    phase_reliability: Option<f64>,
    orientation_reliability: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct VectorCase {
    case_id: String,
    candidates: Vec<Candidate>,
    expected: VectorExpected,
}

#[derive(Debug, Deserialize)]
struct TemplateExpected {
    phase: usize,
    euler_deg: [f64; 3],
    score: f64,
}

#[derive(Debug, Deserialize)]
struct TemplateCase {
    case_id: String,
    phase: Vec<f64>,
    phi1: Vec<f64>,
    phi: Vec<f64>,
    phi2: Vec<f64>,
    score: Vec<f64>,
    expected: TemplateExpected,
}

#[derive(Debug, Deserialize)]
struct Scenarios {
    vector_cases: Vec<VectorCase>,
    template_cases: Vec<TemplateCase>,
}

fn load_scenarios() -> Scenarios {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/data/scenarios.json");
    let text = fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("failed to read {}: {e}", path.display()));
    serde_json::from_str(&text).expect("failed to parse scenarios")
}

fn angles_close(actual: Euler, expected: [f64; 3]) -> bool {
    actual.to_array().iter().zip(expected).all(|(&a, e)| {
        let d = (a - e).rem_euclid(360.0);
        d.min(360.0 - d) <= ANGLE_TOLERANCE_DEG
    })
}

fn option_close(actual: Option<f64>, expected: Option<f64>) -> bool {
    match (actual, expected) {
        (Some(a), Some(e)) => (a - e).abs() <= RELIABILITY_TOLERANCE,
        (None, None) => true,
        _ => false,
    }
}

#[test]
fn vector_cases_reduce_to_expected_metrics() {
    let scenarios = load_scenarios();
    assert!(!scenarios.vector_cases.is_empty());
    for case in &scenarios.vector_cases {
        let candidates = case
            .candidates
            .iter()
            .map(|c| {
                MatchCandidate::from_euler(c.phase, Euler::from_array(c.euler_deg), c.total_error)
                    .and_then(|cand| cand.with_match_rate(c.match_rate))
            })
            .collect::<Result<Vec<_>, _>>()
            .unwrap_or_else(|e| panic!("{}: invalid candidate: {e}", case.case_id));
        let set = MatchSet::sorted(candidates).unwrap();
        let result = crystal_from_vector_matching(&set);
        let m = result.metrics();
        let exp = &case.expected;

        assert_eq!(result.phase_index(), exp.phase, "{}: phase", case.case_id);
        assert!(
            angles_close(result.orientation(), exp.euler_deg),
            "{}: orientation {:?} != {:?}",
            case.case_id,
            result.orientation(),
            exp.euler_deg
        );
        assert_eq!(m.total_error, exp.total_error, "{}: total_error", case.case_id);
        assert_eq!(m.match_rate, exp.match_rate, "{}: match_rate", case.case_id);
        assert!(
            option_close(m.phase_reliability, exp.phase_reliability),
            "{}: phase_reliability {:?} != {:?}",
            case.case_id,
            m.phase_reliability,
            exp.phase_reliability
        );
        assert!(
            option_close(m.orientation_reliability, exp.orientation_reliability),
            "{}: orientation_reliability {:?} != {:?}",
            case.case_id,
            m.orientation_reliability,
            exp.orientation_reliability
        );
    }
}

#[test]
fn template_cases_pick_expected_column() {
    let scenarios = load_scenarios();
    assert!(!scenarios.template_cases.is_empty());
    for case in &scenarios.template_cases {
        let n = case.score.len();
        let data: Vec<f64> = [&case.phase, &case.phi1, &case.phi, &case.phi2, &case.score]
            .into_iter()
            .flat_map(|channel| channel.iter().copied())
            .collect();
        let table = TemplateMatches::new(data, n)
            .unwrap_or_else(|e| panic!("{}: invalid table: {e}", case.case_id));
        let best = crystal_from_template_matching(&table);
        assert_eq!(best.phase_index, case.expected.phase, "{}", case.case_id);
        assert_eq!(best.euler.to_array(), case.expected.euler_deg, "{}", case.case_id);
        assert_eq!(best.score, case.expected.score, "{}", case.case_id);
    }
}
