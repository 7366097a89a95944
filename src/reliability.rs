//! Phase and orientation reliability scoring.
//!
//! Both metrics are percentages contrasting the best total error with a
//! runner-up: 100 means the runner-up is infinitely worse, values near 0 mean
//! a near tie. Values are not clamped; a negative result signals a runner-up
//! that fits better than the best candidate.

use crate::candidate::select::Selection;

/// Property name of [`ReliabilityMetrics::match_rate`].
pub const MATCH_RATE: &str = "match_rate";
/// Property name of [`ReliabilityMetrics::total_error`].
pub const TOTAL_ERROR: &str = "total_error";
/// Property name of [`ReliabilityMetrics::phase_reliability`].
pub const PHASE_RELIABILITY: &str = "phase_reliability";
/// Property name of [`ReliabilityMetrics::orientation_reliability`].
pub const ORIENTATION_RELIABILITY: &str = "orientation_reliability";

/// Fit metrics of the best candidate at one scan position.
#[derive(Clone, Debug, PartialEq)]
pub struct ReliabilityMetrics {
    /// Fraction of observed vectors matched by the best candidate.
    pub match_rate: f64,
    /// Per-reflection errors of the best candidate.
    pub ehkls: Vec<f64>,
    /// Total error of the best candidate.
    pub total_error: f64,
    /// Present only when another phase was matched.
    pub phase_reliability: Option<f64>,
    /// Absent only when the match set has a single candidate.
    pub orientation_reliability: Option<f64>,
}

impl ReliabilityMetrics {
    /// Named scalar properties present on this record, in a fixed order.
    ///
    /// `ehkls` is a sequence and therefore not listed.
    pub fn scalar_properties(&self) -> Vec<(&'static str, f64)> {
        let mut props = vec![(MATCH_RATE, self.match_rate), (TOTAL_ERROR, self.total_error)];
        if let Some(value) = self.phase_reliability {
            props.push((PHASE_RELIABILITY, value));
        }
        if let Some(value) = self.orientation_reliability {
            props.push((ORIENTATION_RELIABILITY, value));
        }
        props
    }
}

/// `100 * (1 - best / second)` for the best candidate of another phase.
pub fn phase_reliability(best_error: f64, second_error: f64) -> f64 {
    100.0 * (1.0 - best_error / second_error)
}

/// `100 * (1 - best / second)`, with a zero `second` replaced by `1.0`.
pub fn orientation_reliability(best_error: f64, second_error: f64) -> f64 {
    let denom = if second_error == 0.0 { 1.0 } else { second_error };
    100.0 * (1.0 - best_error / denom)
}

/// Scores a selection.
pub fn score(selection: &Selection<'_>) -> ReliabilityMetrics {
    let best = selection.best;
    ReliabilityMetrics {
        match_rate: best.match_rate(),
        ehkls: best.error_hkls().to_vec(),
        total_error: best.total_error(),
        phase_reliability: selection
            .second_cross_phase
            .map(|second| phase_reliability(best.total_error(), second.total_error())),
        orientation_reliability: selection
            .second_same_phase
            .map(|second| orientation_reliability(best.total_error(), second.total_error())),
    }
}
