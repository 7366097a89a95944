//! Best and second-best candidate selection for vector matching.

use crate::candidate::matchset::MatchSet;
use crate::candidate::record::{cmp_error, MatchCandidate};

/// Best candidate plus the two runner-up references used for reliability.
#[derive(Clone, Copy, Debug)]
pub struct Selection<'a> {
    /// Globally lowest total error; the first one on ties.
    pub best: &'a MatchCandidate,
    /// Lowest-error candidate of any other phase.
    pub second_cross_phase: Option<&'a MatchCandidate>,
    /// Next candidate of the best phase, or the global runner-up when the
    /// best phase has a single candidate.
    pub second_same_phase: Option<&'a MatchCandidate>,
}

/// Selects the best candidate and its runner-ups.
///
/// The same-phase fallback ranks every candidate regardless of phase, so it
/// can return the same candidate as `second_cross_phase`.
pub fn select(set: &MatchSet) -> Selection<'_> {
    let candidates = set.candidates();
    let best = set.best();

    let second_cross_phase = candidates
        .iter()
        .filter(|c| c.phase_index() != best.phase_index())
        .min_by(|a, b| cmp_error(a, b));

    let run = set.phase_run(best.phase_index());
    debug_assert!(run.first().is_some_and(|first| std::ptr::eq(first, best)));
    let second_same_phase = if run.len() > 1 {
        run.get(1)
    } else {
        nth_by_error(candidates, 1)
    };

    Selection {
        best,
        second_cross_phase,
        second_same_phase,
    }
}

/// Returns the `rank`-th candidate by ascending error, stable on ties.
pub(crate) fn nth_by_error(candidates: &[MatchCandidate], rank: usize) -> Option<&MatchCandidate> {
    let mut ranked: Vec<&MatchCandidate> = candidates.iter().collect();
    ranked.sort_by(|a, b| cmp_error(a, b));
    ranked.get(rank).copied()
}
