//! Validated candidate list for one scan position.

use crate::candidate::record::{cmp_error, MatchCandidate};
use crate::util::{OriMapError, OriMapResult};

/// All candidates for one scan position, grouped by phase.
///
/// Invariants, checked once at construction:
/// - at least one candidate;
/// - the candidates of each phase form one contiguous run;
/// - each run is ascending in `total_error`.
#[derive(Clone, Debug, PartialEq)]
pub struct MatchSet {
    candidates: Vec<MatchCandidate>,
    best: usize,
}

impl MatchSet {
    /// Wraps candidates that are already grouped and sorted.
    pub fn new(candidates: Vec<MatchCandidate>) -> OriMapResult<Self> {
        if candidates.is_empty() {
            return Err(OriMapError::EmptyMatchSet);
        }

        let mut finished_phases: Vec<usize> = Vec::new();
        for (index, pair) in candidates.windows(2).enumerate() {
            let (prev, cand) = (&pair[0], &pair[1]);
            if cand.phase_index() == prev.phase_index() {
                if cand.total_error() < prev.total_error() {
                    return Err(OriMapError::UnsortedCandidates {
                        index: index + 1,
                        phase_index: cand.phase_index(),
                    });
                }
                continue;
            }
            finished_phases.push(prev.phase_index());
            if finished_phases.contains(&cand.phase_index()) {
                return Err(OriMapError::UngroupedPhase {
                    index: index + 1,
                    phase_index: cand.phase_index(),
                });
            }
        }

        let best = (1..candidates.len()).fold(0, |best, idx| {
            if cmp_error(&candidates[idx], &candidates[best]).is_lt() {
                idx
            } else {
                best
            }
        });
        Ok(Self { candidates, best })
    }

    /// Groups candidates by phase (in order of first appearance) and sorts
    /// each group by ascending total error. Equal errors keep input order.
    pub fn sorted(mut candidates: Vec<MatchCandidate>) -> OriMapResult<Self> {
        let mut phase_order: Vec<usize> = Vec::new();
        for cand in &candidates {
            if !phase_order.contains(&cand.phase_index()) {
                phase_order.push(cand.phase_index());
            }
        }
        let rank = |phase: usize| phase_order.iter().position(|&p| p == phase);
        candidates.sort_by(|a, b| {
            rank(a.phase_index())
                .cmp(&rank(b.phase_index()))
                .then_with(|| cmp_error(a, b))
        });
        Self::new(candidates)
    }

    /// Candidates in grouped, error-ascending order.
    pub fn candidates(&self) -> &[MatchCandidate] {
        &self.candidates
    }

    /// Candidate with the lowest total error; the first one on ties.
    pub fn best(&self) -> &MatchCandidate {
        &self.candidates[self.best]
    }

    /// Number of candidates (always at least one).
    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    /// Always `false`; empty sets are rejected at construction.
    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    /// The contiguous, error-ascending run of a phase (empty if absent).
    pub fn phase_run(&self, phase_index: usize) -> &[MatchCandidate] {
        let Some(start) = self
            .candidates
            .iter()
            .position(|c| c.phase_index() == phase_index)
        else {
            return &[];
        };
        let len = self.candidates[start..]
            .iter()
            .take_while(|c| c.phase_index() == phase_index)
            .count();
        &self.candidates[start..start + len]
    }

    /// Number of distinct phases represented.
    pub fn num_phases(&self) -> usize {
        1 + self
            .candidates
            .windows(2)
            .filter(|pair| pair[0].phase_index() != pair[1].phase_index())
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::MatchSet;
    use crate::candidate::record::MatchCandidate;
    use crate::util::OriMapError;
    use nalgebra::Matrix3;

    fn cand(phase: usize, err: f64) -> MatchCandidate {
        MatchCandidate::new(phase, Matrix3::identity(), err).unwrap()
    }

    #[test]
    fn rejects_empty() {
        assert_eq!(MatchSet::new(Vec::new()).err(), Some(OriMapError::EmptyMatchSet));
    }

    #[test]
    fn rejects_descending_error_within_phase() {
        let err = MatchSet::new(vec![cand(0, 0.3), cand(0, 0.1)]).err();
        assert_eq!(
            err,
            Some(OriMapError::UnsortedCandidates {
                index: 1,
                phase_index: 0,
            })
        );
    }

    #[test]
    fn rejects_split_phase_runs() {
        let err = MatchSet::new(vec![cand(0, 0.1), cand(1, 0.2), cand(0, 0.3)]).err();
        assert_eq!(
            err,
            Some(OriMapError::UngroupedPhase {
                index: 2,
                phase_index: 0,
            })
        );
    }

    #[test]
    fn phases_may_interleave_in_error_across_runs() {
        let set = MatchSet::new(vec![cand(1, 0.2), cand(1, 0.4), cand(0, 0.1)]).unwrap();
        assert_eq!(set.num_phases(), 2);
        assert_eq!(set.phase_run(1).len(), 2);
        assert_eq!(set.phase_run(0).len(), 1);
        assert!(set.phase_run(7).is_empty());
    }

    #[test]
    fn sorted_groups_by_first_appearance() {
        let set = MatchSet::sorted(vec![
            cand(1, 0.5),
            cand(0, 0.3),
            cand(1, 0.2),
            cand(0, 0.1),
        ])
        .unwrap();
        let order: Vec<(usize, f64)> = set
            .candidates()
            .iter()
            .map(|c| (c.phase_index(), c.total_error()))
            .collect();
        assert_eq!(order, vec![(1, 0.2), (1, 0.5), (0, 0.1), (0, 0.3)]);
    }

    #[test]
    fn best_is_first_lowest_error_across_runs() {
        let set = MatchSet::new(vec![cand(1, 0.2), cand(1, 0.4), cand(0, 0.1), cand(2, 0.1)])
            .unwrap();
        assert!(std::ptr::eq(set.best(), &set.candidates()[2]));

        let single = MatchSet::new(vec![cand(5, 0.0)]).unwrap();
        assert_eq!(single.best().phase_index(), 5);
    }
}
