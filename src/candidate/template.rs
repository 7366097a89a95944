//! Per-pixel template-matching results stored as a channel table.
//!
//! The table is channel-major with `TEMPLATE_CHANNELS` rows and one column
//! per match: `[phase, phi1, Phi, phi2, score]`, angles in degrees.

use crate::orientation::Euler;
use crate::util::{OriMapError, OriMapResult};

/// Number of channels per template match.
pub const TEMPLATE_CHANNELS: usize = 5;

const PHASE: usize = 0;
const SCORE: usize = 4;

/// Channel-major `5 x n` table of template matches for one scan position.
#[derive(Clone, Debug, PartialEq)]
pub struct TemplateMatches {
    data: Vec<f64>,
    n_matches: usize,
}

/// One column of a template table, decoded.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TemplateMatch {
    /// Index of the phase in the diffraction library.
    pub phase_index: usize,
    /// Orientation in Bunge Euler angles (degrees).
    pub euler: Euler,
    /// Correlation score; higher is better.
    pub score: f64,
}

impl TemplateMatches {
    /// Wraps a channel-major buffer of `5 * n_matches` values.
    ///
    /// All values must be finite and the phase channel must hold
    /// non-negative integers.
    pub fn new(data: Vec<f64>, n_matches: usize) -> OriMapResult<Self> {
        if n_matches == 0 {
            return Err(OriMapError::InvalidInput {
                reason: "template table needs at least one match",
            });
        }
        let expected = n_matches.checked_mul(TEMPLATE_CHANNELS).ok_or(
            OriMapError::LengthMismatch {
                expected: usize::MAX,
                got: data.len(),
                context: "template table",
            },
        )?;
        if data.len() != expected {
            return Err(OriMapError::LengthMismatch {
                expected,
                got: data.len(),
                context: "template table",
            });
        }
        if data.iter().any(|v| !v.is_finite()) {
            return Err(OriMapError::InvalidInput {
                reason: "template table holds non-finite values",
            });
        }
        let table = Self { data, n_matches };
        if table
            .channel(PHASE)
            .iter()
            .any(|&p| p < 0.0 || p.fract() != 0.0)
        {
            return Err(OriMapError::InvalidInput {
                reason: "phase channel must hold non-negative integers",
            });
        }
        Ok(table)
    }

    /// Builds a table from decoded matches.
    pub fn from_matches(matches: &[TemplateMatch]) -> OriMapResult<Self> {
        let n = matches.len();
        let mut data = vec![0.0; TEMPLATE_CHANNELS * n];
        for (col, m) in matches.iter().enumerate() {
            let values = [
                m.phase_index as f64,
                m.euler.phi1,
                m.euler.phi,
                m.euler.phi2,
                m.score,
            ];
            for (channel, value) in values.into_iter().enumerate() {
                data[channel * n + col] = value;
            }
        }
        Self::new(data, n)
    }

    /// Number of matches (columns).
    pub fn len(&self) -> usize {
        self.n_matches
    }

    /// Always `false`; empty tables are rejected at construction.
    pub fn is_empty(&self) -> bool {
        self.n_matches == 0
    }

    /// Returns the channel-major backing buffer.
    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }

    /// Returns one channel across all matches.
    ///
    /// # Panics
    /// Panics if `channel >= TEMPLATE_CHANNELS`.
    pub fn channel(&self, channel: usize) -> &[f64] {
        let start = channel * self.n_matches;
        &self.data[start..start + self.n_matches]
    }

    /// Score channel.
    pub fn scores(&self) -> &[f64] {
        self.channel(SCORE)
    }

    /// Decodes one column.
    pub fn column(&self, col: usize) -> Option<TemplateMatch> {
        (col < self.n_matches).then(|| self.decode(col))
    }

    /// Column of the highest score; the first one on ties.
    pub fn best_column(&self) -> usize {
        let scores = self.scores();
        let mut best = 0usize;
        for (idx, &score) in scores.iter().enumerate().skip(1) {
            if score > scores[best] {
                best = idx;
            }
        }
        best
    }

    /// Column of the `rank`-th highest score (rank 0 is the best).
    pub fn nth_best_column(&self, rank: usize) -> Option<usize> {
        if rank == 0 {
            return Some(self.best_column());
        }
        let scores = self.scores();
        let mut order: Vec<usize> = (0..self.n_matches).collect();
        order.sort_by(|&a, &b| scores[b].total_cmp(&scores[a]));
        order.get(rank).copied()
    }

    /// Decoded best match.
    pub fn best(&self) -> TemplateMatch {
        self.decode(self.best_column())
    }

    fn decode(&self, col: usize) -> TemplateMatch {
        let at = |channel: usize| self.data[channel * self.n_matches + col];
        TemplateMatch {
            phase_index: at(PHASE) as usize,
            euler: Euler::new(at(1), at(2), at(3)),
            score: at(SCORE),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{TemplateMatch, TemplateMatches};
    use crate::orientation::Euler;
    use crate::util::OriMapError;

    fn two_column_table() -> TemplateMatches {
        // [phase, alpha, beta, gamma, score] rows, two matches
        TemplateMatches::new(
            vec![0.0, 1.0, 10.0, 20.0, 5.0, 15.0, 1.0, 2.0, 0.8, 0.95],
            2,
        )
        .unwrap()
    }

    #[test]
    fn best_column_is_highest_score() {
        let table = two_column_table();
        assert_eq!(table.best_column(), 1);
        let best = table.best();
        assert_eq!(best.phase_index, 1);
        assert_eq!(best.euler, Euler::new(20.0, 15.0, 2.0));
        assert_eq!(best.score, 0.95);
    }

    #[test]
    fn ties_keep_first_column() {
        let table = TemplateMatches::new(vec![0.0, 1.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.5, 0.5], 2)
            .unwrap();
        assert_eq!(table.best_column(), 0);
    }

    #[test]
    fn nth_best_orders_by_descending_score() {
        let table = TemplateMatches::from_matches(&[
            TemplateMatch {
                phase_index: 0,
                euler: Euler::default(),
                score: 0.2,
            },
            TemplateMatch {
                phase_index: 1,
                euler: Euler::default(),
                score: 0.9,
            },
            TemplateMatch {
                phase_index: 2,
                euler: Euler::default(),
                score: 0.5,
            },
        ])
        .unwrap();
        assert_eq!(table.nth_best_column(0), Some(1));
        assert_eq!(table.nth_best_column(1), Some(2));
        assert_eq!(table.nth_best_column(2), Some(0));
        assert_eq!(table.nth_best_column(3), None);
    }

    #[test]
    fn rejects_malformed_tables() {
        assert_eq!(
            TemplateMatches::new(vec![0.0; 9], 2).err(),
            Some(OriMapError::LengthMismatch {
                expected: 10,
                got: 9,
                context: "template table",
            })
        );
        assert!(TemplateMatches::new(vec![0.5, 0.0, 0.0, 0.0, 1.0], 1).is_err());
        assert!(TemplateMatches::new(vec![0.0, 0.0, 0.0, 0.0, f64::NAN], 1).is_err());
        assert!(TemplateMatches::new(Vec::new(), 0).is_err());
    }

    #[test]
    fn oversized_match_count_is_a_length_mismatch() {
        assert_eq!(
            TemplateMatches::new(Vec::new(), usize::MAX).err(),
            Some(OriMapError::LengthMismatch {
                expected: usize::MAX,
                got: 0,
                context: "template table",
            })
        );
    }
}
