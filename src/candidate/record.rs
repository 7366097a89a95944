//! A single phase/orientation candidate produced by vector matching.

use crate::orientation::{rotation_from_matrix, Euler};
use crate::util::{OriMapError, OriMapResult};
use nalgebra::{Matrix3, Rotation3};
use std::cmp::Ordering;

/// One phase/orientation hypothesis with its fit quality.
#[derive(Clone, Debug, PartialEq)]
pub struct MatchCandidate {
    phase_index: usize,
    rotation: Rotation3<f64>,
    match_rate: f64,
    error_hkls: Vec<f64>,
    total_error: f64,
}

impl MatchCandidate {
    /// Creates a candidate from a rotation matrix and its total error.
    ///
    /// The matrix must be a proper rotation and `total_error` must be finite
    /// and non-negative. `match_rate` defaults to 0 and `error_hkls` to empty.
    pub fn new(phase_index: usize, rotation: Matrix3<f64>, total_error: f64) -> OriMapResult<Self> {
        let rotation = rotation_from_matrix(rotation)?;
        if !total_error.is_finite() || total_error < 0.0 {
            return Err(OriMapError::InvalidInput {
                reason: "total_error must be finite and >= 0",
            });
        }
        Ok(Self {
            phase_index,
            rotation,
            match_rate: 0.0,
            error_hkls: Vec::new(),
            // folds -0.0 into +0.0
            total_error: total_error + 0.0,
        })
    }

    /// Creates a candidate from Bunge Euler angles in degrees.
    pub fn from_euler(phase_index: usize, euler: Euler, total_error: f64) -> OriMapResult<Self> {
        Self::new(phase_index, euler.to_rotation().into_inner(), total_error)
    }

    /// Sets the fraction of observed vectors matched, in `[0, 1]`.
    pub fn with_match_rate(mut self, match_rate: f64) -> OriMapResult<Self> {
        if !(0.0..=1.0).contains(&match_rate) {
            return Err(OriMapError::InvalidInput {
                reason: "match_rate must lie in [0, 1]",
            });
        }
        self.match_rate = match_rate;
        Ok(self)
    }

    /// Sets the per-reflection errors.
    pub fn with_error_hkls(mut self, error_hkls: Vec<f64>) -> Self {
        self.error_hkls = error_hkls;
        self
    }

    /// Index of the phase in the diffraction library.
    pub fn phase_index(&self) -> usize {
        self.phase_index
    }

    /// Crystal-to-lab rotation.
    pub fn rotation(&self) -> &Rotation3<f64> {
        &self.rotation
    }

    /// Rotation as Bunge Euler angles in degrees.
    pub fn euler(&self) -> Euler {
        Euler::from_rotation(&self.rotation)
    }

    /// Fraction of observed vectors matched.
    pub fn match_rate(&self) -> f64 {
        self.match_rate
    }

    /// Per-reflection errors.
    pub fn error_hkls(&self) -> &[f64] {
        &self.error_hkls
    }

    /// Scalar badness of fit; lower is better.
    pub fn total_error(&self) -> f64 {
        self.total_error
    }
}

/// Orders candidates by ascending total error.
pub(crate) fn cmp_error(a: &MatchCandidate, b: &MatchCandidate) -> Ordering {
    a.total_error.total_cmp(&b.total_error)
}
