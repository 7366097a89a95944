//! Bunge (zxz) Euler angles and their rotation representations.
//!
//! Angles are stored in degrees. The rotation described by `(phi1, Phi, phi2)`
//! is the intrinsic product `Rz(phi1) * Rx(Phi) * Rz(phi2)`, which maps
//! crystal coordinates into the lab frame. Crystal maps always receive the
//! crystal-to-lab quaternion of that product.

use crate::util::math::deg_to_rad3;
use crate::util::{OriMapError, OriMapResult};
use nalgebra::{Matrix3, Rotation3, UnitQuaternion, Vector3};

/// Below this `sin(Phi)` the first and last axes coincide (gimbal lock).
const GIMBAL_EPS: f64 = 4.0 * f64::EPSILON;

/// Tolerance for `R^T R = I` when accepting rotation matrices.
const ORTHONORMAL_TOL: f64 = 1e-6;

/// Bunge Euler triple in degrees.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Euler {
    /// First rotation about z, in degrees.
    pub phi1: f64,
    /// Rotation about the rotated x axis, in degrees.
    pub phi: f64,
    /// Second rotation about the rotated z axis, in degrees.
    pub phi2: f64,
}

impl Euler {
    /// Creates a triple from angles in degrees.
    pub fn new(phi1: f64, phi: f64, phi2: f64) -> Self {
        Self { phi1, phi, phi2 }
    }

    /// Creates a triple from `[phi1, Phi, phi2]` in degrees.
    pub fn from_array(angles_deg: [f64; 3]) -> Self {
        Self::new(angles_deg[0], angles_deg[1], angles_deg[2])
    }

    /// Returns `[phi1, Phi, phi2]` in degrees.
    pub fn to_array(self) -> [f64; 3] {
        [self.phi1, self.phi, self.phi2]
    }

    /// Decomposes a rotation matrix into rotating-frame zxz angles.
    ///
    /// `phi1` and `phi2` fall in `(-180, 180]`, `Phi` in `[0, 180]`. In the
    /// gimbal-locked case the whole in-plane rotation is assigned to `phi2`.
    pub fn from_matrix(m: &Matrix3<f64>) -> Self {
        let sy = (m[(2, 0)] * m[(2, 0)] + m[(2, 1)] * m[(2, 1)]).sqrt();
        let phi = sy.atan2(m[(2, 2)]);
        let (phi1, phi2) = if sy > GIMBAL_EPS {
            (m[(0, 2)].atan2(-m[(1, 2)]), m[(2, 0)].atan2(m[(2, 1)]))
        } else {
            (0.0, (-m[(0, 1)]).atan2(m[(0, 0)]))
        };
        Self::new(phi1.to_degrees(), phi.to_degrees(), phi2.to_degrees())
    }

    /// Decomposes a rotation into rotating-frame zxz angles.
    pub fn from_rotation(rotation: &Rotation3<f64>) -> Self {
        Self::from_matrix(rotation.matrix())
    }

    /// Crystal-to-lab unit quaternion `q(z, phi1) * q(x, Phi) * q(z, phi2)`.
    pub fn to_quaternion(self) -> UnitQuaternion<f64> {
        let [phi1, phi, phi2] = deg_to_rad3(self.to_array());
        UnitQuaternion::from_axis_angle(&Vector3::z_axis(), phi1)
            * UnitQuaternion::from_axis_angle(&Vector3::x_axis(), phi)
            * UnitQuaternion::from_axis_angle(&Vector3::z_axis(), phi2)
    }

    /// Crystal-to-lab rotation matrix.
    pub fn to_rotation(self) -> Rotation3<f64> {
        self.to_quaternion().to_rotation_matrix()
    }
}

/// Accepts a matrix as a rotation if it is finite, orthonormal and proper.
pub(crate) fn rotation_from_matrix(m: Matrix3<f64>) -> OriMapResult<Rotation3<f64>> {
    if m.iter().any(|v| !v.is_finite()) {
        return Err(OriMapError::InvalidRotation {
            reason: "non-finite entries",
        });
    }
    let residual = (m.transpose() * m - Matrix3::identity()).abs().max();
    if residual > ORTHONORMAL_TOL {
        return Err(OriMapError::InvalidRotation {
            reason: "matrix is not orthonormal",
        });
    }
    if m.determinant() <= 0.0 {
        return Err(OriMapError::InvalidRotation {
            reason: "matrix is improper (det <= 0)",
        });
    }
    Ok(Rotation3::from_matrix_unchecked(m))
}

/// Converts per-pixel Euler triples into crystal-to-lab quaternions.
pub fn rotations_from_euler(eulers: &[Euler]) -> Vec<UnitQuaternion<f64>> {
    eulers.iter().map(|e| e.to_quaternion()).collect()
}
