//! Angle helpers shared by orientation handling and library lookup.

/// Wraps an angle in degrees to the range [-180, 180).
pub(crate) fn wrap_deg(angle_deg: f64) -> f64 {
    let mut wrapped = angle_deg % 360.0;
    if wrapped < -180.0 {
        wrapped += 360.0;
    }
    if wrapped >= 180.0 {
        wrapped -= 360.0;
    }
    wrapped
}

/// Absolute circular difference between two angles in degrees.
pub(crate) fn angle_diff_deg(a: f64, b: f64) -> f64 {
    wrap_deg(a - b).abs()
}

/// Converts a Euler triple from degrees to radians.
pub(crate) fn deg_to_rad3(angles_deg: [f64; 3]) -> [f64; 3] {
    angles_deg.map(f64::to_radians)
}

#[cfg(test)]
mod tests {
    use super::{angle_diff_deg, deg_to_rad3, wrap_deg};

    #[test]
    fn wrap_deg_maps_to_expected_range() {
        assert!((wrap_deg(181.0) + 179.0).abs() < 1e-12);
        assert!((wrap_deg(-181.0) - 179.0).abs() < 1e-12);
        assert!((wrap_deg(540.0) + 180.0).abs() < 1e-12);
    }

    #[test]
    fn angle_diff_is_circular() {
        assert!((angle_diff_deg(179.0, -179.0) - 2.0).abs() < 1e-12);
        assert!((angle_diff_deg(360.0, 0.0)).abs() < 1e-12);
        assert!((angle_diff_deg(10.0, 30.0) - 20.0).abs() < 1e-12);
    }

    #[test]
    fn deg_to_rad3_converts_each_component() {
        let rad = deg_to_rad3([180.0, 90.0, 0.0]);
        assert!((rad[0] - std::f64::consts::PI).abs() < 1e-12);
        assert!((rad[1] - std::f64::consts::FRAC_PI_2).abs() < 1e-12);
        assert_eq!(rad[2], 0.0);
    }
}
