//! 3-vector alias and rigid-motion helpers shared by mesh, wake and solver.

use nalgebra::{Matrix3, Rotation3, Vector3};

use crate::Real;

/// Cartesian 3-vector used for positions, velocities and angles.
pub type Vec3 = Vector3<Real>;

/// Revolutions per minute to radians per second.
pub const RPM_TO_RAD_PER_S: Real = 2.0 * std::f64::consts::PI / 60.0;

/// Convert a per-axis angle triple from degrees to radians.
pub fn deg_to_rad(angles: &Vec3) -> Vec3 {
    angles.map(Real::to_radians)
}

/// Rotation matrix for per-axis angles in radians, applied about x, then y, then z.
pub fn rotation_matrix(angles_rad: &Vec3) -> Matrix3<Real> {
    Rotation3::from_euler_angles(angles_rad.x, angles_rad.y, angles_rad.z).into_inner()
}

/// Unit vector in the direction of `v`, or `None` for a (near) zero vector.
pub fn unit_or_none(v: &Vec3, eps: Real) -> Option<Vec3> {
    let n = v.norm();
    if n > eps { Some(v / n) } else { None }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quarter_turn_about_y() {
        let r = rotation_matrix(&Vec3::new(0.0, std::f64::consts::FRAC_PI_2, 0.0));
        let p = r * Vec3::new(1.0, 0.0, 0.0);
        assert!((p - Vec3::new(0.0, 0.0, -1.0)).norm() < 1e-12);
    }

    #[test]
    fn degrees_convert_per_axis() {
        let r = deg_to_rad(&Vec3::new(180.0, -5.0, 0.0));
        assert!((r.x - std::f64::consts::PI).abs() < 1e-15);
        assert!((r.y + 5.0_f64.to_radians()).abs() < 1e-15);
        assert_eq!(r.z, 0.0);
    }

    #[test]
    fn rpm_factor() {
        assert!((60.0 * RPM_TO_RAD_PER_S - 2.0 * std::f64::consts::PI).abs() < 1e-12);
    }

    #[test]
    fn unit_of_zero_is_none() {
        assert!(unit_or_none(&Vec3::zeros(), 1e-12).is_none());
        let u = unit_or_none(&Vec3::new(3.0, 0.0, 4.0), 1e-12).unwrap();
        assert!((u.norm() - 1.0).abs() < 1e-15);
    }
}
