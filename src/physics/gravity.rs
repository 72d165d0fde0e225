use nalgebra::Vector3;

use crate::physics::body::Body;

/// Point-mass gravitational acceleration at an ECI position (inward).
pub fn gravity_accel(body: &Body, r: &Vector3<f64>) -> Vector3<f64> {
    let rm = r.norm();
    if rm < 1.0 {
        return Vector3::zeros();
    }
    -body.mu / (rm * rm * rm) * r
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn surface_gravity_magnitude() {
        let body = Body::earth();
        let r = Vector3::new(body.radius, 0.0, 0.0);
        let g = gravity_accel(&body, &r);
        assert_abs_diff_eq!(g.norm(), body.mu / body.radius.powi(2), epsilon = 1e-9);
        assert!(g.x < 0.0, "gravity must point toward the body center");
    }

    #[test]
    fn gravity_decreases_with_altitude() {
        let body = Body::earth();
        let g0 = gravity_accel(&body, &Vector3::new(body.radius, 0.0, 0.0)).norm();
        let g1 = gravity_accel(&body, &Vector3::new(body.radius + 400_000.0, 0.0, 0.0)).norm();
        assert!(g1 < g0);
    }
}
