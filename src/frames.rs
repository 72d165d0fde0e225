use nalgebra::Vector3;

// ---------------------------------------------------------------------------
// Local co-rotating frames built from (r, v)
// ---------------------------------------------------------------------------

/// `v/|v|` when the norm is positive, the vector unchanged otherwise.
pub fn unit(v: Vector3<f64>) -> Vector3<f64> {
    let n = v.norm();
    if n > 0.0 {
        v / n
    } else {
        v
    }
}

/// A local steering basis of three orthonormal rows.
///
/// Thrust directions are built from pitch and yaw against the rows:
/// pitch is measured from row 1 (up/radial), yaw from row 3 (east/circum)
/// toward row 2 (north/normal).
pub trait SteeringFrame {
    fn rows(&self) -> [Vector3<f64>; 3];

    /// Unit thrust direction for the given commands (degrees).
    /// Pitch 0 points along row 1; pitch 90 / yaw 0 along row 3;
    /// pitch 90 / yaw 90 along row 2.
    fn thrust_vector(&self, pitch_deg: f64, yaw_deg: f64) -> Vector3<f64> {
        let [r1, r2, r3] = self.rows();
        let p = pitch_deg.to_radians();
        let y = yaw_deg.to_radians();
        r1 * p.cos() + r2 * (p.sin() * y.sin()) + r3 * (p.sin() * y.cos())
    }

    /// Inverse of `thrust_vector`: (pitch, yaw) in degrees of a unit vector.
    fn angles_of(&self, u: &Vector3<f64>) -> (f64, f64) {
        let [r1, r2, r3] = self.rows();
        let pitch = u.dot(&r1).clamp(-1.0, 1.0).acos().to_degrees();
        let yaw = u.dot(&r2).atan2(u.dot(&r3)).to_degrees();
        (pitch, yaw)
    }
}

// ---------------------------------------------------------------------------
// Navball frame: up / north / east
// ---------------------------------------------------------------------------

/// Radial/north/east basis. "East" is the direction of the planet's
/// surface-rotation velocity under the vehicle; "north" completes the
/// right-handed set.
#[derive(Debug, Clone, Copy)]
pub struct NavballFrame {
    pub up: Vector3<f64>,
    pub north: Vector3<f64>,
    pub east: Vector3<f64>,
}

impl NavballFrame {
    pub fn from_state(r: &Vector3<f64>, v: &Vector3<f64>) -> Self {
        let up = unit(*r);
        let r_xy = Vector3::new(r.x, r.y, 0.0);
        let v_xy = Vector3::new(v.x, v.y, 0.0);

        // Pseudo-north is the equatorial-projection angular momentum axis.
        // Degenerate when the projections are parallel or vanish (polar
        // geometry): substitute the ECI spin axis.
        let mut pseudo_north = r_xy.cross(&v_xy);
        if pseudo_north.norm() == 0.0 {
            pseudo_north = Vector3::z();
        }
        let pseudo_north = unit(pseudo_north);

        // Exactly over a pole the equatorial projection of r vanishes too;
        // substitute the ECI +x axis.
        let r_xy_hat = if r_xy.norm() > 0.0 {
            unit(r_xy)
        } else {
            Vector3::x()
        };

        let east = pseudo_north.cross(&r_xy_hat);
        let north = up.cross(&east);
        Self { up, north, east }
    }
}

impl SteeringFrame for NavballFrame {
    fn rows(&self) -> [Vector3<f64>; 3] {
        [self.up, self.north, self.east]
    }
}

// ---------------------------------------------------------------------------
// Circumferential (RNC) frame: radial / normal / circumferential
// ---------------------------------------------------------------------------

/// Radial/normal/circumferential basis. "Normal" is perpendicular to the
/// instantaneous orbital plane; "circum" is the in-plane horizontal.
#[derive(Debug, Clone, Copy)]
pub struct RncFrame {
    pub radial: Vector3<f64>,
    pub normal: Vector3<f64>,
    pub circum: Vector3<f64>,
}

impl RncFrame {
    pub fn from_state(r: &Vector3<f64>, v: &Vector3<f64>) -> Self {
        let radial = unit(*r);

        // r ∥ v (purely radial flight) leaves the orbital plane undefined;
        // substitute an equatorial-ish normal, falling back to +y for a
        // position on the spin axis itself.
        let mut normal = r.cross(v);
        if normal.norm() == 0.0 {
            normal = Vector3::z().cross(&radial);
            if normal.norm() == 0.0 {
                normal = Vector3::y();
            }
        }
        let normal = unit(normal);
        let circum = normal.cross(&radial);
        Self { radial, normal, circum }
    }
}

impl SteeringFrame for RncFrame {
    fn rows(&self) -> [Vector3<f64>; 3] {
        [self.radial, self.normal, self.circum]
    }
}

/// Cosine of the rotation between the two frames' horizontal rows; used to
/// relate guidance outputs expressed in one frame to the other.
pub fn frame_rotation(rnc: &RncFrame, nav: &NavballFrame) -> f64 {
    rnc.circum.dot(&nav.east)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    const TOL: f64 = 1e-9;

    fn assert_orthonormal(rows: [Vector3<f64>; 3]) {
        for (i, a) in rows.iter().enumerate() {
            assert_abs_diff_eq!(a.norm(), 1.0, epsilon = TOL);
            for b in rows.iter().skip(i + 1) {
                assert_abs_diff_eq!(a.dot(b), 0.0, epsilon = TOL);
            }
        }
    }

    #[test]
    fn unit_of_zero_is_zero() {
        assert_eq!(unit(Vector3::zeros()), Vector3::zeros());
        let v = unit(Vector3::new(3.0, 4.0, 0.0));
        assert_abs_diff_eq!(v.norm(), 1.0, epsilon = TOL);
    }

    #[test]
    fn equatorial_eastward_frame() {
        let r = Vector3::new(6_371_000.0, 0.0, 0.0);
        let v = Vector3::new(0.0, 465.0, 0.0);
        let nav = NavballFrame::from_state(&r, &v);
        assert_abs_diff_eq!(nav.up.x, 1.0, epsilon = TOL);
        assert_abs_diff_eq!(nav.east.y, 1.0, epsilon = TOL);
        assert_abs_diff_eq!(nav.north.z, 1.0, epsilon = TOL);
        assert_orthonormal(nav.rows());
    }

    #[test]
    fn frames_orthonormal_in_general_position() {
        let r = Vector3::new(5_000_000.0, 3_000_000.0, 2_000_000.0);
        let v = Vector3::new(-1_200.0, 6_900.0, 800.0);
        assert_orthonormal(NavballFrame::from_state(&r, &v).rows());
        assert_orthonormal(RncFrame::from_state(&r, &v).rows());
    }

    #[test]
    fn rnc_normal_matches_angular_momentum() {
        let r = Vector3::new(6_500_000.0, 0.0, 0.0);
        let v = Vector3::new(0.0, 7_000.0, 1_000.0);
        let rnc = RncFrame::from_state(&r, &v);
        let h = unit(r.cross(&v));
        assert_abs_diff_eq!(rnc.normal.dot(&h), 1.0, epsilon = TOL);
    }

    #[test]
    fn polar_position_stays_finite() {
        // Over the pole with zero horizontal velocity: tie-break axes apply.
        let r = Vector3::new(0.0, 0.0, 6_371_000.0);
        let v = Vector3::new(0.0, 0.0, 10.0);
        let nav = NavballFrame::from_state(&r, &v);
        for row in nav.rows() {
            assert!(row.iter().all(|c| c.is_finite()), "non-finite row {row:?}");
        }
        assert_orthonormal(nav.rows());
        let rnc = RncFrame::from_state(&r, &v);
        assert_orthonormal(rnc.rows());
    }

    #[test]
    fn thrust_vector_pitch_yaw_conventions() {
        let r = Vector3::new(6_371_000.0, 0.0, 0.0);
        let v = Vector3::new(0.0, 465.0, 0.0);
        let nav = NavballFrame::from_state(&r, &v);

        // Pitch 0 = straight up, pitch 90/yaw 0 = due east, yaw 90 = due north.
        assert_abs_diff_eq!(nav.thrust_vector(0.0, 0.0).dot(&nav.up), 1.0, epsilon = TOL);
        assert_abs_diff_eq!(nav.thrust_vector(90.0, 0.0).dot(&nav.east), 1.0, epsilon = TOL);
        assert_abs_diff_eq!(nav.thrust_vector(90.0, 90.0).dot(&nav.north), 1.0, epsilon = TOL);
        assert_abs_diff_eq!(nav.thrust_vector(37.0, 12.0).norm(), 1.0, epsilon = TOL);
    }

    #[test]
    fn angles_of_inverts_thrust_vector() {
        let r = Vector3::new(6_371_000.0, 0.0, 0.0);
        let v = Vector3::new(0.0, 7_400.0, 0.0);
        let nav = NavballFrame::from_state(&r, &v);
        let u = nav.thrust_vector(28.0, 55.0);
        let (p, y) = nav.angles_of(&u);
        assert_abs_diff_eq!(p, 28.0, epsilon = 1e-9);
        assert_abs_diff_eq!(y, 55.0, epsilon = 1e-9);
    }

    #[test]
    fn frame_rotation_unity_for_equatorial_prograde() {
        let r = Vector3::new(6_371_000.0, 0.0, 0.0);
        let v = Vector3::new(0.0, 7_400.0, 0.0);
        let rnc = RncFrame::from_state(&r, &v);
        let nav = NavballFrame::from_state(&r, &v);
        assert_abs_diff_eq!(frame_rotation(&rnc, &nav), 1.0, epsilon = TOL);
    }
}
