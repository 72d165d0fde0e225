use nalgebra::Vector3;

// ---------------------------------------------------------------------------
// Classical orbital elements
// ---------------------------------------------------------------------------

/// Classical Keplerian elements of the terminal (or any) state.
///
/// Angles in radians. The gravitational parameter is always passed in
/// explicitly; nothing here assumes a particular central body.
#[derive(Debug, Clone, Copy)]
pub struct KeplerianElements {
    pub sma: f64,          // semi-major axis, m
    pub ecc: f64,          // eccentricity (0 = circular)
    pub inc: f64,          // inclination, rad
    pub lan: f64,          // longitude of ascending node, rad
    pub aop: f64,          // argument of periapsis, rad
    pub true_anomaly: f64, // rad
}

impl KeplerianElements {
    /// Elements from an ECI state vector.
    pub fn from_state_vector(pos: &Vector3<f64>, vel: &Vector3<f64>, mu: f64) -> Self {
        let r = pos.norm();
        let v = vel.norm();

        // Angular momentum
        let h = pos.cross(vel);
        let h_mag = h.norm();

        // Node vector
        let n = Vector3::new(-h.y, h.x, 0.0);
        let n_mag = n.norm();

        // Eccentricity vector
        let e_vec = ((v * v - mu / r) * pos - pos.dot(vel) * vel) / mu;
        let ecc = e_vec.norm();

        // Semi-major axis
        let energy = 0.5 * v * v - mu / r;
        let sma = if ecc.abs() < 1.0 - 1e-10 {
            -mu / (2.0 * energy)
        } else {
            h_mag * h_mag / (mu * (1.0 - ecc * ecc).abs())
        };

        // Inclination; a degenerate (radial) trajectory has no plane.
        let inc = if h_mag > 1e-10 {
            (h.z / h_mag).clamp(-1.0, 1.0).acos()
        } else {
            0.0
        };

        // Longitude of ascending node
        let lan = if n_mag > 1e-10 {
            let o = (n.x / n_mag).clamp(-1.0, 1.0).acos();
            if n.y < 0.0 { 2.0 * std::f64::consts::PI - o } else { o }
        } else {
            0.0
        };

        // Argument of periapsis
        let aop = if n_mag > 1e-10 && ecc > 1e-10 {
            let cos_aop = (n.dot(&e_vec) / (n_mag * ecc)).clamp(-1.0, 1.0);
            let w = cos_aop.acos();
            if e_vec.z < 0.0 { 2.0 * std::f64::consts::PI - w } else { w }
        } else {
            0.0
        };

        // True anomaly
        let true_anomaly = if ecc > 1e-10 {
            let cos_nu = (e_vec.dot(pos) / (ecc * r)).clamp(-1.0, 1.0);
            let nu = cos_nu.acos();
            if pos.dot(vel) < 0.0 { 2.0 * std::f64::consts::PI - nu } else { nu }
        } else {
            0.0
        };

        KeplerianElements { sma, ecc, inc, lan, aop, true_anomaly }
    }

    /// Convert back to an ECI state vector. Used to place test vehicles on
    /// known orbits.
    pub fn to_state_vector(&self, mu: f64) -> (Vector3<f64>, Vector3<f64>) {
        let p = self.sma * (1.0 - self.ecc * self.ecc); // semi-latus rectum
        let r_mag = p / (1.0 + self.ecc * self.true_anomaly.cos());

        // Position in perifocal frame (PQW)
        let r_pqw = Vector3::new(
            r_mag * self.true_anomaly.cos(),
            r_mag * self.true_anomaly.sin(),
            0.0,
        );

        // Velocity in perifocal frame
        let sqrt_mu_p = (mu / p).sqrt();
        let v_pqw = Vector3::new(
            -sqrt_mu_p * self.true_anomaly.sin(),
            sqrt_mu_p * (self.ecc + self.true_anomaly.cos()),
            0.0,
        );

        // Rotation matrix from PQW to ECI
        let cos_lan = self.lan.cos();
        let sin_lan = self.lan.sin();
        let cos_aop = self.aop.cos();
        let sin_aop = self.aop.sin();
        let cos_inc = self.inc.cos();
        let sin_inc = self.inc.sin();

        let rot = |v: &Vector3<f64>| -> Vector3<f64> {
            Vector3::new(
                (cos_lan * cos_aop - sin_lan * sin_aop * cos_inc) * v.x
                    + (-cos_lan * sin_aop - sin_lan * cos_aop * cos_inc) * v.y,
                (sin_lan * cos_aop + cos_lan * sin_aop * cos_inc) * v.x
                    + (-sin_lan * sin_aop + cos_lan * cos_aop * cos_inc) * v.y,
                (sin_aop * sin_inc) * v.x + (cos_aop * sin_inc) * v.y,
            )
        };

        (rot(&r_pqw), rot(&v_pqw))
    }

    /// Apoapsis radius from the body center, m.
    pub fn apoapsis_radius(&self) -> f64 {
        self.sma * (1.0 + self.ecc)
    }

    /// Periapsis radius from the body center, m.
    pub fn periapsis_radius(&self) -> f64 {
        self.sma * (1.0 - self.ecc)
    }

    /// Orbital period for an elliptical orbit, s.
    pub fn period(&self, mu: f64) -> f64 {
        2.0 * std::f64::consts::PI * (self.sma.powi(3) / mu).sqrt()
    }

    /// Circular orbit at a given radius and inclination.
    pub fn circular(radius: f64, inc: f64) -> Self {
        KeplerianElements {
            sma: radius,
            ecc: 0.0,
            inc,
            lan: 0.0,
            aop: 0.0,
            true_anomaly: 0.0,
        }
    }
}
