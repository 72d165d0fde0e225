use std::f64::consts::PI;

use nalgebra::Vector3;

use crate::frames::NavballFrame;
use crate::physics::atmosphere::Atmosphere;

// ---------------------------------------------------------------------------
// Central body constants
// ---------------------------------------------------------------------------

/// Physical constants of the central body. Assembled once and passed down;
/// nothing in the simulator reads planet data from module scope, so runs on
/// non-Earth bodies only need a different `Body`.
#[derive(Debug, Clone)]
pub struct Body {
    pub mu: f64,         // gravitational parameter, m^3/s^2
    pub g0: f64,         // standard gravity for Isp conversion, m/s^2
    pub radius: f64,     // reference surface radius, m
    pub day_length: f64, // sidereal rotation period used for surface speed, s
}

impl Body {
    pub fn earth() -> Self {
        Self {
            mu: 3.986_004_418e14,
            g0: 9.80665,
            radius: 6_371_000.0,
            day_length: 86_400.0,
        }
    }

    /// Geocentric latitude under an ECI position (rad).
    pub fn latitude_of(&self, r: &Vector3<f64>) -> f64 {
        (r.z / r.norm()).clamp(-1.0, 1.0).asin()
    }

    /// Magnitude of the surface-rotation velocity at the vehicle's latitude.
    pub fn surface_speed(&self, r: &Vector3<f64>) -> f64 {
        2.0 * PI * self.radius * self.latitude_of(r).cos() / self.day_length
    }

    /// Inertial velocity of the co-rotating atmosphere, along navball east.
    pub fn surface_velocity(&self, r: &Vector3<f64>, nav: &NavballFrame) -> Vector3<f64> {
        nav.east * self.surface_speed(r)
    }

    /// Surface-rotation velocity before any vehicle velocity exists.
    ///
    /// Builds a stand-in navball frame from a dummy tangent (r rotated 90°
    /// CCW about z). The tangent collapses at the exact poles, where the
    /// frame tie-breaks take over and the east speed is zero anyway.
    pub fn surface_velocity_init(&self, r: &Vector3<f64>) -> Vector3<f64> {
        let tangent = Vector3::new(-r.y, r.x, 0.0);
        let nav = NavballFrame::from_state(r, &tangent);
        self.surface_velocity(r, &nav)
    }
}

// ---------------------------------------------------------------------------
// Simulation context
// ---------------------------------------------------------------------------

/// Read-only environment handed to every component: body constants plus the
/// atmosphere tables. Owning this by value keeps the simulator re-entrant.
#[derive(Debug, Clone)]
pub struct Context {
    pub body: Body,
    pub atmosphere: Atmosphere,
}

impl Context {
    pub fn earth() -> Self {
        Self {
            body: Body::earth(),
            atmosphere: Atmosphere::earth(),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
