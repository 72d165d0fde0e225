use nalgebra::Vector3;

use crate::frames::{unit, NavballFrame, RncFrame};
use crate::physics::body::Context;

// ---------------------------------------------------------------------------
// Steering command
// ---------------------------------------------------------------------------

/// Thrust-direction command in the navball frame, degrees.
/// Pitch 0 = straight up; yaw 0 = due east; yaw 90 = due north.
#[derive(Debug, Clone, Copy, Default)]
pub struct SteeringCommand {
    pub pitch: f64,
    pub yaw: f64,
}

// ---------------------------------------------------------------------------
// Per-step simulation state
// ---------------------------------------------------------------------------

/// Full kinematic state of one step, plus the derived quantities every
/// consumer (steering, guidance, plots) reads: both local frames, the
/// air-relative velocity, and the four flight-path angles.
#[derive(Debug, Clone)]
pub struct StepState {
    pub time: f64,
    pub r: Vector3<f64>,
    pub v: Vector3<f64>,
    pub mass: f64,
    pub thrust: f64, // engine thrust magnitude, N
    pub accel: f64,  // thrust acceleration magnitude, m/s^2
    pub q: f64,      // dynamic pressure, Pa
    pub nav: NavballFrame,
    pub rnc: RncFrame,
    pub v_air: Vector3<f64>,
    pub pitch_srf: f64, // surface-relative velocity pitch angle from up, deg
    pub yaw_srf: f64,   // surface-relative velocity yaw angle from east, deg
    pub pitch_obt: f64, // orbital velocity pitch angle from up, deg
    pub yaw_obt: f64,   // orbital velocity yaw angle from east, deg
}

impl StepState {
    /// Assemble a state from raw kinematics: rebuilds both frames, the
    /// air-relative velocity and the derived angles.
    pub fn derive(
        ctx: &Context,
        time: f64,
        r: Vector3<f64>,
        v: Vector3<f64>,
        mass: f64,
        thrust: f64,
        q: f64,
    ) -> Self {
        let nav = NavballFrame::from_state(&r, &v);
        let rnc = RncFrame::from_state(&r, &v);
        let v_air = v - ctx.body.surface_velocity(&r, &nav);

        let air_dir = unit(v_air);
        let v_dir = unit(v);
        let pitch_srf = air_dir.dot(&nav.up).clamp(-1.0, 1.0).acos().to_degrees();
        let yaw_srf = air_dir.dot(&nav.east).clamp(-1.0, 1.0).acos().to_degrees();
        let pitch_obt = v_dir.dot(&nav.up).clamp(-1.0, 1.0).acos().to_degrees();
        let yaw_obt = v_dir.dot(&nav.east).clamp(-1.0, 1.0).acos().to_degrees();

        let accel = if mass > 0.0 { thrust / mass } else { 0.0 };
        Self {
            time,
            r,
            v,
            mass,
            thrust,
            accel,
            q,
            nav,
            rnc,
            v_air,
            pitch_srf,
            yaw_srf,
            pitch_obt,
            yaw_obt,
        }
    }

    pub fn altitude(&self, ctx: &Context) -> f64 {
        self.r.norm() - ctx.body.radius
    }

    /// Radial (vertical) velocity component, m/s.
    pub fn radial_velocity(&self) -> f64 {
        self.v.dot(&self.rnc.radial)
    }

    /// In-plane horizontal velocity component, m/s.
    pub fn tangential_velocity(&self) -> f64 {
        self.v.dot(&self.rnc.circum)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn velocity_split_recovers_magnitude() {
        let ctx = Context::earth();
        let r = Vector3::new(ctx.body.radius + 200_000.0, 0.0, 0.0);
        let v = Vector3::new(120.0, 7_700.0, 0.0);
        let s = StepState::derive(&ctx, 0.0, r, v, 10_000.0, 0.0, 0.0);
        assert_abs_diff_eq!(s.radial_velocity(), 120.0, epsilon = 1e-9);
        assert_abs_diff_eq!(s.tangential_velocity(), 7_700.0, epsilon = 1e-9);
        let split = (s.radial_velocity().powi(2) + s.tangential_velocity().powi(2)).sqrt();
        assert_abs_diff_eq!(split, v.norm(), epsilon = 1e-9);
    }

    #[test]
    fn horizontal_flight_has_ninety_degree_pitch_angle() {
        let ctx = Context::earth();
        let r = Vector3::new(ctx.body.radius + 200_000.0, 0.0, 0.0);
        let v = Vector3::new(0.0, 7_700.0, 0.0);
        let s = StepState::derive(&ctx, 0.0, r, v, 10_000.0, 0.0, 0.0);
        assert_abs_diff_eq!(s.pitch_obt, 90.0, epsilon = 1e-9);
        assert_abs_diff_eq!(s.yaw_obt, 0.0, epsilon = 1e-9);
    }

    #[test]
    fn air_velocity_subtracts_surface_rotation() {
        let ctx = Context::earth();
        let r = Vector3::new(ctx.body.radius, 0.0, 0.0);
        // At rest relative to the ground: inertial velocity equals the
        // surface-rotation velocity, so the air-relative velocity vanishes.
        let v = ctx.body.surface_velocity_init(&r);
        let s = StepState::derive(&ctx, 0.0, r, v, 1_000.0, 0.0, 0.0);
        assert!(s.v_air.norm() < 1e-9, "|v_air| = {}", s.v_air.norm());
    }
}
