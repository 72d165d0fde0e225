use crate::frames::SteeringFrame;
use crate::physics::atmosphere::{air_density, SEA_LEVEL_PRESSURE};
use crate::physics::body::Context;
use crate::physics::gravity::gravity_accel;
use crate::sim::state::{StepState, SteeringCommand};
use crate::vehicle::craft::Vehicle;

// ---------------------------------------------------------------------------
// Fixed-step explicit Euler with semi-implicit position update
// ---------------------------------------------------------------------------

/// Delta-v charged to gravity and drag over one step.
#[derive(Debug, Clone, Copy)]
pub struct StepLosses {
    pub gravity: f64,
    pub drag: f64,
}

/// Dynamic pressure from the tabulated atmosphere, with the airspeed
/// clamped to 1 m/s (the zero-airspeed guard).
pub(crate) fn dynamic_pressure(ctx: &Context, altitude: f64, v_air_norm: f64) -> f64 {
    let p = ctx.atmosphere.pressure_ratio_at(altitude);
    let temp_k = ctx.atmosphere.temperature_k_at(altitude);
    let rho = air_density(p * SEA_LEVEL_PRESSURE, temp_k);
    let airspeed = v_air_norm.max(1.0);
    0.5 * rho * airspeed * airspeed
}

/// Advance one step.
///
/// Thrust is built in the PREVIOUS step's navball frame from the commanded
/// pitch/yaw; gravity and drag come from the previous state; the position
/// update uses the NEW velocity. Frames, air-relative velocity and derived
/// angles are rebuilt from the advanced state.
pub fn euler_step(
    ctx: &Context,
    vehicle: &Vehicle,
    prev: &StepState,
    cmd: SteeringCommand,
    thrusting: bool,
    dt: f64,
) -> (StepState, StepLosses) {
    let body = &ctx.body;
    let altitude = prev.r.norm() - body.radius;
    let pressure_ratio = ctx.atmosphere.pressure_ratio_at(altitude);

    // Thrust from the blended Isp, directed by the steering command.
    let (thrust, mass_flow) = if thrusting {
        (vehicle.thrust_at(body.g0, pressure_ratio), vehicle.mass_flow)
    } else {
        (0.0, 0.0)
    };
    let thrust_accel = prev.nav.thrust_vector(cmd.pitch, cmd.yaw) * (thrust / prev.mass);

    // Gravity.
    let gravity = gravity_accel(body, &prev.r);
    let gravity_loss = gravity.norm() * dt;

    // Drag as a scalar deceleration along the air-relative velocity.
    let airspeed = prev.v_air.norm().max(1.0);
    let cd = vehicle.drag_curve.sample(airspeed);
    let q = dynamic_pressure(ctx, altitude, prev.v_air.norm());
    let drag = vehicle.drag_area * cd * q / prev.mass;
    let drag_loss = drag * dt;

    // Advance; the position update consumes the already-updated velocity.
    let v = prev.v + (thrust_accel + gravity) * dt - (prev.v_air / airspeed) * (drag * dt);
    let r = prev.r + v * dt;
    let mass = prev.mass - mass_flow * dt;

    let next = StepState::derive(ctx, prev.time + dt, r, v, mass, thrust, q);
    (next, StepLosses { gravity: gravity_loss, drag: drag_loss })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vehicle::craft::VehicleBuilder;
    use nalgebra::Vector3;

    fn test_vehicle() -> Vehicle {
        VehicleBuilder::new("Step test")
            .mass(1_000.0)
            .isp_sl(300.0)
            .isp_vac(300.0)
            .mass_flow(4.0)
            .max_burn_time(60.0)
            .drag_area(0.0)
            .build()
    }

    fn pad_state(ctx: &Context, vehicle: &Vehicle) -> StepState {
        let r = Vector3::new(ctx.body.radius, 0.0, 0.0);
        let v = ctx.body.surface_velocity_init(&r);
        let thrust = vehicle.thrust_at(ctx.body.g0, 1.0);
        StepState::derive(ctx, 0.0, r, v, vehicle.mass, thrust, 0.0)
    }

    #[test]
    fn vertical_thrust_raises_radial_velocity() {
        let ctx = Context::earth();
        let vehicle = test_vehicle();
        let prev = pad_state(&ctx, &vehicle);
        let cmd = SteeringCommand { pitch: 0.0, yaw: 0.0 };
        let (next, _) = euler_step(&ctx, &vehicle, &prev, cmd, true, 0.1);
        // TWR ~1.2: net radial acceleration is upward.
        assert!(next.radial_velocity() > prev.radial_velocity());
        assert!(next.mass < prev.mass);
    }

    #[test]
    fn position_update_uses_new_velocity() {
        let ctx = Context::earth();
        let vehicle = test_vehicle();
        let prev = pad_state(&ctx, &vehicle);
        let dt = 0.5;
        let (next, _) = euler_step(&ctx, &vehicle, &prev, SteeringCommand::default(), true, dt);
        let semi_implicit = prev.r + next.v * dt;
        assert!((next.r - semi_implicit).norm() < 1e-9);
    }

    #[test]
    fn coasting_preserves_mass_and_kills_thrust() {
        let ctx = Context::earth();
        let vehicle = test_vehicle();
        let r = Vector3::new(ctx.body.radius + 300_000.0, 0.0, 0.0);
        let v = Vector3::new(0.0, 7_700.0, 0.0);
        let prev = StepState::derive(&ctx, 0.0, r, v, 500.0, 0.0, 0.0);
        let (next, losses) = euler_step(&ctx, &vehicle, &prev, SteeringCommand::default(), false, 0.5);
        assert_eq!(next.mass, prev.mass);
        assert_eq!(next.thrust, 0.0);
        assert!(losses.gravity > 0.0);
        assert_eq!(losses.drag, 0.0, "no drag in vacuum");
    }

    #[test]
    fn losses_are_non_negative() {
        let ctx = Context::earth();
        let vehicle = VehicleBuilder::new("Draggy")
            .mass(1_000.0)
            .mass_flow(4.0)
            .drag_area(1.0)
            .build();
        let r = Vector3::new(ctx.body.radius + 2_000.0, 0.0, 0.0);
        let v = Vector3::new(200.0, 465.0, 0.0);
        let q = dynamic_pressure(&ctx, 2_000.0, 200.0);
        let prev = StepState::derive(&ctx, 0.0, r, v, 1_000.0, 12_000.0, q);
        let (_, losses) = euler_step(&ctx, &vehicle, &prev, SteeringCommand::default(), true, 0.1);
        assert!(losses.gravity > 0.0);
        assert!(losses.drag > 0.0);
    }
}
