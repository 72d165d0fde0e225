use log::{debug, info};
use nalgebra::Vector3;

use crate::errors::SimError;
use crate::guidance::steering::{Autopilot, SteeringDecision};
use crate::orbital::elements::KeplerianElements;
use crate::physics::body::Context;
use crate::sim::integrator::{dynamic_pressure, euler_step};
use crate::sim::results::{max_value, EngineState, FlightResults, Plots};
use crate::sim::state::{StepState, SteeringCommand};
use crate::vehicle::craft::Vehicle;
use crate::vehicle::mission::{Control, InitialState};

// ---------------------------------------------------------------------------
// Top-level simulation loop
// ---------------------------------------------------------------------------

/// Run one flight phase to completion.
///
/// Buffers are sized once from the phase duration (the coast length, or the
/// burn time remaining after hold-down); every termination path returns a
/// results record truncated to the last completed step.
pub fn simulate(
    ctx: &Context,
    vehicle: &Vehicle,
    initial: &InitialState,
    control: &Control,
    dt: f64,
) -> Result<FlightResults, SimError> {
    if !(dt > 0.0) {
        return Err(SimError::InvalidTimeStep(dt));
    }
    vehicle.validate()?;
    if let Control::Coast { length } = control {
        if *length <= 0.0 {
            return Err(SimError::InvalidCoastLength(*length));
        }
    }

    let body = &ctx.body;
    // The hold-down burn is spent once, before release.
    let mass0 = vehicle.release_mass();
    let burn_left = vehicle.release_burn_time();

    let (t0, r0, v0) = match initial {
        InitialState::LaunchSite { longitude_deg, latitude_deg, altitude } => {
            let lon = longitude_deg.to_radians();
            let lat = latitude_deg.to_radians();
            let rm = body.radius + altitude;
            let r = rm * Vector3::new(lat.cos() * lon.cos(), lat.cos() * lon.sin(), lat.sin());
            let v = body.surface_velocity_init(&r);
            (0.0, r, v)
        }
        InitialState::StateVector { time, position, velocity } => (*time, *position, *velocity),
    };

    let duration = match control {
        Control::Coast { length } => *length,
        _ => burn_left,
    };
    let steps = (duration / dt).floor() as usize + 1;

    // Step 1: derived state at release.
    let thrusting = !matches!(control, Control::Coast { .. });
    let altitude0 = r0.norm() - body.radius;
    let thrust0 = if thrusting {
        vehicle.thrust_at(body.g0, ctx.atmosphere.pressure_ratio_at(altitude0))
    } else {
        0.0
    };
    let nav0 = crate::frames::NavballFrame::from_state(&r0, &v0);
    let v_air0 = v0 - body.surface_velocity(&r0, &nav0);
    let q0 = dynamic_pressure(ctx, altitude0, v_air0.norm());
    let init = StepState::derive(ctx, t0, r0, v0, mass0, thrust0, q0);

    let mut autopilot = Autopilot::new(ctx, vehicle, control, &init, burn_left)?;

    let mut plots = Plots::with_capacity(steps);
    plots.push(&init, SteeringCommand::default());

    let mut loss_gravity = 0.0;
    let mut loss_drag = 0.0;
    let mut cutoff = None;
    let mut prev = init;

    debug!(
        "starting {} phase: {} steps of {} s, mass {:.0} kg",
        vehicle.name, steps, dt, mass0
    );

    for _ in 1..steps {
        let elapsed = prev.time - t0;
        let cmd = match autopilot.step(ctx, vehicle, &prev, elapsed, dt) {
            SteeringDecision::Steer(cmd) => cmd,
            SteeringDecision::Shutdown(flag) => {
                cutoff = Some(flag);
                break;
            }
        };
        // Closed-loop modes report running dry as fuel depletion.
        if autopilot.closed_loop() && elapsed > burn_left {
            cutoff = Some(EngineState::FuelDepleted);
            break;
        }

        let (next, losses) = euler_step(ctx, vehicle, &prev, cmd, autopilot.thrusting(), dt);
        loss_gravity += losses.gravity;
        loss_drag += losses.drag;
        plots.push(&next, cmd);
        prev = next;
    }

    let engine = cutoff.unwrap_or(if autopilot.closed_loop() {
        EngineState::FuelDepleted
    } else {
        EngineState::NoCutoff
    });

    // Results assembly from the last completed step.
    let elements = KeplerianElements::from_state_vector(&prev.r, &prev.v, body.mu);
    let (q_idx, q_max) = max_value(&plots.dynamic_pressure);
    let burn_time_left = if autopilot.thrusting() {
        burn_left - (prev.time - t0)
    } else {
        burn_left
    };

    info!(
        "phase complete at t={:.1}: ENG={}, alt {:.1} km, v {:.0} m/s",
        prev.time,
        engine.code(),
        (prev.r.norm() - body.radius) / 1000.0,
        prev.v.norm()
    );

    Ok(FlightResults {
        altitude_km: (prev.r.norm() - body.radius) / 1000.0,
        apoapsis_km: (elements.apoapsis_radius() - body.radius) / 1000.0,
        periapsis_km: (elements.periapsis_radius() - body.radius) / 1000.0,
        velocity: prev.v.norm(),
        velocity_radial: prev.radial_velocity(),
        velocity_tangential: prev.tangential_velocity(),
        max_q: q_max,
        max_q_time: plots.time[q_idx],
        loss_gravity,
        loss_drag,
        loss_total: loss_gravity + loss_drag,
        burn_time_left,
        engine,
        orbit: elements,
        plots,
        debug: autopilot.into_debug(),
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
