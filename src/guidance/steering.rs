use log::debug;

use crate::curve::Curve;
use crate::errors::SimError;
use crate::guidance::peg::{powered_explicit_guidance, steering_constant, PegState};
use crate::guidance::upfg::{
    unified_powered_flight_guidance, UpfgGuidance, UpfgInternal, UpfgTarget, UpfgVehicle,
};
use crate::physics::body::Context;
use crate::sim::results::{EngineState, GuidanceDebug};
use crate::sim::state::{StepState, SteeringCommand};
use crate::vehicle::craft::Vehicle;
use crate::vehicle::mission::Control;

// ---------------------------------------------------------------------------
// Per-step steering dispatch
// ---------------------------------------------------------------------------

/// What the steering layer decided for this step.
pub enum SteeringDecision {
    Steer(SteeringCommand),
    Shutdown(EngineState),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GravityTurnPhase {
    Vertical,
    PitchingOver,
    ProgradeHold,
}

/// Mutable steering state for the selected control mode, consulted once per
/// step. Closed-loop modes keep their guidance state here; the orchestrator
/// owns the `Autopilot` and never touches its internals.
pub enum Autopilot {
    GravityTurn {
        pitchover_angle: f64,
        pitchover_velocity: f64,
        phase: GravityTurnPhase,
        pitch: f64,
    },
    PitchProgram {
        program: Curve,
        yaw: f64,
    },
    Peg {
        target_radius: f64,
        yaw: f64,
        major: f64,
        lc: f64,
        state: PegState,
        debug: Vec<[f64; 4]>,
    },
    Upfg {
        target: UpfgTarget,
        major: f64,
        lc: f64,
        internal: UpfgInternal,
        guidance: UpfgGuidance,
        debug: Vec<crate::guidance::upfg::UpfgDebug>,
    },
    Coast {
        held: SteeringCommand,
    },
}

impl Autopilot {
    /// Build the steering state for a control mode, validating its
    /// parameters and running PEG/UPFG pre-guidance where selected.
    pub fn new(
        ctx: &Context,
        vehicle: &Vehicle,
        control: &Control,
        init: &StepState,
        burn_time_left: f64,
    ) -> Result<Self, SimError> {
        let body = &ctx.body;
        match control {
            Control::GravityTurn { pitchover_angle_deg, pitchover_velocity } => {
                Ok(Autopilot::GravityTurn {
                    pitchover_angle: *pitchover_angle_deg,
                    pitchover_velocity: *pitchover_velocity,
                    phase: GravityTurnPhase::Vertical,
                    pitch: 0.0,
                })
            }
            Control::PitchProgram { program, azimuth_deg } => {
                if program.is_empty() {
                    return Err(SimError::EmptyCurve("pitch program"));
                }
                Ok(Autopilot::PitchProgram {
                    program: program.clone(),
                    yaw: 90.0 - azimuth_deg,
                })
            }
            Control::Peg { target_altitude, azimuth_deg, major_cycle } => {
                let target_radius = body.radius + target_altitude;
                if target_radius <= body.radius {
                    return Err(SimError::TargetBelowSurface {
                        target: target_radius,
                        body: body.radius,
                    });
                }
                // Pre-guidance: seed T with the remaining burn and let a few
                // refinements settle it before liftoff of this phase.
                let ve = init.thrust / vehicle.mass_flow;
                let mut state = PegState::seed(burn_time_left);
                for _ in 0..3 {
                    state = powered_explicit_guidance(
                        body,
                        init.r.norm(),
                        init.tangential_velocity(),
                        init.radial_velocity(),
                        target_radius,
                        init.accel,
                        ve,
                        &state,
                    );
                }
                debug!("peg pre-guidance: T={:.1} s", state.t);
                Ok(Autopilot::Peg {
                    target_radius,
                    yaw: 90.0 - azimuth_deg,
                    major: *major_cycle,
                    lc: 0.0,
                    state,
                    debug: vec![],
                })
            }
            Control::Upfg { target, major_cycle } => {
                if target.normal.norm() == 0.0 {
                    return Err(SimError::DegenerateTargetPlane);
                }
                if target.radius <= body.radius {
                    return Err(SimError::TargetBelowSurface {
                        target: target.radius,
                        body: body.radius,
                    });
                }
                let snapshot = UpfgVehicle {
                    thrust: init.thrust,
                    isp: init.thrust / (body.g0 * vehicle.mass_flow),
                    mass: init.mass,
                };
                // Convergence primer: iterate the guidance on the frozen
                // initial state before the main loop starts.
                let mut internal = UpfgInternal::initialize(body, target, init.time, &init.r, &init.v);
                let mut guidance = UpfgGuidance { pitch: 0.0, yaw: 0.0, tgo: 0.0 };
                let mut debug_records = Vec::new();
                for _ in 0..5 {
                    let (next, g, dbg) = unified_powered_flight_guidance(
                        body, target, &snapshot, init.time, &init.r, &init.v, &internal,
                    );
                    internal = next;
                    guidance = g;
                    debug_records.push(dbg);
                }
                debug!("upfg pre-guidance: tgo={:.1} s", guidance.tgo);
                Ok(Autopilot::Upfg {
                    target: target.clone(),
                    major: *major_cycle,
                    lc: 0.0,
                    internal,
                    guidance,
                    debug: debug_records,
                })
            }
            Control::Coast { .. } => Ok(Autopilot::Coast {
                held: SteeringCommand::default(),
            }),
        }
    }

    /// Whether the engine burns in this mode.
    pub fn thrusting(&self) -> bool {
        !matches!(self, Autopilot::Coast { .. })
    }

    /// Whether this mode owns cutoff logic (and therefore reports fuel
    /// depletion rather than plain loop exhaustion).
    pub fn closed_loop(&self) -> bool {
        matches!(self, Autopilot::Peg { .. } | Autopilot::Upfg { .. })
    }

    /// Steering for the step about to be integrated, based on the previous
    /// step's state.
    pub fn step(
        &mut self,
        ctx: &Context,
        vehicle: &Vehicle,
        prev: &StepState,
        elapsed: f64,
        dt: f64,
    ) -> SteeringDecision {
        let body = &ctx.body;
        match self {
            Autopilot::GravityTurn { pitchover_angle, pitchover_velocity, phase, pitch } => {
                // Transitions cascade within a single step.
                if *phase == GravityTurnPhase::Vertical
                    && prev.v.dot(&prev.nav.up) >= *pitchover_velocity
                {
                    *phase = GravityTurnPhase::PitchingOver;
                }
                if *phase == GravityTurnPhase::PitchingOver && prev.pitch_srf > *pitchover_angle {
                    *phase = GravityTurnPhase::ProgradeHold;
                }
                *pitch = match phase {
                    GravityTurnPhase::Vertical => 0.0,
                    // 1 deg/s ramp: dt degrees per dt-second step.
                    GravityTurnPhase::PitchingOver => (*pitch + dt).min(*pitchover_angle),
                    GravityTurnPhase::ProgradeHold => prev.pitch_srf,
                };
                SteeringDecision::Steer(SteeringCommand { pitch: *pitch, yaw: 0.0 })
            }

            Autopilot::PitchProgram { program, yaw } => SteeringDecision::Steer(SteeringCommand {
                pitch: program.sample(elapsed),
                yaw: *yaw,
            }),

            Autopilot::Peg { target_radius, yaw, major, lc, state, debug } => {
                *lc += dt;
                let r = prev.r.norm();
                let vt = prev.tangential_velocity();
                let vy = prev.radial_velocity();
                let accel = prev.accel;
                let ve = prev.thrust / vehicle.mass_flow;

                if *lc >= *major - dt {
                    let carried = PegState { t: state.t - *lc, ..*state };
                    *state = powered_explicit_guidance(
                        body, r, vt, vy, *target_radius, accel, ve, &carried,
                    );
                    *lc = 0.0;
                }

                // Scheduled cutoff: less than one step of burn remains.
                if state.t - *lc < dt {
                    return SteeringDecision::Shutdown(EngineState::ScheduledCutoff);
                }

                let c = steering_constant(body, r, vt, accel);
                let pitch = (state.a - state.b * *lc + c).clamp(-1.0, 1.0).acos().to_degrees();
                debug.push([state.a, state.b, c, state.t - *lc]);
                SteeringDecision::Steer(SteeringCommand { pitch, yaw: *yaw })
            }

            Autopilot::Upfg { target, major, lc, internal, guidance, debug } => {
                *lc += dt;
                if *lc >= *major - dt {
                    let snapshot = UpfgVehicle {
                        thrust: prev.thrust,
                        isp: prev.thrust / (body.g0 * vehicle.mass_flow),
                        mass: prev.mass,
                    };
                    let (next, g, dbg) = unified_powered_flight_guidance(
                        body, target, &snapshot, prev.time, &prev.r, &prev.v, internal,
                    );
                    debug.push(dbg);
                    *internal = next;
                    if g.tgo < -20.0 {
                        // Degenerate solution: hold the previous commands and
                        // keep flying on the old cutoff estimate.
                        debug!("upfg degenerate (tgo={:.1}), holding previous commands", g.tgo);
                    } else {
                        *guidance = g;
                        *lc = 0.0;
                    }
                }

                if guidance.tgo - *lc < dt {
                    return SteeringDecision::Shutdown(EngineState::ScheduledCutoff);
                }
                if prev.v.norm() >= target.velocity {
                    return SteeringDecision::Shutdown(EngineState::VelocityCutoff);
                }

                SteeringDecision::Steer(SteeringCommand {
                    pitch: guidance.pitch,
                    yaw: guidance.yaw,
                })
            }

            Autopilot::Coast { held } => SteeringDecision::Steer(*held),
        }
    }

    /// Guidance internals accumulated over the run, if this mode keeps any.
    pub fn into_debug(self) -> Option<GuidanceDebug> {
        match self {
            Autopilot::Peg { debug, .. } => Some(GuidanceDebug::Peg(debug)),
            Autopilot::Upfg { debug, .. } => Some(GuidanceDebug::Upfg(debug)),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vehicle::craft::VehicleBuilder;
    use nalgebra::Vector3;

    fn ctx_vehicle() -> (Context, Vehicle) {
        let vehicle = VehicleBuilder::new("Steering test")
            .mass(1_000.0)
            .isp_sl(300.0)
            .isp_vac(300.0)
            .mass_flow(4.0)
            .max_burn_time(60.0)
            .drag_area(0.0)
            .build();
        (Context::earth(), vehicle)
    }

    fn state_with_radial_speed(ctx: &Context, vehicle: &Vehicle, vy: f64) -> StepState {
        let r = Vector3::new(ctx.body.radius + 500.0, 0.0, 0.0);
        let v = ctx.body.surface_velocity_init(&r) + Vector3::new(vy, 0.0, 0.0);
        let thrust = vehicle.thrust_at(ctx.body.g0, 1.0);
        StepState::derive(ctx, 5.0, r, v, vehicle.mass, thrust, 0.0)
    }

    #[test]
    fn gravity_turn_phases_advance() {
        let (ctx, vehicle) = ctx_vehicle();
        let control = Control::GravityTurn { pitchover_angle_deg: 5.0, pitchover_velocity: 50.0 };
        let init = state_with_radial_speed(&ctx, &vehicle, 0.0);
        let mut ap = Autopilot::new(&ctx, &vehicle, &control, &init, 60.0).unwrap();

        // Below the pitchover speed: vertical.
        let slow = state_with_radial_speed(&ctx, &vehicle, 10.0);
        match ap.step(&ctx, &vehicle, &slow, 0.0, 0.1) {
            SteeringDecision::Steer(cmd) => assert_eq!(cmd.pitch, 0.0),
            _ => panic!("should steer"),
        }

        // Above it: the ramp starts at dt degrees per step.
        let fast = state_with_radial_speed(&ctx, &vehicle, 80.0);
        match ap.step(&ctx, &vehicle, &fast, 0.0, 0.1) {
            SteeringDecision::Steer(cmd) => {
                assert!(cmd.pitch > 0.0 && cmd.pitch <= 0.1 + 1e-12, "pitch = {}", cmd.pitch)
            }
            _ => panic!("should steer"),
        }

        // Ramp saturates at the pitchover angle.
        for _ in 0..200 {
            ap.step(&ctx, &vehicle, &fast, 0.0, 0.1);
        }
        match ap.step(&ctx, &vehicle, &fast, 0.0, 0.1) {
            SteeringDecision::Steer(cmd) => assert!(cmd.pitch <= 5.0 + 1e-12),
            _ => panic!("should steer"),
        }
    }

    #[test]
    fn pitch_program_samples_table_and_fixes_yaw() {
        let (ctx, vehicle) = ctx_vehicle();
        let control = Control::PitchProgram {
            program: Curve::new(vec![[0.0, 0.0], [10.0, 45.0]]),
            azimuth_deg: 90.0,
        };
        let init = state_with_radial_speed(&ctx, &vehicle, 0.0);
        let mut ap = Autopilot::new(&ctx, &vehicle, &control, &init, 60.0).unwrap();
        match ap.step(&ctx, &vehicle, &init, 5.0, 0.1) {
            SteeringDecision::Steer(cmd) => {
                assert!((cmd.pitch - 22.5).abs() < 1e-9);
                assert_eq!(cmd.yaw, 0.0); // due-east launch
            }
            _ => panic!("should steer"),
        }
    }

    #[test]
    fn empty_pitch_program_is_rejected() {
        let (ctx, vehicle) = ctx_vehicle();
        let control = Control::PitchProgram { program: Curve::new(vec![]), azimuth_deg: 90.0 };
        let init = state_with_radial_speed(&ctx, &vehicle, 0.0);
        assert!(Autopilot::new(&ctx, &vehicle, &control, &init, 60.0).is_err());
    }

    #[test]
    fn peg_target_below_surface_is_rejected() {
        let (ctx, vehicle) = ctx_vehicle();
        let control = Control::Peg { target_altitude: -10_000.0, azimuth_deg: 90.0, major_cycle: 2.0 };
        let init = state_with_radial_speed(&ctx, &vehicle, 0.0);
        assert!(Autopilot::new(&ctx, &vehicle, &control, &init, 60.0).is_err());
    }

    #[test]
    fn coast_holds_commands() {
        let (ctx, vehicle) = ctx_vehicle();
        let control = Control::Coast { length: 100.0 };
        let init = state_with_radial_speed(&ctx, &vehicle, 0.0);
        let mut ap = Autopilot::new(&ctx, &vehicle, &control, &init, 60.0).unwrap();
        assert!(!ap.thrusting());
        match ap.step(&ctx, &vehicle, &init, 0.0, 0.5) {
            SteeringDecision::Steer(cmd) => {
                assert_eq!(cmd.pitch, 0.0);
                assert_eq!(cmd.yaw, 0.0);
            }
            _ => panic!("coast never shuts down by itself"),
        }
    }
}
