use nalgebra::Vector3;

use crate::guidance::upfg::UpfgDebug;
use crate::orbital::elements::KeplerianElements;
use crate::sim::state::{StepState, SteeringCommand};
use crate::vehicle::mission::InitialState;

// ---------------------------------------------------------------------------
// Engine termination flags
// ---------------------------------------------------------------------------

/// How (or whether) the engine stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    /// Unguided mode ran its full allotted time; no cutoff logic applies.
    NoCutoff,
    /// Propellant ran out before guidance called a cutoff.
    FuelDepleted,
    /// Still burning (only ever seen mid-flight).
    Running,
    /// PEG/UPFG scheduled cutoff reached.
    ScheduledCutoff,
    /// UPFG velocity-overshoot cutoff.
    VelocityCutoff,
}

impl EngineState {
    /// Numeric code as reported in results: -1, 0, 1, 2, 3.
    pub fn code(self) -> i32 {
        match self {
            EngineState::NoCutoff => -1,
            EngineState::FuelDepleted => 0,
            EngineState::Running => 1,
            EngineState::ScheduledCutoff => 2,
            EngineState::VelocityCutoff => 3,
        }
    }
}

// ---------------------------------------------------------------------------
// Time-series plots
// ---------------------------------------------------------------------------

/// Parallel per-step series, pre-sized once and truncated to the last
/// completed step on early termination.
#[derive(Debug, Clone, Default)]
pub struct Plots {
    pub time: Vec<f64>,
    pub position: Vec<Vector3<f64>>,
    pub radius: Vec<f64>,
    pub velocity: Vec<Vector3<f64>>,
    pub velocity_radial: Vec<f64>,
    pub velocity_tangential: Vec<f64>,
    pub speed: Vec<f64>,
    pub mass: Vec<f64>,
    pub thrust: Vec<f64>,
    pub accel: Vec<f64>,
    pub dynamic_pressure: Vec<f64>,
    pub pitch_cmd: Vec<f64>,
    pub yaw_cmd: Vec<f64>,
    pub pitch_srf: Vec<f64>,
    pub yaw_srf: Vec<f64>,
    pub pitch_obt: Vec<f64>,
    pub yaw_obt: Vec<f64>,
}

impl Plots {
    pub fn with_capacity(n: usize) -> Self {
        Self {
            time: Vec::with_capacity(n),
            position: Vec::with_capacity(n),
            radius: Vec::with_capacity(n),
            velocity: Vec::with_capacity(n),
            velocity_radial: Vec::with_capacity(n),
            velocity_tangential: Vec::with_capacity(n),
            speed: Vec::with_capacity(n),
            mass: Vec::with_capacity(n),
            thrust: Vec::with_capacity(n),
            accel: Vec::with_capacity(n),
            dynamic_pressure: Vec::with_capacity(n),
            pitch_cmd: Vec::with_capacity(n),
            yaw_cmd: Vec::with_capacity(n),
            pitch_srf: Vec::with_capacity(n),
            yaw_srf: Vec::with_capacity(n),
            pitch_obt: Vec::with_capacity(n),
            yaw_obt: Vec::with_capacity(n),
        }
    }

    pub fn push(&mut self, state: &StepState, cmd: SteeringCommand) {
        self.time.push(state.time);
        self.position.push(state.r);
        self.radius.push(state.r.norm());
        self.velocity.push(state.v);
        self.velocity_radial.push(state.radial_velocity());
        self.velocity_tangential.push(state.tangential_velocity());
        self.speed.push(state.v.norm());
        self.mass.push(state.mass);
        self.thrust.push(state.thrust);
        self.accel.push(state.accel);
        self.dynamic_pressure.push(state.q);
        self.pitch_cmd.push(cmd.pitch);
        self.yaw_cmd.push(cmd.yaw);
        self.pitch_srf.push(state.pitch_srf);
        self.yaw_srf.push(state.yaw_srf);
        self.pitch_obt.push(state.pitch_obt);
        self.yaw_obt.push(state.yaw_obt);
    }

    pub fn len(&self) -> usize {
        self.time.len()
    }

    pub fn is_empty(&self) -> bool {
        self.time.is_empty()
    }
}

/// Index and value of the maximum of a series. Empty series report (0, 0).
pub fn max_value(series: &[f64]) -> (usize, f64) {
    let mut best = (0, f64::NEG_INFINITY);
    for (i, &v) in series.iter().enumerate() {
        if v > best.1 {
            best = (i, v);
        }
    }
    if best.1 == f64::NEG_INFINITY {
        (0, 0.0)
    } else {
        best
    }
}

// ---------------------------------------------------------------------------
// Results record
// ---------------------------------------------------------------------------

/// Per-cycle guidance internals, kept when a closed-loop mode flew the run.
#[derive(Debug, Clone)]
pub enum GuidanceDebug {
    /// (A, B, C, T) per step.
    Peg(Vec<[f64; 4]>),
    /// Full cycle records, one per major cycle (plus priming).
    Upfg(Vec<UpfgDebug>),
}

/// Everything a run produces.
#[derive(Debug, Clone)]
pub struct FlightResults {
    pub altitude_km: f64,
    pub apoapsis_km: f64,
    pub periapsis_km: f64,
    pub velocity: f64,
    pub velocity_radial: f64,
    pub velocity_tangential: f64,
    pub max_q: f64,
    pub max_q_time: f64,
    pub loss_gravity: f64,
    pub loss_drag: f64,
    pub loss_total: f64,
    pub burn_time_left: f64,
    pub engine: EngineState,
    pub orbit: KeplerianElements,
    pub plots: Plots,
    pub debug: Option<GuidanceDebug>,
}

impl FlightResults {
    /// Final state repackaged as initial conditions, so a follow-on phase
    /// (e.g. a coast after insertion, or an upper stage after a booster)
    /// continues exactly where this run ended.
    pub fn final_state(&self) -> InitialState {
        let k = self.plots.len() - 1;
        InitialState::StateVector {
            time: self.plots.time[k],
            position: self.plots.position[k],
            velocity: self.plots.velocity[k],
        }
    }
}
