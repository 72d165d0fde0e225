use nalgebra::Vector3;

use crate::curve::Curve;
use crate::guidance::upfg::UpfgTarget;

// ---------------------------------------------------------------------------
// Initial conditions
// ---------------------------------------------------------------------------

/// Where a run starts: on the ground, or mid-flight from a prior run's
/// final state.
#[derive(Debug, Clone)]
pub enum InitialState {
    /// Launch site on the reference sphere; time starts at zero and the
    /// initial velocity is the local surface-rotation velocity.
    LaunchSite {
        longitude_deg: f64,
        latitude_deg: f64,
        /// Height above the reference radius, m.
        altitude: f64,
    },
    /// In-flight ECI state, e.g. the hand-off point from a previous phase.
    StateVector {
        time: f64,
        position: Vector3<f64>,
        velocity: Vector3<f64>,
    },
}

// ---------------------------------------------------------------------------
// Steering configuration
// ---------------------------------------------------------------------------

/// One steering law per run. Each variant carries exactly the parameters its
/// mode needs; the orchestrator dispatches on the variant.
#[derive(Debug, Clone)]
pub enum Control {
    /// Open-loop gravity turn: vertical rise, constant-rate pitchover to a
    /// preset angle, then surface-prograde hold. Yaw is not commanded.
    GravityTurn {
        pitchover_angle_deg: f64,
        /// Radial speed at which the pitchover starts, m/s.
        pitchover_velocity: f64,
    },
    /// Open-loop pitch table over elapsed time, flown at a fixed azimuth.
    PitchProgram {
        /// (time s, pitch deg) rows.
        program: Curve,
        azimuth_deg: f64,
    },
    /// Closed-loop planar ascent guidance into a circular orbit.
    Peg {
        target_altitude: f64,
        azimuth_deg: f64,
        major_cycle: f64,
    },
    /// Closed-loop 3-D ascent guidance toward an arbitrary terminal state.
    Upfg {
        target: UpfgTarget,
        major_cycle: f64,
    },
    /// Unpowered flight; steering commands hold their previous values.
    Coast { length: f64 },
}

// ---------------------------------------------------------------------------
// Preset vehicles
// ---------------------------------------------------------------------------

pub mod presets {
    use crate::curve::Curve;
    use crate::vehicle::craft::{Vehicle, VehicleBuilder};

    /// Transonic-bump drag profile typical of a slender launcher.
    pub fn launcher_drag_curve() -> Curve {
        Curve::new(vec![
            [0.0, 0.25],
            [240.0, 0.26],
            [300.0, 0.45],
            [340.0, 0.64],
            [400.0, 0.60],
            [600.0, 0.52],
            [900.0, 0.44],
            [1400.0, 0.36],
            [2400.0, 0.30],
            [4000.0, 0.27],
        ])
    }

    /// First-stage booster for ground launch under a gravity turn.
    pub fn booster() -> Vehicle {
        VehicleBuilder::new("Booster")
            .mass(250_000.0)
            .isp_sl(282.0)
            .isp_vac(311.0)
            .mass_flow(1_100.0)
            .max_burn_time(160.0)
            .hold_down_time(2.0)
            .drag_area(10.8)
            .drag_curve(launcher_drag_curve())
            .build()
    }

    /// Sustainer stage for closed-loop insertion from the booster hand-off.
    pub fn sustainer() -> Vehicle {
        VehicleBuilder::new("Sustainer")
            .mass(90_000.0)
            .isp_sl(340.0)
            .isp_vac(345.0)
            .mass_flow(270.0)
            .max_burn_time(300.0)
            .hold_down_time(0.0)
            .drag_area(10.8)
            .drag_curve(launcher_drag_curve())
            .build()
    }
}
