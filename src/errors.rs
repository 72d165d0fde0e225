use thiserror::Error;

/// Everything that can reject a simulation before its first step.
///
/// All variants are deterministic configuration failures; nothing here is
/// retried. Conditions arising mid-flight (degenerate frames, zero airspeed,
/// stale guidance) are handled in place and never surface as errors.
#[derive(Debug, Error)]
pub enum SimError {
    #[error("time step must be positive, got {0} s")]
    InvalidTimeStep(f64),

    #[error("mass flow rate must be positive, got {0} kg/s")]
    NonPositiveMassFlow(f64),

    #[error("no burn time left after {hold_down} s hold-down of a {max_burn} s burn")]
    NoBurnTime { hold_down: f64, max_burn: f64 },

    #[error("vehicle mass after hold-down burn must be positive, got {0} kg")]
    NonPositiveMass(f64),

    #[error("{0} lookup table is empty")]
    EmptyCurve(&'static str),

    #[error("target radius {target} m does not clear the body radius {body} m")]
    TargetBelowSurface { target: f64, body: f64 },

    #[error("target plane normal must be a non-zero vector")]
    DegenerateTargetPlane,

    #[error("coast length must be positive, got {0} s")]
    InvalidCoastLength(f64),
}
