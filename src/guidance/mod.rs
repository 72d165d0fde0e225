pub mod cser;
pub mod peg;
pub mod steering;
pub mod upfg;

pub use cser::{conic_state_extrapolation, CserState};
pub use peg::{powered_explicit_guidance, PegState};
pub use steering::{Autopilot, SteeringDecision};
pub use upfg::{unified_powered_flight_guidance, UpfgGuidance, UpfgInternal, UpfgTarget};
