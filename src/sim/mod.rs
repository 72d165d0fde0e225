pub mod integrator;
pub mod results;
pub mod runner;
pub mod state;

pub use results::{max_value, EngineState, FlightResults, GuidanceDebug, Plots};
pub use runner::simulate;
pub use state::{StepState, SteeringCommand};
