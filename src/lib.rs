pub mod curve;
pub mod errors;
pub mod frames;
pub mod guidance;
pub mod io;
pub mod orbital;
pub mod physics;
pub mod sim;
pub mod vehicle;

pub use curve::Curve;
pub use errors::SimError;
pub use physics::body::Context;
pub use sim::results::{EngineState, FlightResults};
pub use sim::runner::simulate;
pub use vehicle::craft::{Vehicle, VehicleBuilder};
pub use vehicle::mission::{Control, InitialState};
