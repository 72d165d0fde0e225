pub mod craft;
pub mod mission;

pub use craft::{Vehicle, VehicleBuilder};
pub use mission::{presets, Control, InitialState};
