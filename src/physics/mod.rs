pub mod atmosphere;
pub mod body;
pub mod gravity;

pub use atmosphere::{air_density, Atmosphere};
pub use body::{Body, Context};
pub use gravity::gravity_accel;
