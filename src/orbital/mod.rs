pub mod elements;

pub use elements::KeplerianElements;
