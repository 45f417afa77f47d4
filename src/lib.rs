//! Core library for a bounded or toroidal Game of Life grid.

pub mod codec;
pub mod grid;
pub mod pattern;
pub mod pos;
pub mod runner;
pub mod settings;
pub mod sim;
pub mod store;

pub use codec::{DecodeOutcome, LifeConfig};
pub use grid::Grid;
pub use pattern::Pattern;
pub use pos::Pos2;
pub use runner::Runner;
pub use settings::Settings;
pub use sim::Simulation;
