//! Platform abstraction layer
//!
//! Handles the parts of the outside world the simulation depends on:
//! - Input: key mapping for movement
//! - Time: the fixed-timestep driver

pub mod input;
pub mod time;

pub use input::{Axis, Key};
pub use time::FixedStep;
