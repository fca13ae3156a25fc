//! Fixed-rate demo simulation: mobiles wander the map and animate.

mod components;
mod mob;
mod systems;
mod tic;

pub use components::{Animation, Body, Facing, Motion, Position, Wander};
pub use systems::{MAX_CLIMB, STEP_TICS, standing_height};
pub use tic::{SIM_FPS, TIC, TicRunner};
