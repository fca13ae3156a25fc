pub mod defs;
pub mod engine;
pub mod renderer;
pub mod sim;
pub mod world;
