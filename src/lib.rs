pub mod autopilot;
pub mod constants;
pub mod engine;
pub mod io;
pub mod maze;
pub mod motion;
pub mod rng;
pub mod settings_store;
pub mod types;
