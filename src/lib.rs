pub mod config;
pub mod error;
pub mod simulation;
pub mod engine;

pub use config::*;
pub use error::*;
pub use simulation::*;
pub use engine::*;
