pub mod config;
pub mod engine;
pub mod error;
pub mod roster;
pub mod telemetry;
