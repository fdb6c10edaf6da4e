pub mod allocation;
pub mod client;
pub mod config;
pub mod error;
pub mod roster;
pub mod telemetry;
