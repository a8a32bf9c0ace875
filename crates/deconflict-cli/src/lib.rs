//! Deconfliction CLI - file loading, configuration and session handling
//! around the deconfliction core.
//!
//! This crate provides the `deconflict` binary, which loads a primary flight
//! path plus every simulated path in a data directory, runs the two-stage
//! conflict check and prints the report.

pub mod config;
pub mod loader;
pub mod scenarios;
pub mod session;

pub use config::Config;
pub use loader::{load_flight_path, load_sim_paths, FlightPathSource};
pub use session::{Outcome, Session};
