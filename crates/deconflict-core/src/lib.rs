//! Deconfliction core - trajectory densification and strategic conflict
//! detection for a primary UAV against simulated concurrent flights.
//!
//! Everything in this crate is a pure, synchronous computation over
//! in-memory data. Loading waypoint files and displaying results are left
//! to callers.

pub mod conflict;
pub mod error;
pub mod models;
pub mod report;
pub mod rules;
pub mod spatial;
pub mod trajectory;

pub use conflict::{detect, Analysis, ConflictDetector};
pub use error::{DeconflictError, Result};
pub use models::{Conflict, MissionWindow, Sample, Trajectory, Waypoint};
pub use report::{summarize, summarize_with_mode, Report, ReportEntry};
pub use rules::{DeconflictRules, ReportMode, ScanStrategy, TimeAxisPolicy};
pub use spatial::{distance3d, geodesic_distance, total_path_length_m};
pub use trajectory::{build, build_with_policy};
