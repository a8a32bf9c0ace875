//! Analysis session state.
//!
//! Holds the loaded flight paths, the active rules and the last analysis,
//! and is passed explicitly to whatever drives a run.

use anyhow::{Context, Result};
use std::path::Path;

use deconflict_core::{
    build_with_policy, summarize_with_mode, total_path_length_m, Analysis, ConflictDetector,
    DeconflictRules, Report, Trajectory,
};

use crate::loader::{self, FlightPathSource};
use crate::scenarios::Scenario;

/// Everything produced by one run.
#[derive(Debug, Clone)]
pub struct Outcome {
    pub primary: Trajectory,
    /// Horizontal length of the primary waypoint path (meters)
    pub primary_path_length_m: f64,
    pub others: Vec<(String, Trajectory)>,
    pub analysis: Analysis,
    pub report: Report,
    /// Sims whose trajectory could not be built and were left out.
    pub skipped: Vec<String>,
}

impl Outcome {
    /// Report over the spatial-only candidates.
    pub fn spatial_report(&self) -> Report {
        summarize_with_mode(&self.primary, &self.analysis.spatial, self.report.mode)
    }
}

#[derive(Debug, Default)]
pub struct Session {
    pub rules: DeconflictRules,
    primary: Option<FlightPathSource>,
    sims: Vec<(String, FlightPathSource)>,
    last_outcome: Option<Outcome>,
}

impl Session {
    pub fn new(rules: DeconflictRules) -> Self {
        Self {
            rules,
            ..Self::default()
        }
    }

    pub fn from_scenario(rules: DeconflictRules, scenario: Scenario) -> Self {
        let mut session = Self::new(rules);
        session.set_primary(scenario.primary);
        for (id, path) in scenario.sims {
            session.add_sim(id, path);
        }
        session
    }

    pub fn set_primary(&mut self, path: FlightPathSource) {
        self.primary = Some(path);
        self.last_outcome = None;
    }

    pub fn add_sim(&mut self, id: impl Into<String>, path: FlightPathSource) {
        self.sims.push((id.into(), path));
        self.last_outcome = None;
    }

    pub fn load_primary(&mut self, csv_path: &Path, json_path: &Path) -> Result<()> {
        let path = loader::load_flight_path(csv_path, json_path)
            .context("loading primary flight path")?;
        tracing::info!(
            waypoints = path.waypoints.len(),
            start = path.window.start_time,
            end = path.window.end_time,
            "loaded primary path"
        );
        self.set_primary(path);
        Ok(())
    }

    /// Load every simulated path in `dir`, returning how many were added.
    pub fn load_sims(&mut self, dir: &Path) -> Result<usize> {
        let sims = loader::load_sim_paths(dir).context("loading simulated flight paths")?;
        let count = sims.len();
        for (id, path) in sims {
            self.add_sim(id, path);
        }
        tracing::info!(count, dir = %dir.display(), "loaded simulated paths");
        Ok(count)
    }

    pub fn sim_count(&self) -> usize {
        self.sims.len()
    }

    pub fn last_outcome(&self) -> Option<&Outcome> {
        self.last_outcome.as_ref()
    }

    /// Densify every path, run the detector and build the report.
    ///
    /// A sim whose trajectory cannot be built is left out of the run entirely;
    /// a primary that cannot be built fails the run.
    pub fn run(&mut self) -> Result<&Outcome> {
        let primary_source = self
            .primary
            .as_ref()
            .context("no primary flight path loaded")?;
        let primary = build_with_policy(
            &primary_source.waypoints,
            primary_source.window,
            self.rules.time_axis,
        )
        .context("building primary trajectory")?;
        let primary_path_length_m = total_path_length_m(&primary_source.waypoints);
        tracing::info!(
            length_m = primary_path_length_m,
            samples = primary.len(),
            "built primary trajectory"
        );

        let mut others = Vec::with_capacity(self.sims.len());
        let mut skipped = Vec::new();
        for (id, source) in &self.sims {
            match build_with_policy(&source.waypoints, source.window, self.rules.time_axis) {
                Ok(trajectory) => others.push((id.clone(), trajectory)),
                Err(e) => {
                    tracing::warn!(sim = %id, error = %e, "skipping simulated path");
                    skipped.push(id.clone());
                }
            }
        }

        let detector = ConflictDetector::from_rules(&self.rules)?;
        let analysis = detector.analyze(&primary, &others)?;
        let report = summarize_with_mode(&primary, &analysis.temporal, self.rules.report_mode);

        Ok(self.last_outcome.insert(Outcome {
            primary,
            primary_path_length_m,
            others,
            analysis,
            report,
            skipped,
        }))
    }
}
