//! Conflict summaries for display layers.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::fmt::Write as _;

use crate::models::{Conflict, Sample, Trajectory};
use crate::rules::ReportMode;

pub const CLEAR_TEXT: &str = "Path Clear";
pub const CONFLICT_HEADER: &str = "Conflict Detected";

/// Primary locations listed under one conflicting trajectory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportEntry {
    pub other_id: String,
    pub primary_indices: Vec<usize>,
    pub locations: Vec<Sample>,
}

/// Outcome of a deconfliction run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    pub has_conflict: bool,
    pub mode: ReportMode,
    pub entries: Vec<ReportEntry>,
    pub text: String,
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// Summarize conflicts with the cumulative listing.
pub fn summarize(primary: &Trajectory, conflicts: &[Conflict]) -> Report {
    summarize_with_mode(primary, conflicts, ReportMode::Cumulative)
}

/// Summarize conflicts against the primary trajectory.
///
/// In [`ReportMode::Cumulative`] every section lists all distinct primary
/// indices seen up to and including that trajectory, in first-seen order.
/// [`ReportMode::PerTrajectory`] lists only the section's own indices.
/// Indices past the end of `primary` are left out of both the index list and
/// the locations.
pub fn summarize_with_mode(
    primary: &Trajectory,
    conflicts: &[Conflict],
    mode: ReportMode,
) -> Report {
    if conflicts.is_empty() {
        return Report {
            has_conflict: false,
            mode,
            entries: Vec::new(),
            text: CLEAR_TEXT.to_string(),
        };
    }

    let mut seen: HashSet<usize> = HashSet::new();
    let mut cumulative: Vec<usize> = Vec::new();
    let mut entries = Vec::with_capacity(conflicts.len());

    for conflict in conflicts {
        let primary_indices = match mode {
            ReportMode::Cumulative => {
                for &idx in &conflict.primary_indices {
                    if primary.get(idx).is_some() && seen.insert(idx) {
                        cumulative.push(idx);
                    }
                }
                cumulative.clone()
            }
            ReportMode::PerTrajectory => {
                let mut own = HashSet::new();
                conflict
                    .primary_indices
                    .iter()
                    .copied()
                    .filter(|&idx| primary.get(idx).is_some() && own.insert(idx))
                    .collect()
            }
        };

        let locations = primary_indices
            .iter()
            .map(|&idx| primary.samples()[idx])
            .collect();

        entries.push(ReportEntry {
            other_id: conflict.other_id.clone(),
            primary_indices,
            locations,
        });
    }

    let text = render_text(&entries);
    Report {
        has_conflict: true,
        mode,
        entries,
        text,
    }
}

fn render_text(entries: &[ReportEntry]) -> String {
    let mut text = format!("{CONFLICT_HEADER}\n");
    for entry in entries {
        let _ = writeln!(text, "sim drone: {}", entry.other_id);
        for location in &entry.locations {
            let _ = write!(
                text,
                "location:\nlatitude:{:?}\nlongitude:{:?}\naltitude:{:?}\ntime:{}\n",
                location.lat, location.lon, location.altitude_m, location.timestamp
            );
        }
    }
    text
}
