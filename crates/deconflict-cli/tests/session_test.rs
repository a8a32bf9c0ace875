//! File-backed session tests.
//!
//! Writes primary and simulated flight paths to a scratch directory and runs
//! the full load -> densify -> detect -> report flow over them.

use std::fs;
use std::path::{Path, PathBuf};

use deconflict_cli::loader::discover_sim_paths;
use deconflict_cli::Session;
use deconflict_core::{DeconflictRules, ReportMode};

fn scratch_dir() -> PathBuf {
    let dir = std::env::temp_dir().join(format!("deconflict-test-{}", uuid::Uuid::new_v4()));
    fs::create_dir_all(&dir).expect("create scratch dir");
    dir
}

fn write_path(dir: &Path, stem: &str, rows: &[(f64, f64, f64)], start: i64, end: i64) {
    let mut csv = String::from("lat,long,alt\n");
    for (lat, lon, alt) in rows {
        csv.push_str(&format!("{lat},{lon},{alt}\n"));
    }
    fs::write(dir.join(format!("{stem}.csv")), csv).expect("write csv");
    fs::write(
        dir.join(format!("{stem}.json")),
        format!(r#"{{"T_start": {start}, "T_end": {end}}}"#),
    )
    .expect("write json");
}

/// Primary flies east along the equator; sim 1 shadows it 3m higher, sim 2
/// flies the same track an hour later, sim 3 is far away.
fn write_fixture(dir: &Path) {
    write_path(
        dir,
        "primary_drone",
        &[(0.0, 0.0, 100.0), (0.0, 0.001, 100.0)],
        0,
        20,
    );
    write_path(
        dir,
        "sim_drone_1",
        &[(0.0, 0.0, 103.0), (0.0, 0.001, 103.0)],
        0,
        20,
    );
    write_path(
        dir,
        "sim_drone_2",
        &[(0.0, 0.0, 100.0), (0.0, 0.001, 100.0)],
        3600,
        3620,
    );
    write_path(
        dir,
        "sim_drone_3",
        &[(1.0, 1.0, 100.0), (1.0, 1.001, 100.0)],
        0,
        20,
    );
}

#[test]
fn test_discovers_sims_in_name_order() {
    let dir = scratch_dir();
    write_fixture(&dir);

    let found = discover_sim_paths(&dir).unwrap();
    let ids: Vec<&str> = found.iter().map(|(id, _, _)| id.as_str()).collect();
    assert_eq!(ids, vec!["1", "2", "3"]);

    fs::remove_dir_all(&dir).ok();
}

#[test]
fn test_missing_json_partner_fails_loading() {
    let dir = scratch_dir();
    write_fixture(&dir);
    fs::remove_file(dir.join("sim_drone_2.json")).unwrap();

    let mut session = Session::default();
    let err = session.load_sims(&dir).unwrap_err();
    assert!(format!("{err:#}").contains("File not found"));

    fs::remove_dir_all(&dir).ok();
}

#[test]
fn test_loads_and_detects_from_files() {
    let dir = scratch_dir();
    write_fixture(&dir);

    let mut session = Session::new(DeconflictRules::default());
    session
        .load_primary(&dir.join("primary_drone.csv"), &dir.join("primary_drone.json"))
        .unwrap();
    assert_eq!(session.load_sims(&dir).unwrap(), 3);

    let outcome = session.run().unwrap();
    // 0.001 degrees of longitude along the equator
    assert!((outcome.primary_path_length_m - 111.32).abs() < 0.5);
    let spatial_ids: Vec<&str> = outcome
        .analysis
        .spatial
        .iter()
        .map(|c| c.other_id.as_str())
        .collect();
    assert_eq!(spatial_ids, vec!["1", "2"]);

    assert_eq!(outcome.analysis.temporal.len(), 1);
    assert_eq!(outcome.analysis.temporal[0].other_id, "1");
    assert!(outcome.report.has_conflict);
    assert!(outcome.report.text.starts_with("Conflict Detected\nsim drone: 1\n"));

    fs::remove_dir_all(&dir).ok();
}

#[test]
fn test_per_trajectory_report_mode_is_honored() {
    let dir = scratch_dir();
    write_fixture(&dir);

    let rules = DeconflictRules {
        temporal_threshold_s: 10_000.0,
        report_mode: ReportMode::PerTrajectory,
        ..DeconflictRules::default()
    };
    let mut session = Session::new(rules);
    session
        .load_primary(&dir.join("primary_drone.csv"), &dir.join("primary_drone.json"))
        .unwrap();
    session.load_sims(&dir).unwrap();

    let outcome = session.run().unwrap();
    assert_eq!(outcome.report.entries.len(), 2);
    assert_eq!(outcome.report.mode, ReportMode::PerTrajectory);

    fs::remove_dir_all(&dir).ok();
}
