//! Strategic deconfliction check for a primary UAV flight path.
//!
//! Usage:
//!   deconflict --primary-csv primary_drone.csv --primary-json primary_drone.json --data-dir data/
//!   deconflict --demo crossing --spatial 15

use anyhow::{bail, Context, Result};
use clap::Parser;
use serde::Serialize;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use deconflict_cli::config::{parse_report_mode, parse_scan_strategy};
use deconflict_cli::{scenarios, Config, Session};
use deconflict_core::{Analysis, Report, TimeAxisPolicy};

/// Irvine coordinates, center of the demo scenarios
const DEMO_CENTER_LAT: f64 = 33.6846;
const DEMO_CENTER_LON: f64 = -117.8265;

/// Exit status when a conflict is detected
const CONFLICT_EXIT: u8 = 2;

#[derive(Serialize)]
struct JsonOutput<'a> {
    primary_path_length_m: f64,
    analysis: &'a Analysis,
    report: &'a Report,
    skipped: &'a [String],
}

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Primary path waypoints (lat,long,alt)
    #[arg(long, default_value = "primary_drone.csv")]
    primary_csv: PathBuf,

    /// Primary path mission window (T_start, T_end)
    #[arg(long, default_value = "primary_drone.json")]
    primary_json: PathBuf,

    /// Directory holding sim_drone_*.csv / .json pairs [env: DECONFLICT_DATA_DIR]
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Spatial threshold in meters [env: DECONFLICT_SPATIAL_THRESHOLD_M]
    #[arg(long)]
    spatial: Option<f64>,

    /// Temporal threshold in seconds [env: DECONFLICT_TEMPORAL_THRESHOLD_S]
    #[arg(long)]
    temporal: Option<f64>,

    /// Spatial scan: brute or grid [env: DECONFLICT_SCAN]
    #[arg(long)]
    scan: Option<String>,

    /// Report listing: cumulative or per-trajectory [env: DECONFLICT_REPORT]
    #[arg(long)]
    report_mode: Option<String>,

    /// Sample every whole second instead of a fixed count per segment
    #[arg(long)]
    exact_time: bool,

    /// Also report spatial-only candidates
    #[arg(long)]
    spatial_only: bool,

    /// Print the full analysis as JSON
    #[arg(long)]
    json: bool,

    /// Run a built-in scenario instead of loading files (crossing, parallel, converging)
    #[arg(long)]
    demo: Option<String>,
}

fn main() -> Result<ExitCode> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("deconflict=info".parse()?),
        )
        .init();

    let args = Args::parse();
    let mut config = Config::from_env();
    apply_overrides(&mut config, &args)?;

    let time_axis = if args.exact_time {
        TimeAxisPolicy::Exact
    } else {
        TimeAxisPolicy::Segmented
    };
    let rules = config.rules(time_axis);
    tracing::info!(
        spatial_m = rules.spatial_threshold_m,
        temporal_s = rules.temporal_threshold_s,
        scan = ?rules.scan_strategy,
        "starting deconfliction"
    );

    let mut session = match &args.demo {
        Some(name) => {
            let scenario = scenarios::by_name(name, DEMO_CENTER_LAT, DEMO_CENTER_LON)
                .with_context(|| format!("unknown demo scenario '{name}'"))?;
            Session::from_scenario(rules, scenario)
        }
        None => {
            let mut session = Session::new(rules);
            session.load_primary(&args.primary_csv, &args.primary_json)?;
            session.load_sims(&config.data_dir)?;
            session
        }
    };

    let outcome = session.run()?;
    for id in &outcome.skipped {
        eprintln!("Skipped sim drone {id}: trajectory could not be built");
    }

    if args.json {
        let output = JsonOutput {
            primary_path_length_m: outcome.primary_path_length_m,
            analysis: &outcome.analysis,
            report: &outcome.report,
            skipped: &outcome.skipped,
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        if args.spatial_only {
            println!("== Spatial conflicts ==");
            println!("{}", outcome.spatial_report());
            println!("== Spatial-temporal conflicts ==");
        }
        println!("{}", outcome.report);
    }

    if outcome.report.has_conflict {
        Ok(ExitCode::from(CONFLICT_EXIT))
    } else {
        Ok(ExitCode::SUCCESS)
    }
}

fn apply_overrides(config: &mut Config, args: &Args) -> Result<()> {
    if let Some(dir) = &args.data_dir {
        config.data_dir = dir.clone();
    }
    if let Some(spatial) = args.spatial {
        config.spatial_threshold_m = spatial;
    }
    if let Some(temporal) = args.temporal {
        config.temporal_threshold_s = temporal;
    }
    if let Some(scan) = &args.scan {
        let Some(strategy) = parse_scan_strategy(scan) else {
            bail!("unknown scan strategy '{scan}', expected brute or grid");
        };
        config.scan_strategy = strategy;
    }
    if let Some(mode) = &args.report_mode {
        let Some(mode) = parse_report_mode(mode) else {
            bail!("unknown report mode '{mode}', expected cumulative or per-trajectory");
        };
        config.report_mode = mode;
    }
    Ok(())
}
