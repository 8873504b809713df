pub mod bracket;
pub mod config;
pub mod error;
pub mod fixtures;
pub mod match_state;
pub mod registry;
pub mod seeding;
pub mod simulation;
pub mod snapshot;
pub mod standings;
pub mod stats;
pub mod types;

pub use error::{ConfigError, EngineError, SnapshotError};
pub use simulation::{Event, Simulation, SimulationState};
pub use snapshot::SimulationSnapshot;

use config::*;
use match_state::{evaluate, MatchPhase};
use seeding::{SeedingStrategy, ThirdPlaceCandidate};
use snapshot::{read_snapshot, write_snapshot};
use stats::{tournament_stats, TournamentStats};
use types::*;

use serde::Serialize;
use std::{
    collections::BTreeMap,
    env, fs,
    path::{Path, PathBuf},
};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

// ── Derived view ───────────────────────────────────────────────────────

/// Everything a front end renders, in one serializable value.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TournamentView<'a> {
    pub simulation_name: &'a str,
    pub selected_winners: &'a BTreeMap<PathKey, TeamId>,
    pub groups: &'a [Group],
    pub standings: &'a Standings,
    pub group_matches: &'a [GroupMatch],
    pub knockout_matches: Vec<KnockoutView<'a>>,
    pub best_thirds: &'a [ThirdPlaceCandidate],
    pub seeding: SeedingStrategy,
    pub stats: TournamentStats,
}

/// A knockout record plus its display round and result state.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct KnockoutView<'a> {
    #[serde(flatten)]
    pub record: &'a KnockoutMatch,
    pub round_label: &'static str,
    pub phase: MatchPhase,
    /// A winner is known and propagates downstream.
    pub resolved: bool,
}

impl<'a> KnockoutView<'a> {
    pub fn new(record: &'a KnockoutMatch) -> Self {
        KnockoutView {
            record,
            round_label: record.round.label(),
            phase: evaluate(record),
            resolved: record.winner.is_some(),
        }
    }
}

pub fn tournament_view(sim: &Simulation) -> TournamentView<'_> {
    TournamentView {
        simulation_name: sim.simulation_name(),
        selected_winners: sim.selected_winners(),
        groups: sim.active_groups(),
        standings: sim.standings(),
        group_matches: sim.group_matches(),
        knockout_matches: sim.knockout_matches().iter().map(KnockoutView::new).collect(),
        best_thirds: sim.best_thirds(),
        seeding: sim.seeding_strategy(),
        stats: tournament_stats(sim.group_matches(), sim.knockout_matches()),
    }
}

// ── CLI ────────────────────────────────────────────────────────────────

struct CliArgs {
    snapshot: Option<PathBuf>,
    write_back: bool,
}

fn parse_args(args: &[String]) -> CliArgs {
    CliArgs {
        snapshot: args
            .iter()
            .find(|arg| !arg.starts_with("--"))
            .map(PathBuf::from),
        write_back: args.iter().any(|arg| arg == "--write"),
    }
}

fn load_simulation(path: &Path, config: &AppConfig) -> Result<Simulation, SnapshotError> {
    match read_snapshot(path)? {
        Some(snapshot) => {
            info!("Loaded snapshot {}", path.display());
            Ok(Simulation::from_snapshot(snapshot))
        }
        None => {
            info!("No snapshot at {}, starting a fresh simulation", path.display());
            let mut state = SimulationState::default();
            if !config.default_simulation_name.trim().is_empty() {
                state.simulation_name = config.default_simulation_name.clone();
            }
            Ok(Simulation::from_state(state))
        }
    }
}

fn run_cli(config: &AppConfig, args: &[String]) -> Result<(), SnapshotError> {
    let args = parse_args(args);
    let path = args.snapshot.unwrap_or_else(|| snapshot_path(config));
    let sim = load_simulation(&path, config)?;

    let view = tournament_view(&sim);
    println!("{}", serde_json::to_string_pretty(&view)?);

    if args.write_back {
        write_snapshot(&path, &sim.snapshot())?;
    }
    Ok(())
}

// ── Entry point ────────────────────────────────────────────────────────

pub fn run() {
    load_env_file();
    let config = load_config_inner();

    // Initialize tracing with a daily rolling file
    let logs_dir = match &config {
        Ok(config) => log_dir(config),
        Err(_) => log_dir(&AppConfig::default()),
    };
    fs::create_dir_all(&logs_dir).ok();
    let file_appender = tracing_appender::rolling::daily(&logs_dir, "app.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(non_blocking)
        .with_ansi(false)
        .init();
    info!("World Cup 2026 simulator starting");

    let config = config.unwrap_or_else(|err| {
        error!("{err}; using default configuration");
        apply_env_defaults(AppConfig::default())
    });
    log_env_warnings(&config);

    let args: Vec<String> = env::args().skip(1).collect();
    if let Err(err) = run_cli(&config, &args) {
        error!("{err}");
        eprintln!("{err}");
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Side;

    #[test]
    fn parse_args_takes_first_path_and_write_flag() {
        let args = parse_args(&["--write".to_string(), "saves/cup.json".to_string()]);
        assert_eq!(args.snapshot, Some(PathBuf::from("saves/cup.json")));
        assert!(args.write_back);

        let bare = parse_args(&[]);
        assert_eq!(bare.snapshot, None);
        assert!(!bare.write_back);
    }

    #[test]
    fn view_serializes_with_wire_names() {
        let mut sim = Simulation::new();
        sim.set_group_match_score("GA-1", Side::Home, Some(2)).unwrap();
        sim.set_group_match_score("GA-1", Side::Away, Some(0)).unwrap();

        let value = serde_json::to_value(tournament_view(&sim)).unwrap();
        assert_eq!(value["groups"][0]["teams"][3], "PLAYOFF_UEFA_D");
        assert_eq!(value["standings"]["A"][0]["id"], "MEX");
        assert_eq!(value["standings"]["A"][0]["points"], 3);
        assert_eq!(value["standings"]["A"][0]["gd"], 2);
        assert_eq!(value["seeding"], "constrained");
        assert_eq!(value["bestThirds"].as_array().map(Vec::len), Some(8));
        assert_eq!(value["bestThirds"][0]["groupId"], "A");
        assert_eq!(value["stats"]["totalGoals"], 2);
    }

    #[test]
    fn knockout_entries_carry_round_label_and_phase() {
        let mut sim = Simulation::new();
        sim.set_knockout_match_score("R32-4", Side::Home, Some(2)).unwrap();
        sim.set_knockout_match_score("R32-4", Side::Away, Some(2)).unwrap();

        let value = serde_json::to_value(tournament_view(&sim)).unwrap();
        let r32_4 = &value["knockoutMatches"][3];
        assert_eq!(r32_4["id"], "R32-4");
        assert_eq!(r32_4["roundLabel"], "Round of 32");
        assert_eq!(r32_4["phase"], "awaitingShootout");
        assert_eq!(r32_4["resolved"], false);
        assert_eq!(r32_4["winner"], serde_json::Value::Null);

        sim.set_penalty_winner("R32-4", "MAR").unwrap();
        let value = serde_json::to_value(tournament_view(&sim)).unwrap();
        assert_eq!(value["knockoutMatches"][3]["phase"], "resolved");
        assert_eq!(value["knockoutMatches"][3]["resolved"], true);
        assert_eq!(value["knockoutMatches"][31]["roundLabel"], "3rd Place");
        assert_eq!(value["knockoutMatches"][31]["phase"], "pending");
    }

    #[test]
    fn cli_writes_a_fresh_snapshot_with_the_configured_name() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sim.json");
        let config = AppConfig {
            default_simulation_name: "Office pool".to_string(),
            ..AppConfig::default()
        };

        run_cli(&config, &[path.display().to_string(), "--write".to_string()]).unwrap();
        let loaded = read_snapshot(&path).unwrap().unwrap();
        assert_eq!(loaded.simulation_name, "Office pool");
        assert_eq!(loaded.knockout_matches.len(), KNOCKOUT_MATCH_COUNT);
    }
}
