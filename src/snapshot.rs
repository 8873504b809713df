//! Persisted shape of a simulation and its lenient loader.
//!
//! Only selections, scores, shootout winners and the name are read back.
//! Participants, winners and `finished` flags in a file are ignored and
//! re-derived when the state is rebuilt.

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use tracing::{info, warn};

use crate::error::SnapshotError;
use crate::fixtures::generate_all_group_matches;
use crate::registry::resolve_groups;
use crate::simulation::{validate_selection, SimulationState};
use crate::types::{
    GroupMatch, KnockoutMatch, PathKey, Round, Side, TeamId, DEFAULT_SIMULATION_NAME, MAX_SCORE,
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationSnapshot {
    pub selected_winners: BTreeMap<PathKey, TeamId>,
    pub group_matches: Vec<GroupMatch>,
    pub knockout_matches: Vec<KnockoutMatch>,
    pub simulation_name: String,
    /// RFC 3339 time the snapshot was captured.
    pub last_saved: Option<String>,
}

impl Default for SimulationSnapshot {
    fn default() -> Self {
        SimulationSnapshot {
            selected_winners: BTreeMap::new(),
            group_matches: Vec::new(),
            knockout_matches: Vec::new(),
            simulation_name: DEFAULT_SIMULATION_NAME.to_string(),
            last_saved: None,
        }
    }
}

impl SimulationSnapshot {
    pub fn capture(state: &SimulationState) -> Self {
        SimulationSnapshot {
            selected_winners: state.selected_winners.clone(),
            group_matches: state.group_matches.clone(),
            knockout_matches: state.knockout_matches.clone(),
            simulation_name: state.simulation_name.clone(),
            last_saved: Some(Utc::now().to_rfc3339()),
        }
    }

    pub fn into_state(self) -> SimulationState {
        SimulationState {
            selected_winners: self.selected_winners,
            group_matches: self.group_matches,
            knockout_matches: self.knockout_matches,
            simulation_name: self.simulation_name,
        }
    }

    pub fn last_saved_at(&self) -> Option<DateTime<Utc>> {
        let raw = self.last_saved.as_deref()?;
        DateTime::parse_from_rfc3339(raw)
            .ok()
            .map(|at| at.with_timezone(&Utc))
    }

    /// Parse JSON text. Text that is not JSON yields the default snapshot.
    pub fn from_json_str(raw: &str) -> Self {
        match serde_json::from_str::<Value>(raw) {
            Ok(value) => SimulationSnapshot::from_value(&value),
            Err(err) => {
                warn!("Snapshot is not valid JSON, starting fresh: {}", err);
                SimulationSnapshot::default()
            }
        }
    }

    /// Read every field on its own; a bad field or entry falls back to its
    /// default without affecting the rest.
    pub fn from_value(value: &Value) -> Self {
        let Some(root) = value.as_object() else {
            warn!("Snapshot root is not an object, starting fresh");
            return SimulationSnapshot::default();
        };

        let selected_winners = parse_selected_winners(root);
        let group_matches = parse_group_matches(root, &selected_winners);
        let knockout_matches = parse_knockout_matches(root);
        let simulation_name = root
            .get("simulationName")
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| DEFAULT_SIMULATION_NAME.to_string());
        let last_saved = root
            .get("lastSaved")
            .and_then(Value::as_str)
            .filter(|raw| DateTime::parse_from_rfc3339(raw).is_ok())
            .map(str::to_string);

        SimulationSnapshot {
            selected_winners,
            group_matches,
            knockout_matches,
            simulation_name,
            last_saved,
        }
    }

    pub fn to_json_pretty(&self) -> Result<String, SnapshotError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

fn entries<'a>(root: &'a Map<String, Value>, key: &str) -> &'a [Value] {
    match root.get(key) {
        Some(Value::Array(items)) => items.as_slice(),
        Some(Value::Null) | None => &[],
        Some(_) => {
            warn!("Snapshot field {} is not a list, ignoring it", key);
            &[]
        }
    }
}

fn parse_selected_winners(root: &Map<String, Value>) -> BTreeMap<PathKey, TeamId> {
    let Some(raw) = root.get("selectedWinners").and_then(Value::as_object) else {
        return BTreeMap::new();
    };
    raw.iter()
        .filter_map(|(path, team)| {
            let team = team.as_str()?;
            match validate_selection(path, team) {
                Ok(()) => Some((path.clone(), team.to_string())),
                Err(err) => {
                    warn!("Dropping saved playoff selection: {}", err);
                    None
                }
            }
        })
        .collect()
}

fn parse_group_matches(root: &Map<String, Value>, selected: &BTreeMap<PathKey, TeamId>) -> Vec<GroupMatch> {
    let mut fixtures = generate_all_group_matches(&resolve_groups(selected));
    for entry in entries(root, "groupMatches") {
        let Some(id) = entry.get("id").and_then(Value::as_str) else {
            warn!("Skipping saved group match without an id");
            continue;
        };
        let Some(fixture) = fixtures.iter_mut().find(|m| m.id == id) else {
            warn!("Skipping unknown saved group match {}", id);
            continue;
        };
        fixture.set_score(Side::Home, score_field(entry, "homeScore", id));
        fixture.set_score(Side::Away, score_field(entry, "awayScore", id));
    }
    fixtures
}

fn parse_knockout_matches(root: &Map<String, Value>) -> Vec<KnockoutMatch> {
    let mut matches: Vec<KnockoutMatch> = Vec::new();
    for entry in entries(root, "knockoutMatches") {
        let Some(id) = entry.get("id").and_then(Value::as_str) else {
            warn!("Skipping saved knockout match without an id");
            continue;
        };
        let Some(round) = Round::for_match_id(id) else {
            warn!("Skipping unknown saved knockout match {}", id);
            continue;
        };
        if matches.iter().any(|m| m.id == id) {
            continue;
        }
        let mut m = KnockoutMatch::new(id, round);
        m.home_score = score_field(entry, "homeScore", id);
        m.away_score = score_field(entry, "awayScore", id);
        m.penalty_winner = entry
            .get("penaltyWinner")
            .and_then(Value::as_str)
            .map(str::to_string);
        matches.push(m);
    }
    matches
}

fn score_field(entry: &Value, key: &str, match_id: &str) -> Option<u32> {
    match entry.get(key) {
        None | Some(Value::Null) => None,
        Some(value) => {
            let score = value
                .as_u64()
                .and_then(|n| u32::try_from(n).ok())
                .filter(|n| *n <= MAX_SCORE);
            if score.is_none() {
                warn!("Ignoring invalid {} {} on match {}", key, value, match_id);
            }
            score
        }
    }
}

/// Load a snapshot file. A missing file is `Ok(None)`.
pub fn read_snapshot(path: &Path) -> Result<Option<SimulationSnapshot>, SnapshotError> {
    if !path.exists() {
        return Ok(None);
    }
    let raw = fs::read_to_string(path).map_err(|source| SnapshotError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(Some(SimulationSnapshot::from_json_str(&raw)))
}

pub fn write_snapshot(path: &Path, snapshot: &SimulationSnapshot) -> Result<(), SnapshotError> {
    let json = snapshot.to_json_pretty()?;
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|source| SnapshotError::Write {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    fs::write(path, json).map_err(|source| SnapshotError::Write {
        path: path.to_path_buf(),
        source,
    })?;
    info!("Snapshot written to {}", path.display());
    Ok(())
}
