use std::collections::BTreeMap;
use tracing::{debug, info};

use crate::bracket::generate_knockout_bracket;
use crate::error::EngineError;
use crate::fixtures::{generate_all_group_matches, merge_group_matches};
use crate::match_state::{apply_penalty_winner, apply_score};
use crate::registry::{find_playoff_path, resolve_groups};
use crate::seeding::{SeedingStrategy, ThirdPlaceCandidate};
use crate::snapshot::SimulationSnapshot;
use crate::standings::calculate_all;
use crate::types::{
  Group, GroupMatch, KnockoutMatch, PathKey, Side, Standings, TeamId, DEFAULT_SIMULATION_NAME, MAX_SCORE,
};

/// The mutable leaf state. Participants stored in the match lists are a
/// cache refreshed by [`reconcile`]; only selections and scores are truth.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SimulationState {
  pub selected_winners: BTreeMap<PathKey, TeamId>,
  pub group_matches: Vec<GroupMatch>,
  pub knockout_matches: Vec<KnockoutMatch>,
  pub simulation_name: String,
}

impl Default for SimulationState {
  fn default() -> Self {
    SimulationState {
      selected_winners: BTreeMap::new(),
      group_matches: Vec::new(),
      knockout_matches: Vec::new(),
      simulation_name: DEFAULT_SIMULATION_NAME.to_string(),
    }
  }
}

/// Values derived from [`SimulationState`] on every change.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DerivedView {
  pub groups: Vec<Group>,
  pub standings: Standings,
  pub best_thirds: Vec<ThirdPlaceCandidate>,
  pub seeding: SeedingStrategy,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
  SelectPlayoffWinner { path: PathKey, team: TeamId },
  SetGroupMatchScore { match_id: String, side: Side, value: Option<u32> },
  SetKnockoutMatchScore { match_id: String, side: Side, value: Option<u32> },
  SetPenaltyWinner { match_id: String, team: TeamId },
  SetSimulationName(String),
  ResetAll,
}

/// Score text from an input field: empty clears, plain digits up to
/// [`MAX_SCORE`] set.
pub fn parse_score(raw: &str) -> Result<Option<u32>, EngineError> {
  let trimmed = raw.trim();
  if trimmed.is_empty() {
    return Ok(None);
  }
  if !trimmed.bytes().all(|b| b.is_ascii_digit()) {
    return Err(EngineError::InvalidScore(raw.to_string()));
  }
  trimmed
    .parse::<u32>()
    .ok()
    .filter(|value| *value <= MAX_SCORE)
    .map(Some)
    .ok_or_else(|| EngineError::InvalidScore(raw.to_string()))
}

fn check_score(value: Option<u32>) -> Result<(), EngineError> {
  match value {
    Some(score) if score > MAX_SCORE => Err(EngineError::InvalidScore(score.to_string())),
    _ => Ok(()),
  }
}

pub fn validate_selection(path_key: &str, team_id: &str) -> Result<(), EngineError> {
  let path = find_playoff_path(path_key)
    .ok_or_else(|| EngineError::UnknownPlayoffPath(path_key.to_string()))?;
  if !path.has_candidate(team_id) {
    return Err(EngineError::NotAPlayoffCandidate {
      path: path_key.to_string(),
      team: team_id.to_string(),
    });
  }
  Ok(())
}

/// Apply one event to the leaf state. A rejected event returns the error
/// and produces no new state.
pub fn apply(state: &SimulationState, event: Event) -> Result<SimulationState, EngineError> {
  let mut next = state.clone();
  match event {
    Event::SelectPlayoffWinner { path, team } => {
      validate_selection(&path, &team)?;
      info!(path = %path, team = %team, "playoff winner selected");
      next.selected_winners.insert(path, team);
    }
    Event::SetGroupMatchScore { match_id, side, value } => {
      check_score(value)?;
      let m = next
        .group_matches
        .iter_mut()
        .find(|m| m.id == match_id)
        .ok_or(EngineError::GroupMatchNotFound(match_id))?;
      m.set_score(side, value);
    }
    Event::SetKnockoutMatchScore { match_id, side, value } => {
      check_score(value)?;
      let m = find_knockout(&mut next.knockout_matches, match_id)?;
      apply_score(m, side, value)?;
    }
    Event::SetPenaltyWinner { match_id, team } => {
      let m = find_knockout(&mut next.knockout_matches, match_id)?;
      apply_penalty_winner(m, &team)?;
    }
    Event::SetSimulationName(name) => {
      next.simulation_name = name;
    }
    Event::ResetAll => {
      debug!("simulation reset");
      next = SimulationState::default();
    }
  }
  Ok(next)
}

fn find_knockout(matches: &mut [KnockoutMatch], match_id: String) -> Result<&mut KnockoutMatch, EngineError> {
  matches
    .iter_mut()
    .find(|m| m.id == match_id)
    .ok_or(EngineError::KnockoutMatchNotFound(match_id))
}

/// Re-derive groups, fixtures, standings and the bracket from the leaf state.
/// Running it on its own output changes nothing.
pub fn reconcile(mut state: SimulationState) -> (SimulationState, DerivedView) {
  let groups = resolve_groups(&state.selected_winners);
  state.group_matches = merge_group_matches(generate_all_group_matches(&groups), &state.group_matches);
  let standings = calculate_all(&groups, &state.group_matches);
  let bracket = generate_knockout_bracket(&standings, &state.knockout_matches);
  state.knockout_matches = bracket.matches;

  let view = DerivedView {
    groups,
    standings,
    best_thirds: bracket.best_thirds,
    seeding: bracket.seeding,
  };
  (state, view)
}

/// Owns the single authoritative state and its derived view.
#[derive(Clone, Debug)]
pub struct Simulation {
  state: SimulationState,
  view: DerivedView,
}

impl Default for Simulation {
  fn default() -> Self {
    Simulation::from_state(SimulationState::default())
  }
}

impl Simulation {
  pub fn new() -> Self {
    Simulation::default()
  }

  pub fn from_state(state: SimulationState) -> Self {
    let (state, view) = reconcile(state);
    Simulation { state, view }
  }

  pub fn from_snapshot(snapshot: SimulationSnapshot) -> Self {
    Simulation::from_state(snapshot.into_state())
  }

  pub fn dispatch(&mut self, event: Event) -> Result<(), EngineError> {
    let next = apply(&self.state, event)?;
    let (state, view) = reconcile(next);
    self.state = state;
    self.view = view;
    Ok(())
  }

  pub fn select_playoff_winner(&mut self, path_key: &str, team_id: &str) -> Result<(), EngineError> {
    self.dispatch(Event::SelectPlayoffWinner {
      path: path_key.to_string(),
      team: team_id.to_string(),
    })
  }

  pub fn set_group_match_score(&mut self, match_id: &str, side: Side, value: Option<u32>) -> Result<(), EngineError> {
    self.dispatch(Event::SetGroupMatchScore {
      match_id: match_id.to_string(),
      side,
      value,
    })
  }

  pub fn set_knockout_match_score(
    &mut self,
    match_id: &str,
    side: Side,
    value: Option<u32>,
  ) -> Result<(), EngineError> {
    self.dispatch(Event::SetKnockoutMatchScore {
      match_id: match_id.to_string(),
      side,
      value,
    })
  }

  pub fn set_penalty_winner(&mut self, match_id: &str, team_id: &str) -> Result<(), EngineError> {
    self.dispatch(Event::SetPenaltyWinner {
      match_id: match_id.to_string(),
      team: team_id.to_string(),
    })
  }

  pub fn set_simulation_name(&mut self, name: &str) -> Result<(), EngineError> {
    self.dispatch(Event::SetSimulationName(name.to_string()))
  }

  pub fn reset_all(&mut self) -> Result<(), EngineError> {
    self.dispatch(Event::ResetAll)
  }

  pub fn state(&self) -> &SimulationState {
    &self.state
  }

  pub fn active_groups(&self) -> &[Group] {
    &self.view.groups
  }

  pub fn standings(&self) -> &Standings {
    &self.view.standings
  }

  pub fn group_matches(&self) -> &[GroupMatch] {
    &self.state.group_matches
  }

  pub fn knockout_matches(&self) -> &[KnockoutMatch] {
    &self.state.knockout_matches
  }

  pub fn best_thirds(&self) -> &[ThirdPlaceCandidate] {
    &self.view.best_thirds
  }

  pub fn seeding_strategy(&self) -> SeedingStrategy {
    self.view.seeding
  }

  pub fn selected_winners(&self) -> &BTreeMap<PathKey, TeamId> {
    &self.state.selected_winners
  }

  pub fn simulation_name(&self) -> &str {
    &self.state.simulation_name
  }

  pub fn snapshot(&self) -> SimulationSnapshot {
    SimulationSnapshot::capture(&self.state)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::types::{SlotValue, GROUP_COUNT, KNOCKOUT_MATCH_COUNT, MATCHES_PER_GROUP};

  fn knockout<'a>(sim: &'a Simulation, id: &str) -> &'a KnockoutMatch {
    sim.knockout_matches().iter().find(|m| m.id == id).unwrap()
  }

  fn group_match<'a>(sim: &'a Simulation, id: &str) -> &'a GroupMatch {
    sim.group_matches().iter().find(|m| m.id == id).unwrap()
  }

  fn score_group(sim: &mut Simulation, id: &str, home: u32, away: u32) {
    sim.set_group_match_score(id, Side::Home, Some(home)).unwrap();
    sim.set_group_match_score(id, Side::Away, Some(away)).unwrap();
  }

  fn score_knockout(sim: &mut Simulation, id: &str, home: u32, away: u32) {
    sim.set_knockout_match_score(id, Side::Home, Some(home)).unwrap();
    sim.set_knockout_match_score(id, Side::Away, Some(away)).unwrap();
  }

  #[test]
  fn new_simulation_derives_everything() {
    let sim = Simulation::new();
    assert_eq!(sim.active_groups().len(), GROUP_COUNT);
    assert_eq!(sim.group_matches().len(), GROUP_COUNT * MATCHES_PER_GROUP);
    assert_eq!(sim.knockout_matches().len(), KNOCKOUT_MATCH_COUNT);
    assert_eq!(sim.standings().len(), GROUP_COUNT);
    assert_eq!(sim.best_thirds().len(), 8);
    assert_eq!(sim.simulation_name(), DEFAULT_SIMULATION_NAME);
  }

  #[test]
  fn host_sweeping_group_a_tops_the_table() {
    let mut sim = Simulation::new();
    sim.select_playoff_winner("UEFA_D", "ITA").unwrap();
    assert_eq!(sim.active_groups()[0].slots[3], SlotValue::team("ITA"));

    score_group(&mut sim, "GA-1", 1, 0); // MEX-RSA
    score_group(&mut sim, "GA-3", 2, 0); // MEX-KOR
    score_group(&mut sim, "GA-5", 3, 0); // MEX-ITA
    score_group(&mut sim, "GA-2", 0, 1); // KOR-ITA
    score_group(&mut sim, "GA-4", 2, 2); // RSA-ITA
    score_group(&mut sim, "GA-6", 1, 0); // RSA-KOR

    let table = &sim.standings()[&'A'];
    assert_eq!(table[0].team, SlotValue::team("MEX"));
    assert_eq!(table[0].points, 9);
    let rest: Vec<String> = table[1..].iter().map(|row| row.team.to_string()).collect();
    // RSA and ITA level on points; RSA ahead on goal difference.
    assert_eq!(rest, ["RSA", "ITA", "KOR"]);

    assert_eq!(knockout(&sim, "R32-11").home.as_deref(), Some("MEX"));
    assert_eq!(knockout(&sim, "R32-3").home.as_deref(), Some("RSA"));
  }

  #[test]
  fn drawn_knockout_match_needs_a_penalty_winner() {
    let mut sim = Simulation::new();
    score_knockout(&mut sim, "R32-4", 2, 2);
    let m = knockout(&sim, "R32-4");
    assert_eq!(m.winner, None);
    assert_eq!(knockout(&sim, "R16-2").away, None);

    sim.set_penalty_winner("R32-4", "NED").unwrap();
    assert_eq!(knockout(&sim, "R32-4").winner.as_deref(), Some("NED"));
    assert_eq!(knockout(&sim, "R16-2").away.as_deref(), Some("NED"));
    assert_eq!(knockout(&sim, "R32-4").home_score, Some(2));
  }

  #[test]
  fn rejected_events_leave_state_untouched() {
    let mut sim = Simulation::new();
    let before = sim.state().clone();

    assert_eq!(
      sim.select_playoff_winner("UEFA_Z", "ITA"),
      Err(EngineError::UnknownPlayoffPath("UEFA_Z".into()))
    );
    assert_eq!(
      sim.select_playoff_winner("UEFA_A", "DEN"),
      Err(EngineError::NotAPlayoffCandidate {
        path: "UEFA_A".into(),
        team: "DEN".into()
      })
    );
    assert_eq!(
      sim.set_group_match_score("GM-1", Side::Home, Some(1)),
      Err(EngineError::GroupMatchNotFound("GM-1".into()))
    );
    assert_eq!(
      sim.set_knockout_match_score("R32-3", Side::Home, Some(1)),
      Err(EngineError::MissingParticipants("R32-3".into()))
    );
    assert_eq!(
      sim.set_penalty_winner("R64-1", "NED"),
      Err(EngineError::KnockoutMatchNotFound("R64-1".into()))
    );
    assert_eq!(sim.state(), &before);
  }

  #[test]
  fn playoff_reselection_keeps_scores_and_relabels_fixtures() {
    let mut sim = Simulation::new();
    sim.select_playoff_winner("UEFA_D", "DEN").unwrap();
    score_group(&mut sim, "GA-1", 2, 1); // MEX-RSA
    score_group(&mut sim, "GA-2", 0, 3); // KOR-DEN

    sim.select_playoff_winner("UEFA_D", "CZE").unwrap();
    let untouched = group_match(&sim, "GA-1");
    assert_eq!(untouched.result(), Some((2, 1)));
    let relabeled = group_match(&sim, "GA-2");
    assert_eq!(relabeled.away, SlotValue::team("CZE"));
    assert_eq!(relabeled.result(), Some((0, 3)));
    assert_eq!(sim.standings()[&'A'][0].team, SlotValue::team("CZE"));
  }

  #[test]
  fn group_result_flows_into_the_bracket() {
    let mut sim = Simulation::new();
    score_knockout(&mut sim, "R32-4", 3, 1);
    assert_eq!(knockout(&sim, "R16-2").away.as_deref(), Some("NED"));

    // JPN beats NED: group F becomes JPN, PLAYOFF_UEFA_B, TUN, NED.
    score_group(&mut sim, "GF-1", 0, 1);
    let r32_4 = knockout(&sim, "R32-4");
    assert_eq!(r32_4.home.as_deref(), Some("JPN"));
    assert_eq!((r32_4.home_score, r32_4.away_score), (Some(3), Some(1)));
    assert_eq!(knockout(&sim, "R16-2").away.as_deref(), Some("JPN"));
  }

  #[test]
  fn clearing_a_score_pulls_the_winner_back_out() {
    let mut sim = Simulation::new();
    score_knockout(&mut sim, "R32-4", 1, 0);
    assert_eq!(knockout(&sim, "R16-2").away.as_deref(), Some("NED"));

    sim.set_knockout_match_score("R32-4", Side::Away, None).unwrap();
    assert_eq!(knockout(&sim, "R32-4").winner, None);
    assert_eq!(knockout(&sim, "R16-2").away, None);
  }

  #[test]
  fn reconcile_is_idempotent() {
    let mut sim = Simulation::new();
    sim.select_playoff_winner("IC_1", "COD").unwrap();
    score_group(&mut sim, "GK-1", 1, 1);
    score_knockout(&mut sim, "R32-6", 0, 2);

    let (once, view_once) = reconcile(sim.state().clone());
    let (twice, view_twice) = reconcile(once.clone());
    assert_eq!(once, twice);
    assert_eq!(view_once, view_twice);
    assert_eq!(&once, sim.state());
  }

  #[test]
  fn reset_restores_the_initial_state() {
    let mut sim = Simulation::new();
    sim.set_simulation_name("Knockout what-ifs").unwrap();
    sim.select_playoff_winner("UEFA_A", "WAL").unwrap();
    score_group(&mut sim, "GB-1", 4, 0);

    sim.reset_all().unwrap();
    assert_eq!(sim.state(), Simulation::new().state());
    assert_eq!(sim.simulation_name(), DEFAULT_SIMULATION_NAME);
  }

  #[test]
  fn parse_score_accepts_blank_and_digits_only() {
    assert_eq!(parse_score(""), Ok(None));
    assert_eq!(parse_score("  "), Ok(None));
    assert_eq!(parse_score("3"), Ok(Some(3)));
    assert_eq!(parse_score(" 12 "), Ok(Some(12)));
    assert_eq!(parse_score("-1"), Err(EngineError::InvalidScore("-1".into())));
    assert_eq!(parse_score("two"), Err(EngineError::InvalidScore("two".into())));
    assert_eq!(parse_score("1.5"), Err(EngineError::InvalidScore("1.5".into())));
    assert_eq!(parse_score("+3"), Err(EngineError::InvalidScore("+3".into())));
    assert_eq!(parse_score("99"), Ok(Some(MAX_SCORE)));
    assert_eq!(parse_score("100"), Err(EngineError::InvalidScore("100".into())));
    assert_eq!(
      parse_score("4294967296"),
      Err(EngineError::InvalidScore("4294967296".into()))
    );
  }

  #[test]
  fn oversized_scores_are_rejected_before_reaching_the_tables() {
    let mut sim = Simulation::new();
    let before = sim.state().clone();
    assert_eq!(
      sim.set_group_match_score("GA-1", Side::Home, Some(3_000_000_000)),
      Err(EngineError::InvalidScore("3000000000".into()))
    );
    assert_eq!(
      sim.set_group_match_score("GA-1", Side::Home, Some(u32::MAX)),
      Err(EngineError::InvalidScore(u32::MAX.to_string()))
    );
    assert_eq!(
      sim.set_knockout_match_score("R32-4", Side::Home, Some(MAX_SCORE + 1)),
      Err(EngineError::InvalidScore("100".into()))
    );
    assert_eq!(sim.state(), &before);

    score_group(&mut sim, "GA-1", MAX_SCORE, 0);
    score_group(&mut sim, "GA-3", MAX_SCORE, 0);
    let mex = &sim.standings()[&'A'][0];
    assert_eq!(mex.goals_for, 2 * MAX_SCORE);
    assert_eq!(mex.goal_difference, 2 * MAX_SCORE as i32);
  }
}
