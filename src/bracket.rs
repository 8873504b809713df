use std::collections::HashMap;
use tracing::{debug, warn};

use crate::match_state::settle;
use crate::seeding::{
  assign_third_place_teams, rank_third_placed, PoolSlot, SeedingOutcome, SeedingStrategy,
  ThirdPlaceCandidate,
};
use crate::types::{GroupId, KnockoutMatch, Round, Standings, TeamId, KNOCKOUT_MATCH_COUNT};

/// Where a knockout participant comes from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SlotSource {
  GroupWinner(GroupId),
  GroupRunnerUp(GroupId),
  /// A best third-placed team from one of these groups, placed by seeding.
  BestThird(&'static str),
  /// Winner of the match at this plan index.
  Winner(usize),
  /// Loser of the match at this plan index.
  Loser(usize),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PlannedMatch {
  pub id: String,
  pub round: Round,
  pub home: SlotSource,
  pub away: SlotSource,
}

use SlotSource::{BestThird as Third, GroupRunnerUp as Second, GroupWinner as First};

static ROUND_OF_32: [(&str, SlotSource, SlotSource); 16] = [
  ("R32-1", First('E'), Third("ABCDF")),
  ("R32-2", First('I'), Third("CDFGH")),
  ("R32-3", Second('A'), Second('B')),
  ("R32-4", First('F'), Second('C')),
  ("R32-5", Second('K'), Second('L')),
  ("R32-6", First('H'), Second('J')),
  ("R32-7", First('D'), Third("BEFIJ")),
  ("R32-8", First('G'), Third("AEHIJ")),
  ("R32-9", First('C'), Second('F')),
  ("R32-10", Second('E'), Second('I')),
  ("R32-11", First('A'), Third("CEFHI")),
  ("R32-12", First('L'), Third("EHIJK")),
  ("R32-13", First('J'), Second('H')),
  ("R32-14", Second('D'), Second('G')),
  ("R32-15", First('B'), Third("EFGIJ")),
  ("R32-16", First('K'), Third("EHIJK")),
];

/// Round-of-32 positions filled by best third-placed teams, in table order.
pub fn pool_slots() -> Vec<PoolSlot> {
  ROUND_OF_32
    .iter()
    .flat_map(|&(match_id, home, away)| {
      [home, away].into_iter().filter_map(move |source| match source {
        SlotSource::BestThird(pool) => Some(PoolSlot { match_id, pool }),
        _ => None,
      })
    })
    .collect()
}

/// All 32 knockout fixtures in round order. Every feeder precedes the match
/// it feeds.
pub fn bracket_plan() -> Vec<PlannedMatch> {
  let mut plan = Vec::with_capacity(KNOCKOUT_MATCH_COUNT);

  let mut previous = ROUND_OF_32
    .iter()
    .map(|(id, home, away)| push_match(&mut plan, id.to_string(), Round::RoundOf32, *home, *away))
    .collect::<Vec<_>>();

  for (round, prefix) in [
    (Round::RoundOf16, "R16"),
    (Round::QuarterFinal, "QF"),
    (Round::SemiFinal, "SF"),
  ] {
    previous = previous
      .chunks_exact(2)
      .enumerate()
      .map(|(i, pair)| {
        push_match(
          &mut plan,
          format!("{}-{}", prefix, i + 1),
          round,
          SlotSource::Winner(pair[0]),
          SlotSource::Winner(pair[1]),
        )
      })
      .collect();
  }

  if let [sf1, sf2] = *previous.as_slice() {
    push_match(&mut plan, "Final".to_string(), Round::Final, SlotSource::Winner(sf1), SlotSource::Winner(sf2));
    push_match(&mut plan, "3rdPlace".to_string(), Round::ThirdPlace, SlotSource::Loser(sf1), SlotSource::Loser(sf2));
  }

  plan
}

fn push_match(plan: &mut Vec<PlannedMatch>, id: String, round: Round, home: SlotSource, away: SlotSource) -> usize {
  plan.push(PlannedMatch { id, round, home, away });
  plan.len() - 1
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KnockoutBracket {
  pub matches: Vec<KnockoutMatch>,
  pub best_thirds: Vec<ThirdPlaceCandidate>,
  pub seeding: SeedingStrategy,
}

/// Rebuild the whole bracket from the current standings.
///
/// Participants are always re-derived. Scores and the shootout winner of any
/// match present in `existing` are carried forward by id and the winner is
/// then re-settled against the new participants, so a change upstream flows
/// down the bracket in this single pass.
pub fn generate_knockout_bracket(standings: &Standings, existing: &[KnockoutMatch]) -> KnockoutBracket {
  let best_thirds = rank_third_placed(standings);
  let seeding = assign_third_place_teams(&best_thirds, &pool_slots());
  let previous = existing
    .iter()
    .map(|m| (m.id.as_str(), m))
    .collect::<HashMap<_, _>>();

  let plan = bracket_plan();
  let mut matches: Vec<KnockoutMatch> = Vec::with_capacity(plan.len());
  let mut carried = 0usize;

  for planned in &plan {
    let mut m = KnockoutMatch::new(planned.id.clone(), planned.round);
    m.home = resolve_slot(planned.home, &planned.id, standings, &seeding, &matches);
    m.away = resolve_slot(planned.away, &planned.id, standings, &seeding, &matches);

    if let Some(old) = previous.get(planned.id.as_str()) {
      if carry_forward(&mut m, old) {
        carried += 1;
      }
    }
    settle(&mut m);
    matches.push(m);
  }

  debug!(
    matches = matches.len(),
    carried,
    best_thirds = best_thirds.len(),
    "knockout bracket regenerated"
  );
  KnockoutBracket {
    matches,
    best_thirds,
    seeding: seeding.strategy,
  }
}

/// Copy entered results from `old`. Returns whether anything was entered.
fn carry_forward(m: &mut KnockoutMatch, old: &KnockoutMatch) -> bool {
  let entered = old.home_score.is_some() || old.away_score.is_some() || old.penalty_winner.is_some();
  if !entered {
    return false;
  }
  m.home_score = old.home_score;
  m.away_score = old.away_score;
  m.penalty_winner = old.penalty_winner.clone();

  let replaced = |before: &Option<TeamId>, after: &Option<TeamId>| before.is_some() && before != after;
  if replaced(&old.home, &m.home) || replaced(&old.away, &m.away) {
    warn!(
      match_id = %m.id,
      old_home = ?old.home,
      old_away = ?old.away,
      new_home = ?m.home,
      new_away = ?m.away,
      "participants changed under an entered score; keeping the score"
    );
  }
  true
}

fn resolve_slot(
  source: SlotSource,
  match_id: &str,
  standings: &Standings,
  seeding: &SeedingOutcome,
  built: &[KnockoutMatch],
) -> Option<TeamId> {
  match source {
    SlotSource::GroupWinner(group) => group_place(standings, group, 0),
    SlotSource::GroupRunnerUp(group) => group_place(standings, group, 1),
    SlotSource::BestThird(_) => seeding
      .assignments
      .get(match_id)
      .and_then(|slot| slot.team_id())
      .map(str::to_string),
    SlotSource::Winner(idx) => built.get(idx).and_then(|m| m.winner.clone()),
    SlotSource::Loser(idx) => built.get(idx).and_then(|m| m.loser()).map(str::to_string),
  }
}

/// Direct qualifier at `place` (0 = winner, 1 = runner-up). Needs at least
/// two rows; a pending playoff placeholder qualifies as TBD.
fn group_place(standings: &Standings, group: GroupId, place: usize) -> Option<TeamId> {
  let rows = standings.get(&group)?;
  if rows.len() < 2 {
    return None;
  }
  rows.get(place)?.team.team_id().map(str::to_string)
}
