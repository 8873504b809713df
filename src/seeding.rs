use serde::Serialize;
use std::collections::BTreeMap;
use tracing::{debug, warn};

use crate::standings::rank_order;
use crate::types::{GroupId, SlotValue, StandingRow, Standings, BEST_THIRD_COUNT};

/// A Round-of-32 position reserved for a third-placed team from one of the
/// groups listed in `pool`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PoolSlot {
  pub match_id: &'static str,
  pub pool: &'static str,
}

impl PoolSlot {
  pub fn accepts(&self, group: GroupId) -> bool {
    self.pool.contains(group)
  }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ThirdPlaceCandidate {
  pub group_id: GroupId,
  #[serde(flatten)]
  pub row: StandingRow,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum SeedingStrategy {
  /// Every assignment respects its slot's pool.
  Constrained,
  /// No legal assignment existed; slots were filled in rank order.
  Fallback,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SeedingOutcome {
  pub assignments: BTreeMap<&'static str, SlotValue>,
  pub strategy: SeedingStrategy,
}

/// Third-ranked row of every group that has one, best first, cut to eight.
pub fn rank_third_placed(standings: &Standings) -> Vec<ThirdPlaceCandidate> {
  let mut thirds = standings
    .iter()
    .filter_map(|(group_id, rows)| {
      rows.get(2).map(|row| ThirdPlaceCandidate {
        group_id: *group_id,
        row: row.clone(),
      })
    })
    .collect::<Vec<_>>();
  thirds.sort_by(|a, b| rank_order(&a.row, &b.row));
  thirds.truncate(BEST_THIRD_COUNT);
  thirds
}

/// Place ranked third-placed teams into pool slots.
///
/// Slots are tried in order and, within a slot, candidates in rank order;
/// a dead end pops the latest pick and moves to the next candidate. When no
/// complete legal assignment exists the slots are filled in order with the
/// candidates in rank order, pools ignored.
pub fn assign_third_place_teams(candidates: &[ThirdPlaceCandidate], slots: &[PoolSlot]) -> SeedingOutcome {
  let mut used = vec![false; candidates.len()];
  let mut picks = Vec::with_capacity(slots.len());

  if candidates.len() >= slots.len() && solve(0, slots, candidates, &mut used, &mut picks) {
    let assignments = slots
      .iter()
      .zip(picks.iter())
      .map(|(slot, &idx)| (slot.match_id, candidates[idx].row.team.clone()))
      .collect::<BTreeMap<_, _>>();
    debug!(slots = assignments.len(), "third-place seeding solved");
    return SeedingOutcome {
      assignments,
      strategy: SeedingStrategy::Constrained,
    };
  }

  warn!(
    candidates = candidates.len(),
    slots = slots.len(),
    "no legal third-place assignment; filling pool slots in rank order"
  );
  let assignments = slots
    .iter()
    .zip(candidates.iter())
    .map(|(slot, candidate)| (slot.match_id, candidate.row.team.clone()))
    .collect::<BTreeMap<_, _>>();
  SeedingOutcome {
    assignments,
    strategy: SeedingStrategy::Fallback,
  }
}

fn solve(
  slot_idx: usize,
  slots: &[PoolSlot],
  candidates: &[ThirdPlaceCandidate],
  used: &mut [bool],
  picks: &mut Vec<usize>,
) -> bool {
  let Some(slot) = slots.get(slot_idx) else {
    return true;
  };
  for (idx, candidate) in candidates.iter().enumerate() {
    if used[idx] || !slot.accepts(candidate.group_id) {
      continue;
    }
    used[idx] = true;
    picks.push(idx);
    if solve(slot_idx + 1, slots, candidates, used, picks) {
      return true;
    }
    picks.pop();
    used[idx] = false;
  }
  false
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::bracket::pool_slots;
  use proptest::prelude::*;
  use std::collections::HashSet;

  fn row(team: &str, points: u32, gd: i32, gf: u32) -> StandingRow {
    let mut row = StandingRow::new(SlotValue::from(team));
    row.points = points;
    row.goal_difference = gd;
    row.goals_for = gf;
    row
  }

  /// Standings whose third-placed rows are given per group; other groups
  /// only report their top two.
  fn standings_with_thirds(thirds: &[(char, u32)]) -> Standings {
    let mut standings = Standings::new();
    for letter in 'A'..='L' {
      let mut rows = vec![row(&format!("{letter}1"), 9, 6, 6), row(&format!("{letter}2"), 6, 2, 4)];
      if let Some((_, points)) = thirds.iter().find(|(g, _)| *g == letter) {
        rows.push(row(&format!("{letter}3"), *points, 0, 2));
      }
      standings.insert(letter, rows);
    }
    standings
  }

  fn assert_legal(outcome: &SeedingOutcome, candidates: &[ThirdPlaceCandidate]) {
    for slot in pool_slots() {
      let team = &outcome.assignments[slot.match_id];
      let candidate = candidates.iter().find(|c| &c.row.team == team).unwrap();
      assert!(slot.accepts(candidate.group_id), "{} placed in {}", team, slot.match_id);
    }
  }

  #[test]
  fn ranks_third_places_by_points_then_difference_then_goals() {
    let mut standings = Standings::new();
    standings.insert('A', vec![row("A1", 9, 0, 0), row("A2", 6, 0, 0), row("A3", 4, 1, 3)]);
    standings.insert('B', vec![row("B1", 9, 0, 0), row("B2", 6, 0, 0), row("B3", 4, 1, 5)]);
    standings.insert('C', vec![row("C1", 9, 0, 0), row("C2", 6, 0, 0), row("C3", 5, -2, 1)]);
    standings.insert('D', vec![row("D1", 9, 0, 0), row("D2", 6, 0, 0)]);

    let ranked = rank_third_placed(&standings);
    let teams: Vec<String> = ranked.iter().map(|c| c.row.team.to_string()).collect();
    assert_eq!(teams, ["C3", "B3", "A3"]);
    assert_eq!(ranked[0].group_id, 'C');
  }

  #[test]
  fn only_best_eight_of_twelve_advance() {
    let thirds: Vec<(char, u32)> = ('A'..='L').zip([1, 2, 3, 4, 5, 6, 7, 8, 9, 0, 0, 0]).collect();
    let ranked = rank_third_placed(&standings_with_thirds(&thirds));
    assert_eq!(ranked.len(), BEST_THIRD_COUNT);
    assert_eq!(ranked[0].group_id, 'I');
    assert!(ranked.iter().all(|c| !['J', 'K', 'L', 'A'].contains(&c.group_id)));
  }

  #[test]
  fn eight_groups_fill_every_pool_slot_legally() {
    let thirds: Vec<(char, u32)> = ('A'..='H').zip([7, 6, 5, 4, 3, 2, 1, 0]).collect();
    let candidates = rank_third_placed(&standings_with_thirds(&thirds));
    assert_eq!(candidates.len(), 8);

    let outcome = assign_third_place_teams(&candidates, &pool_slots());
    assert_eq!(outcome.strategy, SeedingStrategy::Constrained);
    assert_eq!(outcome.assignments.len(), 8);
    let distinct: HashSet<_> = outcome.assignments.values().collect();
    assert_eq!(distinct.len(), 8);
    assert_legal(&outcome, &candidates);
  }

  #[test]
  fn too_few_candidates_falls_back_to_rank_order() {
    let thirds = [('A', 3), ('B', 2), ('C', 1)];
    let candidates = rank_third_placed(&standings_with_thirds(&thirds));
    let outcome = assign_third_place_teams(&candidates, &pool_slots());

    assert_eq!(outcome.strategy, SeedingStrategy::Fallback);
    assert_eq!(outcome.assignments.len(), 3);
    assert_eq!(outcome.assignments["R32-1"], SlotValue::team("A3"));
    assert_eq!(outcome.assignments["R32-2"], SlotValue::team("B3"));
    assert_eq!(outcome.assignments["R32-7"], SlotValue::team("C3"));
    assert!(!outcome.assignments.contains_key("R32-8"));
  }

  #[test]
  fn unsatisfiable_pools_fall_back_without_failing() {
    // Group L is in no pool.
    let thirds: Vec<(char, u32)> = ['A', 'B', 'C', 'D', 'G', 'F', 'H', 'L']
      .into_iter()
      .zip([8, 7, 6, 5, 4, 3, 2, 1])
      .collect();
    let candidates = rank_third_placed(&standings_with_thirds(&thirds));
    let outcome = assign_third_place_teams(&candidates, &pool_slots());

    assert_eq!(outcome.strategy, SeedingStrategy::Fallback);
    assert_eq!(outcome.assignments.len(), 8);
    assert_eq!(outcome.assignments["R32-1"], SlotValue::team("A3"));
  }

  proptest! {
    #[test]
    fn prop_constrained_outcomes_respect_pools(points in proptest::collection::vec(0u32..10, 12)) {
      let thirds: Vec<(char, u32)> = ('A'..='L').zip(points).collect();
      let candidates = rank_third_placed(&standings_with_thirds(&thirds));
      let outcome = assign_third_place_teams(&candidates, &pool_slots());

      prop_assert_eq!(outcome.assignments.len(), 8);
      let distinct: HashSet<_> = outcome.assignments.values().collect();
      prop_assert_eq!(distinct.len(), 8);
      if outcome.strategy == SeedingStrategy::Constrained {
        for slot in pool_slots() {
          let team = &outcome.assignments[slot.match_id];
          let candidate = candidates.iter().find(|c| &c.row.team == team).unwrap();
          prop_assert!(slot.accepts(candidate.group_id));
        }
      }
    }
  }
}
