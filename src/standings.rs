use std::cmp::Ordering;

use crate::types::{Group, GroupMatch, SlotValue, StandingRow, Standings, TEAMS_PER_GROUP};

/// Ranking order shared by group tables and the third-place table:
/// points, then goal difference, then goals for, all descending.
pub fn rank_order(a: &StandingRow, b: &StandingRow) -> Ordering {
    b.points
        .cmp(&a.points)
        .then(b.goal_difference.cmp(&a.goal_difference))
        .then(b.goals_for.cmp(&a.goals_for))
}

/// Ranked table for one group.
///
/// Rows are created for every slot, pending placeholders included. Only
/// finished matches count, and a match naming a slot outside `slots` is
/// skipped. Rows level on every key keep slot order.
pub fn calculate_standings(matches: &[GroupMatch], slots: &[SlotValue; TEAMS_PER_GROUP]) -> Vec<StandingRow> {
    let mut rows: Vec<StandingRow> = slots.iter().cloned().map(StandingRow::new).collect();

    for m in matches {
        let Some((home_goals, away_goals)) = m.result() else {
            continue;
        };
        let home_idx = rows.iter().position(|row| row.team == m.home);
        let away_idx = rows.iter().position(|row| row.team == m.away);
        let (Some(home_idx), Some(away_idx)) = (home_idx, away_idx) else {
            continue;
        };
        credit(&mut rows[home_idx], home_goals, away_goals);
        credit(&mut rows[away_idx], away_goals, home_goals);
    }

    for row in rows.iter_mut() {
        row.goal_difference = goal_difference(row.goals_for, row.goals_against);
    }

    rows.sort_by(rank_order);
    rows
}

fn credit(row: &mut StandingRow, scored: u32, conceded: u32) {
    row.played += 1;
    row.goals_for = row.goals_for.saturating_add(scored);
    row.goals_against = row.goals_against.saturating_add(conceded);
    match scored.cmp(&conceded) {
        Ordering::Greater => {
            row.won += 1;
            row.points += 3;
        }
        Ordering::Equal => {
            row.drawn += 1;
            row.points += 1;
        }
        Ordering::Less => row.lost += 1,
    }
}

fn goal_difference(goals_for: u32, goals_against: u32) -> i32 {
    let diff = i64::from(goals_for) - i64::from(goals_against);
    diff.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32
}

/// Tables for every group, each fed only with that group's matches.
pub fn calculate_all(groups: &[Group], matches: &[GroupMatch]) -> Standings {
    groups
        .iter()
        .map(|group| {
            let group_matches: Vec<GroupMatch> =
                matches.iter().filter(|m| m.group == group.id).cloned().collect();
            (group.id, calculate_standings(&group_matches, &group.slots))
        })
        .collect()
}
