use std::collections::HashMap;

use crate::types::{Group, GroupMatch, MATCHES_PER_GROUP};

/// Slot index pairs, in fixture order. Every pair of the four slots plays once.
pub const PAIRINGS: [(usize, usize); MATCHES_PER_GROUP] =
    [(0, 1), (2, 3), (0, 2), (1, 3), (0, 3), (1, 2)];

pub fn group_match_id(group: char, fixture_index: usize) -> String {
    format!("G{}-{}", group, fixture_index + 1)
}

/// Fresh fixture list for one group. Scores start empty.
pub fn generate_group_matches(group: &Group) -> Vec<GroupMatch> {
    PAIRINGS
        .iter()
        .enumerate()
        .map(|(idx, &(home, away))| {
            GroupMatch::new(
                group_match_id(group.id, idx),
                group.id,
                group.slots[home].clone(),
                group.slots[away].clone(),
            )
        })
        .collect()
}

pub fn generate_all_group_matches(groups: &[Group]) -> Vec<GroupMatch> {
    groups.iter().flat_map(generate_group_matches).collect()
}

/// Carry entered scores from `previous` onto a fresh generation.
///
/// Matching is by id only. Participants always come from `generated`, so a
/// re-selected playoff winner relabels its fixtures while their scores stay.
pub fn merge_group_matches(generated: Vec<GroupMatch>, previous: &[GroupMatch]) -> Vec<GroupMatch> {
    let by_id: HashMap<&str, &GroupMatch> =
        previous.iter().map(|m| (m.id.as_str(), m)).collect();

    generated
        .into_iter()
        .map(|mut fresh| {
            if let Some(old) = by_id.get(fresh.id.as_str()) {
                fresh.home_score = old.home_score;
                fresh.away_score = old.away_score;
                fresh.finished = fresh.home_score.is_some() && fresh.away_score.is_some();
            }
            fresh
        })
        .collect()
}
