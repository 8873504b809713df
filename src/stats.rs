use serde::Serialize;

use crate::registry::find_team;
use crate::types::{GroupMatch, KnockoutMatch, TeamId};

/// Rating gap above which a win by the weaker side counts as an upset.
pub const UPSET_RATING_GAP: u16 = 20;
const TOP_SCORING_LIMIT: usize = 5;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamGoals {
    pub team_id: TeamId,
    pub goals: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Upset {
    pub match_id: String,
    pub winner: TeamId,
    pub favorite: TeamId,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TournamentStats {
    pub total_group_matches: usize,
    pub completed_group_matches: usize,
    pub group_progress: u32,
    pub total_knockout_matches: usize,
    pub completed_knockout_matches: usize,
    pub knockout_progress: u32,
    pub total_goals: u32,
    pub avg_goals_per_match: f64,
    pub top_scoring_teams: Vec<TeamGoals>,
    pub champion: Option<TeamId>,
    pub runner_up: Option<TeamId>,
    pub third_place: Option<TeamId>,
    pub fourth_place: Option<TeamId>,
    pub upsets: Vec<Upset>,
}

pub fn tournament_stats(group_matches: &[GroupMatch], knockout_matches: &[KnockoutMatch]) -> TournamentStats {
    let completed_group_matches = group_matches.iter().filter(|m| m.finished).count();
    let completed_knockout_matches = knockout_matches.iter().filter(|m| m.winner.is_some()).count();

    let mut goals = GoalTally::default();
    let mut upsets = Vec::new();

    for m in group_matches {
        let Some((home_goals, away_goals)) = m.result() else {
            continue;
        };
        goals.add(m.home.team_id(), home_goals);
        goals.add(m.away.team_id(), away_goals);
        if let (Some(home), Some(away)) = (m.home.team_id(), m.away.team_id()) {
            upsets.extend(detect_upset(&m.id, (home, home_goals), (away, away_goals)));
        }
    }

    for m in knockout_matches {
        let (Some(home_goals), Some(away_goals)) = (m.home_score, m.away_score) else {
            continue;
        };
        goals.add(m.home.as_deref(), home_goals);
        goals.add(m.away.as_deref(), away_goals);
        if m.winner.is_none() {
            continue;
        }
        if let (Some(home), Some(away)) = (m.home.as_deref(), m.away.as_deref()) {
            upsets.extend(detect_upset(&m.id, (home, home_goals), (away, away_goals)));
        }
    }

    let played = completed_group_matches + completed_knockout_matches;
    let avg_goals_per_match = if played > 0 {
        (f64::from(goals.total) / played as f64 * 100.0).round() / 100.0
    } else {
        0.0
    };

    let final_match = knockout_matches.iter().find(|m| m.id == "Final");
    let third_place_match = knockout_matches.iter().find(|m| m.id == "3rdPlace");

    TournamentStats {
        total_group_matches: group_matches.len(),
        completed_group_matches,
        group_progress: progress(completed_group_matches, group_matches.len()),
        total_knockout_matches: knockout_matches.len(),
        completed_knockout_matches,
        knockout_progress: progress(completed_knockout_matches, knockout_matches.len()),
        total_goals: goals.total,
        avg_goals_per_match,
        top_scoring_teams: goals.top(TOP_SCORING_LIMIT),
        champion: final_match.and_then(|m| m.winner.clone()),
        runner_up: final_match.and_then(|m| m.loser()).map(str::to_string),
        third_place: third_place_match.and_then(|m| m.winner.clone()),
        fourth_place: third_place_match.and_then(|m| m.loser()).map(str::to_string),
        upsets,
    }
}

fn progress(completed: usize, total: usize) -> u32 {
    if total == 0 {
        return 0;
    }
    (completed as f64 * 100.0 / total as f64).round() as u32
}

fn detect_upset(match_id: &str, home: (&str, u32), away: (&str, u32)) -> Option<Upset> {
    let (winner, loser) = if home.1 > away.1 {
        (home.0, away.0)
    } else if away.1 > home.1 {
        (away.0, home.0)
    } else {
        return None;
    };
    let winner_rating = find_team(winner)?.rating;
    let loser_rating = find_team(loser)?.rating;
    (winner_rating > loser_rating + UPSET_RATING_GAP).then(|| Upset {
        match_id: match_id.to_string(),
        winner: winner.to_string(),
        favorite: loser.to_string(),
    })
}

/// Goals per team in order of first appearance.
#[derive(Default)]
struct GoalTally {
    total: u32,
    by_team: Vec<TeamGoals>,
}

impl GoalTally {
    fn add(&mut self, team_id: Option<&str>, goals: u32) {
        self.total = self.total.saturating_add(goals);
        let Some(team_id) = team_id else {
            return;
        };
        match self.by_team.iter_mut().find(|entry| entry.team_id == team_id) {
            Some(entry) => entry.goals = entry.goals.saturating_add(goals),
            None => self.by_team.push(TeamGoals {
                team_id: team_id.to_string(),
                goals,
            }),
        }
    }

    fn top(mut self, limit: usize) -> Vec<TeamGoals> {
        self.by_team.sort_by(|a, b| b.goals.cmp(&a.goals));
        self.by_team.truncate(limit);
        self.by_team
    }
}
