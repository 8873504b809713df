use serde::{Deserialize, Serialize};
use std::{collections::BTreeMap, fmt};

// ── Constants ──────────────────────────────────────────────────────────

pub const GROUP_COUNT: usize = 12;
pub const TEAMS_PER_GROUP: usize = 4;
pub const MATCHES_PER_GROUP: usize = 6;
pub const BEST_THIRD_COUNT: usize = 8;
pub const KNOCKOUT_MATCH_COUNT: usize = 32;
pub const PLAYOFF_PREFIX: &str = "PLAYOFF_";
pub const DEFAULT_SIMULATION_NAME: &str = "My Simulation";
/// Highest score accepted for either side of a match.
pub const MAX_SCORE: u32 = 99;

// ── Aliases ────────────────────────────────────────────────────────────

pub type TeamId = String;
pub type PathKey = String;
pub type GroupId = char;

/// Group id → ranked table, ordered by group letter.
pub type Standings = BTreeMap<GroupId, Vec<StandingRow>>;

// ── Reference data ─────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Team {
    pub id: &'static str,
    pub name: &'static str,
    pub flag: &'static str,
    /// Lower is stronger.
    pub rating: u16,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PlayoffPath {
    pub key: &'static str,
    pub name: &'static str,
    pub candidates: &'static [&'static str],
}

impl PlayoffPath {
    pub fn has_candidate(&self, team_id: &str) -> bool {
        self.candidates.iter().any(|candidate| *candidate == team_id)
    }
}

// ── Slots ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Side {
    Home,
    Away,
}

/// A group position: either a concrete team or a playoff path that has no
/// selected winner yet.
///
/// On the wire a slot is the team id, or `PLAYOFF_<key>` while pending.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum SlotValue {
    Resolved(TeamId),
    Pending(PathKey),
}

impl SlotValue {
    pub fn team(id: impl Into<TeamId>) -> Self {
        SlotValue::Resolved(id.into())
    }

    pub fn playoff(key: impl Into<PathKey>) -> Self {
        SlotValue::Pending(key.into())
    }

    /// Concrete team id, `None` while the playoff is unresolved.
    pub fn team_id(&self) -> Option<&str> {
        match self {
            SlotValue::Resolved(id) => Some(id),
            SlotValue::Pending(_) => None,
        }
    }
}

impl From<String> for SlotValue {
    fn from(raw: String) -> Self {
        match raw.strip_prefix(PLAYOFF_PREFIX) {
            Some(key) => SlotValue::Pending(key.to_string()),
            None => SlotValue::Resolved(raw),
        }
    }
}

impl From<&str> for SlotValue {
    fn from(raw: &str) -> Self {
        SlotValue::from(raw.to_string())
    }
}

impl From<SlotValue> for String {
    fn from(slot: SlotValue) -> Self {
        slot.to_string()
    }
}

impl fmt::Display for SlotValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SlotValue::Resolved(id) => f.write_str(id),
            SlotValue::Pending(key) => write!(f, "{PLAYOFF_PREFIX}{key}"),
        }
    }
}

// ── Group stage ────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Group {
    pub id: GroupId,
    #[serde(rename = "teams")]
    pub slots: [SlotValue; TEAMS_PER_GROUP],
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupMatch {
    pub id: String,
    pub group: GroupId,
    pub home: SlotValue,
    pub away: SlotValue,
    pub home_score: Option<u32>,
    pub away_score: Option<u32>,
    /// Both scores present. Kept in sync by [`GroupMatch::set_score`].
    pub finished: bool,
}

impl GroupMatch {
    pub fn new(id: String, group: GroupId, home: SlotValue, away: SlotValue) -> Self {
        GroupMatch {
            id,
            group,
            home,
            away,
            home_score: None,
            away_score: None,
            finished: false,
        }
    }

    pub fn set_score(&mut self, side: Side, value: Option<u32>) {
        match side {
            Side::Home => self.home_score = value,
            Side::Away => self.away_score = value,
        }
        self.finished = self.home_score.is_some() && self.away_score.is_some();
    }

    /// Both scores when the match is finished.
    pub fn result(&self) -> Option<(u32, u32)> {
        Some((self.home_score?, self.away_score?))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StandingRow {
    #[serde(rename = "id")]
    pub team: SlotValue,
    pub played: u32,
    pub won: u32,
    pub drawn: u32,
    pub lost: u32,
    #[serde(rename = "gf")]
    pub goals_for: u32,
    #[serde(rename = "ga")]
    pub goals_against: u32,
    #[serde(rename = "gd")]
    pub goal_difference: i32,
    pub points: u32,
}

impl StandingRow {
    pub fn new(team: SlotValue) -> Self {
        StandingRow {
            team,
            played: 0,
            won: 0,
            drawn: 0,
            lost: 0,
            goals_for: 0,
            goals_against: 0,
            goal_difference: 0,
            points: 0,
        }
    }
}

// ── Knockout stage ─────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Round {
    RoundOf32,
    RoundOf16,
    QuarterFinal,
    SemiFinal,
    Final,
    ThirdPlace,
}

impl Round {
    pub fn label(self) -> &'static str {
        match self {
            Round::RoundOf32 => "Round of 32",
            Round::RoundOf16 => "Round of 16",
            Round::QuarterFinal => "Quarter Finals",
            Round::SemiFinal => "Semi Finals",
            Round::Final => "Final",
            Round::ThirdPlace => "3rd Place",
        }
    }

    /// Round encoded in a knockout match id (`R32-3`, `QF-2`, `Final`, ...).
    pub fn for_match_id(id: &str) -> Option<Round> {
        match id {
            "Final" => return Some(Round::Final),
            "3rdPlace" => return Some(Round::ThirdPlace),
            _ => {}
        }
        let (prefix, number) = id.split_once('-')?;
        let (round, count) = match prefix {
            "R32" => (Round::RoundOf32, 16),
            "R16" => (Round::RoundOf16, 8),
            "QF" => (Round::QuarterFinal, 4),
            "SF" => (Round::SemiFinal, 2),
            _ => return None,
        };
        let number = number.parse::<usize>().ok()?;
        (1..=count).contains(&number).then_some(round)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct KnockoutMatch {
    pub id: String,
    pub round: Round,
    pub home: Option<TeamId>,
    pub away: Option<TeamId>,
    pub home_score: Option<u32>,
    pub away_score: Option<u32>,
    pub winner: Option<TeamId>,
    pub penalty_winner: Option<TeamId>,
}

impl KnockoutMatch {
    pub fn new(id: impl Into<String>, round: Round) -> Self {
        KnockoutMatch {
            id: id.into(),
            round,
            home: None,
            away: None,
            home_score: None,
            away_score: None,
            winner: None,
            penalty_winner: None,
        }
    }

    pub(crate) fn set_score_raw(&mut self, side: Side, value: Option<u32>) {
        match side {
            Side::Home => self.home_score = value,
            Side::Away => self.away_score = value,
        }
    }

    pub fn has_participants(&self) -> bool {
        self.home.is_some() && self.away.is_some()
    }

    pub fn side_of(&self, team_id: &str) -> Option<Side> {
        if self.home.as_deref() == Some(team_id) {
            Some(Side::Home)
        } else if self.away.as_deref() == Some(team_id) {
            Some(Side::Away)
        } else {
            None
        }
    }

    /// The participant that did not win, once the match is decided.
    pub fn loser(&self) -> Option<&str> {
        let winner = self.winner.as_deref()?;
        let home = self.home.as_deref()?;
        let away = self.away.as_deref()?;
        if winner == home {
            Some(away)
        } else {
            Some(home)
        }
    }

    pub fn is_fully_scored(&self) -> bool {
        self.home_score.is_some() && self.away_score.is_some()
    }
}
