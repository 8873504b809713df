use serde::Serialize;
use std::cmp::Ordering;

use crate::error::EngineError;
use crate::types::{KnockoutMatch, Side};

/// Result state of a knockout match, always derived from its fields.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum MatchPhase {
  /// A participant or a score is still missing.
  Pending,
  /// Scores differ; the higher side wins outright.
  Decisive,
  /// Level on score with no shootout winner recorded.
  AwaitingShootout,
  /// Level on score and decided on penalties.
  Resolved,
}

pub fn evaluate(m: &KnockoutMatch) -> MatchPhase {
  if !m.has_participants() {
    return MatchPhase::Pending;
  }
  let (Some(home), Some(away)) = (m.home_score, m.away_score) else {
    return MatchPhase::Pending;
  };
  if home != away {
    MatchPhase::Decisive
  } else if m.penalty_winner.is_some() {
    MatchPhase::Resolved
  } else {
    MatchPhase::AwaitingShootout
  }
}

/// Re-derive `winner` from scores, participants and the shootout winner.
///
/// A shootout winner survives only while the score is level and it is still
/// one of the participants.
pub fn settle(m: &mut KnockoutMatch) {
  let (Some(home), Some(away)) = (m.home_score, m.away_score) else {
    m.winner = None;
    m.penalty_winner = None;
    return;
  };

  match home.cmp(&away) {
    Ordering::Greater => {
      m.penalty_winner = None;
      m.winner = m.home.clone();
    }
    Ordering::Less => {
      m.penalty_winner = None;
      m.winner = m.away.clone();
    }
    Ordering::Equal => {
      let still_playing = m
        .penalty_winner
        .as_deref()
        .is_some_and(|team| m.side_of(team).is_some());
      if !still_playing {
        m.penalty_winner = None;
      }
      m.winner = m.penalty_winner.clone();
    }
  }

  if !m.has_participants() {
    m.winner = None;
  }
}

/// Enter or clear one side's score. Clearing is always allowed; entering a
/// value needs both participants.
pub fn apply_score(m: &mut KnockoutMatch, side: Side, value: Option<u32>) -> Result<(), EngineError> {
  if value.is_some() && !m.has_participants() {
    return Err(EngineError::MissingParticipants(m.id.clone()));
  }
  m.set_score_raw(side, value);
  settle(m);
  Ok(())
}

pub fn apply_penalty_winner(m: &mut KnockoutMatch, team_id: &str) -> Result<(), EngineError> {
  if !m.has_participants() {
    return Err(EngineError::MissingParticipants(m.id.clone()));
  }
  match evaluate(m) {
    MatchPhase::AwaitingShootout | MatchPhase::Resolved => {}
    MatchPhase::Pending | MatchPhase::Decisive => {
      return Err(EngineError::NotAwaitingShootout(m.id.clone()));
    }
  }
  if m.side_of(team_id).is_none() {
    return Err(EngineError::NotAParticipant {
      match_id: m.id.clone(),
      team: team_id.to_string(),
    });
  }
  m.penalty_winner = Some(team_id.to_string());
  settle(m);
  Ok(())
}
