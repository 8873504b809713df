use std::path::PathBuf;

use thiserror::Error;

/// Rejections raised by the engine's input operations.
///
/// A rejected event never mutates the simulation; callers surface the
/// message and keep the previous state.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EngineError {
    /// Playoff path key is not part of the registry.
    #[error("unknown playoff path: {0}")]
    UnknownPlayoffPath(String),
    /// Selected team is not one of the path's candidates.
    #[error("team {team} is not a candidate for playoff path {path}")]
    NotAPlayoffCandidate { path: String, team: String },
    /// No group match carries this id.
    #[error("group match not found: {0}")]
    GroupMatchNotFound(String),
    /// No knockout match carries this id.
    #[error("knockout match not found: {0}")]
    KnockoutMatchNotFound(String),
    /// Score entry on a knockout match that still has a TBD participant.
    #[error("knockout match {0} is missing participants")]
    MissingParticipants(String),
    /// Penalty winner recorded on a match that is not level on score.
    #[error("knockout match {0} is not awaiting a penalty shootout")]
    NotAwaitingShootout(String),
    /// Penalty winner is not one of the match participants.
    #[error("team {team} does not play in match {match_id}")]
    NotAParticipant { match_id: String, team: String },
    /// Score that is neither empty nor a plain integer up to `MAX_SCORE`.
    #[error("invalid score: {0:?}")]
    InvalidScore(String),
}

/// Failures while reading or writing the JSON configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("write config {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("serialize config: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Failures while moving a snapshot between disk and memory.
#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("read snapshot {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("write snapshot {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("serialize snapshot: {0}")]
    Serialize(#[from] serde_json::Error),
}
