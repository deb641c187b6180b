use thiserror::Error;

use crate::models::Period;

/// Why the tracker refused an operation.
///
/// A rejection never changes state; callers normally disable the action
/// up front and treat this as a silent no-op.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Rejection {
    #[error("match {0} not found")]
    MatchNotFound(String),

    #[error("event {0} not found")]
    EventNotFound(String),

    #[error("panel {0} not found")]
    PanelNotFound(String),

    #[error("team {0} is not playing in this match")]
    UnknownTeam(String),

    #[error("player {0} is not on the team's roster")]
    UnknownPlayer(String),

    #[error("events cannot be recorded during {0}")]
    NotPlaying(Period),

    #[error("cannot {action} during {period}")]
    IllegalTransition {
        action: &'static str,
        period: Period,
    },

    #[error("event type cannot change from {from} to {to}")]
    TypeChange {
        from: &'static str,
        to: &'static str,
    },

    #[error("no match is open")]
    NoOpenMatch,
}

/// Failure reported by a storage backend
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

pub type TrackerResult<T> = Result<T, Rejection>;
