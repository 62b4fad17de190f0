//! Session errors.
//!
//! Business failures are returned as `Err` values and never unwind; a
//! rejected command leaves the session untouched. `InternalInconsistency`
//! is different: it means the planner and selector disagree about table
//! sizes, which is a defect rather than a business condition.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur while operating a session
#[derive(Debug, Clone, Deserialize, Eq, Error, PartialEq, Serialize)]
pub enum SessionError {
    #[error("room code cannot be empty")]
    EmptyRoomCode,

    #[error("session not found: {0}")]
    SessionNotFound(String),

    #[error("session expired: {0}")]
    SessionExpired(String),

    #[error("game already ended")]
    GameEnded,

    #[error("game not started")]
    GameNotStarted,

    #[error("game already started")]
    GameAlreadyStarted,

    #[error("joining after start is disabled")]
    JoinClosed,

    #[error("participant already joined: {0}")]
    DuplicateParticipant(String),

    #[error("participant not found: {0}")]
    ParticipantNotFound(String),

    #[error("participant id cannot be empty")]
    EmptyParticipantId,

    #[error("insufficient participants: need {needed}, have {current}")]
    InsufficientParticipants { needed: usize, current: usize },

    #[error("maximum of {0} rounds reached")]
    MaxRoundsReached(u32),

    #[error("table not found: {0}")]
    TableNotFound(u32),

    #[error("table {0} is full")]
    TableFull(u32),

    #[error("round {0} is not the current round")]
    NotCurrentRound(u32),

    #[error("no tables generated for the current round")]
    NoCurrentRound,

    #[error("result already recorded for table {0}")]
    ResultAlreadyRecorded(u32),

    #[error("cannot drop out after the round has started")]
    DropOutAfterStart,

    #[error("custom groups are disabled for this session")]
    CustomGroupsDisabled,

    #[error("custom group not found")]
    CustomGroupNotFound,

    #[error("invalid game state: table size {actual} does not match plan {expected}")]
    InternalInconsistency { expected: usize, actual: usize },
}

pub type SessionResult<T> = Result<T, SessionError>;
