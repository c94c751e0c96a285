//! Engine error type.
//!
//! Every failure the engine can report is a caller error: nothing in here is
//! transient, so callers should surface the message instead of retrying.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    /// Date text does not have the `yyyy-mm-dd` shape.
    #[error("malformed date value: {0:?}")]
    MalformedInput(String),

    /// Date text has the right shape but names no real day.
    #[error("invalid date value: {0:?}")]
    InvalidCalendarDate(String),

    /// Day arithmetic left the representable calendar range.
    #[error("date out of range: {date} shifted by {days} days")]
    DateOutOfRange { date: String, days: i64 },

    #[error("precondition violated: {0}")]
    PreconditionViolated(String),

    #[error("invalid task class: {0:?}")]
    InvalidTaskClass(String),

    #[error("invalid priority value: {0:?}")]
    InvalidPriority(String),

    #[error("final priority must be higher than initial priority")]
    PriorityOrder,

    #[error("due date cannot be in the past")]
    DueInPast,

    #[error("due date must occur after start date")]
    DueNotAfterStart,

    #[error("need to specify at least one location")]
    NoLocations,

    #[error("invalid location ID: {0}")]
    UnknownLocation(u64),

    #[error("label may not be empty")]
    EmptyLabel,

    #[error("invalid timezone: {0:?}")]
    InvalidTimezone(String),
}

pub type Result<T> = std::result::Result<T, EngineError>;
