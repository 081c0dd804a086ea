use ulid::Ulid;

use crate::store::StoreError;
use crate::time::MalformedTime;

/// Faults the engine surfaces to callers. Business rejections
/// (past/capacity/user-conflict) are not errors — see
/// [`super::ScheduleOutcome`].
#[derive(Debug)]
pub enum EngineError {
    /// Unparsable date/time/duration input. Never reaches the guards.
    MalformedTime(String),
    /// Unknown resource or reservation id. No retry.
    NotFound(Ulid),
    /// A resource invariant would be violated (capacity < 1, open >= close).
    InvalidResource(&'static str),
    LimitExceeded(&'static str),
    /// Storage-layer fault; fatal for the request, never retried here.
    Persistence(String),
}

impl std::fmt::Display for EngineError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EngineError::MalformedTime(s) => write!(f, "malformed time: {s}"),
            EngineError::NotFound(id) => write!(f, "not found: {id}"),
            EngineError::InvalidResource(msg) => write!(f, "invalid resource: {msg}"),
            EngineError::LimitExceeded(msg) => write!(f, "limit exceeded: {msg}"),
            EngineError::Persistence(e) => write!(f, "persistence failure: {e}"),
        }
    }
}

impl std::error::Error for EngineError {}

impl From<MalformedTime> for EngineError {
    fn from(e: MalformedTime) -> Self {
        EngineError::MalformedTime(e.0)
    }
}

impl From<StoreError> for EngineError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::NotFound(id) => EngineError::NotFound(id),
            StoreError::Unavailable(msg) => EngineError::Persistence(msg),
        }
    }
}
