use thiserror::Error;

/// Failure causes surfaced by the competition engine. Every operation is
/// deterministic, so a retry with unchanged input fails identically; the
/// caller decides recoverability from the kind alone.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("invalid state: {0}")]
    InvalidState(String),

    #[error("inconsistent schedule: {0}")]
    InconsistentSchedule(String),
}

impl EngineError {
    pub fn not_found(what: impl Into<String>) -> Self {
        EngineError::NotFound(what.into())
    }

    pub fn invalid_state(what: impl Into<String>) -> Self {
        EngineError::InvalidState(what.into())
    }
}

pub type EngineResult<T> = Result<T, EngineError>;
