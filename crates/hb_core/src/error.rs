use thiserror::Error;

/// Errors surfaced by the play resolution engine.
///
/// Probabilistic outcomes (wrong umpire calls, bobbles, misses) are never
/// errors; they are simulated results. Everything here means either the
/// caller handed us a broken setup or the engine caught itself in a state
/// that would corrupt statistics if it kept going.
#[derive(Debug, Error)]
pub enum PlayError {
    /// Internal consistency check failed. Fatal for the play: continuing
    /// would corrupt statistics, so the play aborts with a diagnostic.
    #[error("invariant violation: {0}")]
    InvariantViolation(String),

    /// The tick loop hit the hard ceiling without the play resolving.
    #[error("play did not resolve within {ticks} ticks")]
    TickLimitExceeded { ticks: u32 },

    /// The caller-supplied setup failed validation.
    #[error("invalid play setup: {0}")]
    InvalidSetup(String),

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("deserialization error: {0}")]
    Deserialization(String),
}

impl From<serde_json::Error> for PlayError {
    fn from(err: serde_json::Error) -> Self {
        if err.is_data() {
            PlayError::Deserialization(err.to_string())
        } else {
            PlayError::Serialization(err.to_string())
        }
    }
}

pub type Result<T> = std::result::Result<T, PlayError>;
