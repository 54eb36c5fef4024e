use thiserror::Error;

pub type Result<T> = std::result::Result<T, GameError>;

/// Errors raised by the game core. All of them are recoverable: a session
/// that hit one can always continue or start a new round.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GameError {
    #[error("invalid coordinate ({latitude}, {longitude}): latitude must be in [-90, 90] and longitude in [-180, 180]")]
    InvalidCoordinate { latitude: f64, longitude: f64 },

    #[error("invalid region: {0}")]
    InvalidRegion(String),

    #[error("invalid win threshold {0} km: must be a finite, non-negative number")]
    InvalidThreshold(f64),

    #[error("location catalog must contain at least one coordinate")]
    EmptyCatalog,

    #[error("invalid location catalog: {0}")]
    InvalidCatalog(String),

    #[error("guess ({latitude}, {longitude}) is outside the playable region")]
    GuessOutsideRegion { latitude: f64, longitude: f64 },

    #[error("cannot {action} while the round is {state}")]
    InvalidStateTransition {
        action: &'static str,
        state: &'static str,
    },
}

impl GameError {
    /// Stable machine-readable code, used by hosts that surface errors to clients.
    pub fn code(&self) -> &'static str {
        match self {
            GameError::InvalidCoordinate { .. } => "INVALID_COORDINATE",
            GameError::InvalidRegion(_) => "INVALID_REGION",
            GameError::InvalidThreshold(_) => "INVALID_THRESHOLD",
            GameError::EmptyCatalog => "EMPTY_CATALOG",
            GameError::InvalidCatalog(_) => "INVALID_CATALOG",
            GameError::GuessOutsideRegion { .. } => "GUESS_OUTSIDE_REGION",
            GameError::InvalidStateTransition { .. } => "INVALID_STATE_TRANSITION",
        }
    }
}
