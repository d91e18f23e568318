//! Error types for the game core

/// Errors surfaced by the game core to its caller
#[derive(Debug, thiserror::Error)]
pub enum GameError {
    /// Invalid configuration (e.g. a non-positive mean). Fatal at startup.
    #[error("Invalid configuration: {0}")]
    Configuration(String),

    /// Rejected input; no state was mutated
    #[error("Invalid input: {0}")]
    Validation(String),

    /// Another round or username change is still in flight
    #[error("Operation already in progress: {0}")]
    Busy(&'static str),

    /// Local persisted state could not be read or written
    #[error("Local storage error: {0}")]
    Storage(#[from] anyhow::Error),
}

pub type GameResult<T> = std::result::Result<T, GameError>;
