//! Error types for chess-explorer-core

use thiserror::Error;

use crate::engine::EngineError;

#[derive(Error, Debug)]
pub enum Error {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON parsing failed: {0}")]
    Json(#[from] serde_json::Error),

    /// The opening explorer could not be reached or answered with an error.
    /// No retry is attempted; the caller decides.
    #[error("Opening statistics unavailable: {reason}")]
    StatisticsUnavailable {
        reason: String,
        #[source]
        source: Option<reqwest::Error>,
    },

    #[error("Engine error: {0}")]
    Engine(#[from] EngineError),

    #[error("Invalid FEN: {0}")]
    InvalidFen(#[from] shakmaty::fen::ParseFenError),

    #[error("Invalid position: {0}")]
    InvalidPosition(#[from] shakmaty::PositionError<shakmaty::Chess>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    pub(crate) fn statistics(reason: impl Into<String>, source: Option<reqwest::Error>) -> Self {
        Error::StatisticsUnavailable {
            reason: reason.into(),
            source,
        }
    }

    /// True when the engine binary could not be started at all.
    pub fn is_engine_unavailable(&self) -> bool {
        matches!(self, Error::Engine(EngineError::Unavailable { .. }))
    }
}

pub type Result<T> = std::result::Result<T, Error>;
