//! Chess Explorer Core Library
//!
//! Opening statistics from the Lichess explorer, and live engine analysis
//! built on an interpreter for UCI engine output.

pub mod config;
pub mod engine;
pub mod error;
pub mod lichess;

pub use config::{AnalysisConfig, Settings};
pub use engine::{AnalysisSession, Evaluation, EvaluationLine, StockfishEngine};
pub use error::{Error, Result};
pub use lichess::ExplorerClient;
