//! Chess engine integration
//!
//! Interprets UCI engine output and drives UCI-compatible engines like Stockfish.

pub mod analysis;
pub mod evaluator;
pub mod info;
pub mod lines;
pub mod render;
#[cfg(all(test, unix))]
mod scripted;
pub mod session;
pub mod stockfish;

// Re-export main types for convenience
pub use analysis::{Evaluation, EvaluationLine};
pub use evaluator::{Evaluator, MoveComparison, PositionEvaluation};
pub use info::{parse_bestmove, parse_info_line, InfoLine};
pub use lines::{BestLineTable, TableUpdate};
pub use render::{play_uci_moves, render_san};
pub use session::{AnalysisSession, SessionToken};
pub use stockfish::{find_stockfish, BestMove, EngineError, SearchLimit, StockfishEngine};
