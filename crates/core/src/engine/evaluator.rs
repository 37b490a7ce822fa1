//! Position evaluation on top of a running engine
//!
//! Scores returned from here are always from white's point of view.

use serde::Serialize;
use shakmaty::{fen::Fen, CastlingMode, Chess, EnPassantMode, Position};
use tracing::warn;

use super::analysis::{Evaluation, EvaluationLine};
use super::render::play_uci_moves;
use super::session::AnalysisSession;
use super::stockfish::{find_stockfish, SearchLimit, StockfishEngine};
use crate::config::AnalysisConfig;
use crate::error::Result;

/// SAN moves kept per evaluation
const PV_SAN_LENGTH: usize = 10;

#[derive(Debug, Clone, Serialize)]
pub struct PositionEvaluation {
    pub fen: String,
    pub depth: u32,
    /// None when the engine reported nothing, e.g. in a finished game
    pub score: Option<Evaluation>,
    pub best_move: Option<String>,
    pub pv: Vec<String>,
    pub pv_san: Vec<String>,
    pub text: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct MoveComparison {
    pub mv: String,
    /// None when the move is illegal in the compared position
    pub evaluation: Option<PositionEvaluation>,
}

pub struct Evaluator {
    engine: StockfishEngine,
    session: AnalysisSession,
    default_depth: u32,
}

impl Evaluator {
    pub fn new(engine: StockfishEngine, config: AnalysisConfig) -> Self {
        // keep the whole variation, only the SAN rendering is capped
        let session = AnalysisSession::new(AnalysisConfig {
            pv_length: usize::MAX,
            ..config
        });
        Self {
            engine,
            session,
            default_depth: config.default_depth,
        }
    }

    /// Starts the engine at `path`, or wherever `find_stockfish` finds one
    pub fn start(path: Option<&str>, config: AnalysisConfig) -> Result<Self> {
        let path = path.map(String::from).unwrap_or_else(find_stockfish);
        let engine = StockfishEngine::new(&path)?;
        Ok(Self::new(engine, config))
    }

    pub fn engine_mut(&mut self) -> &mut StockfishEngine {
        &mut self.engine
    }

    fn limit_or_default(&self, limit: Option<SearchLimit>) -> SearchLimit {
        limit.unwrap_or(SearchLimit::Depth(self.default_depth))
    }

    pub fn evaluate_position(&mut self, fen: &str, limit: Option<SearchLimit>) -> Result<PositionEvaluation> {
        let limit = self.limit_or_default(limit);
        let mut principal: Option<EvaluationLine> = None;

        let best = self.engine.analyze(&mut self.session, fen, limit, |line| {
            if line.multipv.unwrap_or(1) == 1 {
                principal = Some(line.clone());
            }
        })?;

        let turn = self.session.position().turn();
        let best_move = (!best.is_none()).then_some(best.best);

        let evaluation = match principal {
            Some(mut line) => {
                let score = line.score.for_white(turn);
                line.san.truncate(PV_SAN_LENGTH);
                PositionEvaluation {
                    fen: fen.to_string(),
                    depth: line.depth,
                    score: Some(score),
                    best_move,
                    text: score.describe(),
                    pv: line.pv,
                    pv_san: line.san,
                }
            }
            None => PositionEvaluation {
                fen: fen.to_string(),
                depth: 0,
                score: None,
                best_move,
                pv: Vec::new(),
                pv_san: Vec::new(),
                text: "No evaluation".to_string(),
            },
        };

        Ok(evaluation)
    }

    pub fn find_best_move(&mut self, fen: &str, limit: Option<SearchLimit>) -> Result<Option<String>> {
        Ok(self.evaluate_position(fen, limit)?.best_move)
    }

    /// Evaluates the position after each candidate move, in input order
    pub fn compare_moves(
        &mut self,
        fen: &str,
        moves: &[String],
        limit: Option<SearchLimit>,
    ) -> Result<Vec<MoveComparison>> {
        let position = parse_position(fen)?;
        let mut results = Vec::with_capacity(moves.len());

        for mv in moves {
            let evaluation = match play_uci_moves(&position, std::slice::from_ref(mv)) {
                Ok(next) => Some(self.evaluate_position(&to_fen(&next), limit)?),
                Err(_) => None,
            };
            results.push(MoveComparison {
                mv: mv.clone(),
                evaluation,
            });
        }

        Ok(results)
    }

    /// Evaluates the start position and the position after every move,
    /// stopping at the first illegal move
    pub fn evaluate_sequence(
        &mut self,
        moves: &[String],
        start_fen: Option<&str>,
        limit: Option<SearchLimit>,
    ) -> Result<Vec<PositionEvaluation>> {
        let mut position = match start_fen {
            Some(fen) => parse_position(fen)?,
            None => Chess::default(),
        };

        self.engine.new_game()?;
        let mut evaluations = vec![self.evaluate_position(&to_fen(&position), limit)?];

        for mv in moves {
            match play_uci_moves(&position, std::slice::from_ref(mv)) {
                Ok(next) => position = next,
                Err(_) => {
                    warn!(mv = %mv, "illegal move in sequence, stopping");
                    break;
                }
            }
            evaluations.push(self.evaluate_position(&to_fen(&position), limit)?);
        }

        Ok(evaluations)
    }
}

fn parse_position(fen: &str) -> Result<Chess> {
    let parsed: Fen = fen.parse()?;
    let position: Chess = parsed.into_position(CastlingMode::Standard)?;
    Ok(position)
}

fn to_fen(position: &Chess) -> String {
    Fen::from_position(position, EnPassantMode::Legal).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_position_rejects_garbage() {
        assert!(parse_position("8/8/8 w").is_err());
        assert!(parse_position("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1").is_ok());
    }

    #[test]
    fn test_to_fen_round_trip_start() {
        assert_eq!(
            to_fen(&Chess::default()),
            "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1"
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_evaluation_keeps_full_pv() {
        use crate::engine::scripted::scripted_engine;

        let engine = scripted_engine(&[&[
            "info depth 12 score cp 35 pv e2e4 e7e5 g1f3 b8c6 f1b5 a7a6 b5a4 g8f6 e1g1 f8e7 f1e1 b7b5",
            "bestmove e2e4 ponder e7e5",
        ]]);
        let mut evaluator = Evaluator::new(engine, AnalysisConfig::default());
        let start = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

        let eval = evaluator.evaluate_position(start, None).unwrap();

        assert_eq!(eval.pv.len(), 12);
        assert_eq!(eval.pv.last().map(String::as_str), Some("b7b5"));
        assert_eq!(eval.pv_san.len(), PV_SAN_LENGTH);
        assert_eq!(eval.pv_san[8], "O-O");
        assert_eq!(eval.pv_san[9], "Be7");
        assert_eq!(eval.score, Some(Evaluation::Centipawns(35)));
        assert_eq!(eval.best_move.as_deref(), Some("e2e4"));
        assert_eq!(eval.depth, 12);
    }

    #[cfg(unix)]
    #[test]
    fn test_black_to_move_score_is_white_relative() {
        use crate::engine::scripted::scripted_engine;

        let engine = scripted_engine(&[&["info depth 10 score cp 40 pv e7e5", "bestmove e7e5"]]);
        let mut evaluator = Evaluator::new(engine, AnalysisConfig::default());
        let after_e4 = "rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq - 0 1";

        let eval = evaluator.evaluate_position(after_e4, None).unwrap();

        assert_eq!(eval.score, Some(Evaluation::Centipawns(-40)));
        assert_eq!(eval.pv_san, vec!["e5"]);
    }

    #[test]
    #[ignore] // requires stockfish installed
    fn test_evaluate_scholars_mate_threat() {
        let mut evaluator = Evaluator::start(None, AnalysisConfig::default()).unwrap();
        let fen = "r1bqkb1r/pppp1ppp/2n2n2/4p2Q/2B1P3/8/PPPP1PPP/RNB1K1NR w KQkq - 4 4";

        let eval = evaluator.evaluate_position(fen, Some(SearchLimit::Depth(10))).unwrap();

        assert_eq!(eval.best_move.as_deref(), Some("h5f7"));
        assert_eq!(eval.score, Some(Evaluation::Mate(1)));
        assert_eq!(eval.pv_san.first().map(String::as_str), Some("Qxf7#"));
    }

    #[test]
    #[ignore]
    fn test_compare_marks_illegal_moves() {
        let mut evaluator = Evaluator::start(None, AnalysisConfig::default()).unwrap();
        let start = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";
        let moves = vec!["e2e4".to_string(), "e2e5".to_string()];

        let results = evaluator
            .compare_moves(start, &moves, Some(SearchLimit::Depth(8)))
            .unwrap();

        assert!(results[0].evaluation.is_some());
        assert!(results[1].evaluation.is_none());
    }
}
