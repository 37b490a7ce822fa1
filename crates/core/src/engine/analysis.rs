//! Types for representing engine analysis results

use std::fmt;

use serde::Serialize;
use shakmaty::Color;

/// Represents a position evaluation as reported by the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum Evaluation {
    /// Centipawn score
    #[serde(rename = "cp")]
    Centipawns(i32),
    /// Forced mate in N moves, the sign tells which side mates
    Mate(i32),
}

impl Evaluation {
    /// Flips the score to the other side's point of view
    pub fn negate(self) -> Self {
        match self {
            Evaluation::Centipawns(cp) => Evaluation::Centipawns(-cp),
            Evaluation::Mate(moves) => Evaluation::Mate(-moves),
        }
    }

    /// Converts a side-to-move relative score (what UCI reports) to white's
    /// point of view
    pub fn for_white(self, turn: Color) -> Self {
        match turn {
            Color::White => self,
            Color::Black => self.negate(),
        }
    }

    /// Verbal verdict, assuming the score is from white's point of view
    ///
    /// ```
    /// use chess_explorer_core::engine::Evaluation;
    ///
    /// assert_eq!(Evaluation::Centipawns(20).describe(), "Equal position");
    /// assert_eq!(Evaluation::Centipawns(-180).describe(), "Clear advantage for black (-1.80)");
    /// assert_eq!(Evaluation::Mate(2).describe(), "Mate in 2 for white");
    /// ```
    pub fn describe(&self) -> String {
        match *self {
            Evaluation::Mate(moves) => {
                let side = if moves > 0 { "white" } else { "black" };
                format!("Mate in {} for {}", moves.unsigned_abs(), side)
            }
            Evaluation::Centipawns(cp) => {
                let pawns = cp as f64 / 100.0;
                let side = if pawns > 0.0 { "white" } else { "black" };
                let verdict = match pawns.abs() {
                    p if p < 0.5 => return "Equal position".to_string(),
                    p if p < 1.5 => "Slight advantage",
                    p if p < 3.0 => "Clear advantage",
                    _ => "Winning",
                };
                format!("{} for {} ({:+.2})", verdict, side, pawns)
            }
        }
    }
}

impl fmt::Display for Evaluation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Evaluation::Centipawns(cp) => write!(f, "{:.2}", *cp as f64 / 100.0),
            Evaluation::Mate(moves) => write!(f, "M{}", moves),
        }
    }
}

/// One evaluated line extracted from an `info` message
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EvaluationLine {
    /// Search depth reached
    pub depth: u32,
    pub seldepth: Option<u32>,
    /// Index of this line when the engine runs with MultiPV
    pub multipv: Option<u32>,
    pub nodes: Option<u64>,
    pub time_ms: Option<u64>,
    pub score: Evaluation,
    /// Principal variation in coordinate notation, already truncated
    pub pv: Vec<String>,
    /// The part of `pv` that could be replayed, in SAN
    pub san: Vec<String>,
}

impl EvaluationLine {
    /// The rendered move sequence, used as the best-line table key
    pub fn moves_text(&self) -> String {
        self.san.join(" ")
    }

    pub fn evaluation_text(&self) -> String {
        self.score.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mate_text_keeps_sign() {
        assert_eq!(Evaluation::Mate(-3).to_string(), "M-3");
        assert_eq!(Evaluation::Mate(4).to_string(), "M4");
    }

    #[test]
    fn test_centipawn_text() {
        assert_eq!(Evaluation::Centipawns(250).to_string(), "2.50");
        assert_eq!(Evaluation::Centipawns(-35).to_string(), "-0.35");
        assert_eq!(Evaluation::Centipawns(0).to_string(), "0.00");
    }

    #[test]
    fn test_for_white_flips_black_to_move() {
        assert_eq!(
            Evaluation::Centipawns(40).for_white(Color::Black),
            Evaluation::Centipawns(-40)
        );
        assert_eq!(Evaluation::Mate(2).for_white(Color::White), Evaluation::Mate(2));
    }

    #[test]
    fn test_describe_thresholds() {
        assert_eq!(
            Evaluation::Centipawns(120).describe(),
            "Slight advantage for white (+1.20)"
        );
        assert_eq!(
            Evaluation::Centipawns(-450).describe(),
            "Winning for black (-4.50)"
        );
        assert_eq!(Evaluation::Mate(-1).describe(), "Mate in 1 for black");
    }

    #[test]
    fn test_serializes_tagged() {
        let json = serde_json::to_string(&Evaluation::Centipawns(31)).unwrap();
        assert_eq!(json, r#"{"type":"cp","value":31}"#);
    }
}
