//! Analysis session state
//!
//! An `AnalysisSession` owns everything that belongs to the position being
//! analysed: the live evaluation slot, the best-line table and a token that
//! changes every time a new analysis starts. Engine output is fed into it one
//! line at a time, in the order the engine produced it.

use shakmaty::{fen::Fen, CastlingMode, Chess};
use tracing::debug;

use super::analysis::EvaluationLine;
use super::info::parse_info_line;
use super::lines::BestLineTable;
use super::render::render_san;
use crate::config::AnalysisConfig;
use crate::error::Result;

/// Identifies one analysis run. Lines tagged with an older token are stale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SessionToken(u64);

pub struct AnalysisSession {
    config: AnalysisConfig,
    position: Chess,
    token: SessionToken,
    current: Option<EvaluationLine>,
    table: BestLineTable,
}

impl AnalysisSession {
    pub fn new(config: AnalysisConfig) -> Self {
        Self {
            config,
            position: Chess::default(),
            token: SessionToken(0),
            current: None,
            table: BestLineTable::new(config.capacity),
        }
    }

    /// Starts analysing the position given as FEN, dropping all previous state
    pub fn start_analysis(&mut self, fen: &str) -> Result<SessionToken> {
        let parsed: Fen = fen.parse()?;
        let position: Chess = parsed.into_position(CastlingMode::Standard)?;
        Ok(self.start_position(position))
    }

    pub fn start_position(&mut self, position: Chess) -> SessionToken {
        self.reset();
        self.position = position;
        self.token = SessionToken(self.token.0 + 1);
        debug!(token = self.token.0, "analysis session started");
        self.token
    }

    /// Clears the live evaluation and the table, keeping the position
    pub fn reset(&mut self) {
        self.current = None;
        self.table.clear();
    }

    /// Interprets one raw engine line against the active session.
    ///
    /// Returns the parsed record, or `None` when the line carries no analysis.
    /// The live evaluation is always overwritten; the table only takes lines
    /// at or beyond the configured minimum depth whose first move rendered.
    pub fn submit_line(&mut self, raw: &str) -> Option<EvaluationLine> {
        let info = parse_info_line(raw, self.config.pv_length)?;
        let san = render_san(&self.position, &info.pv);

        let line = EvaluationLine {
            depth: info.depth,
            seldepth: info.seldepth,
            multipv: info.multipv,
            nodes: info.nodes,
            time_ms: info.time_ms,
            score: info.score,
            pv: info.pv,
            san,
        };

        self.current = Some(line.clone());

        if line.san.is_empty() {
            debug!(pv = ?line.pv, "no renderable move, line kept out of the table");
        } else if line.depth >= self.config.min_depth {
            let outcome = self.table.update(line.clone());
            debug!(depth = line.depth, line = %line.moves_text(), ?outcome, "best line update");
        }

        Some(line)
    }

    /// Like `submit_line`, but discards lines that belong to an earlier run
    pub fn submit_line_for(&mut self, token: SessionToken, raw: &str) -> Option<EvaluationLine> {
        if token != self.token {
            debug!(stale = token.0, active = self.token.0, "discarding stale engine line");
            return None;
        }
        self.submit_line(raw)
    }

    pub fn current_evaluation(&self) -> Option<&EvaluationLine> {
        self.current.as_ref()
    }

    pub fn best_lines(&self) -> &[EvaluationLine] {
        self.table.lines()
    }

    pub fn token(&self) -> SessionToken {
        self.token
    }

    pub fn position(&self) -> &Chess {
        &self.position
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }
}

impl Default for AnalysisSession {
    fn default() -> Self {
        Self::new(AnalysisConfig::default())
    }
}
