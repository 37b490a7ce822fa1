//! Stockfish chess engine interface
//!
//! Spawns Stockfish as a subprocess and communicates via UCI protocol.

use std::io::{BufRead, BufReader, Write};
use std::path::Path;
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};
use std::time::Duration;

use thiserror::Error;
use tracing::{debug, info, warn};

use super::analysis::EvaluationLine;
use super::info::parse_bestmove;
use super::session::AnalysisSession;
use crate::error::Result;

/// Places a packaged Stockfish usually ends up in
const STOCKFISH_CANDIDATES: &[&str] = &[
    "/usr/games/stockfish",
    "/usr/local/bin/stockfish",
    "/usr/bin/stockfish",
    "/opt/homebrew/bin/stockfish",
    "./stockfish",
];

/// Error type for engine operations
#[derive(Error, Debug)]
pub enum EngineError {
    /// The engine process could not be started
    #[error("Engine unavailable at '{path}': {source}")]
    Unavailable {
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// Failed to communicate with engine
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// Engine returned unexpected response
    #[error("Protocol error: {0}")]
    Protocol(String),
    /// Engine not initialized
    #[error("Engine not initialized")]
    NotInitialized,
}

/// How long the engine may search
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchLimit {
    Depth(u32),
    MoveTime(u64),
}

impl SearchLimit {
    fn go_command(&self) -> String {
        match self {
            SearchLimit::Depth(depth) => format!("go depth {}", depth),
            SearchLimit::MoveTime(ms) => format!("go movetime {}", ms),
        }
    }
}

/// The engine's final answer for a search
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BestMove {
    pub best: String,
    pub ponder: Option<String>,
}

impl BestMove {
    /// Stockfish answers `(none)` when there is no legal move
    pub fn is_none(&self) -> bool {
        self.best == "(none)"
    }
}

/// Returns the first existing candidate path, or plain `stockfish` so the
/// lookup falls through to `PATH`
pub fn find_stockfish() -> String {
    STOCKFISH_CANDIDATES
        .iter()
        .find(|p| Path::new(p).exists())
        .map(|p| p.to_string())
        .unwrap_or_else(|| "stockfish".to_string())
}

/// Wrapper around Stockfish chess engine
pub struct StockfishEngine {
    /// The child process
    process: Child,
    /// Stdin for sending commands
    stdin: ChildStdin,
    /// Stdout reader for receiving responses
    stdout: BufReader<ChildStdout>,
    /// Whether UCI handshake completed
    initialized: bool,
    /// A `go` was sent and its `bestmove` not yet read
    searching: bool,
    /// Engine name from `id name`
    name: Option<String>,
}

impl StockfishEngine {
    /// Creates a new Stockfish engine instance
    ///
    /// # Arguments
    /// * `path` - Path to stockfish binary (or "stockfish" if in PATH)
    ///
    /// # Example
    /// ```ignore
    /// let mut engine = StockfishEngine::new("stockfish")?;
    /// ```
    pub fn new(path: &str) -> std::result::Result<Self, EngineError> {
        Self::from_command(Command::new(path))
    }

    /// Spawns the engine from a prepared command, e.g. one carrying arguments
    pub fn from_command(mut command: Command) -> std::result::Result<Self, EngineError> {
        let path = command.get_program().to_string_lossy().into_owned();
        let mut process = command
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|source| EngineError::Unavailable {
                path: path.to_string(),
                source,
            })?;

        let stdin = process
            .stdin
            .take()
            .ok_or_else(|| EngineError::Protocol("Failed to open stdin".into()))?;

        let stdout = process
            .stdout
            .take()
            .ok_or_else(|| EngineError::Protocol("Failed to open stdout".into()))?;

        let mut engine = StockfishEngine {
            process,
            stdin,
            stdout: BufReader::new(stdout),
            initialized: false,
            searching: false,
            name: None,
        };

        engine.init_uci()?;
        info!(path = %path, name = engine.name.as_deref().unwrap_or("unknown"), "engine ready");

        Ok(engine)
    }

    /// Starts whatever `find_stockfish` locates
    pub fn locate() -> std::result::Result<Self, EngineError> {
        Self::new(&find_stockfish())
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Sends a command to the engine
    fn send(&mut self, cmd: &str) -> std::result::Result<(), EngineError> {
        debug!(cmd, "-> engine");
        writeln!(self.stdin, "{}", cmd)?;
        self.stdin.flush()?;
        Ok(())
    }

    /// Reads a line from the engine
    fn read_line(&mut self) -> std::result::Result<String, EngineError> {
        let mut line = String::new();
        if self.stdout.read_line(&mut line)? == 0 {
            return Err(EngineError::Protocol("engine closed its output".into()));
        }
        Ok(line.trim().to_string())
    }

    /// Reads lines until we get the expected response
    fn read_until(&mut self, expected: &str) -> std::result::Result<Vec<String>, EngineError> {
        let mut lines = Vec::new();
        loop {
            let line = self.read_line()?;
            let done = line.starts_with(expected);
            lines.push(line);
            if done {
                break;
            }
        }
        Ok(lines)
    }

    /// Initialize UCI protocol
    fn init_uci(&mut self) -> std::result::Result<(), EngineError> {
        self.send("uci")?;
        let lines = self.read_until("uciok")?;
        self.name = lines
            .iter()
            .find_map(|l| l.strip_prefix("id name "))
            .map(String::from);

        self.initialized = true;
        self.is_ready()
    }

    fn ensure_initialized(&self) -> std::result::Result<(), EngineError> {
        if self.initialized {
            Ok(())
        } else {
            Err(EngineError::NotInitialized)
        }
    }

    /// Blocks until the engine has processed everything sent so far
    pub fn is_ready(&mut self) -> std::result::Result<(), EngineError> {
        self.send("isready")?;
        self.read_until("readyok")?;
        Ok(())
    }

    /// Sets a UCI option, e.g. `MultiPV` or `Threads`
    pub fn set_option(&mut self, name: &str, value: &str) -> std::result::Result<(), EngineError> {
        self.ensure_initialized()?;
        self.send(&format!("setoption name {} value {}", name, value))?;
        self.is_ready()
    }

    /// Tells the engine the next position is from a different game
    pub fn new_game(&mut self) -> std::result::Result<(), EngineError> {
        self.ensure_initialized()?;
        self.stop()?;
        self.send("ucinewgame")?;
        self.is_ready()
    }

    /// Sets a position from a FEN string
    ///
    /// # Arguments
    /// * `fen` - FEN string, or None for starting position
    /// * `moves` - Optional list of moves to play from the position
    pub fn set_position(&mut self, fen: Option<&str>, moves: Option<&[String]>) -> std::result::Result<(), EngineError> {
        self.ensure_initialized()?;

        let pos_str = match fen {
            Some(f) => format!("position fen {}", f),
            None => "position startpos".to_string(),
        };

        let cmd = match moves {
            Some(m) if !m.is_empty() => format!("{} moves {}", pos_str, m.join(" ")),
            _ => pos_str,
        };

        self.send(&cmd)
    }

    /// Halts a running search and drains its output up to `bestmove`, so
    /// nothing from it can leak into the next analysis
    pub fn stop(&mut self) -> std::result::Result<(), EngineError> {
        if !self.searching {
            return Ok(());
        }
        self.send("stop")?;
        let drained = self.read_until("bestmove")?;
        debug!(lines = drained.len(), "drained stopped search");
        self.searching = false;
        Ok(())
    }

    /// Analyzes `fen` and streams every interpreted line into `session`
    ///
    /// The session is restarted on `fen` before the search begins. `on_update`
    /// sees each record produced, shallow ones included, in engine order.
    pub fn analyze<F>(
        &mut self,
        session: &mut AnalysisSession,
        fen: &str,
        limit: SearchLimit,
        mut on_update: F,
    ) -> Result<BestMove>
    where
        F: FnMut(&EvaluationLine),
    {
        self.ensure_initialized()?;
        self.stop()?;

        let token = session.start_analysis(fen)?;
        self.set_position(Some(fen), None)?;
        self.is_ready()?;

        self.send(&limit.go_command())?;
        self.searching = true;

        loop {
            let line = self.read_line()?;

            if line.starts_with("bestmove") {
                self.searching = false;
                let (best, ponder) = parse_bestmove(&line)
                    .ok_or_else(|| EngineError::Protocol(format!("malformed bestmove: {}", line)))?;
                return Ok(BestMove { best, ponder });
            }

            if let Some(record) = session.submit_line_for(token, &line) {
                on_update(&record);
            }
        }
    }

    /// Quit the engine cleanly
    pub fn quit(&mut self) -> std::result::Result<(), EngineError> {
        self.initialized = false;
        let sent = self.send("quit");
        // Give it a moment to exit
        std::thread::sleep(Duration::from_millis(100));
        let _ = self.process.kill(); // Kill if still running
        let _ = self.process.wait();
        sent
    }
}

impl Drop for StockfishEngine {
    fn drop(&mut self) {
        if !self.initialized {
            // handshake never completed or already quit
            let _ = self.process.kill();
            let _ = self.process.wait();
            return;
        }
        if let Err(e) = self.quit() {
            warn!(error = %e, "engine did not quit cleanly");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const START_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

    #[test]
    fn test_go_commands() {
        assert_eq!(SearchLimit::Depth(12).go_command(), "go depth 12");
        assert_eq!(SearchLimit::MoveTime(500).go_command(), "go movetime 500");
    }

    #[test]
    fn test_missing_binary_is_unavailable() {
        let err = StockfishEngine::new("/nonexistent/stockfish-binary").err().unwrap();
        assert!(matches!(err, EngineError::Unavailable { .. }));
    }

    #[cfg(unix)]
    #[test]
    fn test_scripted_analysis_streams_in_engine_order() {
        use crate::engine::scripted::scripted_engine;

        let mut engine = scripted_engine(&[&[
            "info string NNUE evaluation enabled",
            "info depth 8 score cp 20 pv e2e4 e7e5",
            "info depth 10 score cp 25 pv e2e4 e7e5",
            "info depth 12 currmove d2d4 currmovenumber 2",
            "info depth 12 seldepth 18 score cp 31 nodes 50000 time 40 pv e2e4 e7e5 g1f3",
            "bestmove e2e4 ponder e7e5",
        ]]);
        assert_eq!(engine.name(), Some("Scripted"));

        let mut session = AnalysisSession::default();
        let mut seen = Vec::new();
        let best = engine
            .analyze(&mut session, START_FEN, SearchLimit::Depth(12), |line| {
                seen.push((line.depth, line.moves_text()))
            })
            .unwrap();

        assert_eq!(
            best,
            BestMove {
                best: "e2e4".to_string(),
                ponder: Some("e7e5".to_string()),
            }
        );
        assert!(!engine.searching);
        assert_eq!(
            seen,
            vec![
                (8, "e4 e5".to_string()),
                (10, "e4 e5".to_string()),
                (12, "e4 e5 Nf3".to_string()),
            ]
        );

        let table: Vec<_> = session
            .best_lines()
            .iter()
            .map(|l| (l.depth, l.moves_text()))
            .collect();
        assert_eq!(table, vec![(10, "e4 e5".to_string()), (12, "e4 e5 Nf3".to_string())]);

        let current = session.current_evaluation().unwrap();
        assert_eq!(current.depth, 12);
        assert_eq!(current.nodes, Some(50000));
    }

    #[cfg(unix)]
    #[test]
    fn test_scripted_second_analysis_starts_clean() {
        use crate::engine::scripted::scripted_engine;

        let mut engine = scripted_engine(&[
            &["info depth 12 score cp 31 pv e2e4 e7e5", "bestmove e2e4"],
            &["info depth 11 score cp 28 pv c7c5 g1f3", "bestmove c7c5 ponder g1f3"],
        ]);
        let mut session = AnalysisSession::default();

        engine
            .analyze(&mut session, START_FEN, SearchLimit::Depth(12), |_| {})
            .unwrap();
        let first_token = session.token();
        assert_eq!(session.best_lines().len(), 1);

        let after_e4 = "rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq - 0 1";
        let mut seen = Vec::new();
        let best = engine
            .analyze(&mut session, after_e4, SearchLimit::Depth(11), |line| seen.push(line.moves_text()))
            .unwrap();

        assert_ne!(session.token(), first_token);
        assert_eq!(best.best, "c7c5");
        assert_eq!(seen, vec!["c5 Nf3"]);
        assert_eq!(session.best_lines().len(), 1);
        assert_eq!(session.best_lines()[0].moves_text(), "c5 Nf3");
    }

    #[cfg(unix)]
    #[test]
    fn test_running_search_is_drained_before_new_analysis() {
        use crate::engine::scripted::scripted_engine;

        let mut engine = scripted_engine(&[
            &["info depth 15 score cp 40 pv d2d4 d7d5", "bestmove d2d4"],
            &["info depth 12 score cp 31 pv e2e4 e7e5", "bestmove e2e4 ponder e7e5"],
        ]);
        engine.set_position(None, None).unwrap();
        engine.send("go infinite").unwrap();
        engine.searching = true;

        let mut session = AnalysisSession::default();
        let mut seen = Vec::new();
        let best = engine
            .analyze(&mut session, START_FEN, SearchLimit::Depth(12), |line| seen.push(line.moves_text()))
            .unwrap();

        assert_eq!(best.best, "e2e4");
        assert_eq!(seen, vec!["e4 e5"]);
        assert_eq!(session.best_lines().len(), 1);
        assert_eq!(session.best_lines()[0].moves_text(), "e4 e5");
    }

    #[cfg(unix)]
    #[test]
    fn test_no_legal_moves_answer() {
        use crate::engine::scripted::scripted_engine;

        let mut engine = scripted_engine(&[]);
        let mut session = AnalysisSession::default();
        let best = engine
            .analyze(&mut session, START_FEN, SearchLimit::Depth(5), |_| {})
            .unwrap();

        assert!(best.is_none());
        assert!(session.current_evaluation().is_none());
    }

    #[test]
    #[ignore] // Ignore by default - requires stockfish installed
    fn test_stockfish_init() {
        let engine = StockfishEngine::locate();
        assert!(engine.is_ok());
    }

    #[test]
    #[ignore]
    fn test_analyze_starting_position() {
        let mut engine = StockfishEngine::locate().unwrap();
        let mut session = AnalysisSession::default();
        let mut updates = 0;

        let best = engine
            .analyze(&mut session, START_FEN, SearchLimit::Depth(12), |_| updates += 1)
            .unwrap();

        assert!(!best.best.is_empty());
        assert!(updates > 0);
        assert!(!session.best_lines().is_empty());
        assert!(session.best_lines().len() <= 5);
        assert_eq!(session.current_evaluation().unwrap().depth, 12);
    }

    #[test]
    #[ignore]
    fn test_second_analysis_starts_clean() {
        let mut engine = StockfishEngine::locate().unwrap();
        let mut session = AnalysisSession::default();

        engine
            .analyze(&mut session, START_FEN, SearchLimit::Depth(10), |_| {})
            .unwrap();
        let after_e4 = "rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq - 0 1";
        engine
            .analyze(&mut session, after_e4, SearchLimit::Depth(10), |_| {})
            .unwrap();

        // every table entry must start with a black move
        for line in session.best_lines() {
            let first = line.pv.first().unwrap();
            assert!(first.ends_with('5') || first.ends_with('6'), "{}", first);
        }
    }
}
