//! Parsing of UCI `info` lines
//!
//! Engine output is untrusted text. Anything that does not look like a
//! complete analysis line (depth, score and pv all present and well formed)
//! yields `None` and is dropped by the caller.

use super::analysis::Evaluation;

/// Fields pulled out of a single `info ... pv ...` line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InfoLine {
    pub depth: u32,
    pub seldepth: Option<u32>,
    pub multipv: Option<u32>,
    pub nodes: Option<u64>,
    pub time_ms: Option<u64>,
    pub score: Evaluation,
    pub pv: Vec<String>,
}

/// Parses an info line, keeping at most `pv_length` moves of the variation.
///
/// ```
/// use chess_explorer_core::engine::{parse_info_line, Evaluation};
///
/// let info = parse_info_line("info depth 12 score cp 31 pv e2e4 e7e5", 5).unwrap();
/// assert_eq!(info.depth, 12);
/// assert_eq!(info.score, Evaluation::Centipawns(31));
/// assert!(parse_info_line("info depth 12 currmove e2e4", 5).is_none());
/// ```
pub fn parse_info_line(line: &str, pv_length: usize) -> Option<InfoLine> {
    let parts: Vec<&str> = line.split_whitespace().collect();

    if parts.first() != Some(&"info") || parts.get(1) == Some(&"string") {
        return None;
    }

    let mut depth: Option<u32> = None;
    let mut seldepth = None;
    let mut multipv = None;
    let mut nodes = None;
    let mut time_ms = None;
    let mut in_score = false;
    let mut cp: Option<i32> = None;
    let mut mate: Option<i32> = None;
    let mut pv: Vec<String> = Vec::new();

    let mut i = 1;
    while i < parts.len() {
        match parts[i] {
            "depth" => {
                let value = parts.get(i + 1)?.parse().ok()?;
                depth.get_or_insert(value);
                i += 2;
            }
            "seldepth" => {
                seldepth = Some(parts.get(i + 1)?.parse().ok()?);
                i += 2;
            }
            "multipv" => {
                multipv = Some(parts.get(i + 1)?.parse().ok()?);
                i += 2;
            }
            "nodes" => {
                nodes = Some(parts.get(i + 1)?.parse().ok()?);
                i += 2;
            }
            "time" => {
                time_ms = Some(parts.get(i + 1)?.parse().ok()?);
                i += 2;
            }
            "score" => {
                in_score = true;
                i += 1;
            }
            "cp" if in_score => {
                cp = Some(parts.get(i + 1)?.parse().ok()?);
                i += 2;
            }
            "mate" if in_score => {
                mate = Some(parts.get(i + 1)?.parse().ok()?);
                i += 2;
            }
            "pv" => {
                // Everything after "pv" is the principal variation
                pv = parts[i + 1..]
                    .iter()
                    .take(pv_length)
                    .map(|s| s.to_string())
                    .collect();
                break;
            }
            _ => {
                i += 1;
            }
        }
    }

    let score = match (mate, cp) {
        (Some(m), _) => Evaluation::Mate(m),
        (None, Some(c)) => Evaluation::Centipawns(c),
        (None, None) => return None,
    };

    if pv.is_empty() {
        return None;
    }

    Some(InfoLine {
        depth: depth?,
        seldepth,
        multipv,
        nodes,
        time_ms,
        score,
        pv,
    })
}

/// Parses `bestmove <move> [ponder <move>]`
pub fn parse_bestmove(line: &str) -> Option<(String, Option<String>)> {
    let mut parts = line.split_whitespace();
    if parts.next()? != "bestmove" {
        return None;
    }
    let best = parts.next()?.to_string();
    let ponder = match (parts.next(), parts.next()) {
        (Some("ponder"), Some(mv)) => Some(mv.to_string()),
        _ => None,
    };
    Some((best, ponder))
}
