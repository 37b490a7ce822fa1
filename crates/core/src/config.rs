//! Runtime configuration
//!
//! `AnalysisConfig` holds the interpreter knobs, `Settings` the values that
//! come from the environment (engine path, Lichess token, endpoints).

use std::env;
use std::time::Duration;

use serde::{Deserialize, Serialize};

pub const DEFAULT_EXPLORER_URL: &str = "https://explorer.lichess.ovh";

/// Knobs for the engine response interpreter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Number of plies kept from each principal variation
    pub pv_length: usize,
    /// Lines shallower than this only update the live evaluation
    pub min_depth: u32,
    /// Maximum number of entries in the best-line table
    pub capacity: usize,
    /// Search depth used when the caller does not pick one
    pub default_depth: u32,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            pv_length: 5,
            min_depth: 10,
            capacity: 5,
            default_depth: 20,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Settings {
    pub stockfish_path: Option<String>,
    pub lichess_token: Option<String>,
    pub explorer_url: String,
    pub bind_addr: String,
    pub timeout: Duration,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            stockfish_path: None,
            lichess_token: None,
            explorer_url: DEFAULT_EXPLORER_URL.to_string(),
            bind_addr: "127.0.0.1:3000".to_string(),
            timeout: Duration::from_secs(10),
        }
    }
}

impl Settings {
    /// Reads `STOCKFISH_PATH`, `LICHESS_TOKEN`, `EXPLORER_URL` and `BIND_ADDR`.
    /// Empty variables count as unset.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let defaults = Self::default();

        Self {
            stockfish_path: get("STOCKFISH_PATH"),
            lichess_token: get("LICHESS_TOKEN"),
            explorer_url: get("EXPLORER_URL").unwrap_or(defaults.explorer_url),
            bind_addr: get("BIND_ADDR").unwrap_or(defaults.bind_addr),
            timeout: defaults.timeout,
        }
    }
}
