//! Lichess Opening Explorer data types

use serde::{Deserialize, Serialize};

/// Query for the `lichess` and `masters` databases
#[derive(Debug, Clone)]
pub struct ExplorerParams {
    pub fen: Option<String>,
    pub play: Vec<String>,
    pub variant: String,
    pub speeds: Vec<Speed>,
    pub ratings: Vec<u16>,
    pub since: Option<String>, // YYYY-MM
    pub until: Option<String>, // YYYY-MM
    pub moves: u32,
    pub top_games: u32,
    pub recent_games: u32,
    pub history: bool,
}

impl Default for ExplorerParams {
    fn default() -> Self {
        Self {
            fen: None,
            play: Vec::new(),
            variant: "standard".to_string(),
            speeds: Vec::new(),
            ratings: Vec::new(),
            since: None,
            until: None,
            moves: 12,
            top_games: 15,
            recent_games: 8,
            history: false,
        }
    }
}

impl ExplorerParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fen(mut self, fen: impl Into<String>) -> Self {
        self.fen = Some(fen.into());
        self
    }

    /// UCI moves played from the starting position (or from `fen`)
    pub fn play<I, S>(mut self, moves: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.play = moves.into_iter().map(Into::into).collect();
        self
    }

    pub fn variant(mut self, variant: impl Into<String>) -> Self {
        self.variant = variant.into();
        self
    }

    pub fn speeds(mut self, speeds: &[Speed]) -> Self {
        self.speeds = speeds.to_vec();
        self
    }

    pub fn ratings(mut self, ratings: &[u16]) -> Self {
        self.ratings = ratings.to_vec();
        self
    }

    pub fn since(mut self, month: impl Into<String>) -> Self {
        self.since = Some(month.into());
        self
    }

    pub fn until(mut self, month: impl Into<String>) -> Self {
        self.until = Some(month.into());
        self
    }

    pub fn moves(mut self, moves: u32) -> Self {
        self.moves = moves;
        self
    }

    pub fn top_games(mut self, n: u32) -> Self {
        self.top_games = n;
        self
    }

    pub fn recent_games(mut self, n: u32) -> Self {
        self.recent_games = n;
        self
    }

    pub fn with_history(mut self) -> Self {
        self.history = true;
        self
    }

    pub(crate) fn to_query(&self) -> Vec<(&'static str, String)> {
        let mut query = vec![
            ("variant", self.variant.clone()),
            ("moves", self.moves.to_string()),
            ("topGames", self.top_games.to_string()),
            ("recentGames", self.recent_games.to_string()),
        ];

        if let Some(ref fen) = self.fen {
            query.push(("fen", fen.clone()));
        }
        if !self.play.is_empty() {
            query.push(("play", self.play.join(",")));
        }
        if !self.speeds.is_empty() {
            query.push(("speeds", join_speeds(&self.speeds)));
        }
        if !self.ratings.is_empty() {
            let ratings: Vec<String> = self.ratings.iter().map(u16::to_string).collect();
            query.push(("ratings", ratings.join(",")));
        }
        if let Some(ref since) = self.since {
            query.push(("since", since.clone()));
        }
        if let Some(ref until) = self.until {
            query.push(("until", until.clone()));
        }
        if self.history {
            query.push(("history", "true".to_string()));
        }

        query
    }
}

/// Query for one player's games
#[derive(Debug, Clone, Default)]
pub struct PlayerParams {
    pub color: Option<Side>,
    pub fen: Option<String>,
    pub play: Vec<String>,
    pub speeds: Vec<Speed>,
    pub modes: Vec<Mode>,
    pub since: Option<String>,
    pub until: Option<String>,
    pub moves: Option<u32>,
    pub recent_games: Option<u32>,
}

impl PlayerParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn color(mut self, color: Side) -> Self {
        self.color = Some(color);
        self
    }

    pub fn fen(mut self, fen: impl Into<String>) -> Self {
        self.fen = Some(fen.into());
        self
    }

    pub fn play<I, S>(mut self, moves: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.play = moves.into_iter().map(Into::into).collect();
        self
    }

    pub fn speeds(mut self, speeds: &[Speed]) -> Self {
        self.speeds = speeds.to_vec();
        self
    }

    pub fn modes(mut self, modes: &[Mode]) -> Self {
        self.modes = modes.to_vec();
        self
    }

    pub fn since(mut self, month: impl Into<String>) -> Self {
        self.since = Some(month.into());
        self
    }

    pub fn until(mut self, month: impl Into<String>) -> Self {
        self.until = Some(month.into());
        self
    }

    pub fn moves(mut self, moves: u32) -> Self {
        self.moves = Some(moves);
        self
    }

    pub fn recent_games(mut self, n: u32) -> Self {
        self.recent_games = Some(n);
        self
    }

    pub(crate) fn to_query(&self, player: &str) -> Vec<(&'static str, String)> {
        let color = self.color.unwrap_or(Side::White);
        let mut query = vec![
            ("player", player.to_string()),
            ("color", color.as_str().to_string()),
        ];

        if let Some(ref fen) = self.fen {
            query.push(("fen", fen.clone()));
        }
        if !self.play.is_empty() {
            query.push(("play", self.play.join(",")));
        }
        if !self.speeds.is_empty() {
            query.push(("speeds", join_speeds(&self.speeds)));
        }
        if !self.modes.is_empty() {
            let modes: Vec<&str> = self.modes.iter().map(Mode::as_str).collect();
            query.push(("modes", modes.join(",")));
        }
        if let Some(ref since) = self.since {
            query.push(("since", since.clone()));
        }
        if let Some(ref until) = self.until {
            query.push(("until", until.clone()));
        }
        if let Some(moves) = self.moves {
            query.push(("moves", moves.to_string()));
        }
        if let Some(n) = self.recent_games {
            query.push(("recentGames", n.to_string()));
        }

        query
    }
}

fn join_speeds(speeds: &[Speed]) -> String {
    speeds.iter().map(Speed::as_str).collect::<Vec<_>>().join(",")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Speed {
    UltraBullet,
    Bullet,
    Blitz,
    Rapid,
    Classical,
    Correspondence,
}

impl Speed {
    pub fn as_str(&self) -> &'static str {
        match self {
            Speed::UltraBullet => "ultraBullet",
            Speed::Bullet => "bullet",
            Speed::Blitz => "blitz",
            Speed::Rapid => "rapid",
            Speed::Classical => "classical",
            Speed::Correspondence => "correspondence",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim() {
            "ultraBullet" => Some(Speed::UltraBullet),
            "bullet" => Some(Speed::Bullet),
            "blitz" => Some(Speed::Blitz),
            "rapid" => Some(Speed::Rapid),
            "classical" => Some(Speed::Classical),
            "correspondence" => Some(Speed::Correspondence),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    Casual,
    Rated,
}

impl Mode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Casual => "casual",
            Mode::Rated => "rated",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    White,
    Black,
}

impl Side {
    pub fn as_str(&self) -> &'static str {
        match self {
            Side::White => "white",
            Side::Black => "black",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "white" => Some(Side::White),
            "black" => Some(Side::Black),
            _ => None,
        }
    }
}

/// Win/draw/loss counts and candidate moves for one position
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExplorerResponse {
    pub white: u64,
    pub draws: u64,
    pub black: u64,
    #[serde(default)]
    pub moves: Vec<ExplorerMove>,
    #[serde(default)]
    pub top_games: Vec<ExplorerGame>,
    #[serde(default)]
    pub recent_games: Vec<ExplorerGame>,
    #[serde(default)]
    pub opening: Option<Opening>,
}

impl ExplorerResponse {
    pub fn total(&self) -> u64 {
        self.white + self.draws + self.black
    }

    /// White's score in percent (wins plus half the draws), None without games
    pub fn white_score(&self) -> Option<f64> {
        white_score(self.white, self.draws, self.black)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExplorerMove {
    pub uci: String,
    pub san: String,
    pub white: u64,
    pub draws: u64,
    pub black: u64,
    #[serde(default)]
    pub average_rating: Option<u32>,
    #[serde(default)]
    pub opening: Option<Opening>,
}

impl ExplorerMove {
    pub fn total(&self) -> u64 {
        self.white + self.draws + self.black
    }

    pub fn white_score(&self) -> Option<f64> {
        white_score(self.white, self.draws, self.black)
    }
}

fn white_score(white: u64, draws: u64, black: u64) -> Option<f64> {
    let total = white + draws + black;
    if total == 0 {
        return None;
    }
    let score = (white as f64 + 0.5 * draws as f64) / total as f64 * 100.0;
    Some((score * 10.0).round() / 10.0)
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Opening {
    pub eco: String,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExplorerGame {
    pub id: String,
    #[serde(default)]
    pub uci: Option<String>,
    #[serde(default)]
    pub winner: Option<String>,
    pub white: GamePlayer,
    pub black: GamePlayer,
    #[serde(default)]
    pub year: Option<u16>,
    #[serde(default)]
    pub month: Option<String>,
    #[serde(default)]
    pub speed: Option<String>,
}

impl ExplorerGame {
    pub fn result(&self) -> &str {
        match self.winner.as_deref() {
            Some("white") => "1-0",
            Some("black") => "0-1",
            _ => "1/2-1/2",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GamePlayer {
    pub name: String,
    #[serde(default)]
    pub rating: Option<u16>,
}
