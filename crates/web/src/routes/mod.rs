use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use std::sync::Arc;

use chess_explorer_core::lichess::{ExplorerParams, ExplorerResponse, PlayerParams, Side, Speed};
use chess_explorer_core::Error;

use crate::AppState;

pub mod analysis;

// ============================================================================
// ERRORS
// ============================================================================

/// JSON error body with a status picked from the core error
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: message.into(),
        }
    }
}

impl From<Error> for ApiError {
    fn from(error: Error) -> Self {
        let status = match &error {
            Error::StatisticsUnavailable { .. } => StatusCode::BAD_GATEWAY,
            Error::InvalidFen(_) | Error::InvalidPosition(_) => StatusCode::BAD_REQUEST,
            e if e.is_engine_unavailable() => StatusCode::SERVICE_UNAVAILABLE,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        Self {
            status,
            message: error.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            tracing::warn!(status = %self.status, error = %self.message, "request failed");
        }
        let body = Json(serde_json::json!({ "error": self.message }));
        (self.status, body).into_response()
    }
}

// ============================================================================
// QUERY PARAMS
// ============================================================================

#[derive(Deserialize, Default)]
pub struct ExplorerQuery {
    pub db: Option<String>,
    pub fen: Option<String>,
    /// Comma separated UCI moves
    pub play: Option<String>,
    pub speeds: Option<String>,
    pub ratings: Option<String>,
    pub moves: Option<u32>,
}

#[derive(Deserialize, Default)]
pub struct PlayerQuery {
    pub username: String,
    pub color: Option<String>,
    pub fen: Option<String>,
    pub play: Option<String>,
    pub speeds: Option<String>,
    pub moves: Option<u32>,
}

fn split_list(value: Option<&str>) -> Vec<String> {
    value
        .unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

fn parse_speeds(value: Option<&str>) -> Result<Vec<Speed>, ApiError> {
    split_list(value)
        .iter()
        .map(|s| Speed::parse(s).ok_or_else(|| ApiError::bad_request(format!("unknown speed: {}", s))))
        .collect()
}

impl ExplorerQuery {
    fn to_params(&self) -> Result<ExplorerParams, ApiError> {
        let ratings = split_list(self.ratings.as_deref())
            .iter()
            .map(|r| r.parse().map_err(|_| ApiError::bad_request(format!("bad rating: {}", r))))
            .collect::<Result<Vec<u16>, _>>()?;

        let mut params = ExplorerParams::new()
            .play(split_list(self.play.as_deref()))
            .speeds(&parse_speeds(self.speeds.as_deref())?)
            .ratings(&ratings);

        if let Some(ref fen) = self.fen {
            params = params.fen(fen.clone());
        }
        if let Some(moves) = self.moves {
            params = params.moves(moves);
        }
        Ok(params)
    }
}

impl PlayerQuery {
    fn to_params(&self) -> Result<PlayerParams, ApiError> {
        let mut params = PlayerParams::new()
            .play(split_list(self.play.as_deref()))
            .speeds(&parse_speeds(self.speeds.as_deref())?);

        if let Some(ref color) = self.color {
            let side = Side::parse(color)
                .ok_or_else(|| ApiError::bad_request(format!("unknown color: {}", color)))?;
            params = params.color(side);
        }
        if let Some(ref fen) = self.fen {
            params = params.fen(fen.clone());
        }
        if let Some(moves) = self.moves {
            params = params.moves(moves);
        }
        Ok(params)
    }
}

// ============================================================================
// HANDLERS
// ============================================================================

pub async fn explorer(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ExplorerQuery>,
) -> Result<Json<ExplorerResponse>, ApiError> {
    let params = query.to_params()?;

    let response = match query.db.as_deref() {
        None | Some("lichess") => state.explorer.lichess(&params).await?,
        Some("masters") => state.explorer.masters(&params).await?,
        Some(other) => return Err(ApiError::bad_request(format!("unknown database: {}", other))),
    };

    Ok(Json(response))
}

pub async fn player(
    State(state): State<Arc<AppState>>,
    Query(query): Query<PlayerQuery>,
) -> Result<Json<ExplorerResponse>, ApiError> {
    let username = query.username.trim();
    if username.is_empty() {
        return Err(ApiError::bad_request("username is required"));
    }

    let params = query.to_params()?;
    let response = state.explorer.player(username, &params).await?;
    Ok(Json(response))
}

pub async fn health() -> &'static str {
    "OK"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explorer_query_to_params() {
        let query = ExplorerQuery {
            play: Some("e2e4, e7e5".to_string()),
            speeds: Some("blitz,rapid".to_string()),
            ratings: Some("2000,2200".to_string()),
            ..Default::default()
        };

        let params = query.to_params().ok().unwrap();
        assert_eq!(params.play, vec!["e2e4", "e7e5"]);
        assert_eq!(params.speeds, vec![Speed::Blitz, Speed::Rapid]);
        assert_eq!(params.ratings, vec![2000, 2200]);
    }

    #[test]
    fn test_bad_filters_are_rejected() {
        let query = ExplorerQuery {
            ratings: Some("high".to_string()),
            ..Default::default()
        };
        assert_eq!(query.to_params().err().unwrap().status, StatusCode::BAD_REQUEST);

        let query = PlayerQuery {
            username: "someone".to_string(),
            color: Some("green".to_string()),
            ..Default::default()
        };
        assert_eq!(query.to_params().err().unwrap().status, StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_statistics_error_maps_to_bad_gateway() {
        let error = Error::StatisticsUnavailable {
            reason: "503 Service Unavailable".to_string(),
            source: None,
        };
        assert_eq!(ApiError::from(error).status, StatusCode::BAD_GATEWAY);
    }
}
