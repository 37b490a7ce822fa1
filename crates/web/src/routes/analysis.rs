use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use chess_explorer_core::engine::SearchLimit;
use chess_explorer_core::{AnalysisSession, Error, EvaluationLine, StockfishEngine};

use super::ApiError;
use crate::AppState;

#[derive(Deserialize)]
pub struct AnalyzeRequest {
    pub fen: String,
    pub depth: Option<u32>,
    pub movetime: Option<u64>,
}

#[derive(Serialize)]
pub struct AnalyzeResponse {
    pub fen: String,
    pub best_move: Option<String>,
    pub ponder: Option<String>,
    pub evaluation: Option<String>,
    pub current: Option<EvaluationLine>,
    pub best_lines: Vec<EvaluationLine>,
}

pub async fn analyze(
    State(state): State<Arc<AppState>>,
    Json(req): Json<AnalyzeRequest>,
) -> Result<Json<AnalyzeResponse>, ApiError> {
    let response = tokio::task::spawn_blocking(move || run_analysis(&state, req))
        .await
        .map_err(|e| ApiError::internal(format!("analysis task failed: {}", e)))??;

    Ok(Json(response))
}

fn run_analysis(state: &AppState, req: AnalyzeRequest) -> Result<AnalyzeResponse, ApiError> {
    let mut session = AnalysisSession::new(state.config);
    // reject bad positions before touching the engine
    session.start_analysis(&req.fen)?;

    let limit = match (req.movetime, req.depth) {
        (Some(ms), _) => SearchLimit::MoveTime(ms),
        (None, Some(depth)) => SearchLimit::Depth(depth),
        (None, None) => SearchLimit::Depth(state.config.default_depth),
    };

    let mut guard = state
        .engine
        .lock()
        .map_err(|_| ApiError::internal("engine lock poisoned"))?;

    if guard.is_none() {
        let engine = StockfishEngine::new(&state.engine_path).map_err(Error::from)?;
        *guard = Some(engine);
    }
    let engine = guard
        .as_mut()
        .ok_or_else(|| ApiError::internal("engine missing"))?;

    tracing::info!(fen = %req.fen, ?limit, "analysis started");

    let best = match engine.analyze(&mut session, &req.fen, limit, |_| {}) {
        Ok(best) => best,
        Err(e) => {
            // the process is in an unknown state; start a fresh one next time
            *guard = None;
            return Err(e.into());
        }
    };

    let current = session.current_evaluation().cloned();

    Ok(AnalyzeResponse {
        fen: req.fen,
        best_move: (!best.is_none()).then(|| best.best.clone()),
        ponder: best.ponder,
        evaluation: current.as_ref().map(EvaluationLine::evaluation_text),
        current,
        best_lines: session.best_lines().to_vec(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use chess_explorer_core::{AnalysisConfig, ExplorerClient};
    use std::sync::Mutex;
    use tower::ServiceExt;

    fn test_state() -> Arc<AppState> {
        Arc::new(AppState {
            explorer: ExplorerClient::new().unwrap(),
            engine: Mutex::new(None),
            engine_path: "/nonexistent/stockfish-binary".to_string(),
            config: AnalysisConfig::default(),
        })
    }

    fn analyze_request(body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/api/analyze")
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let resp = crate::app(test_state())
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(resp.status(), StatusCode::OK);
        let body = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&body[..], b"OK");
    }

    #[tokio::test]
    async fn test_invalid_fen_is_bad_request() {
        let resp = crate::app(test_state())
            .oneshot(analyze_request(r#"{"fen": "not a fen"}"#))
            .await
            .unwrap();

        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_missing_engine_is_service_unavailable() {
        let state = test_state();
        let resp = crate::app(state.clone())
            .oneshot(analyze_request(
                r#"{"fen": "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1", "depth": 5}"#,
            ))
            .await
            .unwrap();

        assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert!(state.engine.lock().unwrap().is_none());

        let body = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert!(json["error"].as_str().unwrap().contains("unavailable"));
    }
}
