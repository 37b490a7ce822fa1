use axum::{
    routing::{get, post},
    Router,
};
use std::sync::{Arc, Mutex};
use tower_http::trace::TraceLayer;

use chess_explorer_core::engine::find_stockfish;
use chess_explorer_core::{AnalysisConfig, ExplorerClient, Settings, StockfishEngine};

mod routes;

pub struct AppState {
    pub explorer: ExplorerClient,
    /// Started on the first analysis request, dropped again if it fails
    pub engine: Mutex<Option<StockfishEngine>>,
    pub engine_path: String,
    pub config: AnalysisConfig,
}

pub fn app(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(routes::health))
        .route("/api/explorer", get(routes::explorer))
        .route("/api/player", get(routes::player))
        .route("/api/analyze", post(routes::analysis::analyze))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let settings = Settings::from_env();
    let explorer = ExplorerClient::from_settings(&settings).expect("Failed to create HTTP client");

    let state = Arc::new(AppState {
        explorer,
        engine: Mutex::new(None),
        engine_path: settings.stockfish_path.clone().unwrap_or_else(find_stockfish),
        config: AnalysisConfig::default(),
    });

    let listener = tokio::net::TcpListener::bind(&settings.bind_addr)
        .await
        .expect("Failed to bind address");

    tracing::info!(addr = %settings.bind_addr, engine = %state.engine_path, "server running");

    axum::serve(listener, app(state)).await.expect("Server error");
}
