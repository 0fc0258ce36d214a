use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use chrono::Utc;
use serde::Serialize;

use crate::state::AppState;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct StatusResponse {
    status: &'static str,
    waiting: WaitingCounts,
    pair_sessions: usize,
    game_sessions: usize,
    connections: usize,
    uptime: u64,
    timestamp: String,
    version: &'static str,
}

#[derive(Serialize)]
struct WaitingCounts {
    video: usize,
    chess: usize,
}

/// Diagnostic snapshot of the coordinator, taken in one lock acquisition.
async fn status(State(state): State<AppState>) -> Json<StatusResponse> {
    let stats = state.coordinator.stats();
    Json(StatusResponse {
        status: "running",
        waiting: WaitingCounts {
            video: stats.waiting_video,
            chess: stats.waiting_chess,
        },
        pair_sessions: stats.pair_sessions,
        game_sessions: stats.game_sessions,
        connections: stats.connections,
        uptime: stats.uptime_secs,
        timestamp: Utc::now().to_rfc3339(),
        version: env!("CARGO_PKG_VERSION"),
    })
}

pub fn root_router() -> Router<AppState> {
    Router::new().route("/", get(status))
}

pub fn api_router() -> Router<AppState> {
    Router::new().route("/status", get(status))
}
