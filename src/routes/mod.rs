mod health;
mod status;
mod ws;

use axum::Router;

use crate::state::AppState;

/// Build the complete application router.
///
/// Structure:
/// - `GET /ws`: the coordinator `WebSocket`
/// - `GET /health`: lightweight liveness check
/// - `GET /` and `GET /api/v1/status`: pool and session counters
pub fn router() -> Router<AppState> {
    let api_v1 = Router::new().merge(status::api_router());

    Router::new()
        .merge(health::root_router())
        .merge(status::root_router())
        .merge(ws::router())
        .nest("/api/v1", api_v1)
}
