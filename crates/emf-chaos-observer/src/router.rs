//! Axum router construction for the status API.

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::state::AppState;
use crate::{handlers, operator, ws};

/// Build the complete Axum router.
///
/// The router includes:
/// - `GET /` -- minimal HTML status page
/// - `GET /ws/snapshots` -- `WebSocket` snapshot stream
/// - `GET /api/snapshot`, `/api/devices`, `/api/amplification`,
///   `/api/environment`, `/api/history` -- latest snapshot views
/// - `GET /api/operator/status` and `POST /api/operator/{pause,resume,speed,stop}`
///
/// CORS allows any origin for dashboard development.
pub fn build_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Status page
        .route("/", get(handlers::index))
        // WebSocket
        .route("/ws/snapshots", get(ws::ws_snapshots))
        // Snapshot views
        .route("/api/snapshot", get(handlers::get_snapshot))
        .route("/api/devices", get(handlers::list_devices))
        .route("/api/amplification", get(handlers::get_amplification))
        .route("/api/environment", get(handlers::get_environment))
        .route("/api/history", get(handlers::get_history))
        // Operator controls
        .route("/api/operator/status", get(operator::status))
        .route("/api/operator/pause", post(operator::pause))
        .route("/api/operator/resume", post(operator::resume))
        .route("/api/operator/speed", post(operator::set_speed))
        .route("/api/operator/stop", post(operator::stop))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
