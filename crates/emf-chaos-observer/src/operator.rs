//! Operator REST handlers for runtime scheduler control.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `POST` | `/api/operator/pause` | Pause the scheduler |
//! | `POST` | `/api/operator/resume` | Resume the scheduler |
//! | `POST` | `/api/operator/speed` | Set tick interval (ms) |
//! | `GET` | `/api/operator/status` | Current scheduler status |
//! | `POST` | `/api/operator/stop` | Clean stop |

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use axum::response::IntoResponse;
use emf_chaos_core::control::MIN_RUNTIME_TICK_INTERVAL_MS;

use crate::error::ObserverError;
use crate::state::AppState;

/// Request body for `POST /api/operator/speed`.
#[derive(Debug, serde::Deserialize)]
pub struct SetSpeedRequest {
    /// New tick interval in milliseconds (minimum 100).
    pub tick_interval_ms: u64,
}

/// Generic success response.
#[derive(Debug, serde::Serialize)]
struct OperatorResponse {
    ok: bool,
    message: String,
}

impl OperatorResponse {
    fn ok(message: &str) -> Json<Self> {
        Json(Self {
            ok: true,
            message: message.to_owned(),
        })
    }
}

/// Pause the scheduler before its next tick.
pub async fn pause(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, ObserverError> {
    state.control()?.pause();
    Ok(OperatorResponse::ok("Scheduler paused"))
}

/// Resume the scheduler after a pause.
pub async fn resume(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, ObserverError> {
    state.control()?.resume();
    Ok(OperatorResponse::ok("Scheduler resumed"))
}

/// Change the tick interval at runtime.
///
/// Takes effect from the next inter-tick sleep.
pub async fn set_speed(
    State(state): State<Arc<AppState>>,
    Json(body): Json<SetSpeedRequest>,
) -> Result<impl IntoResponse, ObserverError> {
    let control = state.control()?;
    let prev = control
        .set_tick_interval_ms(body.tick_interval_ms)
        .ok_or_else(|| {
            ObserverError::InvalidRequest(format!(
                "tick_interval_ms must be at least {MIN_RUNTIME_TICK_INTERVAL_MS}"
            ))
        })?;

    Ok(Json(serde_json::json!({
        "ok": true,
        "message": format!("Tick interval changed from {prev}ms to {}ms", body.tick_interval_ms),
        "previous_interval_ms": prev,
        "new_interval_ms": body.tick_interval_ms,
    })))
}

/// Return the scheduler status.
pub async fn status(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, ObserverError> {
    let status = state.control()?.status().await;
    Ok(Json(status))
}

/// Request a clean stop.
///
/// The in-flight tick finishes but is not published. The HTTP server keeps
/// serving the last snapshot.
pub async fn stop(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, ObserverError> {
    state.control()?.request_stop();
    Ok(OperatorResponse::ok(
        "Stop requested -- no further snapshots will be published",
    ))
}
