//! REST endpoint handlers for the status API.
//!
//! Every handler reads one [`Arc`] of the latest published snapshot, so a
//! response never mixes fields from different ticks.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET` | `/` | Minimal HTML status page |
//! | `GET` | `/api/snapshot` | Full latest snapshot |
//! | `GET` | `/api/devices` | Device batch and zone breakdown |
//! | `GET` | `/api/amplification` | Amplification state and summary |
//! | `GET` | `/api/environment` | Environmental influence |
//! | `GET` | `/api/history` | Recent ticks and intensity trend |

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use axum::response::{Html, IntoResponse};
use emf_chaos_core::amplification;

use crate::error::ObserverError;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// GET / -- minimal HTML status page
// ---------------------------------------------------------------------------

/// Serve a minimal HTML page with the latest figures and API links.
pub async fn index(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let latest = state.reader.latest();
    let status = if state.reader.is_closed() {
        "STOPPED"
    } else {
        "RUNNING"
    };
    let [tick, pattern, intensity, devices, carriers, range, rf_factor] = latest.map_or_else(
        || std::array::from_fn(|_| String::from("-")),
        |snap| {
            [
                snap.tick.to_string(),
                snap.chaos.pattern_type.as_str().to_owned(),
                format!("{}%", snap.chaos.intensity_percent),
                snap.device_count().to_string(),
                snap.amplification.carrier_count.to_string(),
                format!("{:.0} m", snap.amplification.extended_range_m),
                format!("{:.3}", snap.environment.rf_factor),
            ]
        },
    );

    Html(format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="utf-8">
    <title>EMF Chaos Observer</title>
    <style>
        body {{
            background: #0d1117;
            color: #c9d1d9;
            font-family: 'Cascadia Code', 'Fira Code', 'Consolas', monospace;
            padding: 2rem;
            max-width: 800px;
            margin: 0 auto;
        }}
        h1 {{ color: #f0883e; margin-bottom: 0.25rem; }}
        .subtitle {{ color: #8b949e; margin-top: 0; }}
        .metric {{
            display: inline-block;
            background: #161b22;
            border: 1px solid #30363d;
            border-radius: 6px;
            padding: 1rem 1.5rem;
            margin: 0.5rem 0.5rem 0.5rem 0;
            min-width: 120px;
        }}
        .metric .label {{ color: #8b949e; font-size: 0.85rem; }}
        .metric .value {{ color: #f0883e; font-size: 1.5rem; font-weight: bold; }}
        a {{ color: #58a6ff; text-decoration: none; }}
        ul {{ list-style: none; padding: 0; }}
        li {{ padding: 0.3rem 0; }}
        .status {{ color: #3fb950; font-weight: bold; }}
        hr {{ border: none; border-top: 1px solid #30363d; margin: 1.5rem 0; }}
    </style>
</head>
<body>
    <h1>EMF Chaos Observer</h1>
    <p class="subtitle">Synthetic RF environment simulation</p>

    <p>Status: <span class="status">{status}</span></p>

    <div>
        <div class="metric"><div class="label">Tick</div><div class="value">{tick}</div></div>
        <div class="metric"><div class="label">Pattern</div><div class="value">{pattern}</div></div>
        <div class="metric"><div class="label">Intensity</div><div class="value">{intensity}</div></div>
        <div class="metric"><div class="label">Devices</div><div class="value">{devices}</div></div>
        <div class="metric"><div class="label">Carriers</div><div class="value">{carriers}</div></div>
        <div class="metric"><div class="label">Range</div><div class="value">{range}</div></div>
        <div class="metric"><div class="label">RF factor</div><div class="value">{rf_factor}</div></div>
    </div>

    <hr>

    <h2>API Endpoints</h2>
    <ul>
        <li>GET <a href="/api/snapshot">/api/snapshot</a> -- Latest snapshot</li>
        <li>GET <a href="/api/devices">/api/devices</a> -- Device batch and zones</li>
        <li>GET <a href="/api/amplification">/api/amplification</a> -- Amplification estimate</li>
        <li>GET <a href="/api/environment">/api/environment</a> -- Environmental influence</li>
        <li>GET <a href="/api/history">/api/history</a> -- Recent ticks and trend</li>
        <li>GET <a href="/api/operator/status">/api/operator/status</a> -- Scheduler status</li>
    </ul>

    <h2>WebSocket</h2>
    <ul>
        <li><code>ws://host:port/ws/snapshots</code> -- Live snapshot stream</li>
    </ul>
</body>
</html>"#
    ))
}

// ---------------------------------------------------------------------------
// GET /api/snapshot
// ---------------------------------------------------------------------------

/// Return the full latest snapshot.
pub async fn get_snapshot(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, ObserverError> {
    let snapshot = state.latest()?;
    Ok(Json(serde_json::to_value(&*snapshot)?))
}

// ---------------------------------------------------------------------------
// GET /api/devices
// ---------------------------------------------------------------------------

/// Return the latest device batch with its zone breakdown.
pub async fn list_devices(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, ObserverError> {
    let snapshot = state.latest()?;
    Ok(Json(serde_json::json!({
        "tick": snapshot.tick,
        "device_count": snapshot.device_count(),
        "core_zone_count": snapshot.core_zone_count(),
        "zone_counts": snapshot.zone_counts,
        "devices": snapshot.devices,
    })))
}

// ---------------------------------------------------------------------------
// GET /api/amplification
// ---------------------------------------------------------------------------

/// Return the latest amplification estimate and its one-line summary.
pub async fn get_amplification(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, ObserverError> {
    let snapshot = state.latest()?;
    let summary = amplification::summary(&snapshot.amplification, state.base_range_m);
    Ok(Json(serde_json::json!({
        "tick": snapshot.tick,
        "amplification": snapshot.amplification,
        "summary": summary,
    })))
}

// ---------------------------------------------------------------------------
// GET /api/environment
// ---------------------------------------------------------------------------

/// Return the environmental influence applied to the latest tick.
pub async fn get_environment(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, ObserverError> {
    let snapshot = state.latest()?;
    Ok(Json(serde_json::json!({
        "tick": snapshot.tick,
        "environment": snapshot.environment,
    })))
}

// ---------------------------------------------------------------------------
// GET /api/history
// ---------------------------------------------------------------------------

/// Return the recent-tick history and the latest intensity trend.
pub async fn get_history(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, ObserverError> {
    let snapshot = state.latest()?;
    Ok(Json(serde_json::json!({
        "tick": snapshot.tick,
        "trend": snapshot.trend,
        "intensity_delta": snapshot.intensity_delta,
        "history": snapshot.history,
    })))
}
