//! Integration tests for the status API endpoints.
//!
//! Tests drive the Axum `Router` directly via `tower::ServiceExt` without
//! starting a TCP server.

#![allow(clippy::unwrap_used)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use emf_chaos_core::config::{ChaosConfig, GeneratorConfig};
use emf_chaos_core::control::SchedulerControl;
use emf_chaos_core::publish::SnapshotSlot;
use emf_chaos_core::runner::{self, NoOpCallback};
use emf_chaos_core::tick::SchedulerState;
use emf_chaos_observer::router::build_router;
use emf_chaos_observer::state::AppState;
use serde_json::Value;
use tower::ServiceExt;

/// Run a short bounded scheduler and wrap its control in app state.
async fn make_test_state(ticks: u64) -> (Arc<AppState>, Arc<SchedulerControl>) {
    let config = ChaosConfig {
        generator: GeneratorConfig {
            seed: Some(11),
            ..GeneratorConfig::default()
        },
        ..ChaosConfig::default()
    };
    let (mut scheduler, _feed) = SchedulerState::new(&config).unwrap();
    let control = Arc::new(SchedulerControl::new(0, ticks));
    let _ = runner::run_scheduler(&mut scheduler, &control, &mut NoOpCallback)
        .await
        .unwrap();
    let state = Arc::new(AppState::with_control(
        Arc::clone(&control),
        config.amplification.base_range_m,
    ));
    (state, control)
}

fn empty_state() -> Arc<AppState> {
    Arc::new(AppState::new(SnapshotSlot::new().reader(), 25.0))
}

async fn body_to_json(body: Body) -> Value {
    let bytes = axum::body::to_bytes(body, usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

async fn get(state: Arc<AppState>, path: &str) -> (StatusCode, Value) {
    let response = build_router(state)
        .oneshot(Request::get(path).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    (status, body_to_json(response.into_body()).await)
}

async fn post_json(state: Arc<AppState>, path: &str, body: &str) -> (StatusCode, Value) {
    let response = build_router(state)
        .oneshot(
            Request::post(path)
                .header("content-type", "application/json")
                .body(Body::from(body.to_owned()))
                .unwrap(),
        )
        .await
        .unwrap();
    let status = response.status();
    (status, body_to_json(response.into_body()).await)
}

// =========================================================================
// Tests
// =========================================================================

#[tokio::test]
async fn test_index_returns_html() {
    let (state, _control) = make_test_state(2).await;
    let response = build_router(state)
        .oneshot(Request::get("/").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let content_type = response
        .headers()
        .get("content-type")
        .unwrap()
        .to_str()
        .unwrap();
    assert!(content_type.contains("text/html"));
}

#[tokio::test]
async fn test_index_before_first_tick() {
    let response = build_router(empty_state())
        .oneshot(Request::get("/").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_get_snapshot() {
    let (state, _control) = make_test_state(3).await;
    let (status, json) = get(state, "/api/snapshot").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["tick"], 3);
    assert!(json["chaos"]["pattern_type"].is_string());
    assert_eq!(json["history"].as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn test_snapshot_unavailable_before_first_tick() {
    let (status, json) = get(empty_state(), "/api/snapshot").await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(json["status"], 503);
}

#[tokio::test]
async fn test_list_devices() {
    let (state, _control) = make_test_state(1).await;
    let (status, json) = get(state, "/api/devices").await;

    assert_eq!(status, StatusCode::OK);
    let devices = json["devices"].as_array().unwrap();
    assert_eq!(json["device_count"].as_u64().unwrap(), devices.len() as u64);
    assert!((3..=12).contains(&devices.len()));

    let zone_total: u64 = json["zone_counts"]
        .as_object()
        .unwrap()
        .values()
        .map(|v| v.as_u64().unwrap())
        .sum();
    assert_eq!(zone_total, devices.len() as u64);
}

#[tokio::test]
async fn test_get_amplification() {
    let (state, _control) = make_test_state(1).await;
    let (status, json) = get(state, "/api/amplification").await;

    assert_eq!(status, StatusCode::OK);
    assert!(json["summary"].is_string());
    let range = json["amplification"]["extended_range_m"].as_f64().unwrap();
    assert!(range <= 100.0);
}

#[tokio::test]
async fn test_environment_missing_without_feed() {
    let (state, _control) = make_test_state(1).await;
    let (status, json) = get(state, "/api/environment").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["environment"]["status"], "missing");
    assert_eq!(json["environment"]["rf_factor"], 1.0);
}

#[tokio::test]
async fn test_get_history() {
    let (state, _control) = make_test_state(4).await;
    let (status, json) = get(state, "/api/history").await;

    assert_eq!(status, StatusCode::OK);
    let ticks: Vec<u64> = json["history"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["tick"].as_u64().unwrap())
        .collect();
    assert_eq!(ticks, vec![1, 2, 3, 4]);
    assert!(json["trend"].is_string());
}

#[tokio::test]
async fn test_operator_status() {
    let (state, _control) = make_test_state(2).await;
    let (status, json) = get(state, "/api/operator/status").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["tick"], 2);
    assert_eq!(json["max_ticks"], 2);
    assert_eq!(json["end_reason"], "max_ticks_reached");
}

#[tokio::test]
async fn test_operator_unavailable_without_control() {
    let (status, _json) = get(empty_state(), "/api/operator/status").await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn test_pause_and_resume() {
    let (state, control) = make_test_state(1).await;

    let (status, json) = post_json(Arc::clone(&state), "/api/operator/pause", "").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["ok"], true);
    assert!(control.is_paused());

    let (status, _json) = post_json(state, "/api/operator/resume", "").await;
    assert_eq!(status, StatusCode::OK);
    assert!(!control.is_paused());
}

#[tokio::test]
async fn test_set_speed() {
    let (state, control) = make_test_state(1).await;
    let (status, json) = post_json(
        state,
        "/api/operator/speed",
        r#"{"tick_interval_ms": 250}"#,
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["previous_interval_ms"], 0);
    assert_eq!(json["new_interval_ms"], 250);
    assert_eq!(control.tick_interval_ms(), 250);
}

#[tokio::test]
async fn test_set_speed_rejects_sub_100ms() {
    let (state, control) = make_test_state(1).await;
    let (status, json) = post_json(
        state,
        "/api/operator/speed",
        r#"{"tick_interval_ms": 50}"#,
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["status"], 400);
    assert_eq!(control.tick_interval_ms(), 0);
}

#[tokio::test]
async fn test_stop_closes_publication() {
    let (state, control) = make_test_state(1).await;
    let (status, _json) = post_json(Arc::clone(&state), "/api/operator/stop", "").await;

    assert_eq!(status, StatusCode::OK);
    assert!(control.is_stop_requested());
    assert!(state.reader.is_closed());

    // The last snapshot stays readable.
    let (status, json) = get(state, "/api/snapshot").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["tick"], 1);
}

#[tokio::test]
async fn test_nonexistent_route_returns_404() {
    let response = build_router(empty_state())
        .oneshot(Request::get("/api/nope").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
