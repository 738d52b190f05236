//! Runtime control of the tick scheduler.
//!
//! [`SchedulerControl`] is shared (via [`Arc`](std::sync::Arc)) between the
//! scheduler loop and the operator endpoints. It owns the
//! [`SnapshotSlot`] so that a stop request can close publication in the
//! same step it raises the stop flag.
//!
//! Control fields are atomics, read lock-free on every tick. The stop flag
//! is a `watch` channel so that every task awaiting [`SchedulerControl::stopped`]
//! observes it.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::{Mutex, Notify, watch};

use crate::publish::{SnapshotReader, SnapshotSlot};

/// Smallest tick interval an operator may set at runtime.
pub const MIN_RUNTIME_TICK_INTERVAL_MS: u64 = 100;

/// Why the scheduler loop returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SchedulerEndReason {
    /// The configured `max_ticks` was reached.
    MaxTicksReached,
    /// A stop was requested.
    OperatorStop,
}

/// Shared scheduler control state.
#[derive(Debug)]
pub struct SchedulerControl {
    paused: AtomicBool,
    resume_notify: Notify,
    stop_requested: watch::Sender<bool>,
    tick_interval_ms: AtomicU64,
    anomalies: AtomicU64,
    started_at: DateTime<Utc>,
    max_ticks: u64,
    slot: SnapshotSlot,
    end_reason: Mutex<Option<SchedulerEndReason>>,
}

impl SchedulerControl {
    /// Create control state with an empty snapshot slot.
    pub fn new(tick_interval_ms: u64, max_ticks: u64) -> Self {
        Self {
            paused: AtomicBool::new(false),
            resume_notify: Notify::new(),
            stop_requested: watch::Sender::new(false),
            tick_interval_ms: AtomicU64::new(tick_interval_ms),
            anomalies: AtomicU64::new(0),
            started_at: Utc::now(),
            max_ticks,
            slot: SnapshotSlot::new(),
            end_reason: Mutex::new(None),
        }
    }

    // -----------------------------------------------------------------------
    // Snapshot slot
    // -----------------------------------------------------------------------

    /// The write side of the snapshot slot.
    pub const fn slot(&self) -> &SnapshotSlot {
        &self.slot
    }

    /// A read-only snapshot handle for a collaborator.
    pub fn reader(&self) -> SnapshotReader {
        self.slot.reader()
    }

    // -----------------------------------------------------------------------
    // Pause / Resume
    // -----------------------------------------------------------------------

    /// Whether the scheduler is paused.
    pub fn is_paused(&self) -> bool {
        self.paused.load(Ordering::Acquire)
    }

    /// Pause before the next tick.
    pub fn pause(&self) {
        self.paused.store(true, Ordering::Release);
    }

    /// Resume and wake the scheduler.
    pub fn resume(&self) {
        self.paused.store(false, Ordering::Release);
        self.resume_notify.notify_one();
    }

    /// Wait while paused. Returns early if a stop is requested.
    pub async fn wait_if_paused(&self) {
        while self.is_paused() && !self.is_stop_requested() {
            self.resume_notify.notified().await;
        }
    }

    // -----------------------------------------------------------------------
    // Stop
    // -----------------------------------------------------------------------

    /// Request a clean stop.
    ///
    /// The snapshot slot is closed immediately, so no publication happens
    /// after this returns. An in-flight tick still runs to completion.
    pub fn request_stop(&self) {
        self.stop_requested.send_replace(true);
        self.slot.close();
        self.resume_notify.notify_one();
    }

    /// Whether a stop has been requested.
    pub fn is_stop_requested(&self) -> bool {
        *self.stop_requested.borrow()
    }

    /// Resolve once a stop is requested.
    ///
    /// Any number of tasks may wait at once; all of them are released.
    pub async fn stopped(&self) {
        let mut rx = self.stop_requested.subscribe();
        // The sender is owned by `self`, so the channel outlives this wait.
        let _ = rx.wait_for(|&requested| requested).await;
    }

    /// Record why the scheduler ended.
    pub async fn set_end_reason(&self, reason: SchedulerEndReason) {
        *self.end_reason.lock().await = Some(reason);
    }

    /// Why the scheduler ended, if it has.
    pub async fn end_reason(&self) -> Option<SchedulerEndReason> {
        *self.end_reason.lock().await
    }

    // -----------------------------------------------------------------------
    // Tick Speed
    // -----------------------------------------------------------------------

    /// Current tick interval in milliseconds.
    pub fn tick_interval_ms(&self) -> u64 {
        self.tick_interval_ms.load(Ordering::Acquire)
    }

    /// Change the tick interval. Values below
    /// [`MIN_RUNTIME_TICK_INTERVAL_MS`] are rejected with `None`; otherwise
    /// the previous interval is returned.
    pub fn set_tick_interval_ms(&self, ms: u64) -> Option<u64> {
        if ms < MIN_RUNTIME_TICK_INTERVAL_MS {
            return None;
        }
        Some(self.tick_interval_ms.swap(ms, Ordering::AcqRel))
    }

    // -----------------------------------------------------------------------
    // Bounds and counters
    // -----------------------------------------------------------------------

    /// Whether `completed_tick` reaches the configured limit (0 = unlimited).
    pub const fn tick_limit_reached(&self, completed_tick: u64) -> bool {
        self.max_ticks > 0 && completed_tick >= self.max_ticks
    }

    /// Configured tick limit.
    pub const fn max_ticks(&self) -> u64 {
        self.max_ticks
    }

    /// Count one skipped tick.
    pub fn record_anomaly(&self) -> u64 {
        self.anomalies.fetch_add(1, Ordering::AcqRel).saturating_add(1)
    }

    /// Ticks skipped so far.
    pub fn anomalies(&self) -> u64 {
        self.anomalies.load(Ordering::Acquire)
    }

    /// Whole seconds since start.
    pub fn elapsed_seconds(&self) -> u64 {
        let elapsed = Utc::now()
            .signed_duration_since(self.started_at)
            .num_seconds();
        u64::try_from(elapsed.max(0)).unwrap_or(u64::MAX)
    }

    /// Point-in-time status for the operator surface.
    pub async fn status(&self) -> SchedulerStatus {
        SchedulerStatus {
            tick: self.slot.latest().map_or(0, |s| s.tick),
            paused: self.is_paused(),
            stop_requested: self.is_stop_requested(),
            tick_interval_ms: self.tick_interval_ms(),
            elapsed_seconds: self.elapsed_seconds(),
            max_ticks: self.max_ticks,
            anomalies: self.anomalies(),
            end_reason: self.end_reason().await,
            started_at: self.started_at.to_rfc3339(),
        }
    }
}

/// JSON status of the scheduler.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchedulerStatus {
    /// Tick of the latest published snapshot (0 before the first).
    pub tick: u64,
    /// Whether paused.
    pub paused: bool,
    /// Whether a stop has been requested.
    pub stop_requested: bool,
    /// Current tick interval in milliseconds.
    pub tick_interval_ms: u64,
    /// Seconds since start.
    pub elapsed_seconds: u64,
    /// Configured tick limit (0 = unlimited).
    pub max_ticks: u64,
    /// Ticks skipped because of a compute anomaly.
    pub anomalies: u64,
    /// Why the scheduler ended, once it has.
    pub end_reason: Option<SchedulerEndReason>,
    /// RFC 3339 start time.
    pub started_at: String,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use super::*;

    #[test]
    fn initial_state_is_running() {
        let control = SchedulerControl::new(500, 0);
        assert!(!control.is_paused());
        assert!(!control.is_stop_requested());
        assert!(!control.slot().is_closed());
    }

    #[test]
    fn pause_and_resume() {
        let control = SchedulerControl::new(500, 0);
        control.pause();
        assert!(control.is_paused());
        control.resume();
        assert!(!control.is_paused());
    }

    #[test]
    fn stop_closes_the_slot() {
        let control = SchedulerControl::new(500, 0);
        let reader = control.reader();
        control.request_stop();
        assert!(control.is_stop_requested());
        assert!(reader.is_closed());
    }

    #[test]
    fn runtime_interval_floor() {
        let control = SchedulerControl::new(500, 0);
        assert_eq!(control.set_tick_interval_ms(99), None);
        assert_eq!(control.tick_interval_ms(), 500);
        assert_eq!(control.set_tick_interval_ms(250), Some(500));
        assert_eq!(control.tick_interval_ms(), 250);
    }

    #[test]
    fn zero_max_ticks_is_unlimited() {
        let control = SchedulerControl::new(500, 0);
        assert!(!control.tick_limit_reached(u64::MAX));
        let bounded = SchedulerControl::new(500, 3);
        assert!(!bounded.tick_limit_reached(2));
        assert!(bounded.tick_limit_reached(3));
    }

    #[test]
    fn anomalies_are_counted() {
        let control = SchedulerControl::new(500, 0);
        assert_eq!(control.record_anomaly(), 1);
        assert_eq!(control.record_anomaly(), 2);
        assert_eq!(control.anomalies(), 2);
    }

    #[tokio::test]
    async fn stop_releases_a_paused_waiter() {
        let control = Arc::new(SchedulerControl::new(500, 0));
        control.pause();
        let waiter = Arc::clone(&control);
        let handle = tokio::spawn(async move { waiter.wait_if_paused().await });
        tokio::task::yield_now().await;
        control.request_stop();
        let joined = tokio::time::timeout(Duration::from_secs(1), handle).await;
        assert!(joined.is_ok());
    }

    #[tokio::test]
    async fn stop_releases_every_stopped_waiter() {
        let control = Arc::new(SchedulerControl::new(500, 0));
        let first = Arc::clone(&control);
        let second = Arc::clone(&control);
        let a = tokio::spawn(async move { first.stopped().await });
        let b = tokio::spawn(async move { second.stopped().await });
        tokio::task::yield_now().await;

        control.request_stop();
        let joined = tokio::time::timeout(Duration::from_secs(1), async {
            a.await.unwrap();
            b.await.unwrap();
        })
        .await;
        assert!(joined.is_ok());
    }

    #[tokio::test]
    async fn stopped_resolves_after_the_fact() {
        let control = SchedulerControl::new(500, 0);
        control.request_stop();
        let done = tokio::time::timeout(Duration::from_secs(1), control.stopped()).await;
        assert!(done.is_ok());
    }

    #[tokio::test]
    async fn status_reflects_controls() {
        let control = SchedulerControl::new(500, 10);
        control.pause();
        let status = control.status().await;
        assert!(status.paused);
        assert_eq!(status.tick, 0);
        assert_eq!(status.max_ticks, 10);
        assert!(status.end_reason.is_none());

        control.set_end_reason(SchedulerEndReason::OperatorStop).await;
        assert_eq!(control.end_reason().await, Some(SchedulerEndReason::OperatorStop));
    }

    #[tokio::test]
    async fn status_serializes_end_reason_in_snake_case() {
        let control = SchedulerControl::new(500, 1);
        control.set_end_reason(SchedulerEndReason::MaxTicksReached).await;
        let json = serde_json::to_value(control.status().await).ok();
        let reason = json.as_ref().and_then(|v| v.get("end_reason")).cloned();
        assert_eq!(reason, Some(serde_json::json!("max_ticks_reached")));
    }
}
