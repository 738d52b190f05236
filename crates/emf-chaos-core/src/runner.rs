//! Scheduler loop with operator controls.
//!
//! [`run_scheduler`] drives [`build_snapshot`] on the configured cadence and
//! publishes each result into the control's snapshot slot. It supports:
//!
//! - **Bounded runs**: stop after `max_ticks`
//! - **Pause/resume**: halt between ticks and continue
//! - **Variable tick speed**: interval read fresh before every sleep
//! - **Clean stop**: the in-flight tick finishes, nothing is published after
//!   the stop request, and the inter-tick sleep is cut short
//! - **Closed slot on return**: readers see the slot closed once the loop
//!   ends, whatever the reason
//! - **Anomaly skipping**: a tick that fails is logged and skipped while the
//!   previous snapshot stays published
//!
//! [`build_snapshot`]: crate::tick::build_snapshot

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use emf_chaos_types::ChaosSnapshot;
use tracing::{info, warn};

use crate::control::{SchedulerControl, SchedulerEndReason};
use crate::tick::{self, SchedulerState, TickError};

/// Errors that end the scheduler loop.
#[derive(Debug, thiserror::Error)]
pub enum RunnerError {
    /// A tick failed in a way that cannot be skipped.
    #[error("tick error: {source}")]
    Tick {
        /// The underlying tick error.
        #[from]
        source: TickError,
    },
}

/// Outcome of a scheduler run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchedulerResult {
    /// Why the loop returned.
    pub end_reason: SchedulerEndReason,
    /// Ticks attempted, including skipped ones.
    pub total_ticks: u64,
    /// Snapshots published.
    pub published: u64,
    /// Ticks skipped because of a compute anomaly.
    pub anomalies: u64,
    /// Tick number of the last published snapshot.
    pub last_published_tick: Option<u64>,
}

/// Consumer notified after each successful publication.
pub trait TickCallback: Send {
    /// Called with the snapshot that was just published.
    fn on_tick(&mut self, snapshot: &ChaosSnapshot);
}

/// A tick callback that does nothing.
pub struct NoOpCallback;

impl TickCallback for NoOpCallback {
    fn on_tick(&mut self, _snapshot: &ChaosSnapshot) {}
}

/// Run the scheduler until a stop request or the tick limit.
///
/// # Errors
///
/// Returns [`RunnerError`] if the tick counter overflows. Environmental
/// anomalies never end the loop.
pub async fn run_scheduler(
    state: &mut SchedulerState,
    control: &Arc<SchedulerControl>,
    callback: &mut dyn TickCallback,
) -> Result<SchedulerResult, RunnerError> {
    let mut result = SchedulerResult {
        end_reason: SchedulerEndReason::OperatorStop,
        total_ticks: 0,
        published: 0,
        anomalies: 0,
        last_published_tick: None,
    };

    info!(
        max_ticks = control.max_ticks(),
        tick_interval_ms = control.tick_interval_ms(),
        "Scheduler starting"
    );

    loop {
        // --- Check pause ---
        if control.is_paused() {
            info!("Scheduler paused, waiting for resume...");
            control.wait_if_paused().await;
            info!("Scheduler resumed");
        }

        // --- Check stop request (before tick) ---
        if control.is_stop_requested() {
            info!("Operator stop requested");
            return Ok(finish(control, result, SchedulerEndReason::OperatorStop).await);
        }

        // --- Execute tick ---
        result.total_ticks = result.total_ticks.saturating_add(1);
        match tick::build_snapshot(state, Utc::now()) {
            Ok(snapshot) => {
                let tick = snapshot.tick;
                let snapshot = Arc::new(snapshot);
                if control.slot().publish(Arc::clone(&snapshot)) {
                    result.published = result.published.saturating_add(1);
                    result.last_published_tick = Some(tick);
                    callback.on_tick(&snapshot);
                } else {
                    info!(tick, "Stop requested during tick, snapshot discarded");
                }
            }
            Err(TickError::Environment { source }) => {
                result.anomalies = result.anomalies.saturating_add(1);
                let total = control.record_anomaly();
                warn!(
                    tick = state.tick(),
                    error = %source,
                    anomalies = total,
                    "Tick skipped, previous snapshot retained"
                );
            }
            Err(err @ TickError::TickOverflow) => return Err(err.into()),
        }

        // --- Check tick limit (after tick) ---
        if control.tick_limit_reached(state.tick()) {
            info!(
                tick = state.tick(),
                max_ticks = control.max_ticks(),
                "Tick limit reached"
            );
            return Ok(finish(control, result, SchedulerEndReason::MaxTicksReached).await);
        }

        // --- Sleep for tick interval, waking early on stop ---
        let interval_ms = control.tick_interval_ms();
        if interval_ms == 0 {
            tokio::task::yield_now().await;
        } else {
            tokio::select! {
                () = tokio::time::sleep(Duration::from_millis(interval_ms)) => {}
                () = control.stopped() => {}
            }
        }
    }
}

async fn finish(
    control: &SchedulerControl,
    mut result: SchedulerResult,
    reason: SchedulerEndReason,
) -> SchedulerResult {
    control.slot().close();
    control.set_end_reason(reason).await;
    result.end_reason = reason;
    result
}

/// Log the end of a scheduler run.
pub fn log_scheduler_end(result: &SchedulerResult) {
    info!(
        reason = ?result.end_reason,
        total_ticks = result.total_ticks,
        published = result.published,
        anomalies = result.anomalies,
        last_published_tick = result.last_published_tick,
        "Scheduler ended"
    );
    if result.published == 0 {
        warn!("Scheduler ended with no snapshots published");
    }
}
