//! Shared application state for the status API.

use std::sync::Arc;

use emf_chaos_core::control::SchedulerControl;
use emf_chaos_core::publish::SnapshotReader;
use emf_chaos_types::ChaosSnapshot;

use crate::error::ObserverError;

/// Shared state for the Axum application.
///
/// Wrapped in [`Arc`] and injected via Axum's `State` extractor.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Read-only handle on the published snapshot slot.
    pub reader: SnapshotReader,
    /// Scheduler control (present when a scheduler is running).
    pub control: Option<Arc<SchedulerControl>>,
    /// Unamplified range, used for the amplification summary text.
    pub base_range_m: f64,
}

impl AppState {
    /// State that only reads snapshots; operator endpoints are disabled.
    pub const fn new(reader: SnapshotReader, base_range_m: f64) -> Self {
        Self {
            reader,
            control: None,
            base_range_m,
        }
    }

    /// State backed by a running scheduler's control.
    pub fn with_control(control: Arc<SchedulerControl>, base_range_m: f64) -> Self {
        Self {
            reader: control.reader(),
            control: Some(control),
            base_range_m,
        }
    }

    /// The latest published snapshot.
    pub fn latest(&self) -> Result<Arc<ChaosSnapshot>, ObserverError> {
        self.reader.latest().ok_or(ObserverError::NoSnapshot)
    }

    /// The attached scheduler control.
    pub fn control(&self) -> Result<&SchedulerControl, ObserverError> {
        self.control
            .as_deref()
            .ok_or(ObserverError::ControlUnavailable)
    }
}
