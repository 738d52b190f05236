//! The single most-recent-snapshot slot.
//!
//! The scheduler assembles a complete [`ChaosSnapshot`] off to the side and
//! swaps an [`Arc`] of it into the slot in one step. Readers only ever hold
//! an `Arc` to a whole snapshot, so a reader sees either the previous tick
//! or the new one, never a mix.
//!
//! Once the slot is closed (on a stop request) every further publication is
//! refused. Closing and publishing go through the same channel lock, so a
//! tick that finishes after the stop was issued cannot slip a snapshot in.

use std::sync::Arc;

use emf_chaos_types::ChaosSnapshot;
use tokio::sync::watch;

#[derive(Debug, Default)]
struct SlotState {
    latest: Option<Arc<ChaosSnapshot>>,
    closed: bool,
}

/// Write side, owned by the scheduler control.
#[derive(Debug)]
pub struct SnapshotSlot {
    tx: watch::Sender<SlotState>,
}

impl SnapshotSlot {
    /// Create an empty, open slot.
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(SlotState::default());
        Self { tx }
    }

    /// Replace the published snapshot.
    ///
    /// Returns `false` without touching the slot if it has been closed.
    pub fn publish(&self, snapshot: Arc<ChaosSnapshot>) -> bool {
        self.tx.send_if_modified(|state| {
            if state.closed {
                return false;
            }
            state.latest = Some(snapshot);
            true
        })
    }

    /// Refuse all further publications. The last snapshot stays readable.
    pub fn close(&self) {
        self.tx.send_if_modified(|state| {
            let was_open = !state.closed;
            state.closed = true;
            was_open
        });
    }

    /// Whether the slot has been closed.
    pub fn is_closed(&self) -> bool {
        self.tx.borrow().closed
    }

    /// The most recently published snapshot.
    pub fn latest(&self) -> Option<Arc<ChaosSnapshot>> {
        self.tx.borrow().latest.clone()
    }

    /// A new read-only handle.
    pub fn reader(&self) -> SnapshotReader {
        SnapshotReader {
            rx: self.tx.subscribe(),
            last_seen: None,
        }
    }
}

impl Default for SnapshotSlot {
    fn default() -> Self {
        Self::new()
    }
}

/// Read-only view of the slot, handed to presentation collaborators.
#[derive(Debug, Clone)]
pub struct SnapshotReader {
    rx: watch::Receiver<SlotState>,
    last_seen: Option<u64>,
}

impl SnapshotReader {
    /// The most recently published snapshot, if any tick has completed.
    pub fn latest(&self) -> Option<Arc<ChaosSnapshot>> {
        self.rx.borrow().latest.clone()
    }

    /// Whether the producer has stopped publishing.
    pub fn is_closed(&self) -> bool {
        self.rx.borrow().closed
    }

    /// Wait for a snapshot this reader has not returned yet.
    ///
    /// Returns the current snapshot immediately on the first call if one
    /// exists. Intermediate snapshots may be skipped when the reader falls
    /// behind; only the latest is delivered. Returns `None` once the slot is
    /// closed and drained, or when the producer is gone.
    pub async fn next_snapshot(&mut self) -> Option<Arc<ChaosSnapshot>> {
        loop {
            {
                let state = self.rx.borrow_and_update();
                let last_seen = self.last_seen;
                if let Some(fresh) = state
                    .latest
                    .as_ref()
                    .filter(|s| last_seen.is_none_or(|seen| s.tick > seen))
                {
                    self.last_seen = Some(fresh.tick);
                    return Some(Arc::clone(fresh));
                }
                if state.closed {
                    return None;
                }
            }
            if self.rx.changed().await.is_err() {
                return None;
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::BTreeMap;

    use chrono::Utc;
    use emf_chaos_types::{
        AmplificationMode, AmplificationState, ChaosState, EnvironmentStatus,
        EnvironmentalInfluence, IntensityTrend, PatternType, ReflectionType,
    };

    use super::*;

    fn snapshot(tick: u64) -> Arc<ChaosSnapshot> {
        Arc::new(ChaosSnapshot {
            tick,
            devices: Vec::new(),
            zone_counts: BTreeMap::new(),
            chaos: ChaosState {
                pattern_type: PatternType::AmbientMonitoring,
                reflection_type: ReflectionType::Ambient,
                intensity_percent: 0,
                timestamp: Utc::now(),
            },
            amplification: AmplificationState {
                carrier_count: 0,
                amplification_factor: 1.0,
                adjusted_factor: 1.0,
                extended_range_m: 25.0,
                coverage_area_sq_m: std::f64::consts::PI * 625.0,
                amplified_intensity: 0,
                mode: AmplificationMode::None,
            },
            environment: EnvironmentalInfluence::neutral(EnvironmentStatus::Missing),
            trend: IntensityTrend::Steady,
            intensity_delta: 0,
            history: Vec::new(),
        })
    }

    #[test]
    fn empty_slot_has_nothing() {
        let slot = SnapshotSlot::new();
        assert!(slot.latest().is_none());
        assert!(slot.reader().latest().is_none());
        assert!(!slot.is_closed());
    }

    #[test]
    fn publish_replaces_latest() {
        let slot = SnapshotSlot::new();
        let reader = slot.reader();
        assert!(slot.publish(snapshot(1)));
        assert!(slot.publish(snapshot(2)));
        assert_eq!(reader.latest().unwrap().tick, 2);
    }

    #[test]
    fn held_snapshot_survives_replacement() {
        let slot = SnapshotSlot::new();
        let reader = slot.reader();
        assert!(slot.publish(snapshot(1)));
        let held = reader.latest().unwrap();
        assert!(slot.publish(snapshot(2)));
        assert_eq!(held.tick, 1);
        assert_eq!(reader.latest().unwrap().tick, 2);
    }

    #[test]
    fn closed_slot_refuses_publication() {
        let slot = SnapshotSlot::new();
        let reader = slot.reader();
        assert!(slot.publish(snapshot(1)));
        slot.close();
        assert!(!slot.publish(snapshot(2)));
        assert!(reader.is_closed());
        assert_eq!(reader.latest().unwrap().tick, 1);
    }

    #[tokio::test]
    async fn next_snapshot_delivers_then_ends_on_close() {
        let slot = SnapshotSlot::new();
        let mut reader = slot.reader();
        assert!(slot.publish(snapshot(1)));
        assert_eq!(reader.next_snapshot().await.unwrap().tick, 1);

        assert!(slot.publish(snapshot(2)));
        assert!(slot.publish(snapshot(3)));
        assert_eq!(reader.next_snapshot().await.unwrap().tick, 3);

        slot.close();
        assert!(reader.next_snapshot().await.is_none());
    }

    #[tokio::test]
    async fn next_snapshot_waits_for_producer() {
        let slot = Arc::new(SnapshotSlot::new());
        let mut reader = slot.reader();
        let producer = Arc::clone(&slot);
        let handle = tokio::spawn(async move {
            tokio::task::yield_now().await;
            producer.publish(snapshot(7))
        });
        assert_eq!(reader.next_snapshot().await.unwrap().tick, 7);
        assert!(handle.await.unwrap());
    }

    #[tokio::test]
    async fn last_snapshot_before_close_is_not_lost() {
        let slot = SnapshotSlot::new();
        let mut reader = slot.reader();
        assert!(slot.publish(snapshot(4)));
        slot.close();
        assert_eq!(reader.next_snapshot().await.unwrap().tick, 4);
        assert!(reader.next_snapshot().await.is_none());
    }
}
