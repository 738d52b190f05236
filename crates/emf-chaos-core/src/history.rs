//! Short rolling history of published ticks.

use std::collections::VecDeque;

use emf_chaos_types::{HistoryEntry, IntensityTrend};

/// Ring of the most recent ticks, oldest first.
#[derive(Debug, Clone)]
pub struct TickHistory {
    entries: VecDeque<HistoryEntry>,
    capacity: usize,
}

impl TickHistory {
    /// Create an empty history holding at most `capacity` entries
    /// (a zero capacity is treated as one).
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Append an entry, evicting the oldest if full.
    ///
    /// Returns the trend and signed intensity delta relative to the
    /// previous entry. The very first entry is always steady.
    pub fn record(&mut self, entry: HistoryEntry) -> (IntensityTrend, i16) {
        let delta = self.entries.back().map_or(0, |prev| {
            i16::from(entry.intensity_percent).saturating_sub(i16::from(prev.intensity_percent))
        });
        if self.entries.len() >= self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(entry);
        (trend_of(delta), delta)
    }

    /// Copy of the entries, oldest first.
    pub fn entries(&self) -> Vec<HistoryEntry> {
        self.entries.iter().copied().collect()
    }

    /// Most recent entry.
    pub fn latest(&self) -> Option<&HistoryEntry> {
        self.entries.back()
    }

    /// Number of stored entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing has been recorded yet.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

const fn trend_of(delta: i16) -> IntensityTrend {
    if delta > 0 {
        IntensityTrend::Rising
    } else if delta < 0 {
        IntensityTrend::Falling
    } else {
        IntensityTrend::Steady
    }
}
