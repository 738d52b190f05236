//! Tick callback that logs each published snapshot.

use emf_chaos_core::amplification;
use emf_chaos_core::runner::TickCallback;
use emf_chaos_types::{ChaosSnapshot, Zone};
use tracing::{debug, info};

/// Logs one summary line per tick, plus per-device detail at debug level.
pub struct LogCallback {
    base_range_m: f64,
}

impl LogCallback {
    /// Create a callback that reports range gains against `base_range_m`.
    pub const fn new(base_range_m: f64) -> Self {
        Self { base_range_m }
    }
}

impl TickCallback for LogCallback {
    fn on_tick(&mut self, snapshot: &ChaosSnapshot) {
        let zone = |z: Zone| snapshot.zone_counts.get(&z).copied().unwrap_or(0);
        info!(
            tick = snapshot.tick,
            pattern = snapshot.chaos.pattern_type.as_str(),
            reflection = snapshot.chaos.reflection_type.display_name(),
            intensity = snapshot.chaos.intensity_percent,
            trend = ?snapshot.trend,
            devices = snapshot.device_count(),
            center = zone(Zone::Center),
            north = zone(Zone::North),
            east = zone(Zone::East),
            south = zone(Zone::South),
            west = zone(Zone::West),
            rf_factor = snapshot.environment.rf_factor,
            amplification = %amplification::summary(&snapshot.amplification, self.base_range_m),
            "Tick published"
        );

        for device in &snapshot.devices {
            debug!(
                tick = snapshot.tick,
                id = %device.synthetic_id.short_label(),
                device_type = device.device_type.display_name(),
                signal_dbm = device.signal_strength_dbm,
                distance_m = device.distance_m,
                zone = device.zone.label(),
                threat = ?device.threat_level,
                "Device"
            );
        }
    }
}
