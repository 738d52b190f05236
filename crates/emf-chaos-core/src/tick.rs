//! One scheduler tick: the pipeline from device batch to snapshot.
//!
//! Each tick runs these steps in dependency order over a single freshly
//! generated batch:
//!
//! 1. **Generate** -- draw the device batch.
//! 2. **Intensity** -- reduce the batch's signal strengths to 0 to 100.
//! 3. **Pattern** -- map the intensity to a pattern, tag every device with
//!    a reflection and pick the dominant one.
//! 4. **Environment** -- read the latest environmental influence.
//! 5. **Amplification** -- count carriers and apply the environmental
//!    factor before the range clamp.
//! 6. **History** -- append the tick and derive its trend.
//!
//! The finished [`ChaosSnapshot`] is returned to the caller, which decides
//! whether to publish it. A failing step leaves the history untouched so
//! the next tick compares against the last published one.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use emf_chaos_types::{ChaosSnapshot, ChaosState, DeviceRecord, HistoryEntry, Zone};
use rand::SeedableRng;
use rand::rngs::SmallRng;
use tracing::debug;

use crate::amplification::AmplificationEstimator;
use crate::config::{ChaosConfig, ConfigError};
use crate::environment::{EnvironmentError, EnvironmentFeed, EnvironmentalAdjuster};
use crate::generator::DeviceGenerator;
use crate::history::TickHistory;
use crate::{intensity, pattern};

/// Errors that abort a single tick.
#[derive(Debug, thiserror::Error)]
pub enum TickError {
    /// The environmental input could not be evaluated.
    #[error("environment error: {source}")]
    Environment {
        /// The underlying environment error.
        #[from]
        source: EnvironmentError,
    },

    /// The tick counter would overflow.
    #[error("tick counter overflow")]
    TickOverflow,
}

/// State owned by the scheduler across ticks.
///
/// Only the random source, the short history and the tick counter carry
/// over between ticks; every device batch is local to its tick.
#[derive(Debug)]
pub struct SchedulerState {
    generator: DeviceGenerator,
    rng: SmallRng,
    estimator: AmplificationEstimator,
    adjuster: EnvironmentalAdjuster,
    history: TickHistory,
    tick: u64,
}

impl SchedulerState {
    /// Build the scheduler state and the feed for environmental input.
    ///
    /// A configured seed makes the whole device sequence reproducible.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] if the configuration fails
    /// validation.
    pub fn new(config: &ChaosConfig) -> Result<(Self, EnvironmentFeed), ConfigError> {
        config.validate()?;
        let rng = config
            .generator
            .seed
            .map_or_else(SmallRng::from_os_rng, SmallRng::seed_from_u64);
        let (adjuster, feed) = EnvironmentalAdjuster::new(&config.environment);
        let state = Self {
            generator: DeviceGenerator::new(&config.generator)?,
            rng,
            estimator: AmplificationEstimator::new(&config.amplification),
            adjuster,
            history: TickHistory::new(config.scheduler.history_len),
            tick: 0,
        };
        Ok((state, feed))
    }

    /// Number of ticks attempted so far.
    pub const fn tick(&self) -> u64 {
        self.tick
    }

    /// The amplification estimator in use.
    pub const fn estimator(&self) -> &AmplificationEstimator {
        &self.estimator
    }
}

/// Run one tick captured at `now` and assemble its snapshot.
///
/// # Errors
///
/// Returns [`TickError`] if the tick cannot produce a valid snapshot. The
/// tick number is consumed either way.
pub fn build_snapshot(
    state: &mut SchedulerState,
    now: DateTime<Utc>,
) -> Result<ChaosSnapshot, TickError> {
    let tick = state.tick.checked_add(1).ok_or(TickError::TickOverflow)?;
    state.tick = tick;

    let samples = state.generator.generate(&mut state.rng);
    let signals: Vec<i32> = samples.iter().map(|s| s.signal_strength_dbm).collect();

    let intensity_percent = intensity::aggregate(&signals);
    let pattern_type = pattern::select(intensity_percent);

    let devices: Vec<DeviceRecord> = samples
        .into_iter()
        .map(|sample| {
            let reflection = pattern::reflection_for(&sample.synthetic_id, pattern_type);
            sample.into_record(reflection)
        })
        .collect();
    let reflection_type = pattern::dominant_reflection(devices.iter().map(|d| d.reflection_type));
    let zone_counts = count_zones(&devices);

    let environment = state.adjuster.influence(now)?;

    let amplification =
        state
            .estimator
            .estimate(&signals, intensity_percent, environment.rf_factor);

    let device_count = u32::try_from(devices.len()).unwrap_or(u32::MAX);
    let (trend, intensity_delta) = state.history.record(HistoryEntry {
        tick,
        device_count,
        intensity_percent,
    });

    debug!(
        tick,
        device_count,
        intensity_percent,
        pattern = pattern_type.as_str(),
        carriers = amplification.carrier_count,
        rf_factor = environment.rf_factor,
        "Tick computed"
    );

    Ok(ChaosSnapshot {
        tick,
        devices,
        zone_counts,
        chaos: ChaosState {
            pattern_type,
            reflection_type,
            intensity_percent,
            timestamp: now,
        },
        amplification,
        environment,
        trend,
        intensity_delta,
        history: state.history.entries(),
    })
}

/// Devices per zone, with every zone present.
fn count_zones(devices: &[DeviceRecord]) -> BTreeMap<Zone, u32> {
    let mut counts: BTreeMap<Zone, u32> = Zone::ALL.iter().map(|&z| (z, 0)).collect();
    for device in devices {
        if let Some(count) = counts.get_mut(&device.zone) {
            *count = count.saturating_add(1);
        }
    }
    counts
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use emf_chaos_types::{EnvironmentStatus, EnvironmentalSnapshot, PatternType};

    use super::*;
    use crate::config::GeneratorConfig;
    use crate::zone;

    fn seeded_config(seed: u64) -> ChaosConfig {
        ChaosConfig {
            generator: GeneratorConfig {
                seed: Some(seed),
                ..GeneratorConfig::default()
            },
            ..ChaosConfig::default()
        }
    }

    #[test]
    fn snapshot_is_internally_consistent() {
        let (mut state, _feed) = SchedulerState::new(&seeded_config(42)).unwrap();
        for expected_tick in 1..=20 {
            let snap = build_snapshot(&mut state, Utc::now()).unwrap();
            assert_eq!(snap.tick, expected_tick);
            assert!((3..=12).contains(&snap.device_count()));

            let zone_total: u32 = snap.zone_counts.values().sum();
            assert_eq!(usize::try_from(zone_total).unwrap(), snap.device_count());

            let signals: Vec<i32> = snap.devices.iter().map(|d| d.signal_strength_dbm).collect();
            assert_eq!(snap.chaos.intensity_percent, intensity::aggregate(&signals));
            assert_eq!(snap.chaos.pattern_type, pattern::select(snap.chaos.intensity_percent));
            assert_eq!(
                snap.amplification.carrier_count,
                state.estimator().carrier_count(&signals)
            );

            for device in &snap.devices {
                assert!(zone::within_bound(device.zone, device.distance_m));
                assert_eq!(device.threat_level, device.zone.threat_level());
            }

            let last = snap.history.last().unwrap();
            assert_eq!(last.tick, snap.tick);
            assert_eq!(last.intensity_percent, snap.chaos.intensity_percent);
        }
    }

    #[test]
    fn same_seed_same_sequence() {
        let (mut a, _fa) = SchedulerState::new(&seeded_config(9)).unwrap();
        let (mut b, _fb) = SchedulerState::new(&seeded_config(9)).unwrap();
        let now = Utc::now();
        for _ in 0..5 {
            let sa = build_snapshot(&mut a, now).unwrap();
            let sb = build_snapshot(&mut b, now).unwrap();
            assert_eq!(sa.devices, sb.devices);
            assert_eq!(sa.chaos, sb.chaos);
        }
    }

    #[test]
    fn no_environment_is_neutral() {
        let (mut state, _feed) = SchedulerState::new(&seeded_config(1)).unwrap();
        let snap = build_snapshot(&mut state, Utc::now()).unwrap();
        assert_eq!(snap.environment.status, EnvironmentStatus::Missing);
        assert!((snap.environment.rf_factor - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn live_environment_keeps_range_clamp() {
        let (mut state, feed) = SchedulerState::new(&seeded_config(5)).unwrap();
        let now = Utc::now();
        feed.submit(EnvironmentalSnapshot {
            wind_speed_mps: 10.0,
            wind_direction_deg: 0.0,
            humidity_pct: 60.0,
            temperature_c: 18.0,
            pressure_hpa: 1013.25,
            observed_at: now,
            simulated: true,
        });
        for _ in 0..20 {
            let snap = build_snapshot(&mut state, now).unwrap();
            assert_eq!(snap.environment.status, EnvironmentStatus::Live);
            assert!(snap.amplification.extended_range_m <= 100.0);
        }
    }

    #[test]
    fn malformed_environment_fails_tick_without_touching_history() {
        let (mut state, feed) = SchedulerState::new(&seeded_config(3)).unwrap();
        let now = Utc::now();
        let first = build_snapshot(&mut state, now).unwrap();
        feed.submit(EnvironmentalSnapshot {
            wind_speed_mps: f64::INFINITY,
            wind_direction_deg: 0.0,
            humidity_pct: 60.0,
            temperature_c: 18.0,
            pressure_hpa: 1013.25,
            observed_at: now,
            simulated: false,
        });
        let result = build_snapshot(&mut state, now);
        assert!(matches!(result, Err(TickError::Environment { .. })));
        assert_eq!(state.tick(), 2);
        assert_eq!(state.history.len(), first.history.len());
    }

    #[test]
    fn empty_batch_reports_every_zone() {
        let config = ChaosConfig {
            generator: GeneratorConfig {
                min_devices: 0,
                max_devices: 0,
                seed: Some(1),
            },
            ..ChaosConfig::default()
        };
        let (mut state, _feed) = SchedulerState::new(&config).unwrap();
        let snap = build_snapshot(&mut state, Utc::now()).unwrap();
        assert_eq!(snap.device_count(), 0);
        assert_eq!(snap.zone_counts.len(), 5);
        assert_eq!(snap.chaos.intensity_percent, 0);
        assert_eq!(snap.chaos.pattern_type, PatternType::AmbientMonitoring);
        assert_eq!(snap.amplification.mode, emf_chaos_types::AmplificationMode::None);
    }

    #[test]
    fn inverted_range_is_rejected() {
        let config = ChaosConfig {
            generator: GeneratorConfig {
                min_devices: 8,
                max_devices: 2,
                seed: None,
            },
            ..ChaosConfig::default()
        };
        assert!(matches!(
            SchedulerState::new(&config),
            Err(ConfigError::Invalid { .. })
        ));
    }
}
