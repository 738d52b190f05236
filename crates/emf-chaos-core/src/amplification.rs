//! Carrier-based range amplification.
//!
//! Devices whose signal is strictly above the carrier threshold act as
//! informal relay carriers. Each carrier adds 30% to the amplification
//! factor and 12 m to the detection range:
//!
//! ```text
//! amplification_factor = 1.0 + carriers * 0.3
//! extended_range       = min(max_range, (base_range + carriers * 12) * rf_factor)
//! coverage_area        = pi * extended_range^2
//! ```
//!
//! The range ceiling models a legal power limit. It is applied after the
//! environmental factor and is never exceeded.
//!
//! Five carriers give `2.5x` and `85 m`.

use emf_chaos_types::{AmplificationMode, AmplificationState};

use crate::config::AmplificationConfig;

/// Amplification factor added per carrier.
pub const FACTOR_PER_CARRIER: f64 = 0.3;

/// Range added per carrier, in meters.
pub const RANGE_PER_CARRIER_M: f64 = 12.0;

/// Square meters per acre.
const SQ_M_PER_ACRE: f64 = 4_046.856;

/// Computes [`AmplificationState`] from a device batch.
#[derive(Debug, Clone, PartialEq)]
pub struct AmplificationEstimator {
    carrier_threshold_dbm: i32,
    base_range_m: f64,
    max_range_m: f64,
}

impl AmplificationEstimator {
    /// Create an estimator from (already validated) configuration.
    pub const fn new(config: &AmplificationConfig) -> Self {
        Self {
            carrier_threshold_dbm: config.carrier_threshold_dbm,
            base_range_m: config.base_range_m,
            max_range_m: config.max_range_m,
        }
    }

    /// Range with no carriers, in meters.
    pub const fn base_range_m(&self) -> f64 {
        self.base_range_m
    }

    /// Hard range ceiling, in meters.
    pub const fn max_range_m(&self) -> f64 {
        self.max_range_m
    }

    /// Count devices strictly above the carrier threshold.
    pub fn carrier_count(&self, signals_dbm: &[i32]) -> u32 {
        let count = signals_dbm
            .iter()
            .filter(|&&s| s > self.carrier_threshold_dbm)
            .count();
        u32::try_from(count).unwrap_or(u32::MAX)
    }

    /// Estimate amplification for a batch.
    ///
    /// `intensity_percent` is the batch's chaos intensity; `rf_factor` the
    /// environmental factor (1.0 when neutral). A non-finite or
    /// non-positive factor is treated as neutral.
    pub fn estimate(
        &self,
        signals_dbm: &[i32],
        intensity_percent: u8,
        rf_factor: f64,
    ) -> AmplificationState {
        let rf_factor = if rf_factor.is_finite() && rf_factor > 0.0 {
            rf_factor
        } else {
            1.0
        };
        let carrier_count = self.carrier_count(signals_dbm);
        let carriers = f64::from(carrier_count);

        let amplification_factor = FACTOR_PER_CARRIER.mul_add(carriers, 1.0);
        let raw_range = RANGE_PER_CARRIER_M.mul_add(carriers, self.base_range_m);
        let extended_range_m = (raw_range * rf_factor).min(self.max_range_m);

        AmplificationState {
            carrier_count,
            amplification_factor,
            adjusted_factor: amplification_factor * rf_factor,
            extended_range_m,
            coverage_area_sq_m: std::f64::consts::PI * extended_range_m * extended_range_m,
            amplified_intensity: amplified_intensity(intensity_percent, amplification_factor),
            mode: select_mode(signals_dbm.is_empty(), carrier_count),
        }
    }
}

/// Intensity boosted by the amplification factor, capped at 100.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn amplified_intensity(intensity_percent: u8, amplification_factor: f64) -> u8 {
    let boosted = (f64::from(intensity_percent) * amplification_factor).floor();
    // Clamped to [0, 100] so the cast is lossless.
    boosted.clamp(0.0, 100.0) as u8
}

/// Amplification mode from the carrier count.
pub const fn select_mode(empty_batch: bool, carrier_count: u32) -> AmplificationMode {
    if empty_batch {
        return AmplificationMode::None;
    }
    match carrier_count {
        0 | 1 => AmplificationMode::CarrierModulation,
        2 | 3 => AmplificationMode::HarmonicReflection,
        _ => AmplificationMode::ConstructiveInterference,
    }
}

/// Human-readable one-line summary.
pub fn summary(state: &AmplificationState, base_range_m: f64) -> String {
    if state.mode == AmplificationMode::None {
        return "No amplification (no carriers detected)".to_owned();
    }
    let increase = state.extended_range_m - base_range_m;
    let acres = state.coverage_area_sq_m / SQ_M_PER_ACRE;
    format!(
        "{} | Range: {:.1}m (+{:.1}m) | Carriers: {} | Coverage: {:.1} acres",
        state.mode.display_name(),
        state.extended_range_m,
        increase,
        state.carrier_count,
        acres
    )
}
