//! Chaos intensity aggregation.
//!
//! Intensity is the rounded average of two terms, each clamped to
//! `[0, 100]` first:
//!
//! - **count term**: `15` per device, capped at `100`
//! - **signal term**: the sum of normalized signal strengths divided by
//!   [`SIGNAL_SATURATION_DEVICES`], capped at `100`
//!
//! Signals are normalized linearly from [`SIGNAL_FLOOR_DBM`] (0) to
//! [`SIGNAL_CEILING_DBM`] (100). Both terms are sums of non-negative
//! per-device contributions, so intensity never decreases when a device is
//! added or when any single signal gets stronger. An empty batch scores
//! exactly 0.

/// Count-term contribution of each device.
pub const PER_DEVICE_CONTRIBUTION: f64 = 15.0;

/// Signal strength that normalizes to 0.
pub const SIGNAL_FLOOR_DBM: i32 = -95;

/// Signal strength that normalizes to 100.
pub const SIGNAL_CEILING_DBM: i32 = -30;

/// Number of full-strength devices that saturate the signal term.
pub const SIGNAL_SATURATION_DEVICES: f64 = 6.0;

/// Upper bound of every term and of the result.
const CEILING: f64 = 100.0;

/// Normalize a signal strength into `[0, 100]`.
pub fn normalized_signal(signal_strength_dbm: i32) -> f64 {
    let span = f64::from(SIGNAL_CEILING_DBM) - f64::from(SIGNAL_FLOOR_DBM);
    let offset = f64::from(signal_strength_dbm) - f64::from(SIGNAL_FLOOR_DBM);
    (offset / span * CEILING).clamp(0.0, CEILING)
}

/// Count term for a batch of `device_count` devices.
pub fn count_term(device_count: usize) -> f64 {
    let count = f64::from(u32::try_from(device_count).unwrap_or(u32::MAX));
    (count * PER_DEVICE_CONTRIBUTION).min(CEILING)
}

/// Signal term for a batch of signal strengths.
pub fn signal_term(signals_dbm: &[i32]) -> f64 {
    let total: f64 = signals_dbm.iter().map(|&s| normalized_signal(s)).sum();
    (total / SIGNAL_SATURATION_DEVICES).min(CEILING)
}

/// Reduce a batch of signal strengths to a 0 to 100 intensity.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn aggregate(signals_dbm: &[i32]) -> u8 {
    if signals_dbm.is_empty() {
        return 0;
    }
    let blended = (count_term(signals_dbm.len()) + signal_term(signals_dbm)) / 2.0;
    // Clamped to [0, 100] so the cast is lossless.
    blended.round().clamp(0.0, CEILING) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_batch_is_zero() {
        assert_eq!(aggregate(&[]), 0);
    }

    #[test]
    fn normalization_endpoints() {
        assert!(normalized_signal(-95).abs() < f64::EPSILON);
        assert!((normalized_signal(-30) - 100.0).abs() < f64::EPSILON);
        assert!(normalized_signal(-120).abs() < f64::EPSILON);
        assert!((normalized_signal(0) - 100.0).abs() < f64::EPSILON);
    }

    #[test]
    fn known_values() {
        // Count term 15, signal term 100/6 -> (15 + 16.67) / 2 = 15.8
        assert_eq!(aggregate(&[-30]), 16);
        // Saturated on both terms.
        assert_eq!(aggregate(&[-30; 12]), 100);
        // Floor signals only contribute the count term.
        assert_eq!(aggregate(&[-95; 4]), 30);
    }

    #[test]
    fn non_decreasing_in_device_count() {
        for signal in [-95, -80, -60, -45, -30] {
            let mut batch = Vec::new();
            let mut previous = aggregate(&batch);
            for _ in 0..20 {
                batch.push(signal);
                let current = aggregate(&batch);
                assert!(current >= previous, "{current} < {previous} at {signal} dBm");
                previous = current;
            }
        }
    }

    #[test]
    fn non_decreasing_in_each_signal() {
        let base = [-80, -70, -65, -50];
        for index in 0..base.len() {
            let mut batch = base;
            if let Some(slot) = batch.get_mut(index) {
                *slot = -95;
            }
            let mut previous = aggregate(&batch);
            for signal in -95..=-30 {
                if let Some(slot) = batch.get_mut(index) {
                    *slot = signal;
                }
                let current = aggregate(&batch);
                assert!(current >= previous);
                previous = current;
            }
        }
    }

    #[test]
    fn never_exceeds_ceiling() {
        assert!(aggregate(&[-10; 50]) <= 100);
    }
}
