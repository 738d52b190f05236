//! Environmental adjustment of the amplification.
//!
//! An external weather collaborator pushes [`EnvironmentalSnapshot`]s into
//! an [`EnvironmentFeed`] at a coarser cadence than the tick loop. The
//! [`EnvironmentalAdjuster`] owned by the scheduler reads the most recent
//! one each tick and derives a multiplicative `rf_factor` plus the bearing
//! where wind contributes the most enhancement.
//!
//! # Factor
//!
//! Three contributions are blended:
//!
//! - **wind**: turbulence `t = min(speed / 10, 1)`, overall `1 + 0.1 t`.
//!   For each of eight 45 degree sectors, `1 + cos(d) t 0.15` when the wind
//!   aligns with the sector and `1 + cos(d) t 0.08` when it opposes it.
//! - **humidity**: `h = humidity / 100`, overall
//!   `(1 - 0.06 h) * (1 + 0.08 h)`.
//! - **ducting**: pressure, temperature and humidity gradients combined
//!   into a strength in `[0, 1]`, extension `1 + 0.35 strength`.
//!
//! `rf_factor = 0.3 wind + 0.4 humidity + 0.3 ducting`, clamped to
//! `[RF_FACTOR_MIN, RF_FACTOR_MAX]`.
//!
//! # Fallback
//!
//! With no snapshot ever received, or one older than the staleness window,
//! the adjuster silently returns a neutral factor of 1.0. This is the
//! steady state of a pure-simulation deployment.

use std::collections::BTreeMap;

use chrono::{DateTime, Duration, Utc};
use emf_chaos_types::{
    EnvironmentStatus, EnvironmentalInfluence, EnvironmentalReading, EnvironmentalSnapshot,
};
use tokio::sync::watch;
use tracing::debug;

use crate::config::EnvironmentConfig;

/// Lower bound of the blended factor.
pub const RF_FACTOR_MIN: f64 = 0.9;

/// Upper bound of the blended factor.
pub const RF_FACTOR_MAX: f64 = 1.1;

/// Standard atmospheric pressure in hectopascals.
const STANDARD_PRESSURE_HPA: f64 = 1013.25;

/// Ducting strength above which ducting is reported active.
const DUCTING_ACTIVE_THRESHOLD: f64 = 0.6;

/// Width of one directional sector, in degrees.
const SECTOR_STEP_DEG: u16 = 45;

/// Errors raised for malformed environmental input.
#[derive(Debug, thiserror::Error)]
pub enum EnvironmentError {
    /// A parameter is NaN or infinite.
    #[error("environmental field {field} is not a finite number")]
    NonFinite {
        /// The offending field.
        field: &'static str,
    },

    /// A parameter is finite but outside its physical domain.
    #[error("environmental field {field} out of domain: {value}")]
    OutOfDomain {
        /// The offending field.
        field: &'static str,
        /// The rejected value.
        value: f64,
    },
}

/// Producer half: lets an external collaborator publish the latest
/// environmental snapshot.
#[derive(Debug, Clone)]
pub struct EnvironmentFeed {
    tx: std::sync::Arc<watch::Sender<Option<EnvironmentalSnapshot>>>,
}

impl EnvironmentFeed {
    /// Replace the latest snapshot.
    pub fn submit(&self, snapshot: EnvironmentalSnapshot) {
        debug!(
            wind_speed_mps = snapshot.wind_speed_mps,
            wind_direction_deg = snapshot.wind_direction_deg,
            humidity_pct = snapshot.humidity_pct,
            "Environmental snapshot received"
        );
        self.tx.send_replace(Some(snapshot));
    }
}

/// Consumer half, owned by the scheduler.
#[derive(Debug)]
pub struct EnvironmentalAdjuster {
    rx: watch::Receiver<Option<EnvironmentalSnapshot>>,
    enabled: bool,
    staleness: Duration,
}

impl EnvironmentalAdjuster {
    /// Create an adjuster and the feed that supplies it.
    pub fn new(config: &EnvironmentConfig) -> (Self, EnvironmentFeed) {
        let (tx, rx) = watch::channel(None);
        let staleness_secs = i64::try_from(config.staleness_secs).unwrap_or(i64::MAX);
        let adjuster = Self {
            rx,
            enabled: config.enabled,
            staleness: Duration::try_seconds(staleness_secs).unwrap_or(Duration::MAX),
        };
        (adjuster, EnvironmentFeed { tx: std::sync::Arc::new(tx) })
    }

    /// Compute the influence to apply to a tick captured at `now`.
    ///
    /// # Errors
    ///
    /// Returns [`EnvironmentError`] if the latest snapshot is malformed.
    /// The caller treats this as a transient per-tick anomaly.
    pub fn influence(&self, now: DateTime<Utc>) -> Result<EnvironmentalInfluence, EnvironmentError> {
        if !self.enabled {
            return Ok(EnvironmentalInfluence::neutral(EnvironmentStatus::Disabled));
        }
        let latest = self.rx.borrow().clone();
        let Some(snapshot) = latest else {
            return Ok(EnvironmentalInfluence::neutral(EnvironmentStatus::Missing));
        };
        if now.signed_duration_since(snapshot.observed_at) > self.staleness {
            debug!(observed_at = %snapshot.observed_at, "Environmental snapshot stale, using neutral factor");
            return Ok(EnvironmentalInfluence::neutral(EnvironmentStatus::Stale));
        }
        evaluate(snapshot)
    }
}

/// Derive the live influence of one snapshot.
///
/// # Errors
///
/// Returns [`EnvironmentError`] if any field is non-finite or outside its
/// physical domain.
pub fn evaluate(snapshot: EnvironmentalSnapshot) -> Result<EnvironmentalInfluence, EnvironmentError> {
    validate(&snapshot)?;

    let turbulence = turbulence_factor(snapshot.wind_speed_mps);
    let sector_factors = sector_factors(snapshot.wind_direction_deg, turbulence);
    let wind_impact = 0.1_f64.mul_add(turbulence, 1.0);

    let humidity = snapshot.humidity_pct / 100.0;
    let temp_factor = 1.0 + (snapshot.temperature_c - 20.0) / 100.0;
    let multipath = 0.08_f64.mul_add(humidity, 1.0);
    let range = (-0.06_f64).mul_add(humidity, 1.0);
    let humidity_impact = range * multipath;

    let ducting_strength = ducting_strength(&snapshot);
    let ducting_extension = 0.35_f64.mul_add(ducting_strength, 1.0);

    let blended = 0.3_f64.mul_add(
        wind_impact,
        0.4_f64.mul_add(humidity_impact, 0.3 * ducting_extension),
    );
    let rf_factor = blended.clamp(RF_FACTOR_MIN, RF_FACTOR_MAX);

    let (best, worst) = extreme_sectors(&sector_factors);

    let reading = EnvironmentalReading {
        turbulence_factor: turbulence,
        sector_factors,
        wind_impact,
        absorption_2_4ghz: humidity * temp_factor * 0.05,
        absorption_5ghz: humidity * temp_factor * 0.12,
        humidity_impact,
        ducting_strength,
        ducting_extension,
        ducting_active: ducting_strength > DUCTING_ACTIVE_THRESHOLD,
        worst_direction_deg: worst,
    };

    Ok(EnvironmentalInfluence {
        rf_factor,
        optimal_direction_deg: Some(best),
        status: EnvironmentStatus::Live,
        source: Some(snapshot),
        reading: Some(reading),
    })
}

fn validate(snapshot: &EnvironmentalSnapshot) -> Result<(), EnvironmentError> {
    let fields = [
        ("wind_speed_mps", snapshot.wind_speed_mps),
        ("wind_direction_deg", snapshot.wind_direction_deg),
        ("humidity_pct", snapshot.humidity_pct),
        ("temperature_c", snapshot.temperature_c),
        ("pressure_hpa", snapshot.pressure_hpa),
    ];
    for (field, value) in fields {
        if !value.is_finite() {
            return Err(EnvironmentError::NonFinite { field });
        }
    }
    if snapshot.wind_speed_mps < 0.0 {
        return Err(EnvironmentError::OutOfDomain {
            field: "wind_speed_mps",
            value: snapshot.wind_speed_mps,
        });
    }
    if !(0.0..=100.0).contains(&snapshot.humidity_pct) {
        return Err(EnvironmentError::OutOfDomain {
            field: "humidity_pct",
            value: snapshot.humidity_pct,
        });
    }
    if snapshot.pressure_hpa <= 0.0 {
        return Err(EnvironmentError::OutOfDomain {
            field: "pressure_hpa",
            value: snapshot.pressure_hpa,
        });
    }
    Ok(())
}

/// Wind turbulence normalized to `[0, 1]`.
pub fn turbulence_factor(wind_speed_mps: f64) -> f64 {
    (wind_speed_mps / 10.0).clamp(0.0, 1.0)
}

/// Enhancement factor for each 45 degree sector.
pub fn sector_factors(wind_direction_deg: f64, turbulence: f64) -> BTreeMap<u16, f64> {
    let wind_rad = wind_direction_deg.to_radians();
    (0..360_u16)
        .step_by(usize::from(SECTOR_STEP_DEG))
        .map(|sector| {
            let alignment = (wind_rad - f64::from(sector).to_radians()).cos();
            let weight = if alignment > 0.0 { 0.15 } else { 0.08 };
            (sector, (alignment * turbulence).mul_add(weight, 1.0))
        })
        .collect()
}

/// Best and worst sector bearings. Ties go to the lowest bearing.
fn extreme_sectors(factors: &BTreeMap<u16, f64>) -> (u16, u16) {
    let mut best: Option<(u16, f64)> = None;
    let mut worst: Option<(u16, f64)> = None;
    for (&sector, &factor) in factors {
        if best.is_none_or(|(_, top)| factor > top) {
            best = Some((sector, factor));
        }
        if worst.is_none_or(|(_, bottom)| factor < bottom) {
            worst = Some((sector, factor));
        }
    }
    (
        best.map_or(0, |(sector, _)| sector),
        worst.map_or(0, |(sector, _)| sector),
    )
}

/// Atmospheric ducting strength in `[0, 1]`.
pub fn ducting_strength(snapshot: &EnvironmentalSnapshot) -> f64 {
    let pressure_gradient = (snapshot.pressure_hpa - STANDARD_PRESSURE_HPA) / STANDARD_PRESSURE_HPA;
    let temp_factor = 1.0 - (snapshot.temperature_c - 18.0).abs() / 50.0;
    let humidity_gradient = (snapshot.humidity_pct - 60.0) / 100.0;
    let conditions = pressure_gradient.abs().mul_add(
        0.4,
        temp_factor.mul_add(0.3, humidity_gradient.abs() * 0.3),
    );
    conditions.clamp(0.0, 1.0)
}
