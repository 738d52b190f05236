//! Core data structs: device records, per-tick classification results,
//! amplification and environmental state, and the published snapshot.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::enums::{
    AmplificationMode, DeviceType, EnvironmentStatus, IntensityTrend, PatternType,
    ReflectionType, ThreatLevel, Zone,
};
use crate::ids::SyntheticId;

// ---------------------------------------------------------------------------
// Devices
// ---------------------------------------------------------------------------

/// One synthetic detection, created fresh every tick.
///
/// `distance_m` never exceeds `zone.radius_bound_m()`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct DeviceRecord {
    /// Opaque identifier, unique within the tick.
    pub synthetic_id: SyntheticId,
    /// Device class label.
    pub device_type: DeviceType,
    /// Received signal strength in dBm, roughly `[-95, -30]`.
    pub signal_strength_dbm: i32,
    /// Distance from the observer in meters, roughly `[1.0, 30.0]`.
    pub distance_m: f64,
    /// Bearing from the observer in degrees, `[0, 360)`.
    pub bearing_deg: f64,
    /// Zone the device was classified into.
    pub zone: Zone,
    /// Threat level of the zone.
    pub threat_level: ThreatLevel,
    /// Secondary reflection tag.
    pub reflection_type: ReflectionType,
}

// ---------------------------------------------------------------------------
// Classification
// ---------------------------------------------------------------------------

/// Aggregate per-tick classification result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct ChaosState {
    /// Primary, intensity-driven pattern.
    pub pattern_type: PatternType,
    /// Dominant reflection tag across the batch.
    pub reflection_type: ReflectionType,
    /// Chaos intensity, 0 to 100.
    pub intensity_percent: u8,
    /// Wall-clock capture time.
    pub timestamp: DateTime<Utc>,
}

/// Carrier-based range amplification for one tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct AmplificationState {
    /// Number of devices above the carrier threshold.
    pub carrier_count: u32,
    /// `1.0 + carrier_count * 0.3`.
    pub amplification_factor: f64,
    /// `amplification_factor` scaled by the environmental factor.
    pub adjusted_factor: f64,
    /// Detection range after carriers and environment, clamped at the maximum.
    pub extended_range_m: f64,
    /// `pi * extended_range_m^2`.
    pub coverage_area_sq_m: f64,
    /// Chaos intensity boosted by the amplification factor, capped at 100.
    pub amplified_intensity: u8,
    /// Amplification mode selected from the carrier count.
    pub mode: AmplificationMode,
}

// ---------------------------------------------------------------------------
// Environment
// ---------------------------------------------------------------------------

/// Ambient weather-like parameters supplied by an external collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct EnvironmentalSnapshot {
    /// Wind speed in meters per second.
    pub wind_speed_mps: f64,
    /// Direction the wind is measured at, in degrees.
    pub wind_direction_deg: f64,
    /// Relative humidity, 0 to 100.
    pub humidity_pct: f64,
    /// Air temperature in degrees Celsius.
    pub temperature_c: f64,
    /// Barometric pressure in hectopascals.
    pub pressure_hpa: f64,
    /// When the parameters were observed.
    pub observed_at: DateTime<Utc>,
    /// Whether the parameters came from a simulated source.
    pub simulated: bool,
}

/// Breakdown of how one environmental snapshot affects propagation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct EnvironmentalReading {
    /// Normalized wind turbulence, 0 to 1.
    pub turbulence_factor: f64,
    /// Enhancement factor per 45 degree sector, keyed by sector bearing.
    pub sector_factors: BTreeMap<u16, f64>,
    /// Overall wind contribution.
    pub wind_impact: f64,
    /// Estimated absorption at 2.4 GHz.
    pub absorption_2_4ghz: f64,
    /// Estimated absorption at 5 GHz.
    pub absorption_5ghz: f64,
    /// Overall humidity contribution (range times multipath).
    pub humidity_impact: f64,
    /// Ducting strength, 0 to 1.
    pub ducting_strength: f64,
    /// Range extension from ducting.
    pub ducting_extension: f64,
    /// Whether ducting conditions are favourable.
    pub ducting_active: bool,
    /// Sector bearing with the weakest factor.
    pub worst_direction_deg: u16,
}

/// Environmental influence applied to a tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct EnvironmentalInfluence {
    /// Multiplicative propagation factor near 1.0.
    pub rf_factor: f64,
    /// Sector bearing where wind contributes the most enhancement.
    pub optimal_direction_deg: Option<u16>,
    /// Where the factor came from.
    pub status: EnvironmentStatus,
    /// The snapshot the factor was derived from, when live.
    pub source: Option<EnvironmentalSnapshot>,
    /// Detailed breakdown, when live.
    pub reading: Option<EnvironmentalReading>,
}

impl EnvironmentalInfluence {
    /// Neutral influence (`rf_factor = 1.0`) with the given status.
    pub const fn neutral(status: EnvironmentStatus) -> Self {
        Self {
            rf_factor: 1.0,
            optimal_direction_deg: None,
            status,
            source: None,
            reading: None,
        }
    }
}

// ---------------------------------------------------------------------------
// History / snapshot
// ---------------------------------------------------------------------------

/// Compact record of a past tick kept for trend reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct HistoryEntry {
    /// Tick number.
    pub tick: u64,
    /// Devices generated that tick.
    pub device_count: u32,
    /// Intensity that tick.
    pub intensity_percent: u8,
}

/// Immutable aggregate published once per tick.
///
/// Every field comes from the same tick; consumers never see a mix.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct ChaosSnapshot {
    /// Tick number (1-based).
    pub tick: u64,
    /// Devices generated this tick.
    pub devices: Vec<DeviceRecord>,
    /// Number of devices per zone.
    pub zone_counts: BTreeMap<Zone, u32>,
    /// Classification result.
    pub chaos: ChaosState,
    /// Amplification result.
    pub amplification: AmplificationState,
    /// Environmental influence applied to the amplification.
    pub environment: EnvironmentalInfluence,
    /// Intensity change relative to the previous published tick.
    pub trend: IntensityTrend,
    /// Signed intensity delta relative to the previous published tick.
    pub intensity_delta: i16,
    /// Recent ticks, oldest first, including this one.
    pub history: Vec<HistoryEntry>,
}

impl ChaosSnapshot {
    /// Number of devices in this tick.
    pub fn device_count(&self) -> usize {
        self.devices.len()
    }

    /// Number of devices in the center zone.
    pub fn core_zone_count(&self) -> u32 {
        self.zone_counts.get(&Zone::Center).copied().unwrap_or(0)
    }
}
