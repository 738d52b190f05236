//! Enumeration types for the EMF chaos simulation.
//!
//! Zones, threat levels, device classes, the four-state pattern, the
//! six-valued reflection tag, and the small status enums carried on the
//! published snapshot.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

// ---------------------------------------------------------------------------
// Zones
// ---------------------------------------------------------------------------

/// Directional/distance bucket a device is classified into.
///
/// `Center` is a distance-only override. The four compass zones split the
/// bearing circle into 90 degree sectors. South reaches further than the
/// other compass zones (25 m instead of 15 m) for earlier warning along the
/// extended axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum Zone {
    /// Core protection zone, within 5 m regardless of bearing.
    Center,
    /// Bearing in `[315, 45)` degrees.
    North,
    /// Bearing in `[45, 135)` degrees.
    East,
    /// Bearing in `[135, 225)` degrees. Extended to 25 m.
    South,
    /// Bearing in `[225, 315)` degrees.
    West,
}

impl Zone {
    /// All zones in declaration order.
    pub const ALL: [Self; 5] = [
        Self::Center,
        Self::North,
        Self::East,
        Self::South,
        Self::West,
    ];

    /// Outer radius of the zone in meters.
    pub const fn radius_bound_m(self) -> f64 {
        match self {
            Self::Center => 5.0,
            Self::North | Self::East | Self::West => 15.0,
            Self::South => 25.0,
        }
    }

    /// Threat level attached to every device detected in this zone.
    pub const fn threat_level(self) -> ThreatLevel {
        match self {
            Self::Center => ThreatLevel::Critical,
            Self::South => ThreatLevel::High,
            Self::North | Self::East | Self::West => ThreatLevel::Medium,
        }
    }

    /// Upper-case label used in log output.
    pub const fn label(self) -> &'static str {
        match self {
            Self::Center => "CENTER",
            Self::North => "NORTH",
            Self::East => "EAST",
            Self::South => "SOUTH",
            Self::West => "WEST",
        }
    }
}

/// Threat level derived from a device's zone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum ThreatLevel {
    /// Standard-range compass zone.
    Medium,
    /// Extended south axis.
    High,
    /// Center zone.
    Critical,
}

// ---------------------------------------------------------------------------
// Devices
// ---------------------------------------------------------------------------

/// Coarse device class label attached to a synthetic detection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum DeviceType {
    /// Apple handset.
    Iphone,
    /// Generic Android handset.
    Android,
    /// Samsung handset.
    Samsung,
    /// Google Pixel handset.
    GooglePixel,
    /// Unclassified device.
    Unknown,
}

impl DeviceType {
    /// All device types in declaration order.
    pub const ALL: [Self; 5] = [
        Self::Iphone,
        Self::Android,
        Self::Samsung,
        Self::GooglePixel,
        Self::Unknown,
    ];

    /// Human-readable name.
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::Iphone => "iPhone",
            Self::Android => "Android",
            Self::Samsung => "Samsung",
            Self::GooglePixel => "Google Pixel",
            Self::Unknown => "Unknown Device",
        }
    }
}

// ---------------------------------------------------------------------------
// Pattern state machine
// ---------------------------------------------------------------------------

/// Primary, intensity-driven classification of overall activity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum PatternType {
    /// Intensity in `[0, 25)`.
    AmbientMonitoring,
    /// Intensity in `[25, 50)`.
    DynamicChaos,
    /// Intensity in `[50, 75)`.
    QuadReflection,
    /// Intensity in `[75, 100]`.
    SwissEnergyDisruption,
}

impl PatternType {
    /// Snake-case name, matching the serialized form.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::AmbientMonitoring => "ambient_monitoring",
            Self::DynamicChaos => "dynamic_chaos",
            Self::QuadReflection => "quad_reflection",
            Self::SwissEnergyDisruption => "swiss_energy_disruption",
        }
    }

    /// Position of the pattern in the ordered state list.
    pub const fn ordinal(self) -> u8 {
        match self {
            Self::AmbientMonitoring => 0,
            Self::DynamicChaos => 1,
            Self::QuadReflection => 2,
            Self::SwissEnergyDisruption => 3,
        }
    }
}

/// Secondary six-valued tag applied per device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum ReflectionType {
    /// Dynamic reflection.
    Dynamic,
    /// Quad reflection.
    Quad,
    /// Swiss energy reflection.
    SwissEnergy,
    /// Ambient reflection.
    Ambient,
    /// Chaos burst reflection.
    ChaosBurst,
    /// Mirror reflection.
    Mirror,
}

impl ReflectionType {
    /// All reflection types in declaration order.
    pub const ALL: [Self; 6] = [
        Self::Dynamic,
        Self::Quad,
        Self::SwissEnergy,
        Self::Ambient,
        Self::ChaosBurst,
        Self::Mirror,
    ];

    /// Human-readable name.
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::Dynamic => "Dynamic",
            Self::Quad => "Quad",
            Self::SwissEnergy => "Swiss Energy",
            Self::Ambient => "Ambient",
            Self::ChaosBurst => "Chaos Burst",
            Self::Mirror => "Mirror",
        }
    }
}

// ---------------------------------------------------------------------------
// Amplification / environment / history
// ---------------------------------------------------------------------------

/// How detected carriers are used to extend range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum AmplificationMode {
    /// No devices in the batch.
    None,
    /// Fewer than two carriers.
    CarrierModulation,
    /// Two or three carriers.
    HarmonicReflection,
    /// Four or more carriers.
    ConstructiveInterference,
}

impl AmplificationMode {
    /// Title-case name for summaries.
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::None => "None",
            Self::CarrierModulation => "Carrier Modulation",
            Self::HarmonicReflection => "Harmonic Reflection",
            Self::ConstructiveInterference => "Constructive Interference",
        }
    }
}

/// Where the environmental factor applied to a tick came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum EnvironmentStatus {
    /// A fresh environmental snapshot was applied.
    Live,
    /// The latest snapshot is older than the staleness window; neutral used.
    Stale,
    /// No snapshot has ever arrived; neutral used.
    Missing,
    /// Environmental adjustment is disabled by configuration.
    Disabled,
}

/// Direction of intensity change relative to the previous tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum IntensityTrend {
    /// Intensity went up (devices moving closer).
    Rising,
    /// Intensity went down (devices moving away).
    Falling,
    /// Unchanged, or no previous tick to compare against.
    Steady,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn south_is_the_only_extended_compass_zone() {
        assert!((Zone::South.radius_bound_m() - 25.0).abs() < f64::EPSILON);
        for zone in [Zone::North, Zone::East, Zone::West] {
            assert!((zone.radius_bound_m() - 15.0).abs() < f64::EPSILON);
        }
        assert!((Zone::Center.radius_bound_m() - 5.0).abs() < f64::EPSILON);
    }

    #[test]
    fn pattern_serializes_snake_case() {
        let json = serde_json::to_string(&PatternType::SwissEnergyDisruption).ok();
        assert_eq!(json.as_deref(), Some("\"swiss_energy_disruption\""));
    }

    #[test]
    fn threat_levels_follow_zones() {
        assert_eq!(Zone::Center.threat_level(), ThreatLevel::Critical);
        assert_eq!(Zone::South.threat_level(), ThreatLevel::High);
        assert_eq!(Zone::West.threat_level(), ThreatLevel::Medium);
    }
}
