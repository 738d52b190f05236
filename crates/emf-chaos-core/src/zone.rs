//! Zone classification from distance and bearing.
//!
//! Bearing buckets: North `[315, 45)`, East `[45, 135)`, South `[135, 225)`,
//! West `[225, 315)`. Any device within the center radius is `Center`
//! regardless of bearing.

use emf_chaos_types::{ThreatLevel, Zone};

/// Radius of the center override, in meters.
pub const CENTER_RADIUS_M: f64 = 5.0;

/// Half-open bearing sector `[start, end)` of a compass zone, in degrees.
///
/// North wraps through zero, so its sector is reported as `[315, 405)`.
pub const fn sector(zone: Zone) -> Option<(f64, f64)> {
    match zone {
        Zone::Center => None,
        Zone::North => Some((315.0, 405.0)),
        Zone::East => Some((45.0, 135.0)),
        Zone::South => Some((135.0, 225.0)),
        Zone::West => Some((225.0, 315.0)),
    }
}

/// Normalize a bearing into `[0, 360)`.
pub fn normalize_bearing(bearing_deg: f64) -> f64 {
    let normalized = bearing_deg.rem_euclid(360.0);
    // rem_euclid can round up to exactly 360.0 for tiny negative inputs.
    if normalized >= 360.0 { 0.0 } else { normalized }
}

/// Classify a device into a zone.
///
/// Pure function of its inputs. The center override is applied first.
pub fn classify(distance_m: f64, bearing_deg: f64) -> Zone {
    if distance_m <= CENTER_RADIUS_M {
        return Zone::Center;
    }
    let bearing = normalize_bearing(bearing_deg);
    if !(45.0..315.0).contains(&bearing) {
        Zone::North
    } else if bearing < 135.0 {
        Zone::East
    } else if bearing < 225.0 {
        Zone::South
    } else {
        Zone::West
    }
}

/// Whether a distance lies inside the zone's radius bound.
pub const fn within_bound(zone: Zone, distance_m: f64) -> bool {
    distance_m <= zone.radius_bound_m()
}

/// Full classification result for one position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ZoneAssessment {
    /// The zone the position falls into.
    pub zone: Zone,
    /// Threat level of that zone.
    pub threat_level: ThreatLevel,
    /// Whether the distance is inside the zone's radius bound.
    pub in_range: bool,
}

/// Classify a position and report its threat radius status.
pub fn assess(distance_m: f64, bearing_deg: f64) -> ZoneAssessment {
    let zone = classify(distance_m, bearing_deg);
    ZoneAssessment {
        zone,
        threat_level: zone.threat_level(),
        in_range: within_bound(zone, distance_m),
    }
}
