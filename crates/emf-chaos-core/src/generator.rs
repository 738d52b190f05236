//! Synthetic device generation.
//!
//! Each tick the generator draws a device count from the configured range,
//! then for every device picks a zone (weighted toward the extended south
//! axis), a bearing inside that zone's sector, a distance inside that zone's
//! radius bound, and a signal strength from the zone's signal domain.
//!
//! All randomness comes from the caller-supplied [`Rng`], so a seeded source
//! reproduces exact output sequences.
//!
//! | Zone   | Weight | Distance (m) | Signal (dBm) |
//! |--------|--------|--------------|--------------|
//! | Center | 20     | 1.0 -- 5.0   | -45 -- -30   |
//! | North  | 15     | 5.1 -- 15.0  | -75 -- -50   |
//! | East   | 15     | 5.1 -- 15.0  | -75 -- -50   |
//! | South  | 35     | 5.1 -- 25.0  | -85 -- -60   |
//! | West   | 15     | 5.1 -- 15.0  | -75 -- -50   |

use std::collections::BTreeSet;

use emf_chaos_types::{
    DeviceRecord, DeviceType, ReflectionType, SyntheticId, ThreatLevel, Zone,
};
use rand::Rng;

use crate::config::{ConfigError, GeneratorConfig};
use crate::zone::{self, CENTER_RADIUS_M};

/// Closest distance any device is generated at.
const MIN_DISTANCE_M: f64 = 1.0;

/// Closest distance for a compass-zone device. Keeps it outside the center
/// override after rounding.
const MIN_OUTER_DISTANCE_M: f64 = 5.1;

/// Zone selection weights. Sum is 100.
const ZONE_WEIGHTS: [(Zone, u32); 5] = [
    (Zone::Center, 20),
    (Zone::North, 15),
    (Zone::East, 15),
    (Zone::South, 35),
    (Zone::West, 15),
];

/// A generated device before a reflection tag is assigned.
#[derive(Debug, Clone, PartialEq)]
pub struct DeviceSample {
    /// Opaque identifier, unique within the batch.
    pub synthetic_id: SyntheticId,
    /// Device class label.
    pub device_type: DeviceType,
    /// Signal strength in dBm.
    pub signal_strength_dbm: i32,
    /// Distance in meters, rounded to 0.1 m.
    pub distance_m: f64,
    /// Bearing in degrees, `[0, 360)`.
    pub bearing_deg: f64,
    /// Zone the position classifies into.
    pub zone: Zone,
    /// Threat level of that zone.
    pub threat_level: ThreatLevel,
}

impl DeviceSample {
    /// Finish the record with its reflection tag.
    pub fn into_record(self, reflection_type: ReflectionType) -> DeviceRecord {
        DeviceRecord {
            synthetic_id: self.synthetic_id,
            device_type: self.device_type,
            signal_strength_dbm: self.signal_strength_dbm,
            distance_m: self.distance_m,
            bearing_deg: self.bearing_deg,
            zone: self.zone,
            threat_level: self.threat_level,
            reflection_type,
        }
    }
}

/// Produces a fresh batch of synthetic devices per tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeviceGenerator {
    min_devices: u32,
    max_devices: u32,
}

impl DeviceGenerator {
    /// Create a generator from configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] if `min_devices > max_devices`.
    /// The range is never silently clamped.
    pub fn new(config: &GeneratorConfig) -> Result<Self, ConfigError> {
        Self::with_range(config.min_devices, config.max_devices)
    }

    /// Create a generator for an explicit inclusive count range.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] if `min_devices > max_devices`.
    pub fn with_range(min_devices: u32, max_devices: u32) -> Result<Self, ConfigError> {
        if min_devices > max_devices {
            return Err(ConfigError::Invalid {
                reason: format!(
                    "device count minimum ({min_devices}) exceeds maximum ({max_devices})"
                ),
            });
        }
        Ok(Self {
            min_devices,
            max_devices,
        })
    }

    /// Generate one tick's batch.
    pub fn generate<R: Rng + ?Sized>(&self, rng: &mut R) -> Vec<DeviceSample> {
        let count = rng.random_range(self.min_devices..=self.max_devices);
        let capacity = usize::try_from(count).unwrap_or(0);
        let mut seen: BTreeSet<SyntheticId> = BTreeSet::new();
        let mut devices = Vec::with_capacity(capacity);

        for _ in 0..count {
            let synthetic_id = unique_id(rng, &mut seen);
            devices.push(generate_device(rng, synthetic_id));
        }

        devices
    }
}

/// Draw identifiers until one is not yet used in this batch.
fn unique_id<R: Rng + ?Sized>(rng: &mut R, seen: &mut BTreeSet<SyntheticId>) -> SyntheticId {
    loop {
        let id = SyntheticId::from_random_bytes(rng.random::<[u8; 16]>());
        if seen.insert(id) {
            return id;
        }
    }
}

fn generate_device<R: Rng + ?Sized>(rng: &mut R, synthetic_id: SyntheticId) -> DeviceSample {
    let target = select_zone(rng.random_range(0..total_zone_weight()));
    let bearing_deg = draw_bearing(rng, target);
    let distance_m = draw_distance(rng, target);
    let signal_strength_dbm = draw_signal(rng, target);
    let assessment = zone::assess(distance_m, bearing_deg);
    let device_type = DeviceType::ALL
        .get(rng.random_range(0..DeviceType::ALL.len()))
        .copied()
        .unwrap_or(DeviceType::Unknown);

    DeviceSample {
        synthetic_id,
        device_type,
        signal_strength_dbm,
        distance_m,
        bearing_deg,
        zone: assessment.zone,
        threat_level: assessment.threat_level,
    }
}

fn total_zone_weight() -> u32 {
    ZONE_WEIGHTS
        .iter()
        .fold(0_u32, |acc, &(_, weight)| acc.saturating_add(weight))
}

/// Map a value in `[0, total_zone_weight())` to a zone.
fn select_zone(random_value: u32) -> Zone {
    let mut cumulative: u32 = 0;
    for &(zone, weight) in &ZONE_WEIGHTS {
        cumulative = cumulative.saturating_add(weight);
        if random_value < cumulative {
            return zone;
        }
    }
    Zone::South
}

fn draw_bearing<R: Rng + ?Sized>(rng: &mut R, zone: Zone) -> f64 {
    match zone::sector(zone) {
        Some((start, end)) => zone::normalize_bearing(rng.random_range(start..end)),
        None => rng.random_range(0.0..360.0),
    }
}

fn draw_distance<R: Rng + ?Sized>(rng: &mut R, zone: Zone) -> f64 {
    let (low, high) = match zone {
        Zone::Center => (MIN_DISTANCE_M, CENTER_RADIUS_M),
        _ => (MIN_OUTER_DISTANCE_M, zone.radius_bound_m()),
    };
    let raw: f64 = rng.random_range(low..=high);
    // Rounding stays inside [low, high] because both ends are on the grid.
    (raw * 10.0).round() / 10.0
}

fn draw_signal<R: Rng + ?Sized>(rng: &mut R, zone: Zone) -> i32 {
    match zone {
        Zone::Center => rng.random_range(-45..=-30),
        Zone::South => rng.random_range(-85..=-60),
        Zone::North | Zone::East | Zone::West => rng.random_range(-75..=-50),
    }
}
