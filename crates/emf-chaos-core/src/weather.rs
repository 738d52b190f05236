//! Simulated coastal weather.
//!
//! Stands in for a live weather service in pure-simulation deployments.
//! The engine samples it at the environment refresh cadence and pushes the
//! result into the [`EnvironmentFeed`](crate::environment::EnvironmentFeed).
//!
//! | Parameter   | Range            |
//! |-------------|------------------|
//! | Wind speed  | 1.5 - 6.5 m/s    |
//! | Direction   | 220 - 300 deg    |
//! | Humidity    | 55 - 85 %        |
//! | Temperature | 18 - 28 C        |
//! | Pressure    | 1012 - 1018 hPa  |

use chrono::{DateTime, Utc};
use emf_chaos_types::EnvironmentalSnapshot;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

/// Prevailing wind direction, in degrees.
const PREVAILING_WIND_DEG: f64 = 260.0;

/// Maximum deviation from the prevailing direction, in degrees.
const WIND_VARIATION_DEG: f64 = 40.0;

/// Seedable weather generator.
#[derive(Debug, Clone)]
pub struct SimulatedWeather {
    rng: SmallRng,
}

impl SimulatedWeather {
    /// Create a generator with a fixed seed for reproducible runs.
    pub fn new(seed: u64) -> Self {
        Self {
            rng: SmallRng::seed_from_u64(seed),
        }
    }

    /// Create a generator seeded from the operating system.
    pub fn from_entropy() -> Self {
        Self {
            rng: SmallRng::from_os_rng(),
        }
    }

    /// Draw the next set of conditions, observed at `now`.
    pub fn sample(&mut self, now: DateTime<Utc>) -> EnvironmentalSnapshot {
        let offset = self.rng.random_range(-WIND_VARIATION_DEG..=WIND_VARIATION_DEG);
        EnvironmentalSnapshot {
            wind_speed_mps: round_to(self.rng.random_range(1.5..=6.5), 10.0),
            wind_direction_deg: round_to((PREVAILING_WIND_DEG + offset).rem_euclid(360.0), 1.0),
            humidity_pct: round_to(self.rng.random_range(55.0..=85.0), 1.0),
            temperature_c: round_to(self.rng.random_range(18.0..=28.0), 10.0),
            pressure_hpa: round_to(self.rng.random_range(1012.0..=1018.0), 10.0),
            observed_at: now,
            simulated: true,
        }
    }
}

fn round_to(value: f64, scale: f64) -> f64 {
    (value * scale).round() / scale
}
