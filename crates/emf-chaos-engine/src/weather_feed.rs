//! Background task feeding simulated weather to the adjuster.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use emf_chaos_core::control::SchedulerControl;
use emf_chaos_core::environment::EnvironmentFeed;
use emf_chaos_core::weather::SimulatedWeather;
use tokio::task::JoinHandle;
use tracing::{debug, info};

/// Sample `weather` every `refresh` and submit it to `feed` until the
/// scheduler stops. The first sample is submitted immediately.
pub fn spawn_weather_feed(
    mut weather: SimulatedWeather,
    feed: EnvironmentFeed,
    refresh: Duration,
    control: Arc<SchedulerControl>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        info!(refresh_secs = refresh.as_secs(), "Simulated weather feed started");
        let mut interval = tokio::time::interval(refresh);
        loop {
            tokio::select! {
                _ = interval.tick() => {
                    let sample = weather.sample(Utc::now());
                    debug!(
                        wind_speed_mps = sample.wind_speed_mps,
                        humidity_pct = sample.humidity_pct,
                        "Simulated weather sampled"
                    );
                    feed.submit(sample);
                }
                () = control.stopped() => {
                    debug!("Simulated weather feed stopping");
                    return;
                }
            }
        }
    })
}
