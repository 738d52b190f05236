//! Scheduler binary for the EMF chaos simulation.
//!
//! Wires the tick scheduler to its collaborators: the simulated weather
//! feed, the status server and Ctrl-C shutdown.
//!
//! # Startup Sequence
//!
//! 1. Load configuration (`EMF_CHAOS_CONFIG`, else `emf-chaos-config.yaml`,
//!    else defaults) and validate it
//! 2. Initialize structured logging (tracing)
//! 3. Build the scheduler state and control
//! 4. Start the status server
//! 5. Start the simulated weather feed
//! 6. Install the Ctrl-C handler
//! 7. Run the scheduler loop
//! 8. Log the result

mod error;
mod log_callback;
mod weather_feed;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use emf_chaos_core::config::ChaosConfig;
use emf_chaos_core::control::SchedulerControl;
use emf_chaos_core::runner;
use emf_chaos_core::tick::SchedulerState;
use emf_chaos_core::weather::SimulatedWeather;
use emf_chaos_observer::{AppState, ServerConfig};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use crate::error::EngineError;
use crate::log_callback::LogCallback;

/// Default configuration file, relative to the working directory.
const DEFAULT_CONFIG_PATH: &str = "emf-chaos-config.yaml";

/// Application entry point.
///
/// # Errors
///
/// Returns an error if configuration is invalid or the scheduler fails.
#[tokio::main]
async fn main() -> Result<(), EngineError> {
    // 1. Load configuration.
    let config = load_config()?;
    config.validate()?;

    // 2. Initialize structured logging.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.logging.level)),
        )
        .with_target(true)
        .init();

    info!("emf-chaos-engine starting");
    info!(
        min_devices = config.generator.min_devices,
        max_devices = config.generator.max_devices,
        seed = config.generator.seed,
        tick_interval_ms = config.scheduler.tick_interval_ms,
        max_ticks = config.scheduler.max_ticks,
        carrier_threshold_dbm = config.amplification.carrier_threshold_dbm,
        "Configuration loaded"
    );

    // 3. Build scheduler state and control.
    let (mut state, feed) = SchedulerState::new(&config)?;
    let control = Arc::new(SchedulerControl::new(
        config.scheduler.tick_interval_ms,
        config.scheduler.max_ticks,
    ));
    let base_range_m = state.estimator().base_range_m();
    info!(
        base_range_m,
        max_range_m = state.estimator().max_range_m(),
        "Amplification estimator ready"
    );

    // 4. Start the status server.
    if config.observer.enabled {
        let server_config = ServerConfig::from(&config.observer);
        let app_state = Arc::new(AppState::with_control(
            Arc::clone(&control),
            base_range_m,
        ));
        tokio::spawn(async move {
            if let Err(e) = emf_chaos_observer::start_server(&server_config, app_state).await {
                error!(error = %EngineError::from(e), "Observer server stopped");
            }
        });
    } else {
        info!("Observer disabled");
    }

    // 5. Start the simulated weather feed.
    if config.environment.enabled && config.environment.simulated_weather {
        let weather = config
            .generator
            .seed
            .map_or_else(SimulatedWeather::from_entropy, SimulatedWeather::new);
        let _weather_handle = weather_feed::spawn_weather_feed(
            weather,
            feed,
            Duration::from_secs(config.environment.refresh_interval_secs),
            Arc::clone(&control),
        );
    } else {
        info!(
            enabled = config.environment.enabled,
            "No weather feed, rf_factor stays neutral"
        );
    }

    // 6. Stop cleanly on Ctrl-C.
    {
        let control = Arc::clone(&control);
        tokio::spawn(async move {
            match tokio::signal::ctrl_c().await {
                Ok(()) => {
                    info!("Ctrl-C received, stopping scheduler");
                    control.request_stop();
                }
                Err(e) => warn!(error = %e, "Failed to install Ctrl-C handler"),
            }
        });
    }

    // 7. Run the scheduler.
    let mut callback = LogCallback::new(base_range_m);
    let result = runner::run_scheduler(&mut state, &control, &mut callback).await?;

    // 8. Log results.
    runner::log_scheduler_end(&result);
    info!(
        end_reason = ?result.end_reason,
        total_ticks = result.total_ticks,
        "emf-chaos-engine shutdown complete"
    );

    Ok(())
}

/// Load configuration from `EMF_CHAOS_CONFIG` or the default path.
///
/// A missing default file means defaults; a missing explicit file is an
/// error.
fn load_config() -> Result<ChaosConfig, EngineError> {
    if let Some(path) = std::env::var_os("EMF_CHAOS_CONFIG").map(PathBuf::from) {
        return Ok(ChaosConfig::from_file(&path)?);
    }
    let path = PathBuf::from(DEFAULT_CONFIG_PATH);
    if path.exists() {
        Ok(ChaosConfig::from_file(&path)?)
    } else {
        let mut config = ChaosConfig::default();
        config.apply_env_overrides();
        Ok(config)
    }
}
