//! Configuration loading and typed config structures for the EMF chaos
//! simulation.
//!
//! The canonical configuration lives in `emf-chaos-config.yaml` at the
//! project root. Every field has a default, so an empty file (or no file at
//! all) yields a runnable configuration. [`ChaosConfig::validate`] enforces
//! the start-up invariants; an invalid configuration is fatal and the
//! scheduler refuses to start.

use std::path::Path;

use serde::Deserialize;

/// Lowest carrier threshold accepted, in dBm.
const MIN_CARRIER_THRESHOLD_DBM: i32 = -120;

/// Highest carrier threshold accepted, in dBm.
const MAX_CARRIER_THRESHOLD_DBM: i32 = 0;

/// Errors that can occur when loading or validating configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },

    /// A parameter is outside its valid domain.
    #[error("invalid configuration: {reason}")]
    Invalid {
        /// Explanation of what is wrong with the configuration.
        reason: String,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

impl ConfigError {
    fn invalid(reason: impl Into<String>) -> Self {
        Self::Invalid {
            reason: reason.into(),
        }
    }
}

/// Top-level simulation configuration.
///
/// Mirrors the structure of `emf-chaos-config.yaml`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ChaosConfig {
    /// Device synthesis parameters.
    #[serde(default)]
    pub generator: GeneratorConfig,

    /// Tick cadence and bounds.
    #[serde(default)]
    pub scheduler: SchedulerConfig,

    /// Carrier threshold and range limits.
    #[serde(default)]
    pub amplification: AmplificationConfig,

    /// Environmental adjustment settings.
    #[serde(default)]
    pub environment: EnvironmentConfig,

    /// Status API settings.
    #[serde(default)]
    pub observer: ObserverConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl ChaosConfig {
    /// Load configuration from a YAML file at the given path.
    ///
    /// Environment variables override YAML values:
    /// - `EMF_CHAOS_SEED` overrides `generator.seed`
    /// - `EMF_CHAOS_OBSERVER_PORT` overrides `observer.port`
    ///
    /// The result is not validated; call [`validate`](Self::validate).
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, or
    /// [`ConfigError::Yaml`] if the content is not valid YAML.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse configuration from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        // An empty document deserializes to unit, not to a mapping.
        let mut config: Self = if yaml.trim().is_empty() {
            Self::default()
        } else {
            serde_yml::from_str(yaml)?
        };
        config.apply_env_overrides();
        Ok(config)
    }

    /// Override selected values with environment variables when set.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var("EMF_CHAOS_SEED") {
            if let Ok(seed) = val.parse::<u64>() {
                self.generator.seed = Some(seed);
            }
        }
        if let Ok(val) = std::env::var("EMF_CHAOS_OBSERVER_PORT") {
            if let Ok(port) = val.parse::<u16>() {
                self.observer.port = port;
            }
        }
    }

    /// Check every start-up invariant.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] naming the first violated rule.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.generator.validate()?;
        self.scheduler.validate()?;
        self.amplification.validate()?;
        self.environment.validate()
    }
}

/// Device synthesis parameters.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct GeneratorConfig {
    /// Minimum devices per tick (inclusive).
    #[serde(default = "default_min_devices")]
    pub min_devices: u32,

    /// Maximum devices per tick (inclusive).
    #[serde(default = "default_max_devices")]
    pub max_devices: u32,

    /// Seed for the random source. `None` seeds from the OS.
    #[serde(default)]
    pub seed: Option<u64>,
}

impl GeneratorConfig {
    /// Check that the device-count range is not inverted.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] when `min_devices > max_devices`.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.min_devices > self.max_devices {
            return Err(ConfigError::invalid(format!(
                "generator.min_devices ({}) exceeds generator.max_devices ({})",
                self.min_devices, self.max_devices
            )));
        }
        Ok(())
    }
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            min_devices: default_min_devices(),
            max_devices: default_max_devices(),
            seed: None,
        }
    }
}

/// Tick cadence and run bounds.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SchedulerConfig {
    /// Real-time milliseconds between ticks.
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,

    /// Stop after this many ticks (0 = unlimited).
    #[serde(default)]
    pub max_ticks: u64,

    /// Number of recent ticks kept for trend reporting.
    #[serde(default = "default_history_len")]
    pub history_len: usize,
}

impl SchedulerConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        if self.tick_interval_ms == 0 {
            return Err(ConfigError::invalid(
                "scheduler.tick_interval_ms must be at least 1",
            ));
        }
        if self.history_len == 0 {
            return Err(ConfigError::invalid(
                "scheduler.history_len must be at least 1",
            ));
        }
        Ok(())
    }
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: default_tick_interval_ms(),
            max_ticks: 0,
            history_len: default_history_len(),
        }
    }
}

/// Carrier threshold and range limits.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AmplificationConfig {
    /// Devices strictly above this signal strength count as carriers.
    #[serde(default = "default_carrier_threshold_dbm")]
    pub carrier_threshold_dbm: i32,

    /// Detection range with no carriers, in meters.
    #[serde(default = "default_base_range_m")]
    pub base_range_m: f64,

    /// Hard ceiling on the extended range, in meters.
    #[serde(default = "default_max_range_m")]
    pub max_range_m: f64,
}

impl AmplificationConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        if !(MIN_CARRIER_THRESHOLD_DBM..=MAX_CARRIER_THRESHOLD_DBM)
            .contains(&self.carrier_threshold_dbm)
        {
            return Err(ConfigError::invalid(format!(
                "amplification.carrier_threshold_dbm ({}) must be within \
                 [{MIN_CARRIER_THRESHOLD_DBM}, {MAX_CARRIER_THRESHOLD_DBM}] dBm",
                self.carrier_threshold_dbm
            )));
        }
        if !self.base_range_m.is_finite() || self.base_range_m <= 0.0 {
            return Err(ConfigError::invalid(
                "amplification.base_range_m must be a positive number",
            ));
        }
        if !self.max_range_m.is_finite() || self.max_range_m < self.base_range_m {
            return Err(ConfigError::invalid(
                "amplification.max_range_m must be at least amplification.base_range_m",
            ));
        }
        Ok(())
    }
}

impl Default for AmplificationConfig {
    fn default() -> Self {
        Self {
            carrier_threshold_dbm: default_carrier_threshold_dbm(),
            base_range_m: default_base_range_m(),
            max_range_m: default_max_range_m(),
        }
    }
}

/// Environmental adjustment settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct EnvironmentConfig {
    /// Whether environmental snapshots adjust the amplification at all.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Whether the engine feeds simulated weather to the adjuster.
    #[serde(default = "default_true")]
    pub simulated_weather: bool,

    /// Seconds between simulated weather updates.
    #[serde(default = "default_refresh_interval_secs")]
    pub refresh_interval_secs: u64,

    /// Snapshots older than this many seconds are ignored.
    #[serde(default = "default_staleness_secs")]
    pub staleness_secs: u64,
}

impl EnvironmentConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        if self.staleness_secs == 0 {
            return Err(ConfigError::invalid(
                "environment.staleness_secs must be at least 1",
            ));
        }
        if self.refresh_interval_secs == 0 {
            return Err(ConfigError::invalid(
                "environment.refresh_interval_secs must be at least 1",
            ));
        }
        Ok(())
    }
}

impl Default for EnvironmentConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            simulated_weather: true,
            refresh_interval_secs: default_refresh_interval_secs(),
            staleness_secs: default_staleness_secs(),
        }
    }
}

/// Status API settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ObserverConfig {
    /// Whether the status API is served.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Bind address.
    #[serde(default = "default_observer_host")]
    pub host: String,

    /// TCP port.
    #[serde(default = "default_observer_port")]
    pub port: u16,
}

impl Default for ObserverConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            host: default_observer_host(),
            port: default_observer_port(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

const fn default_min_devices() -> u32 {
    3
}

const fn default_max_devices() -> u32 {
    12
}

const fn default_tick_interval_ms() -> u64 {
    500
}

const fn default_history_len() -> usize {
    10
}

const fn default_carrier_threshold_dbm() -> i32 {
    -60
}

const fn default_base_range_m() -> f64 {
    25.0
}

const fn default_max_range_m() -> f64 {
    100.0
}

const fn default_refresh_interval_secs() -> u64 {
    600
}

const fn default_staleness_secs() -> u64 {
    900
}

fn default_observer_host() -> String {
    "0.0.0.0".to_owned()
}

const fn default_observer_port() -> u16 {
    8080
}

fn default_log_level() -> String {
    "info".to_owned()
}

const fn default_true() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = ChaosConfig::default();
        assert_eq!(config.generator.min_devices, 3);
        assert_eq!(config.generator.max_devices, 12);
        assert_eq!(config.scheduler.tick_interval_ms, 500);
        assert_eq!(config.amplification.carrier_threshold_dbm, -60);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn parse_full_yaml() {
        let yaml = r#"
generator:
  min_devices: 1
  max_devices: 4
  seed: 99

scheduler:
  tick_interval_ms: 250
  max_ticks: 20
  history_len: 5

amplification:
  carrier_threshold_dbm: -55
  base_range_m: 30.0
  max_range_m: 90.0

environment:
  enabled: false
  simulated_weather: false
  refresh_interval_secs: 60
  staleness_secs: 120

observer:
  enabled: false
  host: "127.0.0.1"
  port: 9090

logging:
  level: "debug"
"#;

        let config = ChaosConfig::parse(yaml);
        assert!(config.is_ok());
        let config = config.ok().unwrap_or_default();

        assert_eq!(config.generator.max_devices, 4);
        assert_eq!(config.scheduler.max_ticks, 20);
        assert_eq!(config.amplification.carrier_threshold_dbm, -55);
        assert!(!config.environment.enabled);
        assert_eq!(config.observer.host, "127.0.0.1");
        assert_eq!(config.logging.level, "debug");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn parse_minimal_yaml() {
        let yaml = "scheduler:\n  tick_interval_ms: 1000\n";
        let config = ChaosConfig::parse(yaml);
        assert!(config.is_ok());
        let config = config.ok().unwrap_or_default();

        assert_eq!(config.scheduler.tick_interval_ms, 1000);
        assert_eq!(config.generator.min_devices, 3);
        assert_eq!(config.scheduler.history_len, 10);
    }

    #[test]
    fn parse_empty_yaml() {
        assert!(ChaosConfig::parse("").is_ok());
    }

    #[test]
    fn inverted_device_range_is_rejected() {
        let mut config = ChaosConfig::default();
        config.generator.min_devices = 9;
        config.generator.max_devices = 2;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Invalid { .. })
        ));
    }

    #[test]
    fn zero_tick_interval_is_rejected() {
        let mut config = ChaosConfig::default();
        config.scheduler.tick_interval_ms = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn positive_carrier_threshold_is_rejected() {
        let mut config = ChaosConfig::default();
        config.amplification.carrier_threshold_dbm = 10;
        assert!(config.validate().is_err());
    }

    #[test]
    fn max_range_below_base_is_rejected() {
        let mut config = ChaosConfig::default();
        config.amplification.max_range_m = 10.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn non_finite_base_range_is_rejected() {
        let mut config = ChaosConfig::default();
        config.amplification.base_range_m = f64::NAN;
        assert!(config.validate().is_err());
    }

    #[test]
    fn load_project_config_file() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR"))
            .join("..")
            .join("..")
            .join("emf-chaos-config.yaml");
        if path.exists() {
            let config = ChaosConfig::from_file(&path);
            assert!(config.is_ok(), "Failed to load project config: {config:?}");
        }
    }
}
