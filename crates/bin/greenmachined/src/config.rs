//! Configuration loading: TOML file with environment variable overrides.
//!
//! Looks for `greenmachine.toml` in the working directory. Every field has a
//! sensible default so the file is optional. Environment variables take
//! precedence over file values.

use std::time::Duration;

use serde::Deserialize;

use greenmachine_adapter_simulated::{DEFAULT_CONFLICT_PROBABILITY, SimulationConfig};
use greenmachine_adapter_tips::{DEFAULT_BASE_URL, DEFAULT_MODEL, DEFAULT_TIMEOUT, TipClientConfig};
use greenmachine_app::refresh_loop::{DEFAULT_SWEEP_INTERVAL, RefreshLoopConfig};
use greenmachine_domain::decision::AutomationDecisionEngine;
use greenmachine_domain::notification::DEFAULT_TTL_MS;
use greenmachine_domain::points::GREEN_RUN_BONUS;

/// Shortest accepted refresh period, in seconds.
pub const MIN_REFRESH_SECS: u64 = 15;
/// Longest accepted refresh period, in seconds.
pub const MAX_REFRESH_SECS: u64 = 30;

/// Top-level configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// HTTP server settings.
    pub server: ServerConfig,
    /// Logging settings.
    pub logging: LoggingConfig,
    /// Simulated provider knobs.
    pub simulation: SimulationSection,
    pub automation: AutomationConfig,
    pub notifications: NotificationsConfig,
    /// Text-generation backend for energy-saving tips.
    pub tips: TipsConfig,
}

/// HTTP listener configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address to bind to (e.g. `0.0.0.0`).
    pub host: String,
    /// TCP port.
    pub port: u16,
}

/// Logging configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive (`RUST_LOG` syntax).
    pub filter: String,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct SimulationSection {
    /// Artificial delay of every provider call.
    pub latency_ms: u64,
    pub conflict_probability: f64,
    pub fetch_failure_probability: f64,
    /// Fixed RNG seed; random when absent.
    pub seed: Option<u64>,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct AutomationConfig {
    /// Seconds between two intensity refreshes.
    pub refresh_interval_secs: u64,
    /// Points awarded for a low-carbon run.
    pub bonus_points: u64,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct NotificationsConfig {
    /// How long a toast stays visible.
    pub ttl_ms: u64,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct TipsConfig {
    /// API key; tips fall back to a canned text when absent.
    pub api_key: Option<String>,
    pub model: String,
    pub base_url: String,
    pub timeout_secs: u64,
}

impl Config {
    /// Load configuration from `greenmachine.toml` (if present) then apply
    /// environment-variable overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML file exists but is malformed, or if the
    /// resulting configuration is invalid.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = Self::from_file("greenmachine.toml")?;
        config.apply_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    fn from_file(path: &str) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content).map_err(ConfigError::Parse),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(err) => Err(ConfigError::Io(err)),
        }
    }

    /// Apply overrides read through `var`. Unparseable numbers are ignored.
    fn apply_overrides(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(val) = var("GREENMACHINE_HOST") {
            self.server.host = val;
        }
        if let Some(port) = var("GREENMACHINE_PORT").and_then(|val| val.parse().ok()) {
            self.server.port = port;
        }
        if let Some(val) = var("GREENMACHINE_BIND")
            && let Some((host, port)) = val.rsplit_once(':')
        {
            self.server.host = host.to_string();
            if let Ok(port) = port.parse() {
                self.server.port = port;
            }
        }
        if let Some(val) = var("GREENMACHINE_LOG") {
            self.logging.filter = val;
        }
        if let Some(val) = var("RUST_LOG") {
            self.logging.filter = val;
        }
        if let Some(secs) = var("GREENMACHINE_REFRESH_SECS").and_then(|val| val.parse().ok()) {
            self.automation.refresh_interval_secs = secs;
        }
        if let Some(ms) = var("GREENMACHINE_LATENCY_MS").and_then(|val| val.parse().ok()) {
            self.simulation.latency_ms = ms;
        }
        if let Some(p) = var("GREENMACHINE_CONFLICT_PROBABILITY").and_then(|val| val.parse().ok()) {
            self.simulation.conflict_probability = p;
        }
        if let Some(seed) = var("GREENMACHINE_SEED").and_then(|val| val.parse().ok()) {
            self.simulation.seed = Some(seed);
        }
        if let Some(key) = var("GREENMACHINE_TIP_API_KEY") {
            self.tips.api_key = Some(key);
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::Validation("port must be non-zero".to_string()));
        }
        let refresh = self.automation.refresh_interval_secs;
        if !(MIN_REFRESH_SECS..=MAX_REFRESH_SECS).contains(&refresh) {
            return Err(ConfigError::Validation(format!(
                "refresh interval must be between {MIN_REFRESH_SECS} and {MAX_REFRESH_SECS} seconds, got {refresh}"
            )));
        }
        for (name, p) in [
            ("conflict_probability", self.simulation.conflict_probability),
            (
                "fetch_failure_probability",
                self.simulation.fetch_failure_probability,
            ),
        ] {
            if !(0.0..=1.0).contains(&p) {
                return Err(ConfigError::Validation(format!(
                    "{name} must be within [0, 1], got {p}"
                )));
            }
        }
        if self.notifications.ttl_ms == 0 {
            return Err(ConfigError::Validation(
                "notification ttl must be non-zero".to_string(),
            ));
        }
        Ok(())
    }

    /// Return the `host:port` bind address.
    #[must_use]
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    #[must_use]
    pub fn simulation(&self) -> SimulationConfig {
        SimulationConfig {
            latency: Duration::from_millis(self.simulation.latency_ms),
            conflict_probability: self.simulation.conflict_probability,
            fetch_failure_probability: self.simulation.fetch_failure_probability,
            seed: self.simulation.seed,
        }
    }

    #[must_use]
    pub fn refresh_loop(&self) -> RefreshLoopConfig {
        RefreshLoopConfig {
            refresh_interval: Duration::from_secs(self.automation.refresh_interval_secs),
            sweep_interval: DEFAULT_SWEEP_INTERVAL,
        }
    }

    #[must_use]
    pub fn engine(&self) -> AutomationDecisionEngine {
        AutomationDecisionEngine::with_bonus(self.automation.bonus_points)
    }

    #[must_use]
    pub fn notification_ttl(&self) -> Duration {
        Duration::from_millis(self.notifications.ttl_ms)
    }

    #[must_use]
    pub fn tip_client(&self) -> TipClientConfig {
        TipClientConfig {
            base_url: self.tips.base_url.clone(),
            model: self.tips.model.clone(),
            api_key: self.tips.api_key.clone(),
            timeout: Duration::from_secs(self.tips.timeout_secs),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "greenmachined=info,greenmachine=info,tower_http=debug".to_string(),
        }
    }
}

impl Default for SimulationSection {
    fn default() -> Self {
        Self {
            latency_ms: 300,
            conflict_probability: DEFAULT_CONFLICT_PROBABILITY,
            fetch_failure_probability: 0.0,
            seed: None,
        }
    }
}

impl Default for AutomationConfig {
    fn default() -> Self {
        Self {
            refresh_interval_secs: MAX_REFRESH_SECS,
            bonus_points: GREEN_RUN_BONUS,
        }
    }
}

impl Default for NotificationsConfig {
    fn default() -> Self {
        Self {
            ttl_ms: DEFAULT_TTL_MS,
        }
    }
}

impl Default for TipsConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT.as_secs(),
        }
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// TOML parse failure.
    #[error("failed to parse config file")]
    Parse(#[from] toml::de::Error),
    /// File I/O failure.
    #[error("failed to read config file")]
    Io(#[from] std::io::Error),
    /// Semantic validation failure.
    #[error("invalid configuration: {0}")]
    Validation(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn overrides(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn should_produce_sensible_defaults() {
        let config = Config::default();
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.automation.refresh_interval_secs, 30);
        assert_eq!(config.automation.bonus_points, 10);
        assert_eq!(config.simulation.latency_ms, 300);
        assert_eq!(config.notifications.ttl_ms, 5_000);
        assert!(config.tips.api_key.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn should_parse_minimal_toml() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.server.port, 3000);
    }

    #[test]
    fn should_parse_full_toml() {
        let toml = "
            [server]
            host = '127.0.0.1'
            port = 9090

            [logging]
            filter = 'debug'

            [simulation]
            latency_ms = 0
            conflict_probability = 0.0
            fetch_failure_probability = 0.1
            seed = 42

            [automation]
            refresh_interval_secs = 15
            bonus_points = 25

            [notifications]
            ttl_ms = 1000

            [tips]
            api_key = 'secret'
            model = 'other-model'
            base_url = 'http://localhost:9000'
            timeout_secs = 3
        ";
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.bind_addr(), "127.0.0.1:9090");
        assert_eq!(config.logging.filter, "debug");
        assert_eq!(config.simulation.seed, Some(42));
        assert_eq!(config.refresh_loop().refresh_interval, Duration::from_secs(15));
        assert_eq!(config.engine().bonus(), 25);
        assert_eq!(config.notification_ttl(), Duration::from_secs(1));
        let tips = config.tip_client();
        assert_eq!(tips.api_key.as_deref(), Some("secret"));
        assert_eq!(tips.model, "other-model");
        assert_eq!(tips.timeout, Duration::from_secs(3));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn should_parse_partial_toml_with_defaults() {
        let toml = "
            [server]
            port = 8080
        ";
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.automation.refresh_interval_secs, 30);
    }

    #[test]
    fn should_return_default_when_file_not_found() {
        let config = Config::from_file("nonexistent.toml").unwrap();
        assert_eq!(config.server.port, 3000);
    }

    #[test]
    fn should_report_parse_error_for_invalid_toml() {
        let result: Result<Config, _> = toml::from_str("invalid {{{");
        assert!(result.is_err());
    }

    #[test]
    fn should_reject_zero_port() {
        let mut config = Config::default();
        config.server.port = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn should_reject_refresh_interval_outside_bounds() {
        for secs in [0, 14, 31, 60] {
            let mut config = Config::default();
            config.automation.refresh_interval_secs = secs;
            assert!(config.validate().is_err(), "{secs}");
        }
        for secs in [15, 20, 30] {
            let mut config = Config::default();
            config.automation.refresh_interval_secs = secs;
            assert!(config.validate().is_ok(), "{secs}");
        }
    }

    #[test]
    fn should_reject_probability_outside_unit_range() {
        let mut config = Config::default();
        config.simulation.conflict_probability = 1.5;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.simulation.fetch_failure_probability = -0.1;
        assert!(config.validate().is_err());
    }

    #[test]
    fn should_reject_zero_notification_ttl() {
        let mut config = Config::default();
        config.notifications.ttl_ms = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn should_apply_environment_overrides() {
        let mut config = Config::default();

        config.apply_overrides(overrides(&[
            ("GREENMACHINE_BIND", "127.0.0.1:8081"),
            ("GREENMACHINE_LOG", "warn"),
            ("GREENMACHINE_REFRESH_SECS", "20"),
            ("GREENMACHINE_LATENCY_MS", "0"),
            ("GREENMACHINE_CONFLICT_PROBABILITY", "0"),
            ("GREENMACHINE_SEED", "7"),
            ("GREENMACHINE_TIP_API_KEY", "secret"),
        ]));

        assert_eq!(config.bind_addr(), "127.0.0.1:8081");
        assert_eq!(config.logging.filter, "warn");
        assert_eq!(config.automation.refresh_interval_secs, 20);
        assert_eq!(config.simulation(), SimulationConfig::instant(7));
        assert_eq!(config.tips.api_key.as_deref(), Some("secret"));
    }

    #[test]
    fn should_prefer_rust_log_over_greenmachine_log() {
        let mut config = Config::default();

        config.apply_overrides(overrides(&[
            ("GREENMACHINE_LOG", "warn"),
            ("RUST_LOG", "trace"),
        ]));

        assert_eq!(config.logging.filter, "trace");
    }

    #[test]
    fn should_ignore_unparseable_numbers() {
        let mut config = Config::default();

        config.apply_overrides(overrides(&[
            ("GREENMACHINE_PORT", "not-a-port"),
            ("GREENMACHINE_REFRESH_SECS", "soon"),
        ]));

        assert_eq!(config.server.port, 3000);
        assert_eq!(config.automation.refresh_interval_secs, 30);
    }
}
