//! Layered runtime configuration.
//!
//! Settings are resolved from, in increasing priority:
//!
//! 1. built-in defaults
//! 2. a TOML file (`tempd.toml` unless `--config` names another one)
//! 3. environment variables prefixed with `TEMPD`, nested with `__`
//!    (e.g. `TEMPD_LISTEN__PORT=4000`)
//!
//! The binary applies its CLI overrides on top of the result.
//!
//! ```toml
//! default_name = "unknown"
//!
//! [listen]
//! host = "127.0.0.1"
//! port = 31338
//!
//! [process]
//! path = "/usr/local/bin/onewire-probe"
//!
//! [sensors]
//! "2846b25204000054" = "wohnzimmer"
//!
//! [filter]
//! upper_bound = 84.0
//! counted_reason_codes = [4]
//!
//! [flow]
//! history_size = 2
//! report_interval_secs = 5.0
//! ```

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use config::{Config, Environment, File};
use serde::Deserialize;

use crate::error::ServiceError;

/// Default configuration file, read only if it exists.
pub const DEFAULT_CONFIG_PATH: &str = "tempd.toml";

/// Reason code the 1-wire probe reports for a scratchpad CRC mismatch.
pub const CRC_ERROR_REASON: u32 = 0x04;

/// Root configuration structure.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct Settings {
    pub listen: ListenConfig,
    pub process: ProcessConfig,
    /// Sensor id to display name.
    pub sensors: HashMap<String, String>,
    /// Name for sensors missing from `sensors`. When unset, the raw id is used.
    pub default_name: Option<String>,
    pub filter: FilterConfig,
    pub flow: FlowConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ListenConfig {
    pub host: String,
    pub port: u16,
    pub write_timeout_ms: u64,
}

impl Default for ListenConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 31338,
            write_timeout_ms: 5_000,
        }
    }
}

impl ListenConfig {
    /// `host:port` string suitable for binding.
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn write_timeout(&self) -> Duration {
        Duration::from_millis(self.write_timeout_ms)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ProcessConfig {
    pub path: PathBuf,
    pub args: Vec<String>,
    /// Log the probe's stderr at debug level instead of discarding it.
    pub forward_stderr: bool,
}

impl Default for ProcessConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("onewire-probe"),
            args: Vec::new(),
            forward_stderr: false,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    /// Readings strictly above this are implausible and filtered.
    pub upper_bound: f64,
    /// Readings strictly below this are filtered, if set.
    pub lower_bound: Option<f64>,
    /// Decode-failure reason codes that count toward the filter ratio.
    pub counted_reason_codes: Vec<u32>,
    /// Maximum distance from the window median kept for the mean, if set.
    pub median_deviation: Option<f64>,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            upper_bound: 84.0,
            lower_bound: None,
            counted_reason_codes: vec![CRC_ERROR_REASON],
            median_deviation: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FlowConfig {
    /// Number of past outputs kept for flow estimation.
    pub history_size: usize,
    /// Assumed seconds between two reports; flow is scaled to a per-minute rate.
    pub report_interval_secs: f64,
}

impl Default for FlowConfig {
    fn default() -> Self {
        Self {
            history_size: 2,
            report_interval_secs: 5.0,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl Settings {
    /// Load settings from an optional file plus the environment.
    ///
    /// An explicitly named file must exist; the default one is optional.
    pub fn load(path: Option<&Path>) -> Result<Self, ServiceError> {
        let file = match path {
            Some(path) => File::from(path).required(true),
            None => File::with_name(DEFAULT_CONFIG_PATH).required(false),
        };

        let settings: Settings = Config::builder()
            .add_source(file)
            .add_source(
                Environment::with_prefix("TEMPD")
                    .prefix_separator("_")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("process.args")
                    .with_list_parse_key("filter.counted_reason_codes")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;

        settings.validate()?;
        Ok(settings)
    }

    /// Reject settings the pipeline cannot work with.
    pub fn validate(&self) -> Result<(), ServiceError> {
        let invalid = |msg: String| Err(ServiceError::InvalidConfig(msg));

        if self.flow.history_size < 2 {
            return invalid(format!(
                "flow.history_size must be at least 2, got {}",
                self.flow.history_size
            ));
        }
        let interval = self.flow.report_interval_secs;
        if !interval.is_finite() || interval <= 0.0 {
            return invalid(format!(
                "flow.report_interval_secs must be positive, got {interval}"
            ));
        }
        if !self.filter.upper_bound.is_finite() {
            return invalid("filter.upper_bound must be finite".to_string());
        }
        if let Some(lower) = self.filter.lower_bound {
            if !lower.is_finite() || lower > self.filter.upper_bound {
                return invalid(format!(
                    "filter.lower_bound {lower} must be finite and not above upper_bound {}",
                    self.filter.upper_bound
                ));
            }
        }
        if let Some(deviation) = self.filter.median_deviation {
            if deviation.is_nan() || deviation < 0.0 {
                return invalid(format!(
                    "filter.median_deviation must be non-negative, got {deviation}"
                ));
            }
        }
        if self.process.path.as_os_str().is_empty() {
            return invalid("process.path must not be empty".to_string());
        }
        Ok(())
    }
}
