//! JSON configuration file

use crate::download::{RetryConfig, Throttle};
use crate::error::ConfigError;
use crate::utils::{format_rate, is_proxy_url, parse_rate_limit};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;
use tracing::{info, warn};

/// Default configuration file name
pub const DEFAULT_CONFIG_FILE: &str = "config.json";

/// Upper bound for any delay setting, in seconds (one day)
pub const MAX_DELAY_SECS: f64 = 86_400.0;

/// Runtime configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Proxy URL passed to the engine (e.g. `socks5://127.0.0.1:1080`)
    pub proxy: Option<String>,
    /// Lower bound of the random pause before each request, in seconds
    pub min_delay: f64,
    /// Upper bound of the random pause before each request, in seconds
    pub max_delay: f64,
    /// Items processed at once; 1 keeps the run strictly sequential
    pub max_workers: usize,
    /// Engine download rate limit (e.g. `5M`); `null` disables it
    pub rate_limit: Option<String>,
    /// Attempts per rendition, including the first
    pub max_retries: u32,
    /// Backoff unit between attempts, in seconds
    pub retry_delay: f64,
    /// Extra engine arguments
    pub engine_args: Vec<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            proxy: None,
            min_delay: 3.0,
            max_delay: 10.0,
            max_workers: 1,
            rate_limit: Some("5M".to_string()),
            max_retries: 3,
            retry_delay: 5.0,
            engine_args: Vec::new(),
        }
    }
}

/// Where the effective configuration came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigSource {
    /// Read from the file
    Loaded,
    /// File was missing and has been created with defaults
    Created,
    /// File could not be used; defaults apply
    Fallback,
}

fn seconds(value: f64) -> Duration {
    if value.is_finite() && value > 0.0 {
        Duration::try_from_secs_f64(value.min(MAX_DELAY_SECS)).unwrap_or(Duration::ZERO)
    } else {
        Duration::ZERO
    }
}

impl AppConfig {
    /// Read and parse a configuration file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Write the configuration as pretty JSON
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content + "\n").map_err(|source| ConfigError::Write {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Load the file, creating it with defaults when missing.
    ///
    /// Never fails: unreadable or invalid files fall back to defaults with a warning.
    pub fn load_or_create(path: &Path) -> (Self, ConfigSource) {
        if !path.exists() {
            let config = Self::default();
            match config.save(path) {
                Ok(()) => info!("Created default config {}", path.display()),
                Err(e) => warn!("Could not create default config: {}", e),
            }
            return (config, ConfigSource::Created);
        }

        match Self::load(path) {
            Ok(config) => {
                info!("Loaded config {}", path.display());
                (config.normalized(), ConfigSource::Loaded)
            }
            Err(e) => {
                warn!("Config read failed, using defaults: {}", e);
                (Self::default(), ConfigSource::Fallback)
            }
        }
    }

    /// Repair values the rest of the program cannot use
    pub fn normalized(mut self) -> Self {
        for (name, value) in [
            ("min_delay", &mut self.min_delay),
            ("max_delay", &mut self.max_delay),
            ("retry_delay", &mut self.retry_delay),
        ] {
            if !value.is_finite() || *value < 0.0 {
                warn!("{} = {} is invalid, using 0", name, value);
                *value = 0.0;
            } else if *value > MAX_DELAY_SECS {
                warn!("{} = {} is too large, using {}", name, value, MAX_DELAY_SECS);
                *value = MAX_DELAY_SECS;
            }
        }

        if self.min_delay > self.max_delay {
            warn!(
                "min_delay ({}) is greater than max_delay ({}), swapping",
                self.min_delay, self.max_delay
            );
            std::mem::swap(&mut self.min_delay, &mut self.max_delay);
        }

        if self.max_workers == 0 {
            warn!("max_workers = 0 is invalid, using 1");
            self.max_workers = 1;
        }

        if self.rate_limit.as_deref().map(str::trim) == Some("") {
            self.rate_limit = None;
        }
        if let Some(rate) = &self.rate_limit {
            if parse_rate_limit(rate).is_none() {
                warn!("rate_limit {:?} is not understood here, passing it to the engine as is", rate);
            }
        }

        if self.proxy.as_deref().map(str::trim) == Some("") {
            self.proxy = None;
        }
        if let Some(proxy) = &self.proxy {
            if !is_proxy_url(proxy) {
                warn!("proxy {:?} does not look like a proxy URL", proxy);
            }
        }

        self
    }

    /// Randomizer built from the delay bounds
    pub fn throttle(&self) -> Throttle {
        Throttle::new(seconds(self.min_delay), seconds(self.max_delay))
    }

    /// Retry policy built from `max_retries` and `retry_delay`
    pub fn retry_config(&self) -> RetryConfig {
        RetryConfig {
            max_attempts: self.max_retries,
            retry_delay: seconds(self.retry_delay),
        }
    }

    /// Human readable rate limit
    pub fn rate_limit_display(&self) -> String {
        match &self.rate_limit {
            None => "unlimited".to_string(),
            Some(rate) => match parse_rate_limit(rate) {
                Some(bps) => format!("{} ({})", rate, format_rate(bps)),
                None => rate.clone(),
            },
        }
    }
}
