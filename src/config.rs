// src/config.rs
//
// Defaults, then an optional JSON file, then TENDERFEED_* environment
// variables. CLI flags are applied on top by the binary.

use serde::Deserialize;
use std::{env, fs, path::Path, time::Duration};
use tracing::debug;

use crate::error::{Result, TenderError};

pub const DEFAULT_FEED_URL: &str =
    "https://canadabuys.canada.ca/opendata/pub/openTenderNotice-ouvertAvisAppelOffres.csv";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub feed_url: String,
    pub request_timeout_secs: u64,
    pub max_retries: u32,
    pub initial_backoff_ms: u64,
    pub debounce_ms: u64,
    pub export_file: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            feed_url: DEFAULT_FEED_URL.to_string(),
            request_timeout_secs: 30,
            max_retries: 2,
            initial_backoff_ms: 500,
            debounce_ms: 300,
            export_file: "filtered_results.csv".to_string(),
        }
    }
}

impl Config {
    /// Full load: defaults, optional file, environment.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let cfg = match path {
            Some(p) => Self::from_file(p)?,
            None => Self::default(),
        };
        cfg.with_env_overrides(|key| env::var(key).ok())
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).map_err(|e| TenderError::io(path, e))?;
        let cfg: Config = serde_json::from_str(&text)
            .map_err(|e| TenderError::Config(format!("parsing {}: {}", path.display(), e)))?;
        debug!(path = %path.display(), "loaded config file");
        cfg.validate()
    }

    /// Apply `TENDERFEED_*` overrides read through `lookup`.
    pub fn with_env_overrides<F>(mut self, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup("TENDERFEED_URL") {
            self.feed_url = url;
        }
        if let Some(v) = lookup("TENDERFEED_TIMEOUT_SECS") {
            self.request_timeout_secs = parse_num("TENDERFEED_TIMEOUT_SECS", &v)?;
        }
        if let Some(v) = lookup("TENDERFEED_DEBOUNCE_MS") {
            self.debounce_ms = parse_num("TENDERFEED_DEBOUNCE_MS", &v)?;
        }
        if let Some(v) = lookup("TENDERFEED_MAX_RETRIES") {
            self.max_retries = parse_num("TENDERFEED_MAX_RETRIES", &v)?;
        }
        self.validate()
    }

    pub fn validate(self) -> Result<Self> {
        if self.feed_url.trim().is_empty() {
            return Err(TenderError::Config("feed_url must not be empty".into()));
        }
        if self.request_timeout_secs == 0 {
            return Err(TenderError::Config(
                "request_timeout_secs must be greater than zero".into(),
            ));
        }
        if self.export_file.trim().is_empty() {
            return Err(TenderError::Config("export_file must not be empty".into()));
        }
        Ok(self)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

fn parse_num<T: std::str::FromStr>(key: &str, value: &str) -> Result<T> {
    value
        .trim()
        .parse()
        .map_err(|_| TenderError::Config(format!("{} is not a valid number: {:?}", key, value)))
}
