//! Client configuration: YAML file, environment overrides, defaults.
//!
//! Every field except `host` and `api_key` has a default, so the smallest
//! usable file is two lines. Environment variables win over the file.

use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const ENV_HOST: &str = "CVCLIENT_HOST";
pub const ENV_API_KEY: &str = "CVCLIENT_API_KEY";
pub const ENV_VERIFY_TLS: &str = "CVCLIENT_VERIFY_TLS";
pub const ENV_DEBUG: &str = "CVCLIENT_DEBUG";
pub const ENV_RETRY_BACKOFF_MS: &str = "CVCLIENT_RETRY_BACKOFF_MS";
pub const ENV_RETRY_MAX: &str = "CVCLIENT_RETRY_MAX";
pub const ENV_DEADLINE_MS: &str = "CVCLIENT_DEADLINE_MS";
pub const ENV_TIMEOUT_MS: &str = "CVCLIENT_TIMEOUT_MS";

/// Error types for configuration loading.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("Failed to parse config YAML: {0}")]
    YamlParse(#[from] serde_yml::Error),
    #[error("Missing required setting: {0}")]
    Missing(&'static str),
    #[error("Invalid host '{0}': expected an http or https URL")]
    InvalidHost(String),
    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: &'static str, value: String },
    #[error("At least one request type must be configured")]
    NoRequestTypes,
}

/// Fixed-interval retry settings for the request engine.
///
/// With neither `max_attempts` nor `deadline_ms` set, a request retries until
/// it succeeds or the client is cancelled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryPolicy {
    pub backoff_ms: u64,
    pub max_attempts: Option<u32>,
    pub deadline_ms: Option<u64>,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            backoff_ms: 5000,
            max_attempts: None,
            deadline_ms: None,
        }
    }
}

impl RetryPolicy {
    pub fn backoff(&self) -> Duration {
        Duration::from_millis(self.backoff_ms)
    }

    pub fn deadline(&self) -> Option<Duration> {
        self.deadline_ms.map(Duration::from_millis)
    }
}

/// Server paths for the three endpoints the client talks to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Endpoints {
    pub status: String,
    pub alerts: String,
    pub charts: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            status: "/client/status".to_string(),
            alerts: "/client/alerts".to_string(),
            charts: "/client/charts".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    pub host: String,
    pub api_key: String,
    /// Off by default: the service is deployed with self-signed certificates.
    #[serde(default)]
    pub verify_tls: bool,
    /// Promotes transaction chatter from debug to info.
    #[serde(default)]
    pub debug: bool,
    #[serde(default)]
    pub retry: RetryPolicy,
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
    #[serde(default)]
    pub endpoints: Endpoints,
    /// Request type name -> the solver name the server expects.
    #[serde(default = "default_request_types")]
    pub request_types: BTreeMap<String, String>,
}

fn default_request_timeout_ms() -> u64 {
    30_000
}

fn default_request_types() -> BTreeMap<String, String> {
    BTreeMap::from([("aaa".to_string(), "aaa_floating".to_string())])
}

/// Shape of the YAML file: everything optional so env can fill the gaps.
#[derive(Debug, Default, Deserialize)]
struct ConfigFile {
    host: Option<String>,
    api_key: Option<String>,
    verify_tls: Option<bool>,
    debug: Option<bool>,
    retry: Option<RetryPolicy>,
    request_timeout_ms: Option<u64>,
    endpoints: Option<Endpoints>,
    request_types: Option<BTreeMap<String, String>>,
}

impl ClientConfig {
    /// Creates a config with defaults for everything but host and key.
    pub fn new(host: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            api_key: api_key.into(),
            verify_tls: false,
            debug: false,
            retry: RetryPolicy::default(),
            request_timeout_ms: default_request_timeout_ms(),
            endpoints: Endpoints::default(),
            request_types: default_request_types(),
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    /// Loads from an optional YAML file, then applies process environment overrides.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let yaml = match path {
            Some(p) => Some(std::fs::read_to_string(p).map_err(|source| ConfigError::Io {
                path: p.display().to_string(),
                source,
            })?),
            None => None,
        };
        Self::resolve(yaml.as_deref(), |key| std::env::var(key).ok())
    }

    /// Parses a complete config from YAML without consulting the environment.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        Self::resolve(Some(yaml), |_| None)
    }

    /// Merges YAML content and an environment lookup into a validated config.
    pub fn resolve<F>(yaml: Option<&str>, env: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let file: ConfigFile = match yaml {
            Some(content) if !content.trim().is_empty() => serde_yml::from_str(content)?,
            _ => ConfigFile::default(),
        };

        let host = env(ENV_HOST)
            .or(file.host)
            .ok_or(ConfigError::Missing("host"))?;
        let api_key = env(ENV_API_KEY)
            .or(file.api_key)
            .ok_or(ConfigError::Missing("api_key"))?;

        let mut config = Self::new(host, api_key);
        config.verify_tls = file.verify_tls.unwrap_or(false);
        config.debug = file.debug.unwrap_or(false);
        if let Some(retry) = file.retry {
            config.retry = retry;
        }
        if let Some(ms) = file.request_timeout_ms {
            config.request_timeout_ms = ms;
        }
        if let Some(endpoints) = file.endpoints {
            config.endpoints = endpoints;
        }
        if let Some(types) = file.request_types {
            config.request_types = types;
        }

        if let Some(v) = env_parse(&env, ENV_VERIFY_TLS, parse_bool)? {
            config.verify_tls = v;
        }
        if let Some(v) = env_parse(&env, ENV_DEBUG, parse_bool)? {
            config.debug = v;
        }
        if let Some(v) = env_parse(&env, ENV_RETRY_BACKOFF_MS, |s| s.parse().ok())? {
            config.retry.backoff_ms = v;
        }
        if let Some(v) = env_parse(&env, ENV_RETRY_MAX, |s| s.parse().ok())? {
            config.retry.max_attempts = Some(v);
        }
        if let Some(v) = env_parse(&env, ENV_DEADLINE_MS, |s| s.parse().ok())? {
            config.retry.deadline_ms = Some(v);
        }
        if let Some(v) = env_parse(&env, ENV_TIMEOUT_MS, |s| s.parse().ok())? {
            config.request_timeout_ms = v;
        }

        config.validate()?;
        Ok(config)
    }

    /// Checks the invariants construction relies on.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let scheme_ok = url::Url::parse(&self.host)
            .map(|u| matches!(u.scheme(), "http" | "https") && u.has_host())
            .unwrap_or(false);
        if !scheme_ok {
            return Err(ConfigError::InvalidHost(self.host.clone()));
        }
        if self.api_key.trim().is_empty() {
            return Err(ConfigError::Missing("api_key"));
        }
        if self.request_types.is_empty() {
            return Err(ConfigError::NoRequestTypes);
        }
        if self.retry.max_attempts == Some(0) {
            return Err(ConfigError::InvalidValue {
                key: "retry.max_attempts",
                value: "0".to_string(),
            });
        }
        // Unbounded retries need a pause between attempts.
        if self.retry.backoff_ms == 0 && self.retry.max_attempts.is_none() {
            return Err(ConfigError::InvalidValue {
                key: "retry.backoff_ms",
                value: "0 (requires retry.max_attempts)".to_string(),
            });
        }
        Ok(())
    }
}

fn env_parse<F, T, P>(env: &F, key: &'static str, parse: P) -> Result<Option<T>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    P: Fn(&str) -> Option<T>,
{
    match env(key) {
        Some(raw) => parse(raw.trim())
            .map(Some)
            .ok_or(ConfigError::InvalidValue { key, value: raw }),
        None => Ok(None),
    }
}

fn parse_bool(s: &str) -> Option<bool> {
    match s.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
