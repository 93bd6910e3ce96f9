//! Application-level configuration loading: catalog client, reference cache
//! and default list naming.

use std::{env, fs, io::ErrorKind, path::PathBuf, time::Duration};

use serde::Deserialize;
use tracing::{info, warn};

use crate::catalog::retry::RetryPolicy;

/// Default location on disk where the server looks for the JSON configuration.
const DEFAULT_CONFIG_PATH: &str = "config/app.json";
/// Environment variable that overrides [`DEFAULT_CONFIG_PATH`].
const CONFIG_PATH_ENV: &str = "GAMEBOXD_CONFIG_PATH";
/// Environment variable that overrides the catalog API key from the file.
const API_KEY_ENV: &str = "RAWG_API_KEY";
const DEFAULT_CATALOG_URL: &str = "https://api.rawg.io/api";
const DEFAULT_LIST_NAME: &str = "Reviewed Games";

#[derive(Debug, Clone, PartialEq)]
/// Immutable runtime configuration shared across the application.
pub struct AppConfig {
    /// External catalog endpoint and resilience settings.
    pub catalog: CatalogSettings,
    /// Reference-data cache sizing.
    pub reference_cache: CacheSettings,
    /// Name given to the list created for every new user.
    pub default_list_name: String,
}

/// Connection and retry settings of the catalog client.
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogSettings {
    pub base_url: String,
    pub api_key: Option<String>,
    /// Budget of a single attempt.
    pub timeout: Duration,
    /// Attempts including the first call.
    pub max_attempts: u32,
    pub base_backoff: Duration,
    pub max_backoff: Duration,
    /// Spread applied to each backoff delay, clamped to `[0, 1]`.
    pub jitter: f64,
}

/// TTL and bound of the reference-data cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheSettings {
    pub ttl: Duration,
    pub capacity: usize,
}

impl AppConfig {
    /// Load the application configuration from disk, falling back to built-in defaults.
    pub fn load() -> Self {
        let path = resolve_config_path();
        let mut config = match fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str::<RawConfig>(&contents) {
                Ok(raw) => {
                    info!(path = %path.display(), "loaded configuration file");
                    raw.into()
                }
                Err(err) => {
                    warn!(
                        path = %path.display(),
                        error = %err,
                        "failed to parse config; falling back to defaults"
                    );
                    Self::default()
                }
            },
            Err(err) if err.kind() == ErrorKind::NotFound => {
                info!(
                    path = %path.display(),
                    "config file not found; using built-in defaults"
                );
                Self::default()
            }
            Err(err) => {
                warn!(
                    path = %path.display(),
                    error = %err,
                    "failed to read config; falling back to defaults"
                );
                Self::default()
            }
        };

        if let Some(key) = env::var(API_KEY_ENV).ok().filter(|key| !key.trim().is_empty()) {
            config.catalog.api_key = Some(key);
        }
        if config.catalog.api_key.is_none() {
            warn!("no catalog API key configured; upstream calls may be rejected");
        }
        config
    }
}

impl CatalogSettings {
    /// Retry policy derived from these settings.
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            attempt_timeout: self.timeout,
            max_attempts: self.max_attempts.max(1),
            base_delay: self.base_backoff,
            max_delay: self.max_backoff.max(self.base_backoff),
            jitter: self.jitter.clamp(0.0, 1.0),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        RawConfig::default().into()
    }
}

impl Default for CatalogSettings {
    fn default() -> Self {
        RawCatalog::default().into()
    }
}

impl Default for CacheSettings {
    fn default() -> Self {
        RawCache::default().into()
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
/// JSON representation of the configuration file located at [`DEFAULT_CONFIG_PATH`].
struct RawConfig {
    catalog: RawCatalog,
    reference_cache: RawCache,
    default_list_name: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
/// JSON representation of the `catalog` section.
struct RawCatalog {
    base_url: String,
    api_key: Option<String>,
    timeout_ms: u64,
    max_attempts: u32,
    base_backoff_ms: u64,
    max_backoff_ms: u64,
    jitter: f64,
}

impl Default for RawCatalog {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_CATALOG_URL.to_owned(),
            api_key: None,
            timeout_ms: 10_000,
            max_attempts: 3,
            base_backoff_ms: 2_000,
            max_backoff_ms: 16_000,
            jitter: 0.2,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
/// JSON representation of the `reference_cache` section.
struct RawCache {
    ttl_secs: u64,
    capacity: usize,
}

impl Default for RawCache {
    fn default() -> Self {
        Self {
            ttl_secs: 30 * 60,
            capacity: 256,
        }
    }
}

impl From<RawConfig> for AppConfig {
    fn from(value: RawConfig) -> Self {
        let default_list_name = value
            .default_list_name
            .map(|name| name.trim().to_owned())
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| DEFAULT_LIST_NAME.to_owned());
        Self {
            catalog: value.catalog.into(),
            reference_cache: value.reference_cache.into(),
            default_list_name,
        }
    }
}

impl From<RawCatalog> for CatalogSettings {
    fn from(value: RawCatalog) -> Self {
        Self {
            base_url: value.base_url,
            api_key: value.api_key.filter(|key| !key.trim().is_empty()),
            timeout: Duration::from_millis(value.timeout_ms),
            max_attempts: value.max_attempts,
            base_backoff: Duration::from_millis(value.base_backoff_ms),
            max_backoff: Duration::from_millis(value.max_backoff_ms),
            jitter: value.jitter,
        }
    }
}

impl From<RawCache> for CacheSettings {
    fn from(value: RawCache) -> Self {
        Self {
            ttl: Duration::from_secs(value.ttl_secs),
            capacity: value.capacity,
        }
    }
}

/// Resolve the configuration path taking the environment override into account.
fn resolve_config_path() -> PathBuf {
    env::var_os(CONFIG_PATH_ENV)
        .map(PathBuf::from)
        .filter(|path| !path.as_os_str().is_empty())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_file_keeps_defaults_for_missing_keys() {
        let raw: RawConfig = serde_json::from_str(
            r#"{ "catalog": { "max_attempts": 5, "api_key": "  " }, "default_list_name": "Played" }"#,
        )
        .unwrap();
        let config = AppConfig::from(raw);

        assert_eq!(config.catalog.max_attempts, 5);
        assert_eq!(config.catalog.api_key, None);
        assert_eq!(config.catalog.base_url, DEFAULT_CATALOG_URL);
        assert_eq!(config.catalog.timeout, Duration::from_secs(10));
        assert_eq!(config.reference_cache.ttl, Duration::from_secs(1800));
        assert_eq!(config.default_list_name, "Played");
    }

    #[test]
    fn blank_list_name_falls_back() {
        let raw: RawConfig = serde_json::from_str(r#"{ "default_list_name": " " }"#).unwrap();
        assert_eq!(AppConfig::from(raw).default_list_name, DEFAULT_LIST_NAME);
    }

    #[test]
    fn retry_policy_is_sanitised() {
        let settings = CatalogSettings {
            max_attempts: 0,
            base_backoff: Duration::from_secs(4),
            max_backoff: Duration::from_secs(1),
            jitter: 3.0,
            ..CatalogSettings::default()
        };
        let policy = settings.retry_policy();

        assert_eq!(policy.max_attempts, 1);
        assert_eq!(policy.max_delay, Duration::from_secs(4));
        assert_eq!(policy.jitter, 1.0);
    }
}
