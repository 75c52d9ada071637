use std::collections::HashMap;
use std::time::Duration;

use serde::Deserialize;

use crate::domain::upload::{DEFAULT_ALLOWED_MIME_TYPES, DEFAULT_MAX_FILE_SIZE_BYTES};
use crate::domain::{DomainError, UploadPolicy};
use crate::infrastructure::unstructured::DEFAULT_UNSTRUCTURED_API_URL;
use crate::infrastructure::{RateLimitConfig, ResponseCacheConfig, UnstructuredConfig};

/// Application configuration
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub upload: UploadConfig,
    pub rate_limit: RateLimitSettings,
    pub cache: CacheConfig,
    pub gateway: GatewayConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
    /// Single-line output on stderr, used by the `parse` command
    Compact,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UploadConfig {
    pub max_file_size_bytes: u64,
    pub allowed_mime_types: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RateLimitSettings {
    pub requests_per_window: u32,
    pub window_secs: u64,
    pub sweep_interval_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    pub ttl_secs: u64,
    pub max_capacity: u64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GatewayConfig {
    pub api_url: Option<String>,
    pub api_key: Option<String>,
    pub timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::default(),
        }
    }
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            max_file_size_bytes: DEFAULT_MAX_FILE_SIZE_BYTES,
            allowed_mime_types: DEFAULT_ALLOWED_MIME_TYPES
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

impl Default for RateLimitSettings {
    fn default() -> Self {
        Self {
            requests_per_window: 10,
            window_secs: 60,
            sweep_interval_secs: 300,
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl_secs: 3600,
            max_capacity: 1_000,
        }
    }
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            api_url: None,
            api_key: None,
            timeout_secs: 120,
        }
    }
}

impl UploadConfig {
    pub fn policy(&self) -> UploadPolicy {
        UploadPolicy::default()
            .with_max_file_size(self.max_file_size_bytes)
            .with_allowed_mime_types(self.allowed_mime_types.iter().cloned())
    }
}

impl RateLimitSettings {
    pub fn limiter_config(&self) -> Result<RateLimitConfig, DomainError> {
        Ok(RateLimitConfig::new(
            self.requests_per_window,
            seconds("rate_limit.window_secs", self.window_secs)?,
        )
        .with_sweep_interval(seconds(
            "rate_limit.sweep_interval_secs",
            self.sweep_interval_secs,
        )?))
    }
}

impl CacheConfig {
    pub fn response_cache_config(&self) -> Result<ResponseCacheConfig, DomainError> {
        Ok(ResponseCacheConfig::default()
            .with_ttl(seconds("cache.ttl_secs", self.ttl_secs)?)
            .with_max_capacity(self.max_capacity))
    }
}

/// Upper bound for every configured duration (100 years)
pub const MAX_DURATION_SECS: u64 = 100 * 365 * 24 * 60 * 60;

fn seconds(key: &str, secs: u64) -> Result<chrono::Duration, DomainError> {
    i64::try_from(secs)
        .ok()
        .filter(|_| secs <= MAX_DURATION_SECS)
        .and_then(chrono::Duration::try_seconds)
        .ok_or_else(|| {
            DomainError::configuration(format!(
                "{} must be at most {} seconds, got {}",
                key, MAX_DURATION_SECS, secs
            ))
        })
}

impl GatewayConfig {
    /// Resolve credentials, falling back to `UNSTRUCTURED_API_KEY` / `UNSTRUCTURED_API_URL`
    pub fn unstructured(&self) -> Result<UnstructuredConfig, DomainError> {
        let api_key = non_empty(self.api_key.clone())
            .or_else(|| non_empty(std::env::var("UNSTRUCTURED_API_KEY").ok()))
            .ok_or_else(|| DomainError::configuration("Missing Unstructured API configuration"))?;

        let api_url = non_empty(self.api_url.clone())
            .or_else(|| non_empty(std::env::var("UNSTRUCTURED_API_URL").ok()))
            .unwrap_or_else(|| DEFAULT_UNSTRUCTURED_API_URL.to_string());

        Ok(UnstructuredConfig::new(api_key, api_url)
            .with_timeout(Duration::from_secs(self.timeout_secs)))
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

impl AppConfig {
    /// Layer `config/default`, `config/local` and `APP__*` environment variables
    pub fn load() -> Result<Self, config::ConfigError> {
        Self::load_from(None)
    }

    /// Same layering, reading variables from `env` instead of the process
    /// environment when given
    pub fn load_from(env: Option<HashMap<String, String>>) -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name("config/local").required(false))
            .add_source(
                config::Environment::with_prefix("APP")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("upload.allowed_mime_types")
                    .try_parsing(true)
                    .source(env),
            )
            .build()?;

        config.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_observed_deployment() {
        let config = AppConfig::default();

        assert_eq!(config.server.port, 8080);
        assert_eq!(config.upload.max_file_size_bytes, 10 * 1024 * 1024);
        assert_eq!(config.rate_limit.requests_per_window, 10);
        assert_eq!(config.rate_limit.window_secs, 60);
        assert_eq!(config.cache.ttl_secs, 3600);
    }

    #[test]
    fn test_partial_document_fills_defaults() {
        let config: AppConfig = serde_json::from_value(serde_json::json!({
            "upload": {"max_file_size_bytes": 20971520},
            "logging": {"format": "json"}
        }))
        .unwrap();

        assert_eq!(config.upload.max_file_size_bytes, 20 * 1024 * 1024);
        assert_eq!(config.upload.allowed_mime_types.len(), 4);
        assert!(matches!(config.logging.format, LogFormat::Json));
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_upload_policy_from_config() {
        let upload = UploadConfig {
            max_file_size_bytes: 5,
            allowed_mime_types: vec!["application/pdf".to_string()],
        };

        let policy = upload.policy();
        assert_eq!(policy.max_file_size_bytes, 5);
        assert_eq!(policy.allowed_mime_types, vec!["application/pdf".to_string()]);
    }

    #[test]
    fn test_limiter_and_cache_conversion() {
        let config = AppConfig::default();

        let limiter = config.rate_limit.limiter_config().unwrap();
        assert_eq!(limiter.window, chrono::Duration::seconds(60));
        assert_eq!(limiter.sweep_interval, chrono::Duration::minutes(5));

        let cache = config.cache.response_cache_config().unwrap();
        assert_eq!(cache.ttl, chrono::Duration::hours(1));
        assert_eq!(cache.max_capacity, 1_000);
    }

    #[test]
    fn test_explicit_gateway_settings_win() {
        let gateway = GatewayConfig {
            api_url: Some("http://localhost:8000".to_string()),
            api_key: Some("key".to_string()),
            timeout_secs: 5,
        };

        let resolved = gateway.unstructured().unwrap();
        assert_eq!(resolved.api_url, "http://localhost:8000");
        assert_eq!(resolved.api_key, "key");
        assert_eq!(resolved.timeout, Duration::from_secs(5));
    }

    fn env(pairs: &[(&str, &str)]) -> Option<HashMap<String, String>> {
        Some(
            pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        )
    }

    #[test]
    fn test_env_overrides_upload_limit() {
        let config =
            AppConfig::load_from(env(&[("APP__UPLOAD__MAX_FILE_SIZE_BYTES", "20971520")])).unwrap();

        assert_eq!(config.upload.max_file_size_bytes, 20 * 1024 * 1024);
    }

    #[test]
    fn test_malformed_env_value_is_reported() {
        let err = AppConfig::load_from(env(&[("APP__UPLOAD__MAX_FILE_SIZE_BYTES", "20MB")]))
            .unwrap_err();

        assert!(err.to_string().contains("max_file_size_bytes"));
    }

    #[test]
    fn test_out_of_range_window_is_rejected() {
        let settings = RateLimitSettings {
            window_secs: 10_000_000_000_000_000,
            ..RateLimitSettings::default()
        };

        let err = settings.limiter_config().unwrap_err();
        assert!(matches!(err, DomainError::Configuration { .. }));
        assert!(err.to_string().contains("rate_limit.window_secs"));
    }

    #[test]
    fn test_out_of_range_sweep_interval_is_rejected() {
        let settings = RateLimitSettings {
            sweep_interval_secs: u64::MAX,
            ..RateLimitSettings::default()
        };

        assert!(settings.limiter_config().is_err());
    }

    #[test]
    fn test_huge_ttl_is_rejected_instead_of_wrapping() {
        let cache = CacheConfig {
            ttl_secs: u64::MAX,
            ..CacheConfig::default()
        };

        let err = cache.response_cache_config().unwrap_err();
        assert!(err.to_string().contains("cache.ttl_secs"));
    }

    #[test]
    fn test_max_duration_is_accepted() {
        let cache = CacheConfig {
            ttl_secs: MAX_DURATION_SECS,
            ..CacheConfig::default()
        };

        let ttl = cache.response_cache_config().unwrap().ttl;
        assert_eq!(ttl, chrono::Duration::seconds(MAX_DURATION_SECS as i64));
    }
}
