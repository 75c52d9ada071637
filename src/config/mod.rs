//! Application configuration

mod app_config;

pub use app_config::{
    AppConfig, CacheConfig, GatewayConfig, LogFormat, LoggingConfig, RateLimitSettings,
    ServerConfig, UploadConfig,
};
