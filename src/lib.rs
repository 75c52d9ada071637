//! Document parsing gateway
//!
//! Accepts PDF and image uploads, forwards them to the Unstructured partition
//! API and groups the returned elements into heading-delimited chunks:
//! - Upload validation (type allow-list, size ceiling)
//! - Upload lifecycle with supersession of stale results
//! - Sliding-window rate limiting and a TTL response cache

pub mod api;
pub mod cli;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::AppConfig;

use std::sync::Arc;

use api::state::AppState;
use domain::ParsingGateway;
use infrastructure::{CachedGateway, RateLimiter, ResponseCache, UnstructuredGateway};
use tracing::info;

/// Build the parsing gateway: Unstructured client behind the response cache
pub fn create_gateway(config: &AppConfig) -> anyhow::Result<Arc<dyn ParsingGateway>> {
    let unstructured = UnstructuredGateway::new(config.gateway.unstructured()?)?;

    info!(
        url = %unstructured.partition_url(),
        cache_ttl_secs = config.cache.ttl_secs,
        "Parsing gateway configured"
    );

    let cache = Arc::new(ResponseCache::new(config.cache.response_cache_config()?));

    Ok(Arc::new(CachedGateway::new(Arc::new(unstructured), cache)))
}

/// Create the application state with all services initialized
pub fn create_app_state(config: &AppConfig) -> anyhow::Result<AppState> {
    let gateway = create_gateway(config)?;
    let rate_limiter = Arc::new(RateLimiter::new(config.rate_limit.limiter_config()?));

    Ok(AppState::new(gateway, config.upload.policy(), rate_limiter))
}
