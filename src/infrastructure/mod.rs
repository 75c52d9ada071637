//! Infrastructure layer - parsing service client, caching and rate limiting

pub mod cache;
pub mod gateway;
pub mod logging;
pub mod rate_limit;
pub mod unstructured;

pub use cache::{ResponseCache, ResponseCacheConfig};
pub use gateway::CachedGateway;
pub use rate_limit::{RateLimitConfig, RateLimitDecision, RateLimiter};
pub use unstructured::{UnstructuredConfig, UnstructuredGateway};
