use std::sync::Arc;

use async_trait::async_trait;
use sha2::{Digest, Sha256};
use tracing::debug;

use super::cache::ResponseCache;
use crate::domain::{DomainError, Element, ParsingGateway, PartitionRequest};

/// Parsing gateway wrapper that memoizes successful results
///
/// Keys combine the strategy with a SHA-256 digest of the document bytes, so
/// the same file uploaded under a different name still hits.
pub struct CachedGateway {
    inner: Arc<dyn ParsingGateway>,
    cache: Arc<ResponseCache<Vec<Element>>>,
}

impl CachedGateway {
    pub fn new(inner: Arc<dyn ParsingGateway>, cache: Arc<ResponseCache<Vec<Element>>>) -> Self {
        Self { inner, cache }
    }

    pub fn cache_key(request: &PartitionRequest) -> String {
        let digest = Sha256::digest(&request.content);
        format!("partition:{}:{}", request.strategy, hex::encode(digest))
    }
}

#[async_trait]
impl ParsingGateway for CachedGateway {
    async fn partition(&self, request: PartitionRequest) -> Result<Vec<Element>, DomainError> {
        let key = Self::cache_key(&request);

        if let Some(elements) = self.cache.get(&key).await {
            debug!(filename = %request.filename, key = %key, "Cache hit for partition");
            return Ok(elements);
        }

        debug!(filename = %request.filename, key = %key, "Cache miss, calling parsing service");

        let elements = self.inner.partition(request).await?;
        self.cache.set(key, elements.clone()).await;

        Ok(elements)
    }

    fn name(&self) -> &'static str {
        self.inner.name()
    }
}

impl std::fmt::Debug for CachedGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CachedGateway")
            .field("cache", &self.cache)
            .finish_non_exhaustive()
    }
}
