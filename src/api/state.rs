//! Application state for shared services

use std::sync::Arc;

use crate::domain::{ParsingGateway, UploadOrchestrator, UploadPolicy};
use crate::infrastructure::RateLimiter;

/// Application state shared by every handler
#[derive(Clone)]
pub struct AppState {
    pub orchestrator: Arc<UploadOrchestrator>,
    /// Gateway used by the stateless parse endpoint
    pub gateway: Arc<dyn ParsingGateway>,
    pub rate_limiter: Arc<RateLimiter>,
}

impl AppState {
    /// The orchestrator drives its uploads through the same gateway
    pub fn new(
        gateway: Arc<dyn ParsingGateway>,
        policy: UploadPolicy,
        rate_limiter: Arc<RateLimiter>,
    ) -> Self {
        let orchestrator = Arc::new(UploadOrchestrator::new(gateway.clone(), policy));

        Self {
            orchestrator,
            gateway,
            rate_limiter,
        }
    }

    pub fn policy(&self) -> &UploadPolicy {
        self.orchestrator.policy()
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("gateway", &self.gateway.name())
            .field("orchestrator", &self.orchestrator)
            .field("rate_limiter", &self.rate_limiter)
            .finish()
    }
}
