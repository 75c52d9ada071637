//! Parsing gateway abstraction
//!
//! The document-parsing service is an opaque collaborator: bytes go in, an
//! ordered element sequence comes out.

use std::fmt;

use async_trait::async_trait;
use bytes::Bytes;
use serde::{Deserialize, Serialize};

#[cfg(test)]
use mockall::automock;

use super::element::Element;
use super::error::DomainError;

/// Resolution mode requested from the parsing service
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    #[default]
    Standard,
    HighRes,
}

impl Strategy {
    pub fn from_high_res(high_res: bool) -> Self {
        if high_res { Self::HighRes } else { Self::Standard }
    }

    /// Value of the service's `strategy` form field
    pub fn as_api_str(&self) -> &'static str {
        match self {
            Self::Standard => "auto",
            Self::HighRes => "hi_res",
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_api_str())
    }
}

/// One partition call
#[derive(Debug, Clone, PartialEq)]
pub struct PartitionRequest {
    pub content: Bytes,
    pub filename: String,
    pub strategy: Strategy,
}

impl PartitionRequest {
    pub fn new(content: impl Into<Bytes>, filename: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            filename: filename.into(),
            strategy: Strategy::default(),
        }
    }

    pub fn with_strategy(mut self, strategy: Strategy) -> Self {
        self.strategy = strategy;
        self
    }
}

#[cfg_attr(test, automock)]
#[async_trait]
pub trait ParsingGateway: Send + Sync {
    /// Convert raw document bytes into an ordered element sequence
    async fn partition(&self, request: PartitionRequest) -> Result<Vec<Element>, DomainError>;

    /// Short name used in logs
    fn name(&self) -> &'static str;
}
