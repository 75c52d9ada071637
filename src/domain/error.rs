use thiserror::Error;

/// Core domain errors
#[derive(Debug, Clone, Error)]
pub enum DomainError {
    /// Rejected before any network call (missing file, bad type, too large)
    #[error("{message}")]
    Validation { message: String },

    /// The parsing service failed or answered with something unusable
    #[error("{message}")]
    Gateway {
        message: String,
        status: Option<u16>,
        details: Option<String>,
    },

    /// The parsing service succeeded but produced nothing to show
    #[error("{message}")]
    EmptyResult { message: String },

    #[error("{message}")]
    RateLimited {
        message: String,
        retry_after_secs: u64,
    },

    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("{message}")]
    Unexpected { message: String },
}

impl DomainError {
    pub const UNEXPECTED_MESSAGE: &'static str =
        "An unexpected error occurred while processing the file.";

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub fn gateway(message: impl Into<String>) -> Self {
        Self::Gateway {
            message: message.into(),
            status: None,
            details: None,
        }
    }

    pub fn gateway_status(
        message: impl Into<String>,
        status: u16,
        details: impl Into<String>,
    ) -> Self {
        let details = details.into();

        Self::Gateway {
            message: message.into(),
            status: Some(status),
            details: (!details.is_empty()).then_some(details),
        }
    }

    pub fn empty_result(message: impl Into<String>) -> Self {
        Self::EmptyResult {
            message: message.into(),
        }
    }

    pub fn rate_limited(message: impl Into<String>, retry_after_secs: u64) -> Self {
        Self::RateLimited {
            message: message.into(),
            retry_after_secs,
        }
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    pub fn unexpected(message: impl Into<String>) -> Self {
        let message = message.into();

        Self::Unexpected {
            message: if message.trim().is_empty() {
                Self::UNEXPECTED_MESSAGE.to_string()
            } else {
                message
            },
        }
    }

    /// HTTP status reported by the parsing service, if any
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Gateway { status, .. } => *status,
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_displays_message_only() {
        let error = DomainError::validation("No file uploaded");
        assert_eq!(error.to_string(), "No file uploaded");
    }

    #[test]
    fn test_gateway_status_keeps_code_and_details() {
        let error = DomainError::gateway_status("HTTP 503", 503, "upstream down");

        assert_eq!(error.status_code(), Some(503));
        match error {
            DomainError::Gateway { details, .. } => {
                assert_eq!(details.as_deref(), Some("upstream down"));
            }
            other => panic!("unexpected variant: {other:?}"),
        }
    }

    #[test]
    fn test_gateway_status_drops_empty_details() {
        let error = DomainError::gateway_status("HTTP 500", 500, "");

        match error {
            DomainError::Gateway { details, .. } => assert!(details.is_none()),
            other => panic!("unexpected variant: {other:?}"),
        }
    }

    #[test]
    fn test_unexpected_blank_message_is_normalized() {
        let error = DomainError::unexpected("  ");
        assert_eq!(error.to_string(), DomainError::UNEXPECTED_MESSAGE);
    }

    #[test]
    fn test_configuration_error() {
        let error = DomainError::configuration("Missing Unstructured API configuration");
        assert_eq!(
            error.to_string(),
            "Configuration error: Missing Unstructured API configuration"
        );
    }
}
