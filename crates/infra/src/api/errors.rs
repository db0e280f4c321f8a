//! API-specific error types
//!
//! Provides error classification for API operations with retry metadata.

use std::time::Duration;

use repairhub_domain::RepairHubError;
use thiserror::Error;

/// Categories of API errors for retry logic
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiErrorCategory {
    /// Authentication errors (401, 403) - resolved by re-login, not retry
    Authentication,
    /// Rate limiting errors (429) - retry with backoff
    RateLimit,
    /// Server errors (5xx) - retryable
    Server,
    /// Client errors (4xx except auth) - non-retryable
    Client,
    /// Network/connection errors - retryable
    Network,
    /// Configuration errors - non-retryable
    Config,
    /// Known-offline state - retry once connectivity returns
    Offline,
}

/// API operation errors
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Authentication failed: {0}")]
    Auth(String),

    #[error("Rate limit exceeded: {0}")]
    RateLimit(String),

    #[error("Server error: {0}")]
    Server(String),

    #[error("Client error: {0}")]
    Client(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Timeout after {0:?}")]
    Timeout(Duration),

    /// The connectivity monitor reports no link; the request was not sent.
    #[error("Offline: request not attempted")]
    Offline,
}

impl ApiError {
    /// Get the error category for this error
    pub fn category(&self) -> ApiErrorCategory {
        match self {
            Self::Auth(_) => ApiErrorCategory::Authentication,
            Self::RateLimit(_) => ApiErrorCategory::RateLimit,
            Self::Server(_) => ApiErrorCategory::Server,
            Self::Client(_) => ApiErrorCategory::Client,
            Self::Network(_) | Self::Timeout(_) => ApiErrorCategory::Network,
            Self::Config(_) => ApiErrorCategory::Config,
            Self::Offline => ApiErrorCategory::Offline,
        }
    }

    /// Check if this error should be retried as-is
    pub fn should_retry(&self) -> bool {
        matches!(
            self.category(),
            ApiErrorCategory::RateLimit | ApiErrorCategory::Server | ApiErrorCategory::Network
        )
    }
}

impl From<RepairHubError> for ApiError {
    fn from(err: RepairHubError) -> Self {
        match err {
            RepairHubError::Network(msg) => Self::Network(msg),
            RepairHubError::Auth(msg) => Self::Auth(msg),
            RepairHubError::Config(msg) => Self::Config(msg),
            RepairHubError::NotFound(msg) | RepairHubError::InvalidInput(msg) => Self::Client(msg),
            RepairHubError::Storage(msg) | RepairHubError::Internal(msg) => Self::Client(msg),
        }
    }
}
