//! Backend response envelope
//!
//! Every endpoint wraps its payload in `{ success, data?, error?, code? }`.
//! On 401 responses the `code` field carries the stale-token convention
//! (`TOKEN_EXPIRED` / `INVALID_TOKEN`) that drives the refresh cycle.

use serde::{Deserialize, Serialize};

use crate::constants::STALE_TOKEN_CODES;

/// Uniform response wrapper used by the backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiEnvelope<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

impl<T> ApiEnvelope<T> {
    /// Whether this envelope carries a stale-token error code.
    ///
    /// Wrong credentials and permission failures also come back as 401 but
    /// without one of these codes; they must not trigger a refresh.
    #[must_use]
    pub fn is_stale_token(&self) -> bool {
        self.code.as_deref().is_some_and(|code| STALE_TOKEN_CODES.contains(&code))
    }

    /// Error message for failed envelopes, with a fallback for bodies that
    /// omitted it.
    #[must_use]
    pub fn error_message(&self) -> String {
        self.error.clone().unwrap_or_else(|| "request failed".to_string())
    }
}
