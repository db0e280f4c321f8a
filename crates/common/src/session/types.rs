//! Session credential types
//!
//! Tokens are opaque strings from the client's perspective: the access token
//! is the short-lived bearer credential, the refresh token is single-purpose
//! (obtaining a new access token).

use repairhub_domain::UserProfile;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The tuple representing an authenticated client.
///
/// Invariant: a held credential set always has both tokens non-empty. Field
/// names serialize camelCase to match the backend's auth payloads and the
/// durable storage keys.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionCredentials {
    pub access_token: String,
    pub refresh_token: String,
    pub user: UserProfile,
}

impl SessionCredentials {
    /// Both tokens present and non-empty.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        !self.access_token.is_empty() && !self.refresh_token.is_empty()
    }
}

/// Session lifecycle notifications observable by the rest of the application
/// (drives UI state such as showing the login form).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEvent {
    /// Credentials were set or replaced (login, refresh, profile update).
    Updated,
    /// Session cleared (explicit logout or unrecoverable auth failure).
    LoggedOut,
}

/// Error type for session operations
#[derive(Debug, Clone, Error)]
pub enum SessionError {
    /// No credentials held (not logged in)
    #[error("not authenticated")]
    NotAuthenticated,

    /// Login rejected by the backend
    #[error("invalid credentials: {0}")]
    InvalidCredentials(String),

    /// Refresh call failed or was rejected
    #[error("token refresh failed: {0}")]
    RefreshFailed(String),

    /// Durable storage failed
    #[error("credential storage error: {0}")]
    Storage(String),

    /// Wire-level failure talking to the auth endpoints
    #[error("auth transport error: {0}")]
    Transport(String),
}
