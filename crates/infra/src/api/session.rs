//! Session seam for the API client.
//!
//! The API client does not own credentials; it reads tokens and requests
//! refreshes through this trait. `SessionManager` is the production
//! implementation, tests plug in scripted providers.

use async_trait::async_trait;
use repairhub_common::session::{AuthTransport, CredentialStore, SessionManager};
use tracing::debug;

use super::errors::ApiError;

/// What the reauthenticating client needs from the session layer.
#[async_trait]
pub trait SessionProvider: Send + Sync {
    /// Current access token, if a session is held.
    async fn access_token(&self) -> Option<String>;

    /// Whether a refresh token is available for the reauth cycle.
    async fn has_refresh_token(&self) -> bool;

    /// Rotate the tokens after `stale_token` produced a stale-coded 401.
    ///
    /// Implementations single-flight concurrent calls: if the session no
    /// longer holds `stale_token`, another caller already rotated and the
    /// call returns without network traffic.
    async fn refresh(&self, stale_token: &str) -> Result<(), ApiError>;

    /// Clear the session after an unrecoverable 401.
    async fn force_logout(&self);
}

#[async_trait]
impl<T: AuthTransport, S: CredentialStore> SessionProvider for SessionManager<T, S> {
    async fn access_token(&self) -> Option<String> {
        SessionManager::access_token(self).await
    }

    async fn has_refresh_token(&self) -> bool {
        SessionManager::refresh_token(self).await.is_some()
    }

    async fn refresh(&self, stale_token: &str) -> Result<(), ApiError> {
        SessionManager::refresh_if_stale(self, stale_token).await.map_err(|e| {
            debug!(error = %e, "session refresh failed");
            ApiError::Auth(e.to_string())
        })
    }

    async fn force_logout(&self) {
        SessionManager::force_logout(self).await;
    }
}
