//! Auth transport
//!
//! Wire calls against the backend's auth sub-resource. The transport trait is
//! the seam the session manager depends on; the reqwest-backed [`AuthClient`]
//! is the production implementation.

use std::time::Duration;

use async_trait::async_trait;
use repairhub_domain::ApiEnvelope;
use reqwest::StatusCode;
use serde::Serialize;
use tracing::debug;

use super::types::{SessionCredentials, SessionError};

/// Trait for the auth wire calls the session lifecycle needs.
#[async_trait]
pub trait AuthTransport: Send + Sync {
    /// Exchange username/password for a credential set.
    async fn login(&self, username: &str, password: &str)
        -> Result<SessionCredentials, SessionError>;

    /// Exchange a refresh token for a rotated credential set.
    async fn refresh(&self, refresh_token: &str) -> Result<SessionCredentials, SessionError>;

    /// Invalidate the refresh token server-side.
    async fn logout(&self, refresh_token: &str) -> Result<(), SessionError>;
}

#[derive(Serialize)]
struct LoginBody<'a> {
    username: &'a str,
    password: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RefreshBody<'a> {
    refresh_token: &'a str,
}

/// Reqwest-backed auth client.
///
/// `base_url` points at the auth sub-resource, e.g.
/// `http://localhost:3001/api/auth`.
pub struct AuthClient {
    http: reqwest::Client,
    base_url: String,
}

impl AuthClient {
    /// Build a client with the given request timeout.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, SessionError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| SessionError::Transport(format!("build http client: {e}")))?;

        Ok(Self { http, base_url: base_url.into().trim_end_matches('/').to_string() })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn read_envelope(
        response: reqwest::Response,
    ) -> Result<(StatusCode, ApiEnvelope<SessionCredentials>), SessionError> {
        let status = response.status();
        let envelope = response
            .json::<ApiEnvelope<SessionCredentials>>()
            .await
            .map_err(|e| SessionError::Transport(format!("parse auth response: {e}")))?;
        Ok((status, envelope))
    }
}

#[async_trait]
impl AuthTransport for AuthClient {
    async fn login(
        &self,
        username: &str,
        password: &str,
    ) -> Result<SessionCredentials, SessionError> {
        debug!(username, "login request");

        let response = self
            .http
            .post(self.url("/login"))
            .json(&LoginBody { username, password })
            .send()
            .await
            .map_err(|e| SessionError::Transport(format!("login request: {e}")))?;

        let (status, envelope) = Self::read_envelope(response).await?;

        if status == StatusCode::UNAUTHORIZED {
            return Err(SessionError::InvalidCredentials(envelope.error_message()));
        }
        if !status.is_success() || !envelope.success {
            return Err(SessionError::Transport(format!(
                "login failed ({status}): {}",
                envelope.error_message()
            )));
        }

        envelope
            .data
            .filter(SessionCredentials::is_complete)
            .ok_or_else(|| SessionError::Transport("login response missing tokens".into()))
    }

    async fn refresh(&self, refresh_token: &str) -> Result<SessionCredentials, SessionError> {
        debug!("refresh request");

        let response = self
            .http
            .post(self.url("/refresh"))
            .json(&RefreshBody { refresh_token })
            .send()
            .await
            .map_err(|e| SessionError::RefreshFailed(format!("refresh request: {e}")))?;

        let (status, envelope) = Self::read_envelope(response)
            .await
            .map_err(|e| SessionError::RefreshFailed(e.to_string()))?;

        if !status.is_success() || !envelope.success {
            return Err(SessionError::RefreshFailed(envelope.error_message()));
        }

        envelope
            .data
            .filter(SessionCredentials::is_complete)
            .ok_or_else(|| SessionError::RefreshFailed("refresh response missing tokens".into()))
    }

    async fn logout(&self, refresh_token: &str) -> Result<(), SessionError> {
        debug!("logout request");

        self.http
            .post(self.url("/logout"))
            .json(&RefreshBody { refresh_token })
            .send()
            .await
            .map_err(|e| SessionError::Transport(format!("logout request: {e}")))?;

        // Server-side revocation outcome does not gate the local logout.
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::testing::{login_success_body, sample_user};

    fn client(server: &MockServer) -> AuthClient {
        AuthClient::new(format!("{}/api/auth", server.uri()), Duration::from_secs(5)).unwrap()
    }

    #[tokio::test]
    async fn login_returns_credentials() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/auth/login"))
            .and(body_json(serde_json::json!({"username": "tech1", "password": "pw"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(login_success_body("T1", "R1")))
            .mount(&server)
            .await;

        let creds = client(&server).login("tech1", "pw").await.unwrap();
        assert_eq!(creds.access_token, "T1");
        assert_eq!(creds.refresh_token, "R1");
        assert_eq!(creds.user, sample_user());
    }

    #[tokio::test]
    async fn login_401_maps_to_invalid_credentials() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/auth/login"))
            .respond_with(ResponseTemplate::new(401).set_body_json(
                serde_json::json!({"success": false, "error": "invalid credentials"}),
            ))
            .mount(&server)
            .await;

        let err = client(&server).login("tech1", "wrong").await.unwrap_err();
        assert!(matches!(err, SessionError::InvalidCredentials(_)));
    }

    #[tokio::test]
    async fn refresh_failure_maps_to_refresh_failed() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/auth/refresh"))
            .respond_with(ResponseTemplate::new(401).set_body_json(
                serde_json::json!({"success": false, "error": "refresh token revoked"}),
            ))
            .mount(&server)
            .await;

        let err = client(&server).refresh("R-old").await.unwrap_err();
        assert!(matches!(err, SessionError::RefreshFailed(_)));
    }

    #[tokio::test]
    async fn refresh_sends_camel_case_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/auth/refresh"))
            .and(body_json(serde_json::json!({"refreshToken": "R1"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(login_success_body("T2", "R2")))
            .expect(1)
            .mount(&server)
            .await;

        let creds = client(&server).refresh("R1").await.unwrap();
        assert_eq!(creds.access_token, "T2");
    }
}
