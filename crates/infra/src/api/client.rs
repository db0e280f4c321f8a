//! Reauthenticating API client
//!
//! Wraps [`HttpClient`] with the backend's auth contract: every request
//! carries the current bearer token, and a 401 whose envelope code marks the
//! token as stale triggers one refresh followed by one retry of the original
//! request. Everything else is surfaced unchanged.

use std::sync::Arc;
use std::time::Duration;

use repairhub_domain::ApiEnvelope;
use reqwest::{Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info, warn};

use super::errors::ApiError;
use super::session::SessionProvider;
use crate::http::HttpClient;

/// Configuration for the API client.
#[derive(Debug, Clone)]
pub struct ApiClientConfig {
    /// Base URL including the API prefix (e.g. `http://localhost:3001/api`).
    pub base_url: String,
    /// Timeout per request attempt.
    pub timeout: Duration,
}

impl Default for ApiClientConfig {
    fn default() -> Self {
        Self { base_url: "http://localhost:3001/api".to_string(), timeout: Duration::from_secs(30) }
    }
}

/// Outcome of inspecting a response for the stale-token convention.
enum Reauth {
    /// Not a stale-token 401; hand the response on unchanged.
    Proceed(Response),
    /// Tokens were rotated; send the original request once more.
    Retry,
}

/// API client with automatic token refresh.
pub struct ApiClient {
    http: HttpClient,
    session: Arc<dyn SessionProvider>,
    base_url: String,
    timeout: Duration,
}

impl ApiClient {
    /// Create a new API client.
    ///
    /// The underlying HTTP client is built with a single attempt per send:
    /// the refresh-and-retry cycle is the only retry this layer performs.
    ///
    /// # Errors
    /// Returns `ApiError::Config` if the HTTP client cannot be constructed.
    pub fn new(
        config: ApiClientConfig,
        session: Arc<dyn SessionProvider>,
    ) -> Result<Self, ApiError> {
        let http = HttpClient::builder()
            .timeout(config.timeout)
            .max_attempts(1)
            .build()
            .map_err(|e| ApiError::Config(format!("failed to build http client: {e}")))?;

        Ok(Self {
            http,
            session,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            timeout: config.timeout,
        })
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    #[must_use]
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Execute a GET request and unwrap the response envelope.
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        self.execute(Method::GET, path, None).await
    }

    /// Execute a POST request with a JSON body.
    pub async fn post<T, B>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.execute(Method::POST, path, Some(Self::to_body(body)?)).await
    }

    /// Execute a PUT request with a JSON body.
    pub async fn put<T, B>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.execute(Method::PUT, path, Some(Self::to_body(body)?)).await
    }

    /// Execute a PATCH request with a JSON body.
    pub async fn patch<T, B>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.execute(Method::PATCH, path, Some(Self::to_body(body)?)).await
    }

    /// Execute a DELETE request.
    pub async fn delete<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        self.execute(Method::DELETE, path, None).await
    }

    /// Execute a multipart POST. The form is rebuilt through `make_form` for
    /// the reauth retry because multipart bodies cannot be cloned.
    pub async fn post_multipart<T, F>(&self, path: &str, make_form: F) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        F: Fn() -> reqwest::multipart::Form + Send + Sync,
    {
        let (response, used_token) = self.dispatch_multipart(path, make_form()).await?;
        match self.reauth_check(response, used_token).await? {
            Reauth::Proceed(response) => Self::finish(response).await,
            Reauth::Retry => {
                let (retry, _) = self.dispatch_multipart(path, make_form()).await?;
                Self::finish(retry).await
            }
        }
    }

    async fn execute<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
    ) -> Result<T, ApiError> {
        let (response, used_token) = self.dispatch_json(&method, path, body.as_ref()).await?;
        match self.reauth_check(response, used_token).await? {
            Reauth::Proceed(response) => Self::finish(response).await,
            Reauth::Retry => {
                let (retry, _) = self.dispatch_json(&method, path, body.as_ref()).await?;
                Self::finish(retry).await
            }
        }
    }

    async fn dispatch_json(
        &self,
        method: &Method,
        path: &str,
        body: Option<&Value>,
    ) -> Result<(Response, Option<String>), ApiError> {
        let (mut request, used_token) = self.authorized(method.clone(), path).await;
        if let Some(body) = body {
            request = request.json(body);
        }
        let response = self.http.send(request).await.map_err(ApiError::from)?;
        Ok((response, used_token))
    }

    async fn dispatch_multipart(
        &self,
        path: &str,
        form: reqwest::multipart::Form,
    ) -> Result<(Response, Option<String>), ApiError> {
        let (request, used_token) = self.authorized(Method::POST, path).await;
        let response = self.http.send_once(request.multipart(form)).await.map_err(ApiError::from)?;
        Ok((response, used_token))
    }

    /// Build a request carrying the current bearer token, returning the token
    /// so the caller can name it to the refresh cycle if it turns out stale.
    async fn authorized(&self, method: Method, path: &str) -> (RequestBuilder, Option<String>) {
        let url = format!("{}{}", self.base_url, path);
        let mut request = self.http.request(method, url);
        let token = self.session.access_token().await;
        if let Some(token) = &token {
            request = request.bearer_auth(token);
        }
        (request, token)
    }

    /// Apply the stale-token convention to a response.
    ///
    /// Only a 401 whose envelope carries a stale-token code starts the
    /// refresh cycle; all other 401s (wrong credentials, missing permission)
    /// pass through so the cycle can never loop on them. At most one refresh
    /// happens per logical call because the retried response goes through
    /// [`finish`](Self::finish) directly.
    async fn reauth_check(
        &self,
        response: Response,
        used_token: Option<String>,
    ) -> Result<Reauth, ApiError> {
        if response.status() != StatusCode::UNAUTHORIZED {
            return Ok(Reauth::Proceed(response));
        }

        let body = response.text().await.unwrap_or_default();
        let envelope = serde_json::from_str::<ApiEnvelope<Value>>(&body).ok();
        let message = envelope
            .as_ref()
            .map(ApiEnvelope::error_message)
            .unwrap_or_else(|| "unauthorized".to_string());
        let stale = envelope.as_ref().is_some_and(ApiEnvelope::is_stale_token);

        if !stale {
            debug!("401 without stale-token code, surfacing unchanged");
            return Err(ApiError::Auth(message));
        }

        if !self.session.has_refresh_token().await {
            warn!("access token stale and no refresh token held, logging out");
            self.session.force_logout().await;
            return Err(ApiError::Auth(message));
        }

        match self.session.refresh(used_token.as_deref().unwrap_or_default()).await {
            Ok(()) => {
                info!("access token refreshed, retrying original request");
                Ok(Reauth::Retry)
            }
            Err(err) => {
                // The session provider already cleared the session; the
                // caller sees the original 401, not the refresh failure.
                warn!(error = %err, "token refresh failed");
                Err(ApiError::Auth(message))
            }
        }
    }

    async fn finish<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
        let status = response.status();

        if status == StatusCode::NO_CONTENT || status == StatusCode::RESET_CONTENT {
            return serde_json::from_value(Value::Null).map_err(|_| {
                ApiError::Client(format!(
                    "no-content response ({status}) cannot populate the expected type"
                ))
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| ApiError::Network(format!("read response body: {e}")))?;

        if !status.is_success() {
            return Err(Self::map_status_error(status, &body));
        }

        let envelope: ApiEnvelope<T> = serde_json::from_str(&body)
            .map_err(|e| ApiError::Client(format!("malformed response envelope: {e}")))?;

        if !envelope.success {
            return Err(ApiError::Client(envelope.error_message()));
        }

        match envelope.data {
            Some(data) => Ok(data),
            // Acknowledgement-only envelopes ({"success": true}) still have
            // to satisfy T; unit and Option targets accept null.
            None => serde_json::from_value(Value::Null)
                .map_err(|_| ApiError::Client("response envelope missing data".to_string())),
        }
    }

    fn map_status_error(status: StatusCode, body: &str) -> ApiError {
        let message = serde_json::from_str::<ApiEnvelope<Value>>(body)
            .ok()
            .map(|e| e.error_message())
            .unwrap_or_else(|| format!("HTTP {status}"));

        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => ApiError::Auth(message),
            StatusCode::TOO_MANY_REQUESTS => ApiError::RateLimit(message),
            s if s.is_server_error() => ApiError::Server(message),
            _ => ApiError::Client(message),
        }
    }

    fn to_body<B: Serialize + ?Sized>(body: &B) -> Result<Value, ApiError> {
        serde_json::to_value(body)
            .map_err(|e| ApiError::Client(format!("serialize request body: {e}")))
    }
}
