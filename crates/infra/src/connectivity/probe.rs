//! Latency probe against the backend.
//!
//! One lightweight authenticated request (`GET /repairs?limit=1`) measures
//! round-trip latency for the connectivity monitor. The probe client has a
//! hard timeout and never retries; an unreachable or erroring backend is a
//! probe failure, not something to paper over.

use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use repairhub_core::connectivity::ConnectivityProbe;
use repairhub_domain::constants::PROBE_TIMEOUT_SECS;
use repairhub_domain::{RepairHubError, Result};
use reqwest::Method;
use tracing::debug;

use crate::api::SessionProvider;
use crate::http::HttpClient;

const PROBE_PATH: &str = "/repairs?limit=1";

/// Probe implementation backed by the repairs list endpoint.
pub struct HttpConnectivityProbe {
    http: HttpClient,
    base_url: String,
    session: Arc<dyn SessionProvider>,
}

impl HttpConnectivityProbe {
    /// Build a probe for the given API base URL (including the `/api`
    /// prefix). Uses the default 5 second probe timeout.
    pub fn new(base_url: impl Into<String>, session: Arc<dyn SessionProvider>) -> Result<Self> {
        Self::with_timeout(base_url, session, Duration::from_secs(PROBE_TIMEOUT_SECS))
    }

    pub fn with_timeout(
        base_url: impl Into<String>,
        session: Arc<dyn SessionProvider>,
        timeout: Duration,
    ) -> Result<Self> {
        let http = HttpClient::builder().timeout(timeout).max_attempts(1).build()?;
        Ok(Self { http, base_url: base_url.into().trim_end_matches('/').to_string(), session })
    }
}

#[async_trait]
impl ConnectivityProbe for HttpConnectivityProbe {
    async fn measure_latency(&self) -> Result<Duration> {
        let url = format!("{}{PROBE_PATH}", self.base_url);
        let mut request = self.http.request(Method::GET, url).header("Accept", "application/json");
        if let Some(token) = self.session.access_token().await {
            request = request.bearer_auth(token);
        }

        let started = Instant::now();
        let response = self.http.send_once(request).await?;
        let latency = started.elapsed();

        let status = response.status();
        if !status.is_success() {
            return Err(RepairHubError::Network(format!("probe returned {status}")));
        }

        debug!(latency_ms = latency.as_millis() as u64, "connectivity probe succeeded");
        Ok(latency)
    }
}
