//! Test fixtures and doubles shared across the workspace.
//!
//! Compiled into the library so downstream crates can reuse the same
//! fixtures in their own tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use repairhub_domain::{Role, UserProfile};
use serde_json::{json, Value};

use crate::session::{AuthTransport, SessionCredentials, SessionError};

/// The technician profile used throughout the test suites.
#[must_use]
pub fn sample_user() -> UserProfile {
    UserProfile {
        id: 7,
        username: "tech1".into(),
        email: "tech1@example.com".into(),
        full_name: "Tech One".into(),
        role: Role::Employee,
    }
}

/// Credential set holding the given token pair and the sample user.
#[must_use]
pub fn sample_credentials(access: &str, refresh: &str) -> SessionCredentials {
    SessionCredentials {
        access_token: access.into(),
        refresh_token: refresh.into(),
        user: sample_user(),
    }
}

/// The success envelope the backend returns for login and refresh.
#[must_use]
pub fn login_success_body(access: &str, refresh: &str) -> Value {
    json!({
        "success": true,
        "data": {
            "accessToken": access,
            "refreshToken": refresh,
            "user": {
                "id": 7,
                "username": "tech1",
                "email": "tech1@example.com",
                "full_name": "Tech One",
                "role": "employee",
            },
        },
    })
}

/// Scriptable [`AuthTransport`] double with call counters.
///
/// Unscripted calls fail, so a test that never expects a wire call will
/// notice one happening.
#[derive(Default)]
pub struct MockAuthTransport {
    login_response: Mutex<Option<Result<SessionCredentials, SessionError>>>,
    refresh_response: Mutex<Option<Result<SessionCredentials, SessionError>>>,
    logout_response: Mutex<Option<Result<(), SessionError>>>,
    login_count: AtomicUsize,
    refresh_count: AtomicUsize,
    logout_count: AtomicUsize,
}

impl MockAuthTransport {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Script the response every `login` call returns.
    #[must_use]
    pub fn with_login(self, response: Result<SessionCredentials, SessionError>) -> Self {
        *self.login_response.lock().unwrap() = Some(response);
        self
    }

    /// Script the response every `refresh` call returns.
    #[must_use]
    pub fn with_refresh(self, response: Result<SessionCredentials, SessionError>) -> Self {
        *self.refresh_response.lock().unwrap() = Some(response);
        self
    }

    /// Script the response every `logout` call returns (default: `Ok`).
    #[must_use]
    pub fn with_logout(self, response: Result<(), SessionError>) -> Self {
        *self.logout_response.lock().unwrap() = Some(response);
        self
    }

    pub fn login_calls(&self) -> usize {
        self.login_count.load(Ordering::SeqCst)
    }

    pub fn refresh_calls(&self) -> usize {
        self.refresh_count.load(Ordering::SeqCst)
    }

    pub fn logout_calls(&self) -> usize {
        self.logout_count.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AuthTransport for MockAuthTransport {
    async fn login(
        &self,
        _username: &str,
        _password: &str,
    ) -> Result<SessionCredentials, SessionError> {
        self.login_count.fetch_add(1, Ordering::SeqCst);
        self.login_response
            .lock()
            .unwrap()
            .clone()
            .unwrap_or_else(|| Err(SessionError::Transport("unscripted login call".into())))
    }

    async fn refresh(&self, _refresh_token: &str) -> Result<SessionCredentials, SessionError> {
        self.refresh_count.fetch_add(1, Ordering::SeqCst);
        self.refresh_response
            .lock()
            .unwrap()
            .clone()
            .unwrap_or_else(|| Err(SessionError::Transport("unscripted refresh call".into())))
    }

    async fn logout(&self, _refresh_token: &str) -> Result<(), SessionError> {
        self.logout_count.fetch_add(1, Ordering::SeqCst);
        self.logout_response.lock().unwrap().clone().unwrap_or(Ok(()))
    }
}
