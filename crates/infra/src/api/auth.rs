//! Auth administration feature client
//!
//! Account and session management endpoints under `/auth`. Login, refresh
//! and logout are not here: the session manager in `repairhub-common` owns
//! the credential lifecycle, this client covers everything an authenticated
//! user does besides it.

use std::sync::Arc;

use repairhub_domain::{AuthSession, Role, UserProfile};
use serde::{Deserialize, Serialize};

use super::client::ApiClient;
use super::errors::ApiError;

/// Payload for registering a new account.
#[derive(Debug, Clone, Serialize)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password: String,
    pub full_name: String,
    pub role: Role,
}

/// Admin-editable fields of an existing account.
#[derive(Debug, Clone, Serialize)]
pub struct UserUpdate {
    pub full_name: String,
    pub role: Role,
    pub is_active: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PasswordChange<'a> {
    current_password: &'a str,
    new_password: &'a str,
}

#[derive(Deserialize)]
struct MePayload {
    user: UserProfile,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreatedUser {
    pub id: i64,
    #[serde(default)]
    pub message: Option<String>,
}

/// Client for the `/auth` administrative endpoints.
pub struct AuthApi {
    client: Arc<ApiClient>,
}

impl AuthApi {
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self { client }
    }

    /// Register a new account (admin operation).
    pub async fn register(&self, user: &NewUser) -> Result<CreatedUser, ApiError> {
        self.client.post("/auth/register", user).await
    }

    /// Profile of the calling user.
    pub async fn me(&self) -> Result<UserProfile, ApiError> {
        let payload: MePayload = self.client.get("/auth/me").await?;
        Ok(payload.user)
    }

    /// All accounts (admin operation).
    pub async fn users(&self) -> Result<Vec<UserProfile>, ApiError> {
        self.client.get("/auth/users").await
    }

    /// Update an account's editable fields (admin operation).
    pub async fn update_user(&self, id: i64, update: &UserUpdate) -> Result<(), ApiError> {
        self.client.put::<serde_json::Value, _>(&format!("/auth/users/{id}"), update).await?;
        Ok(())
    }

    /// Change the calling user's password.
    pub async fn change_password(&self, current: &str, new: &str) -> Result<(), ApiError> {
        let body = PasswordChange { current_password: current, new_password: new };
        self.client.post::<serde_json::Value, _>("/auth/change-password", &body).await?;
        Ok(())
    }

    /// Active sessions of the calling user.
    pub async fn sessions(&self) -> Result<Vec<AuthSession>, ApiError> {
        self.client.get("/auth/sessions").await
    }

    /// Revoke one session by id.
    pub async fn revoke_session(&self, id: i64) -> Result<(), ApiError> {
        self.client.delete::<serde_json::Value>(&format!("/auth/sessions/{id}")).await?;
        Ok(())
    }

    /// Revoke every session except the current one.
    pub async fn logout_all(&self) -> Result<(), ApiError> {
        self.client.post::<serde_json::Value, _>("/auth/logout-all", &serde_json::json!({})).await?;
        Ok(())
    }
}
