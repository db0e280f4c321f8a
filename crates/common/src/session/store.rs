//! Durable credential storage
//!
//! The web client kept `accessToken` / `refreshToken` / `user` in browser
//! local storage; here the same document is a JSON file under a
//! caller-supplied directory. Reads are null-safe: a missing or unreadable
//! file simply means "not authenticated", never an error surfaced to login
//! flows.

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use async_trait::async_trait;
use tracing::{debug, warn};

use super::types::{SessionCredentials, SessionError};

const CREDENTIALS_FILE: &str = "session.json";

/// Trait for durable session credential storage.
///
/// Abstracts the storage backend so the session manager can be tested with
/// an in-memory double.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Persist the credential set, replacing whatever was stored.
    async fn save(&self, credentials: &SessionCredentials) -> Result<(), SessionError>;

    /// Load the stored credential set, if a complete one exists.
    async fn load(&self) -> Result<Option<SessionCredentials>, SessionError>;

    /// Remove stored credentials. Idempotent.
    async fn clear(&self) -> Result<(), SessionError>;
}

/// File-backed credential store.
pub struct FileCredentialStore {
    path: PathBuf,
}

impl FileCredentialStore {
    /// Store credentials as `session.json` inside `dir`.
    #[must_use]
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self { path: dir.as_ref().join(CREDENTIALS_FILE) }
    }

    /// Path of the backing file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl CredentialStore for FileCredentialStore {
    async fn save(&self, credentials: &SessionCredentials) -> Result<(), SessionError> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| SessionError::Storage(format!("create storage dir: {e}")))?;
        }

        let body = serde_json::to_vec_pretty(credentials)
            .map_err(|e| SessionError::Storage(format!("serialize credentials: {e}")))?;

        tokio::fs::write(&self.path, body)
            .await
            .map_err(|e| SessionError::Storage(format!("write credentials: {e}")))?;

        debug!(path = %self.path.display(), "session credentials persisted");
        Ok(())
    }

    async fn load(&self) -> Result<Option<SessionCredentials>, SessionError> {
        let raw = match tokio::fs::read(&self.path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(SessionError::Storage(format!("read credentials: {e}"))),
        };

        match serde_json::from_slice::<SessionCredentials>(&raw) {
            Ok(credentials) if credentials.is_complete() => Ok(Some(credentials)),
            Ok(_) => {
                warn!("stored credentials incomplete, treating as unauthenticated");
                Ok(None)
            }
            Err(e) => {
                // Corrupt storage falls back to the unauthenticated default.
                warn!(error = %e, "stored credentials unreadable, treating as unauthenticated");
                Ok(None)
            }
        }
    }

    async fn clear(&self) -> Result<(), SessionError> {
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(SessionError::Storage(format!("clear credentials: {e}"))),
        }
    }
}

/// In-memory credential store for tests and ephemeral sessions.
#[derive(Default)]
pub struct MemoryCredentialStore {
    inner: Mutex<Option<SessionCredentials>>,
}

impl MemoryCredentialStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Peek at the stored value without going through the trait.
    #[must_use]
    pub fn snapshot(&self) -> Option<SessionCredentials> {
        self.inner.lock().unwrap_or_else(std::sync::PoisonError::into_inner).clone()
    }
}

#[async_trait]
impl CredentialStore for MemoryCredentialStore {
    async fn save(&self, credentials: &SessionCredentials) -> Result<(), SessionError> {
        *self.inner.lock().unwrap_or_else(std::sync::PoisonError::into_inner) =
            Some(credentials.clone());
        Ok(())
    }

    async fn load(&self) -> Result<Option<SessionCredentials>, SessionError> {
        Ok(self.snapshot().filter(SessionCredentials::is_complete))
    }

    async fn clear(&self) -> Result<(), SessionError> {
        *self.inner.lock().unwrap_or_else(std::sync::PoisonError::into_inner) = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::sample_credentials;

    #[tokio::test]
    async fn file_store_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileCredentialStore::new(dir.path());
        let creds = sample_credentials("T1", "R1");

        store.save(&creds).await.unwrap();
        let loaded = store.load().await.unwrap();
        assert_eq!(loaded, Some(creds));
    }

    #[tokio::test]
    async fn missing_file_loads_as_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileCredentialStore::new(dir.path());
        assert_eq!(store.load().await.unwrap(), None);
    }

    #[tokio::test]
    async fn corrupt_file_loads_as_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileCredentialStore::new(dir.path());
        tokio::fs::write(store.path(), b"{not json").await.unwrap();

        assert_eq!(store.load().await.unwrap(), None);
    }

    #[tokio::test]
    async fn clear_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileCredentialStore::new(dir.path());

        store.clear().await.unwrap();
        store.save(&sample_credentials("T1", "R1")).await.unwrap();
        store.clear().await.unwrap();
        store.clear().await.unwrap();

        assert_eq!(store.load().await.unwrap(), None);
    }

    #[tokio::test]
    async fn incomplete_credentials_are_discarded_on_load() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileCredentialStore::new(dir.path());
        let mut creds = sample_credentials("T1", "R1");
        creds.refresh_token.clear();

        // Bypass save() to simulate an older on-disk document.
        tokio::fs::write(store.path(), serde_json::to_vec(&creds).unwrap()).await.unwrap();
        assert_eq!(store.load().await.unwrap(), None);
    }
}
