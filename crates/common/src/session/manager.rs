//! Session manager: the token store state machine.
//!
//! Two states: Unauthenticated (no credentials) and Authenticated (tokens +
//! user present). Every transition persists through the [`CredentialStore`]
//! before it becomes observable in memory, so a retried request can never
//! read a token older than the one a completed refresh produced.

use std::sync::Arc;

use repairhub_domain::UserProfile;
use tokio::sync::{watch, Mutex, RwLock};
use tracing::{debug, info, warn};

use super::client::AuthTransport;
use super::store::CredentialStore;
use super::types::{SessionCredentials, SessionError, SessionEvent};

/// Owns the session credentials and every lifecycle transition.
///
/// Cheap to share: hand out `Arc<SessionManager<..>>` to API clients.
pub struct SessionManager<T: AuthTransport, S: CredentialStore> {
    transport: Arc<T>,
    store: Arc<S>,
    current: RwLock<Option<SessionCredentials>>,
    /// Serializes refresh attempts so concurrent 401s share one refresh call.
    refresh_gate: Mutex<()>,
    events: watch::Sender<SessionEvent>,
}

impl<T: AuthTransport, S: CredentialStore> SessionManager<T, S> {
    #[must_use]
    pub fn new(transport: T, store: Arc<S>) -> Self {
        let (events, _) = watch::channel(SessionEvent::LoggedOut);
        Self {
            transport: Arc::new(transport),
            store,
            current: RwLock::new(None),
            refresh_gate: Mutex::new(()),
            events,
        }
    }

    /// Derive initial state from durable storage. Call once on startup.
    ///
    /// Returns `true` when stored credentials were found and loaded.
    ///
    /// # Errors
    /// Returns an error only if storage access itself fails; absent or
    /// unreadable credentials simply leave the session Unauthenticated.
    pub async fn initialize(&self) -> Result<bool, SessionError> {
        match self.store.load().await? {
            Some(credentials) => {
                *self.current.write().await = Some(credentials);
                let _ = self.events.send(SessionEvent::Updated);
                info!("session restored from durable storage");
                Ok(true)
            }
            None => {
                debug!("no stored session, starting unauthenticated");
                Ok(false)
            }
        }
    }

    /// Log in with username/password. On success the session transitions to
    /// Authenticated and the credentials are persisted.
    ///
    /// # Errors
    /// `InvalidCredentials` if the backend rejects the login; `Transport` /
    /// `Storage` for wire or persistence failures.
    pub async fn login(
        &self,
        username: &str,
        password: &str,
    ) -> Result<UserProfile, SessionError> {
        let credentials = self.transport.login(username, password).await?;
        let user = credentials.user.clone();

        self.install(credentials).await?;
        info!(username, "login successful");

        Ok(user)
    }

    /// Refresh the access token using the held refresh token.
    ///
    /// # Errors
    /// `NotAuthenticated` when no credentials are held, `RefreshFailed` when
    /// the backend rejects the refresh token.
    pub async fn refresh(&self) -> Result<(), SessionError> {
        let observed = self
            .access_token()
            .await
            .ok_or(SessionError::NotAuthenticated)?;
        self.refresh_if_stale(&observed).await
    }

    /// Refresh only if `observed` is still the current access token.
    ///
    /// This is the single-flight entry point for callers reacting to a
    /// stale-token 401: concurrent callers that saw the same stale token
    /// share one wire refresh, and a caller whose 401 arrives after the
    /// rotation returns immediately without spending the new refresh token.
    ///
    /// On refresh failure the session is cleared (logout) before the error is
    /// returned.
    ///
    /// # Errors
    /// Same as [`refresh`](Self::refresh).
    pub async fn refresh_if_stale(&self, observed: &str) -> Result<(), SessionError> {
        let _gate = self.refresh_gate.lock().await;

        let refresh_token = match &*self.current.read().await {
            Some(credentials) if credentials.access_token != observed => {
                debug!("token already rotated, skipping refresh");
                return Ok(());
            }
            Some(credentials) => credentials.refresh_token.clone(),
            None => return Err(SessionError::NotAuthenticated),
        };

        match self.transport.refresh(&refresh_token).await {
            Ok(rotated) => {
                // A logout (or a fresh login) may have raced the wire call;
                // the rotated tokens belong to the session that no longer
                // exists, so they are discarded rather than installed.
                let still_current = self
                    .current
                    .read()
                    .await
                    .as_ref()
                    .is_some_and(|credentials| credentials.access_token == observed);
                if !still_current {
                    debug!("session changed during refresh, discarding rotated tokens");
                    return Err(SessionError::NotAuthenticated);
                }
                self.install(rotated).await?;
                info!("access token refreshed");
                Ok(())
            }
            Err(err) => {
                warn!(error = %err, "token refresh failed, clearing session");
                self.clear().await;
                Err(err)
            }
        }
    }

    /// Log out: best-effort server-side revocation, then clear memory and
    /// durable storage. Idempotent — calling while Unauthenticated is a no-op.
    pub async fn logout(&self) -> Result<(), SessionError> {
        let refresh_token = self.current.read().await.as_ref().map(|c| c.refresh_token.clone());

        if let Some(token) = refresh_token {
            if let Err(err) = self.transport.logout(&token).await {
                // Local logout proceeds even when revocation cannot be delivered.
                debug!(error = %err, "server-side logout failed");
            }
        }

        self.clear().await;
        info!("logged out");
        Ok(())
    }

    /// Replace the cached user profile (e.g. after a profile edit) and persist.
    ///
    /// # Errors
    /// `NotAuthenticated` when no session is held.
    pub async fn update_user(&self, user: UserProfile) -> Result<(), SessionError> {
        let updated = {
            let guard = self.current.read().await;
            let mut credentials =
                guard.clone().ok_or(SessionError::NotAuthenticated)?;
            credentials.user = user;
            credentials
        };
        self.install(updated).await
    }

    /// Current access token, if authenticated.
    pub async fn access_token(&self) -> Option<String> {
        self.current.read().await.as_ref().map(|c| c.access_token.clone())
    }

    /// Current refresh token, if authenticated.
    pub async fn refresh_token(&self) -> Option<String> {
        self.current.read().await.as_ref().map(|c| c.refresh_token.clone())
    }

    /// Full credential snapshot.
    pub async fn credentials(&self) -> Option<SessionCredentials> {
        self.current.read().await.clone()
    }

    /// Current user profile, if authenticated.
    pub async fn current_user(&self) -> Option<UserProfile> {
        self.current.read().await.as_ref().map(|c| c.user.clone())
    }

    pub async fn is_authenticated(&self) -> bool {
        self.current.read().await.is_some()
    }

    /// Subscribe to session lifecycle events.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    /// Clear the session without a server round-trip. Used by the API client
    /// when a 401 is unrecoverable.
    pub async fn force_logout(&self) {
        self.clear().await;
    }

    /// Persist first, then publish to memory: transitions into Authenticated
    /// are never observable before durable storage has them.
    async fn install(&self, credentials: SessionCredentials) -> Result<(), SessionError> {
        self.store.save(&credentials).await?;
        *self.current.write().await = Some(credentials);
        let _ = self.events.send(SessionEvent::Updated);
        Ok(())
    }

    async fn clear(&self) {
        if let Err(err) = self.store.clear().await {
            warn!(error = %err, "failed to clear credential storage");
        }
        *self.current.write().await = None;
        let _ = self.events.send(SessionEvent::LoggedOut);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::store::MemoryCredentialStore;
    use crate::testing::{sample_credentials, MockAuthTransport};

    fn manager_with(
        transport: MockAuthTransport,
    ) -> (SessionManager<MockAuthTransport, MemoryCredentialStore>, Arc<MemoryCredentialStore>)
    {
        let store = Arc::new(MemoryCredentialStore::new());
        (SessionManager::new(transport, store.clone()), store)
    }

    #[tokio::test]
    async fn starts_unauthenticated() {
        let (manager, _) = manager_with(MockAuthTransport::new());
        assert!(!manager.is_authenticated().await);
        assert_eq!(manager.access_token().await, None);
    }

    #[tokio::test]
    async fn login_persists_and_transitions() {
        let transport =
            MockAuthTransport::new().with_login(Ok(sample_credentials("T1", "R1")));
        let (manager, store) = manager_with(transport);

        let user = manager.login("tech1", "pw").await.unwrap();
        assert_eq!(user.username, "tech1");
        assert!(manager.is_authenticated().await);
        assert_eq!(store.snapshot().unwrap().access_token, "T1");
    }

    #[tokio::test]
    async fn initialize_restores_stored_session() {
        let store = Arc::new(MemoryCredentialStore::new());
        store.save(&sample_credentials("T1", "R1")).await.unwrap();

        let manager = SessionManager::new(MockAuthTransport::new(), store);
        assert!(manager.initialize().await.unwrap());
        assert_eq!(manager.access_token().await, Some("T1".into()));
    }

    #[tokio::test]
    async fn refresh_rotates_both_tokens() {
        let transport = MockAuthTransport::new()
            .with_login(Ok(sample_credentials("T1", "R1")))
            .with_refresh(Ok(sample_credentials("T2", "R2")));
        let (manager, store) = manager_with(transport);

        manager.login("tech1", "pw").await.unwrap();
        manager.refresh().await.unwrap();

        assert_eq!(manager.access_token().await, Some("T2".into()));
        assert_eq!(manager.refresh_token().await, Some("R2".into()));
        assert_eq!(store.snapshot().unwrap().refresh_token, "R2");
    }

    #[tokio::test]
    async fn refresh_failure_clears_session() {
        let transport = MockAuthTransport::new()
            .with_login(Ok(sample_credentials("T1", "R1")))
            .with_refresh(Err(SessionError::RefreshFailed("revoked".into())));
        let (manager, store) = manager_with(transport);

        manager.login("tech1", "pw").await.unwrap();
        let err = manager.refresh().await.unwrap_err();

        assert!(matches!(err, SessionError::RefreshFailed(_)));
        assert!(!manager.is_authenticated().await);
        assert!(store.snapshot().is_none());
    }

    #[tokio::test]
    async fn refresh_without_session_is_not_authenticated() {
        let (manager, _) = manager_with(MockAuthTransport::new());
        let err = manager.refresh().await.unwrap_err();
        assert!(matches!(err, SessionError::NotAuthenticated));
    }

    #[tokio::test]
    async fn concurrent_refreshes_share_one_wire_call() {
        let transport = MockAuthTransport::new()
            .with_login(Ok(sample_credentials("T1", "R1")))
            .with_refresh(Ok(sample_credentials("T2", "R2")));
        let (manager, _) = manager_with(transport);
        let manager = Arc::new(manager);

        manager.login("tech1", "pw").await.unwrap();

        // Everyone reacts to the same stale token, as concurrent 401
        // handlers would.
        let tasks: Vec<_> = (0..4)
            .map(|_| {
                let manager = manager.clone();
                tokio::spawn(async move { manager.refresh_if_stale("T1").await })
            })
            .collect();
        for task in tasks {
            task.await.unwrap().unwrap();
        }

        assert_eq!(manager.transport.refresh_calls(), 1);
        assert_eq!(manager.access_token().await, Some("T2".into()));
    }

    /// Transport whose refresh call stalls long enough for other lifecycle
    /// calls to interleave with it.
    struct SlowRefreshTransport {
        delay: std::time::Duration,
    }

    #[async_trait::async_trait]
    impl AuthTransport for SlowRefreshTransport {
        async fn login(
            &self,
            _username: &str,
            _password: &str,
        ) -> Result<SessionCredentials, SessionError> {
            Ok(sample_credentials("T1", "R1"))
        }

        async fn refresh(&self, _refresh_token: &str) -> Result<SessionCredentials, SessionError> {
            tokio::time::sleep(self.delay).await;
            Ok(sample_credentials("T2", "R2"))
        }

        async fn logout(&self, _refresh_token: &str) -> Result<(), SessionError> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn logout_during_refresh_stays_logged_out() {
        let store = Arc::new(MemoryCredentialStore::new());
        let transport = SlowRefreshTransport { delay: std::time::Duration::from_millis(200) };
        let manager = Arc::new(SessionManager::new(transport, store.clone()));

        manager.login("tech1", "pw").await.unwrap();

        let refreshing = tokio::spawn({
            let manager = manager.clone();
            async move { manager.refresh_if_stale("T1").await }
        });

        // Log out while the refresh is still on the wire.
        tokio::time::sleep(std::time::Duration::from_millis(50)).await;
        manager.logout().await.unwrap();

        let outcome = refreshing.await.unwrap();
        assert!(matches!(outcome, Err(SessionError::NotAuthenticated)));

        // The rotated tokens must not reach memory or durable storage.
        assert!(!manager.is_authenticated().await);
        assert_eq!(manager.access_token().await, None);
        assert!(store.snapshot().is_none());
    }

    #[tokio::test]
    async fn logout_twice_is_idempotent() {
        let transport =
            MockAuthTransport::new().with_login(Ok(sample_credentials("T1", "R1")));
        let (manager, store) = manager_with(transport);

        manager.login("tech1", "pw").await.unwrap();
        manager.logout().await.unwrap();
        manager.logout().await.unwrap();

        assert!(!manager.is_authenticated().await);
        assert!(store.snapshot().is_none());
        // Server-side revocation happened once, for the held token.
        assert_eq!(manager.transport.logout_calls(), 1);
    }

    #[tokio::test]
    async fn events_track_transitions() {
        let transport =
            MockAuthTransport::new().with_login(Ok(sample_credentials("T1", "R1")));
        let (manager, _) = manager_with(transport);
        let mut events = manager.subscribe();

        assert_eq!(*events.borrow(), SessionEvent::LoggedOut);

        manager.login("tech1", "pw").await.unwrap();
        events.changed().await.unwrap();
        assert_eq!(*events.borrow(), SessionEvent::Updated);

        manager.logout().await.unwrap();
        events.changed().await.unwrap();
        assert_eq!(*events.borrow(), SessionEvent::LoggedOut);
    }
}
