//! Session layer: credentials, storage, transport, and lifecycle.
//!
//! # Module Layering
//!
//! - [`types`]: `SessionCredentials` and the session error/event types
//! - [`store`]: `CredentialStore` trait plus file-backed and in-memory
//!   implementations (the durable client storage)
//! - [`client`]: `AuthTransport` trait and the reqwest-backed `AuthClient`
//!   that talks to the backend's auth endpoints
//! - [`manager`]: `SessionManager`, the two-state token store that owns every
//!   transition between Unauthenticated and Authenticated
//!
//! The manager is the only writer of session state; API clients read tokens
//! through it and ask it to refresh or clear the session.

pub mod client;
pub mod manager;
pub mod store;
pub mod types;

pub use client::{AuthClient, AuthTransport};
pub use manager::SessionManager;
pub use store::{CredentialStore, FileCredentialStore, MemoryCredentialStore};
pub use types::{SessionCredentials, SessionError, SessionEvent};
