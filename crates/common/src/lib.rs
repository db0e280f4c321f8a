//! Shared client utilities for RepairHub crates.
//!
//! - `session`: session credentials, durable credential storage, the auth
//!   transport, and the session manager (token store state machine)
//! - `prefs`: durable UI preference storage
//! - `testing`: in-memory doubles for the session seams

#![forbid(unsafe_code)]
#![warn(rust_2018_idioms)]

pub mod prefs;
pub mod session;
pub mod testing;

// Re-export commonly used types for convenience
pub use prefs::PreferenceStore;
pub use session::{
    AuthClient, AuthTransport, CredentialStore, FileCredentialStore, MemoryCredentialStore,
    SessionCredentials, SessionError, SessionEvent, SessionManager,
};
