//! # RepairHub Infrastructure
//!
//! Transport implementations of the core and common seams.
//!
//! This crate contains:
//! - The retrying HTTP client wrapper
//! - The reauthenticating API client and its feature clients
//!   (repairs, reports, auth administration)
//! - The HTTP connectivity probe
//! - Configuration loading (environment + file)
//!
//! ## Architecture
//! - Implements traits defined in `repairhub-core` and `repairhub-common`
//! - Contains all "impure" transport code

pub mod api;
pub mod config;
pub mod connectivity;
pub mod http;

// Re-export commonly used items
pub use api::{
    ApiClient, ApiClientConfig, ApiError, AuthApi, RepairsApi, ReportsApi, SessionProvider,
};
pub use config::ClientConfig;
pub use connectivity::HttpConnectivityProbe;
pub use http::HttpClient;
