//! Reauthenticating API client and feature clients.
//!
//! [`ApiClient`] owns the one cross-cutting behavior of the transport layer:
//! attaching the bearer token and running the refresh-and-retry cycle on
//! stale-token 401s. The feature clients ([`RepairsApi`], [`ReportsApi`],
//! [`AuthApi`]) are thin endpoint maps on top of it and carry no retry
//! logic of their own.

pub mod auth;
pub mod client;
pub mod errors;
pub mod repairs;
pub mod reports;
pub mod session;

pub use auth::{AuthApi, CreatedUser, NewUser, UserUpdate};
pub use client::{ApiClient, ApiClientConfig};
pub use errors::{ApiError, ApiErrorCategory};
pub use repairs::{CreatedRepair, PhotoUpload, RepairFilter, RepairsApi};
pub use reports::ReportsApi;
pub use session::SessionProvider;
