//! # RepairHub Core
//!
//! Pure business logic layer - no infrastructure dependencies.
//!
//! This crate contains:
//! - Connectivity state tracking and quality assessment
//! - Capture (camera/media) error normalization
//! - Port interfaces implemented by `repairhub-infra`
//!
//! ## Architecture Principles
//! - Only depends on `repairhub-domain`
//! - No HTTP or platform code
//! - All external dependencies via traits

pub mod capture;
pub mod connectivity;

pub use capture::{normalize_capture_error, CaptureError, CaptureErrorCode};
pub use connectivity::ports::ConnectivityProbe;
pub use connectivity::{ConnectionQuality, ConnectionState, ConnectivityMonitor};
