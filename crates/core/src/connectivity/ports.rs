//! Port interfaces for connectivity probing
//!
//! These traits define the boundary between the connectivity business logic
//! and the HTTP infrastructure that actually reaches the backend.

use std::time::Duration;

use async_trait::async_trait;
use repairhub_domain::Result;

/// Trait for measuring reachability of the backend.
#[async_trait]
pub trait ConnectivityProbe: Send + Sync {
    /// Issue one lightweight request against the backend and return the
    /// observed round-trip latency. An error means the backend could not be
    /// reached within the probe timeout.
    async fn measure_latency(&self) -> Result<Duration>;
}
