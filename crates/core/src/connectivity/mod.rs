//! Connectivity tracking
//!
//! Keeps a single source of truth for "are we online, and how good is the
//! link", fed by platform online/offline signals and by active latency
//! probes against the backend.

pub mod ports;
pub mod service;

pub use ports::ConnectivityProbe;
pub use service::{ConnectionQuality, ConnectionState, ConnectivityMonitor};
