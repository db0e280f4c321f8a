//! Domain-level constants
//!
//! Centralized location for values shared by the session layer and the API
//! clients.

/// 401 error codes that mean the access token itself is stale.
///
/// Only these codes trigger the refresh-and-retry cycle; any other 401 (wrong
/// credentials, insufficient permission) is surfaced unchanged.
pub const STALE_TOKEN_CODES: &[&str] = &["TOKEN_EXPIRED", "INVALID_TOKEN"];

// Durable storage keys (kept byte-identical to the backend's web client so a
// shared storage directory stays interoperable).
pub const KEY_ACCESS_TOKEN: &str = "accessToken";
pub const KEY_REFRESH_TOKEN: &str = "refreshToken";
pub const KEY_USER: &str = "user";
pub const KEY_PAGE_SIZE: &str = "pageSize";
pub const KEY_CURRENT_PAGE: &str = "currentPage";
pub const KEY_DEFAULT_CAMERA: &str = "defaultCameraDeviceId";

// Pagination defaults
pub const DEFAULT_PAGE_SIZE: u32 = 20;
pub const DEFAULT_PAGE: u32 = 1;

// Connectivity probing
pub const PROBE_TIMEOUT_SECS: u64 = 5;
pub const PROBE_MIN_INTERVAL_SECS: u64 = 5;
pub const PROBE_GOOD_THRESHOLD_MS: u64 = 2_000;
