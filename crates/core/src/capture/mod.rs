//! Capture error normalization
//!
//! Camera/media capture failures arrive as platform error names (the
//! DOM-style `NotAllowedError`, `NotFoundError`, ...). This module folds
//! them into a small stable vocabulary the UI layer can message and branch
//! on, including whether retrying capture can plausibly succeed.

use serde::Serialize;
use thiserror::Error;

/// Stable identifier for a normalized capture failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CaptureErrorCode {
    PermissionDenied,
    DeviceNotFound,
    DeviceInUse,
    ConstraintsUnsupported,
    Aborted,
    InsecureContext,
    Unknown,
}

/// Normalized capture failure.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[error("{message}")]
pub struct CaptureError {
    pub code: CaptureErrorCode,
    pub message: String,
    /// Whether retrying capture (possibly with another device) can succeed
    /// without the user changing system settings first.
    pub recoverable: bool,
}

impl CaptureError {
    fn new(code: CaptureErrorCode, message: &str, recoverable: bool) -> Self {
        Self { code, message: message.to_string(), recoverable }
    }
}

/// Map a platform capture error name onto the stable vocabulary.
///
/// Unrecognized names fall through to [`CaptureErrorCode::Unknown`] with the
/// platform's own message preserved.
#[must_use]
pub fn normalize_capture_error(name: &str, platform_message: &str) -> CaptureError {
    match name {
        "NotAllowedError" | "PermissionDeniedError" => CaptureError::new(
            CaptureErrorCode::PermissionDenied,
            "Camera access was denied. Enable camera permission and try again.",
            false,
        ),
        "NotFoundError" | "DevicesNotFoundError" => CaptureError::new(
            CaptureErrorCode::DeviceNotFound,
            "No camera was found on this device.",
            false,
        ),
        "NotReadableError" | "TrackStartError" => CaptureError::new(
            CaptureErrorCode::DeviceInUse,
            "The camera is already in use by another application.",
            true,
        ),
        "OverconstrainedError" | "ConstraintNotSatisfiedError" => CaptureError::new(
            CaptureErrorCode::ConstraintsUnsupported,
            "The selected camera does not support the requested settings.",
            true,
        ),
        "AbortError" => CaptureError::new(
            CaptureErrorCode::Aborted,
            "Capture was interrupted. Try again.",
            true,
        ),
        "SecurityError" => CaptureError::new(
            CaptureErrorCode::InsecureContext,
            "Camera access requires a secure connection.",
            false,
        ),
        _ => CaptureError {
            code: CaptureErrorCode::Unknown,
            message: if platform_message.is_empty() {
                "Camera capture failed.".to_string()
            } else {
                platform_message.to_string()
            },
            recoverable: true,
        },
    }
}
