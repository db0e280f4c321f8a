//! Repair record types
//!
//! The backend owns these records; the client caches and edits them through
//! the repairs API. Field names match the backend's snake_case wire format.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Repair workflow status.
///
/// A fixed set of values with no client-enforced transition rules: any value
/// may be set via the status-update call, the backend decides what it accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RepairStatus {
    Pending,
    InProgress,
    WaitingParts,
    Completed,
    Issued,
    Cancelled,
}

impl RepairStatus {
    /// Wire representation, useful for query strings and status patches.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::InProgress => "in_progress",
            Self::WaitingParts => "waiting_parts",
            Self::Completed => "completed",
            Self::Issued => "issued",
            Self::Cancelled => "cancelled",
        }
    }
}

/// Photo attachment on a repair record.
///
/// `url` is either a backend-relative path (persisted photo) or a data URL
/// for a capture that has not been uploaded yet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RepairPhoto {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub caption: Option<String>,
}

/// Repair record: device intake, client info, cost and status fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Repair {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub device_type: String,
    pub brand: String,
    pub model: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub serial_number: Option<String>,
    pub client_name: String,
    pub client_phone: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_email: Option<String>,
    pub issue_description: String,
    pub repair_status: RepairStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub estimated_cost: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub actual_cost: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parts_cost: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub labor_cost: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub photos: Vec<RepairPhoto>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
}

/// One status-change entry in a repair's audit trail.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RepairHistoryEntry {
    pub id: i64,
    pub repair_id: i64,
    pub repair_status: RepairStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub changed_by: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Repair {
    /// Minimal intake record for a new repair; everything else defaults.
    #[must_use]
    pub fn intake(
        device_type: impl Into<String>,
        brand: impl Into<String>,
        model: impl Into<String>,
        client_name: impl Into<String>,
        client_phone: impl Into<String>,
        issue_description: impl Into<String>,
    ) -> Self {
        Self {
            id: None,
            device_type: device_type.into(),
            brand: brand.into(),
            model: model.into(),
            serial_number: None,
            client_name: client_name.into(),
            client_phone: client_phone.into(),
            client_email: None,
            issue_description: issue_description.into(),
            repair_status: RepairStatus::Pending,
            estimated_cost: None,
            actual_cost: None,
            parts_cost: None,
            labor_cost: None,
            notes: None,
            photos: Vec::new(),
            created_at: None,
            updated_at: None,
            completed_at: None,
        }
    }
}
