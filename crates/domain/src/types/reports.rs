//! Reporting types
//!
//! Aggregates computed by the backend's reports endpoints. Mixed casing
//! mirrors the wire format: overview/financial blocks are camelCase, the
//! per-dimension rows are snake_case.

use serde::{Deserialize, Serialize};

/// Date window accepted by every reports endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DateRange {
    Week,
    Month,
    Quarter,
    Year,
}

impl DateRange {
    /// Query-string value for `?dateRange=`.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Week => "week",
            Self::Month => "month",
            Self::Quarter => "quarter",
            Self::Year => "year",
        }
    }
}

/// Status breakdown of all repairs in the window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OverviewStats {
    pub total: u64,
    pub pending: u64,
    pub in_progress: u64,
    pub completed: u64,
    pub issued: u64,
    pub cancelled: u64,
    pub waiting_parts: u64,
    pub completion_rate: f64,
}

/// Repairs per device type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceTypeStats {
    pub device_type: String,
    pub count: u64,
}

/// Repairs per brand.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BrandStats {
    pub brand: String,
    pub count: u64,
}

/// Repairs per calendar month (`month` is `YYYY-MM`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyStats {
    pub month: String,
    pub count: u64,
}

/// Estimated vs. actual cost aggregates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinancialStats {
    pub total_repairs: u64,
    pub completed_repairs: u64,
    pub total_estimated: f64,
    pub total_actual: f64,
    pub average_estimated: f64,
    pub average_actual: f64,
}

/// Everything the reports modal shows in one payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportsSummary {
    pub overview: OverviewStats,
    pub devices: Vec<DeviceTypeStats>,
    pub brands: Vec<BrandStats>,
    pub monthly: Vec<MonthlyStats>,
    pub financial: FinancialStats,
}
