//! Reports feature client
//!
//! Endpoint map for the `/reports` resource. Every query is parameterized by
//! a [`DateRange`] window; payload shapes live in the domain crate.

use std::sync::Arc;

use repairhub_domain::{
    BrandStats, DateRange, DeviceTypeStats, FinancialStats, MonthlyStats, OverviewStats,
    ReportsSummary,
};

use super::client::ApiClient;
use super::errors::ApiError;

/// Client for the `/reports` resource.
pub struct ReportsApi {
    client: Arc<ApiClient>,
}

impl ReportsApi {
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self { client }
    }

    /// Status counts and completion rate for the window.
    pub async fn overview(&self, range: DateRange) -> Result<OverviewStats, ApiError> {
        self.client.get(&Self::path("", range)).await
    }

    /// Repair counts grouped by device type.
    pub async fn devices(&self, range: DateRange) -> Result<Vec<DeviceTypeStats>, ApiError> {
        self.client.get(&Self::path("/devices", range)).await
    }

    /// Repair counts grouped by brand.
    pub async fn brands(&self, range: DateRange) -> Result<Vec<BrandStats>, ApiError> {
        self.client.get(&Self::path("/brands", range)).await
    }

    /// Repair counts per month.
    pub async fn monthly(&self, range: DateRange) -> Result<Vec<MonthlyStats>, ApiError> {
        self.client.get(&Self::path("/monthly", range)).await
    }

    /// Estimated/actual revenue aggregates.
    pub async fn financial(&self, range: DateRange) -> Result<FinancialStats, ApiError> {
        self.client.get(&Self::path("/financial", range)).await
    }

    /// Everything above in one response.
    pub async fn summary(&self, range: DateRange) -> Result<ReportsSummary, ApiError> {
        self.client.get(&Self::path("/summary", range)).await
    }

    fn path(endpoint: &str, range: DateRange) -> String {
        format!("/reports{endpoint}?dateRange={}", range.as_str())
    }
}
