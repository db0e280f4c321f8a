//! Domain types and models

pub mod envelope;
pub mod repair;
pub mod reports;
pub mod user;

pub use envelope::ApiEnvelope;
pub use repair::{Repair, RepairHistoryEntry, RepairPhoto, RepairStatus};
pub use reports::{
    BrandStats, DateRange, DeviceTypeStats, FinancialStats, MonthlyStats, OverviewStats,
    ReportsSummary,
};
pub use user::{AuthSession, Role, UserProfile};
