//! # RepairHub Domain
//!
//! Business domain types and models for the RepairHub client.
//!
//! This crate contains:
//! - Domain data types (Repair, UserProfile, report statistics)
//! - Domain error types and Result definitions
//! - The backend's uniform response envelope
//! - Domain constants (stale-token codes, storage keys)
//!
//! ## Architecture
//! - No dependencies on other RepairHub crates
//! - Only external dependencies allowed
//! - Pure domain models and data structures

pub mod constants;
pub mod errors;
pub mod types;

// Re-export commonly used items
pub use errors::*;
pub use types::*;
