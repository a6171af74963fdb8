//! Domain models for the Azure cost export.
//!
//! This module contains the core data structures used throughout the application:
//! - [`BillingPeriod`] - Date range of one export
//! - [`ResourceGroup`] - Azure resource group with its tags
//! - [`UsageRow`] and [`Column`] - Flattened CSV row and its columns

mod billing_period;
mod resource_group;
mod usage_row;

// Re-export public types
pub use billing_period::BillingPeriod;
pub use resource_group::ResourceGroup;
pub use usage_row::{csv_header, Column, UsageRow};
