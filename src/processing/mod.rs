//! Cost data processing logic.
//!
//! This module contains the export pipeline:
//! - [`row_mapping`] - Raw query row to CSV row permutation
//! - [`executor`] - Per resource group query with backoff
//! - [`pipeline`] - Subscription and resource group walk, CSV write

pub mod executor;
pub mod pipeline;
pub mod row_mapping;

// Re-export public functions
pub use executor::{flatten_group, query_group, GroupUsage, RetryPolicy};
pub use pipeline::{collect_usage, run_export, ExportRows, ExportSummary};
pub use row_mapping::{map_raw_row, MappingError, Source, USAGE_ROW_SCHEMA};
