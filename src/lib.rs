//! Export Azure cost and usage for every subscription and resource group a
//! credential can see into one CSV per billing period.

pub mod azure;
pub mod config;
pub mod logging;
pub mod models;
pub mod output;
pub mod processing;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use config::{Cli, Config};
pub use processing::{collect_usage, run_export, ExportSummary};
