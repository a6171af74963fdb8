//! Azure Resource Manager interaction.
//!
//! This module handles all Azure-related operations:
//! - [`auth`] - Bearer tokens from the ambient credential chain
//! - [`api`] - The [`CostApi`] seam the pipeline is written against
//! - [`arm`] - REST client for subscriptions, resource groups and cost queries
//! - [`query`] - Cost Management query request/response shapes
//! - [`error`] - Classification of failed calls

mod api;
mod arm;
mod auth;
mod error;
mod query;

// Re-export public types and functions
pub use api::CostApi;
pub use arm::{ArmClient, DEFAULT_MANAGEMENT_URL, DEFAULT_TIMEOUT};
pub use auth::{IdentityToken, StaticToken, TokenSource, MANAGEMENT_SCOPE};
pub use error::{ApiError, COST_REMAINING_HEADER, COST_RETRY_AFTER_HEADER, RETRY_AFTER_HEADER};
pub use query::{QueryDefinition, QueryProperties, QueryResult, GROUPING_DIMENSIONS};
