//! The three Azure calls the export depends on.

use super::{ApiError, QueryDefinition};
use crate::models::ResourceGroup;
use async_trait::async_trait;
use serde_json::Value;

/// Subscription listing, resource group listing and cost query.
///
/// [`super::ArmClient`] talks to Azure; tests use an in-memory stub.
#[async_trait]
pub trait CostApi: Send + Sync {
    /// Ids of every subscription the credential can see, in listing order.
    async fn subscription_ids(&self) -> Result<Vec<String>, ApiError>;

    /// Resource groups of one subscription, in listing order.
    async fn resource_groups(&self, subscription_id: &str) -> Result<Vec<ResourceGroup>, ApiError>;

    /// Raw rows of a cost query scoped to `subscription_id`, all pages joined.
    async fn query_usage(
        &self,
        subscription_id: &str,
        query: &QueryDefinition,
    ) -> Result<Vec<Vec<Value>>, ApiError>;
}
