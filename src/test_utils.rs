//! Test utilities for azure-cost-export.
//!
//! Provides an in-memory [`CostApi`] and small data factories shared by unit
//! and integration tests.
//!
//! # Usage
//!
//! ```rust,ignore
//! use azure_cost_export::test_utils::*;
//!
//! let api = StubCostApi::new()
//!     .with_subscription("s1", vec![ResourceGroup::new("rg-app")])
//!     .with_query_rows("s1", "rg-app", vec![raw_usage_row(1.5, "/r/vm1", "USD")]);
//! ```

use crate::azure::{ApiError, CostApi, QueryDefinition};
use crate::models::{BillingPeriod, ResourceGroup};
use async_trait::async_trait;
use chrono::DateTime;
use serde_json::{json, Value};
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

type QueryOutcome = Result<Vec<Vec<Value>>, ApiError>;

/// Scripted [`CostApi`].
///
/// Each `(subscription, group)` pair has a queue of query outcomes consumed
/// in order; once the queue is empty the query returns no rows.
#[derive(Default)]
pub struct StubCostApi {
    subscriptions: Vec<String>,
    groups: HashMap<String, Vec<ResourceGroup>>,
    failing_subscriptions: HashMap<String, u16>,
    outcomes: Mutex<HashMap<(String, String), VecDeque<QueryOutcome>>>,
    queries: Mutex<Vec<(String, String)>>,
}

impl StubCostApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_subscription(mut self, id: &str, groups: Vec<ResourceGroup>) -> Self {
        self.subscriptions.push(id.to_string());
        self.groups.insert(id.to_string(), groups);
        self
    }

    /// Listing the resource groups of `id` fails with `status`.
    pub fn with_failing_subscription(mut self, id: &str, status: u16) -> Self {
        self.subscriptions.push(id.to_string());
        self.failing_subscriptions.insert(id.to_string(), status);
        self
    }

    pub fn with_query_rows(self, subscription: &str, group: &str, rows: Vec<Vec<Value>>) -> Self {
        self.push_outcome(subscription, group, Ok(rows))
    }

    pub fn with_query_error(self, subscription: &str, group: &str, err: ApiError) -> Self {
        self.push_outcome(subscription, group, Err(err))
    }

    fn push_outcome(self, subscription: &str, group: &str, outcome: QueryOutcome) -> Self {
        self.outcomes
            .lock()
            .unwrap()
            .entry((subscription.to_string(), group.to_string()))
            .or_default()
            .push_back(outcome);
        self
    }

    /// Number of cost queries issued for one resource group.
    pub fn query_count(&self, subscription: &str, group: &str) -> usize {
        self.queries
            .lock()
            .unwrap()
            .iter()
            .filter(|(s, g)| s == subscription && g == group)
            .count()
    }

    /// Every `(subscription, group)` queried, in order.
    pub fn queries(&self) -> Vec<(String, String)> {
        self.queries.lock().unwrap().clone()
    }

    pub fn rate_limited(retry_after: u64) -> ApiError {
        ApiError::RateLimited {
            url: "stub".to_string(),
            retry_after: Some(retry_after),
            remaining: Some("0".to_string()),
        }
    }

    pub fn unavailable(retry_after: u64) -> ApiError {
        ApiError::ServiceUnavailable {
            url: "stub".to_string(),
            retry_after: Some(retry_after),
        }
    }

    pub fn http_error(status: u16) -> ApiError {
        ApiError::Http {
            status,
            url: "stub".to_string(),
            message: "stubbed failure".to_string(),
        }
    }
}

#[async_trait]
impl CostApi for StubCostApi {
    async fn subscription_ids(&self) -> Result<Vec<String>, ApiError> {
        Ok(self.subscriptions.clone())
    }

    async fn resource_groups(
        &self,
        subscription_id: &str,
    ) -> Result<Vec<ResourceGroup>, ApiError> {
        if let Some(status) = self.failing_subscriptions.get(subscription_id) {
            return Err(Self::http_error(*status));
        }
        Ok(self
            .groups
            .get(subscription_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn query_usage(
        &self,
        subscription_id: &str,
        query: &QueryDefinition,
    ) -> Result<Vec<Vec<Value>>, ApiError> {
        let group = query.resource_group().unwrap_or_default().to_string();
        let key = (subscription_id.to_string(), group);
        self.queries.lock().unwrap().push(key.clone());
        self.outcomes
            .lock()
            .unwrap()
            .get_mut(&key)
            .and_then(VecDeque::pop_front)
            .unwrap_or_else(|| Ok(Vec::new()))
    }
}

/// September 2023, the reference billing period.
pub fn september_2023() -> BillingPeriod {
    BillingPeriod::new(
        DateTime::parse_from_rfc3339("2023-09-01T00:00:00+00:00").unwrap(),
        DateTime::parse_from_rfc3339("2023-09-30T00:00:00+00:00").unwrap(),
    )
    .unwrap()
}

/// A raw query row in the API's positional layout.
pub fn raw_usage_row(cost: f64, resource_id: &str, currency: &str) -> Vec<Value> {
    vec![
        json!(cost),
        json!(20230901),
        json!(resource_id),
        json!("00000000-0000-0000-0000-000000000001"),
        json!("z-env-production"),
        json!("Virtual Machines"),
        json!("D2s v3"),
        json!("Virtual Machines"),
        json!("Dsv3 Series"),
        json!("australiaeast"),
        json!("microsoft.compute/virtualmachines"),
        json!("Usage"),
        json!(currency),
    ]
}
