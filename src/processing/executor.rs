//! Cost query execution for one resource group.
//!
//! Runs the query, flattens the rows and applies the backoff policy for
//! throttled, unavailable and failed queries.

use super::row_mapping::{map_raw_row, MappingError};
use crate::azure::{ApiError, CostApi, QueryDefinition};
use crate::models::{BillingPeriod, ResourceGroup, UsageRow};
use colored::Colorize;
use serde_json::Value;
use std::time::Duration;

/// Default pause after a failure the server gave no hint for.
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_secs(5);
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// How often and how long to back off on a failed cost query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts per resource group, at least 1.
    pub max_attempts: u32,
    /// Pause used when the response carries no retry hint.
    pub retry_delay: Duration,
}

/// Rows produced for one resource group.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GroupUsage {
    pub rows: Vec<UsageRow>,
    /// `None` when the query returned no usage (rows then holds the placeholder).
    pub subtotal: Option<UsageRow>,
}

impl GroupUsage {
    pub fn total_cost(&self) -> f64 {
        self.rows.iter().map(|r| r.cost).sum()
    }
}

/// Flatten raw query rows for `group`.
///
/// Non-empty results give one row per raw row plus a subtotal; an empty
/// result gives a single zero cost placeholder and no subtotal.
pub fn flatten_group(
    raw_rows: &[Vec<Value>],
    group: &ResourceGroup,
    period: &BillingPeriod,
) -> Result<GroupUsage, MappingError> {
    if raw_rows.is_empty() {
        return Ok(GroupUsage {
            rows: vec![UsageRow::placeholder(group, period)],
            subtotal: None,
        });
    }

    let mut rows = Vec::with_capacity(raw_rows.len());
    let mut cost = 0.0;
    for raw in raw_rows {
        let row = map_raw_row(raw, group, period)?;
        cost += row.cost;
        rows.push(row);
    }

    let subtotal = rows.last().map(|last| {
        UsageRow::subtotal(
            &last.resource_id,
            &group.name,
            period,
            cost,
            &last.billing_currency,
        )
    });
    Ok(GroupUsage { rows, subtotal })
}

/// Query and flatten one resource group, backing off and retrying on failure.
///
/// Every failed attempt sleeps first: the server's retry hint for 429/503,
/// else `policy.retry_delay`. After `policy.max_attempts` the last error is
/// returned and the caller skips the group. Rows that cannot be mapped fail
/// the same way every time, so they end the group after the first attempt.
pub async fn query_group<A: CostApi + ?Sized>(
    api: &A,
    subscription_id: &str,
    group: &ResourceGroup,
    period: &BillingPeriod,
    policy: &RetryPolicy,
) -> Result<GroupUsage, ApiError> {
    let query = QueryDefinition::for_resource_group(&group.name, period);
    let max_attempts = policy.max_attempts.max(1);
    let mut attempt = 1;

    loop {
        let err = match api.query_usage(subscription_id, &query).await {
            Ok(raw_rows) => match flatten_group(&raw_rows, group, period) {
                Ok(usage) => return Ok(usage),
                Err(e) => {
                    let err = ApiError::Decode(format!("resource group {}: {e}", group.name));
                    log::error!("Error: {err}");
                    log::info!("Waiting for {} seconds...", policy.retry_delay.as_secs());
                    tokio::time::sleep(policy.retry_delay).await;
                    return Err(err);
                }
            },
            Err(e) => e,
        };

        let wait = err.backoff(policy.retry_delay);
        match &err {
            ApiError::RateLimited { remaining, .. } => {
                log::warn!(
                    "Remaining number of requests for this client type: {}",
                    remaining.as_deref().unwrap_or("unknown")
                );
                log::warn!(
                    "{} {}/{}. Waiting for {} seconds...",
                    "Rate limited".on_red(),
                    subscription_id,
                    group.name,
                    wait.as_secs()
                );
            }
            ApiError::ServiceUnavailable { .. } => {
                log::warn!(
                    "{} {}/{}. Waiting for {} seconds...",
                    "Service Unavailable".on_red(),
                    subscription_id,
                    group.name,
                    wait.as_secs()
                );
            }
            other => {
                log::error!("Error: {other}");
                log::info!("Waiting for {} seconds...", wait.as_secs());
            }
        }
        tokio::time::sleep(wait).await;

        if attempt >= max_attempts {
            log::warn!(
                "giving up on {}/{} after {attempt} attempt(s)",
                subscription_id,
                group.name
            );
            return Err(err);
        }
        attempt += 1;
        log::info!(
            "retry {}/{} attempt {attempt}/{max_attempts}",
            subscription_id,
            group.name
        );
    }
}
