//! Export pipeline: subscriptions, resource groups, cost queries, CSV.

use super::executor::{query_group, RetryPolicy};
use crate::azure::CostApi;
use crate::config::Config;
use crate::models::{BillingPeriod, UsageRow};
use crate::output::{prepare_output_dir, resolve_output_path, write_billing_csv};
use std::error::Error;
use std::path::PathBuf;

/// Rows accumulated over a run, in subscription × resource group order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExportRows {
    pub usage: Vec<UsageRow>,
    pub subtotals: Vec<UsageRow>,
}

/// What a run did, for the closing report.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExportSummary {
    pub subscriptions: usize,
    pub resource_groups: usize,
    pub usage_rows: usize,
    pub subtotal_rows: usize,
    pub total_cost: f64,
    /// `(subscription_id, resource_group)` pairs that produced no rows.
    pub failed_groups: Vec<(String, String)>,
    pub output_path: PathBuf,
}

/// Walk every subscription and resource group and collect their rows.
///
/// Listing failures abort the run; a cost query failure only drops that
/// resource group.
pub async fn collect_usage<A: CostApi + ?Sized>(
    api: &A,
    period: &BillingPeriod,
    policy: &RetryPolicy,
) -> Result<(ExportRows, ExportSummary), Box<dyn Error>> {
    let mut rows = ExportRows::default();
    let mut summary = ExportSummary::default();
    let mut count = 0;

    let subscription_ids = api.subscription_ids().await?;
    log::info!("Found {} subscriptions", subscription_ids.len());
    summary.subscriptions = subscription_ids.len();

    for subscription_id in &subscription_ids {
        let groups = api.resource_groups(subscription_id).await?;
        log::info!(
            "subscription {subscription_id}: {} resource groups",
            groups.len()
        );

        for group in &groups {
            summary.resource_groups += 1;
            match query_group(api, subscription_id, group, period, policy).await {
                Ok(usage) => {
                    count += 1;
                    log::info!("{count:4} {}", group.name);
                    summary.total_cost += usage.total_cost();
                    rows.usage.extend(usage.rows);
                    rows.subtotals.extend(usage.subtotal);
                }
                Err(e) => {
                    log::warn!("skipped {subscription_id}/{}: {e}", group.name);
                    summary
                        .failed_groups
                        .push((subscription_id.clone(), group.name.clone()));
                }
            }
        }
    }

    summary.usage_rows = rows.usage.len();
    summary.subtotal_rows = rows.subtotals.len();
    Ok((rows, summary))
}

/// Run the whole export and write the CSV.
///
/// The output directory is created before any query runs, so a bad path
/// fails the run without spending cost-query quota.
pub async fn run_export<A: CostApi + ?Sized>(
    api: &A,
    config: &Config,
) -> Result<ExportSummary, Box<dyn Error>> {
    log::info!("#Start run_export() period {}", config.period);

    let path = resolve_output_path(config.output.as_deref(), &config.period);
    prepare_output_dir(&path)?;

    let (rows, mut summary) = collect_usage(api, &config.period, &config.retry).await?;

    write_billing_csv(&path, &rows.usage, &rows.subtotals)?;
    summary.output_path = path;

    log::info!(
        "file downloaded successfully: {} ({} usage rows, {} subtotal rows)",
        summary.output_path.display(),
        summary.usage_rows,
        summary.subtotal_rows
    );
    Ok(summary)
}
