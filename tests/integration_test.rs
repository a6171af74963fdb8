//! Integration tests for azure-cost-export
//!
//! These tests run the complete export against an in-memory CostApi and
//! check the CSV written to disk.

use azure_cost_export::models::ResourceGroup;
use azure_cost_export::processing::RetryPolicy;
use azure_cost_export::test_utils::{raw_usage_row, september_2023, StubCostApi};
use azure_cost_export::{run_export, Config};
use std::path::Path;
use std::time::Duration;

const HEADER: &str = "ResourceId,billingPeriodStartDate,BillingPeriodEndDate,Date,SubscriptionId,SubscriptionName,Meter,MeterCategory,MeterSubcategory,ResourceGroupName,ResourceLocation,ServiceName,CostInUsd,BillingCurrency,Tags,ChargeType";

fn config(output: &Path, max_attempts: u32) -> Config {
    Config {
        period: september_2023(),
        output: Some(output.to_path_buf()),
        retry: RetryPolicy {
            max_attempts,
            retry_delay: Duration::from_secs(5),
        },
        management_url: "http://unused".to_string(),
    }
}

fn sample_api() -> StubCostApi {
    StubCostApi::new()
        .with_subscription(
            "s1",
            vec![
                ResourceGroup::new("rg-app").with_tag("env", "prod"),
                ResourceGroup::new("rg-idle"),
            ],
        )
        .with_subscription("s2", vec![ResourceGroup::new("rg-data")])
        .with_query_rows(
            "s1",
            "rg-app",
            vec![
                raw_usage_row(1.25, "/r/vm1", "USD"),
                raw_usage_row(2.5, "/r/vm2", "USD"),
            ],
        )
        .with_query_rows("s2", "rg-data", vec![raw_usage_row(0.5, "/r/st1", "USD")])
}

#[tokio::test(start_paused = true)]
async fn test_full_export_writes_csv() {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let api = sample_api();

    let summary = run_export(&api, &config(dir.path(), 3))
        .await
        .expect("Export failed");

    let expected_path = dir.path().join("Azure_Billing_Data_September_2023.csv");
    assert_eq!(summary.output_path, expected_path);
    assert_eq!(summary.usage_rows, 4);
    assert_eq!(summary.subtotal_rows, 2);

    let csv = std::fs::read_to_string(&expected_path).expect("CSV not written");
    let lines: Vec<&str> = csv.lines().collect();
    assert_eq!(lines.len(), 1 + 4 + 2);
    assert_eq!(lines[0], HEADER);

    // usage rows first, in subscription x resource group order
    assert!(lines[1].starts_with("/r/vm1,2023-09-01,2023-09-30,20230901,"));
    assert!(lines[1].contains(r#",1.25,USD,"{""env"":""prod""}",Usage"#));
    assert!(lines[2].starts_with("/r/vm2,"));
    assert_eq!(lines[3], ",2023-09-01,2023-09-30,,,,,,,rg-idle,,,0,,,");
    assert!(lines[4].starts_with("/r/st1,"));

    // then the subtotals
    assert_eq!(
        lines[5],
        ",2023-09-01,2023-09-30,,,,,,,,Total for linked account# /r/vm2 (rg-app),,3.75,USD,,"
    );
    assert_eq!(
        lines[6],
        ",2023-09-01,2023-09-30,,,,,,,,Total for linked account# /r/st1 (rg-data),,0.5,USD,,"
    );
}

#[tokio::test(start_paused = true)]
async fn test_export_is_deterministic() {
    let dir_a = tempfile::tempdir().unwrap();
    let dir_b = tempfile::tempdir().unwrap();

    let first = run_export(&sample_api(), &config(dir_a.path(), 1))
        .await
        .unwrap();
    let second = run_export(&sample_api(), &config(dir_b.path(), 1))
        .await
        .unwrap();

    let a = std::fs::read(&first.output_path).unwrap();
    let b = std::fs::read(&second.output_path).unwrap();
    assert_eq!(a, b, "identical inputs must give byte-identical CSV");
}

#[tokio::test(start_paused = true)]
async fn test_rate_limited_group_is_dropped_after_backoff() {
    let dir = tempfile::tempdir().unwrap();
    let api = StubCostApi::new()
        .with_subscription(
            "s1",
            vec![ResourceGroup::new("rg-busy"), ResourceGroup::new("rg-app")],
        )
        .with_query_error("s1", "rg-busy", StubCostApi::rate_limited(3))
        .with_query_rows("s1", "rg-app", vec![raw_usage_row(1.0, "/r/vm1", "USD")]);

    let start = tokio::time::Instant::now();
    let summary = run_export(&api, &config(dir.path(), 1)).await.unwrap();

    assert!(start.elapsed() >= Duration::from_secs(3));
    assert_eq!(api.query_count("s1", "rg-busy"), 1);
    assert_eq!(
        summary.failed_groups,
        vec![("s1".to_string(), "rg-busy".to_string())]
    );

    let csv = std::fs::read_to_string(&summary.output_path).unwrap();
    assert!(!csv.contains("rg-busy"));
    assert_eq!(csv.lines().count(), 1 + 1 + 1);
}

#[tokio::test(start_paused = true)]
async fn test_rate_limited_group_is_retried() {
    let dir = tempfile::tempdir().unwrap();
    let api = StubCostApi::new()
        .with_subscription("s1", vec![ResourceGroup::new("rg-busy")])
        .with_query_error("s1", "rg-busy", StubCostApi::rate_limited(3))
        .with_query_rows("s1", "rg-busy", vec![raw_usage_row(2.0, "/r/vm1", "USD")]);

    let summary = run_export(&api, &config(dir.path(), 3)).await.unwrap();

    assert_eq!(api.query_count("s1", "rg-busy"), 2);
    assert!(summary.failed_groups.is_empty());
    assert_eq!(summary.usage_rows, 1);
    assert_eq!(summary.subtotal_rows, 1);
}

#[tokio::test]
async fn test_explicit_csv_path() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("september.csv");
    let api = StubCostApi::new().with_subscription("s1", vec![]);

    let summary = run_export(&api, &config(&path, 1)).await.unwrap();

    assert_eq!(summary.output_path, path);
    let csv = std::fs::read_to_string(&path).unwrap();
    assert_eq!(csv, format!("{HEADER}\n"));
}

#[tokio::test(start_paused = true)]
async fn test_missing_output_dir_is_created() {
    let dir = tempfile::tempdir().unwrap();
    let reports = dir.path().join("reports");
    let api = sample_api();

    let summary = run_export(&api, &config(&reports, 1)).await.unwrap();

    assert_eq!(
        summary.output_path,
        reports.join("Azure_Billing_Data_September_2023.csv")
    );
    assert!(summary.output_path.is_file());
    assert_eq!(api.query_count("s1", "rg-app"), 1);
}

#[tokio::test]
async fn test_unusable_output_dir_fails_before_querying() {
    let dir = tempfile::tempdir().unwrap();
    let blocker = dir.path().join("taken");
    std::fs::write(&blocker, "not a directory").unwrap();
    let api = sample_api();

    let result = run_export(&api, &config(&blocker.join("reports"), 1)).await;

    assert!(result.is_err());
    assert!(api.queries().is_empty(), "no cost query should run");
}
