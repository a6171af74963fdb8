//! Command line and environment configuration.

use crate::azure::DEFAULT_MANAGEMENT_URL;
use crate::models::BillingPeriod;
use crate::processing::executor::{RetryPolicy, DEFAULT_MAX_ATTEMPTS, DEFAULT_RETRY_DELAY};
use chrono::{DateTime, Datelike, Duration as ChronoDuration, FixedOffset, NaiveDate};
use clap::Parser;
use std::error::Error;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_LOG_CONFIG: &str = "log4rs.yml";

/// Export Azure cost and usage for every subscription and resource group to CSV.
#[derive(Parser, Debug, Clone)]
#[command(name = "azure-cost-export", version, about)]
pub struct Cli {
    /// First day of the billing period (RFC 3339 or YYYY-MM-DD).
    /// Defaults to the first day of the previous month.
    #[arg(long, env = "COST_EXPORT_START_DATE", value_parser = parse_date)]
    pub start_date: Option<DateTime<FixedOffset>>,

    /// Last day of the billing period (RFC 3339 or YYYY-MM-DD).
    /// Defaults to the last day of the previous month.
    #[arg(long, env = "COST_EXPORT_END_DATE", value_parser = parse_date)]
    pub end_date: Option<DateTime<FixedOffset>>,

    /// Output directory, or a file path ending in .csv.
    #[arg(long, short, env = "COST_EXPORT_OUTPUT")]
    pub output: Option<PathBuf>,

    /// Attempts per resource group before it is skipped (1 = no retry).
    #[arg(long, env = "COST_EXPORT_MAX_ATTEMPTS", default_value_t = DEFAULT_MAX_ATTEMPTS,
          value_parser = clap::value_parser!(u32).range(1..))]
    pub max_attempts: u32,

    /// Seconds to wait after a failure without a server retry hint.
    #[arg(long, env = "COST_EXPORT_RETRY_DELAY",
          default_value_t = DEFAULT_RETRY_DELAY.as_secs())]
    pub retry_delay: u64,

    /// Azure Resource Manager endpoint.
    #[arg(long, env = "AZURE_MANAGEMENT_URL", default_value = DEFAULT_MANAGEMENT_URL)]
    pub management_url: String,

    /// log4rs configuration file.
    #[arg(long, env = "COST_EXPORT_LOG_CONFIG", default_value = DEFAULT_LOG_CONFIG)]
    pub log_config: PathBuf,
}

/// Resolved settings of one run.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub period: BillingPeriod,
    pub output: Option<PathBuf>,
    pub retry: RetryPolicy,
    pub management_url: String,
}

impl Cli {
    /// Resolve defaults relative to `today` and validate the date range.
    pub fn into_config(self, today: NaiveDate) -> Result<Config, Box<dyn Error>> {
        let (default_start, default_end) = previous_month(today)?;
        let start = match self.start_date {
            Some(start) => start,
            None => midnight_utc(default_start)?,
        };
        let end = match self.end_date {
            Some(end) => end,
            None => midnight_utc(default_end)?,
        };
        let period = BillingPeriod::new(start, end)?;

        Ok(Config {
            period,
            output: self.output,
            retry: RetryPolicy {
                max_attempts: self.max_attempts,
                retry_delay: Duration::from_secs(self.retry_delay),
            },
            management_url: self.management_url,
        })
    }
}

/// Parse `2023-09-01T00:00:00+00:00` or `2023-09-01` (midnight UTC).
pub fn parse_date(input: &str) -> Result<DateTime<FixedOffset>, String> {
    let input = input.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(input) {
        return Ok(ts);
    }
    let date = NaiveDate::parse_from_str(input, "%Y-%m-%d")
        .map_err(|e| format!("invalid date '{input}', expected YYYY-MM-DD or RFC 3339: {e}"))?;
    midnight_utc(date)
}

/// First and last day of the calendar month before `today`.
pub fn previous_month(today: NaiveDate) -> Result<(NaiveDate, NaiveDate), String> {
    let first_this_month = NaiveDate::from_ymd_opt(today.year(), today.month(), 1)
        .ok_or_else(|| format!("no first day of month for {today}"))?;
    let last = first_this_month - ChronoDuration::days(1);
    let first = NaiveDate::from_ymd_opt(last.year(), last.month(), 1)
        .ok_or_else(|| format!("no first day of month for {last}"))?;
    Ok((first, last))
}

fn midnight_utc(date: NaiveDate) -> Result<DateTime<FixedOffset>, String> {
    date.and_hms_opt(0, 0, 0)
        .map(|dt| dt.and_utc().fixed_offset())
        .ok_or_else(|| format!("invalid midnight for {date}"))
}
