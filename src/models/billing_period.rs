//! Billing period covered by one export run.

use chrono::{DateTime, FixedOffset};
use std::fmt;

/// Date range queried from Cost Management.
///
/// Both ends are sent to the API as given; the service decides whether the
/// end is inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BillingPeriod {
    pub start: DateTime<FixedOffset>,
    pub end: DateTime<FixedOffset>,
}

impl BillingPeriod {
    /// Create a new period, rejecting a start after the end.
    pub fn new(start: DateTime<FixedOffset>, end: DateTime<FixedOffset>) -> Result<Self, String> {
        if start > end {
            return Err(format!(
                "start date {} is after end date {}",
                start.to_rfc3339(),
                end.to_rfc3339()
            ));
        }
        Ok(BillingPeriod { start, end })
    }

    /// `YYYY-MM-DD` part of the start, as written in every CSV row.
    pub fn start_date(&self) -> String {
        self.start.format("%Y-%m-%d").to_string()
    }

    /// `YYYY-MM-DD` part of the end, as written in every CSV row.
    pub fn end_date(&self) -> String {
        self.end.format("%Y-%m-%d").to_string()
    }

    /// Start timestamp in the form the query API expects.
    pub fn api_from(&self) -> String {
        self.start.format("%Y-%m-%dT%H:%M:%S%:z").to_string()
    }

    /// End timestamp in the form the query API expects.
    pub fn api_to(&self) -> String {
        self.end.format("%Y-%m-%dT%H:%M:%S%:z").to_string()
    }

    /// English month name of the start date, e.g. `September`.
    pub fn month_name(&self) -> String {
        self.start.format("%B").to_string()
    }

    /// Four digit year of the start date.
    pub fn year(&self) -> String {
        self.start.format("%Y").to_string()
    }
}

impl fmt::Display for BillingPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} .. {}", self.api_from(), self.api_to())
    }
}
