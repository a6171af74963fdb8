//! Raw cost query row to [`UsageRow`] mapping.
//!
//! The query API returns each row as a positional array whose layout follows
//! the aggregation and grouping of [`crate::azure::QueryDefinition`]:
//!
//! ```text
//! [cost, date, resourceId, subscriptionId, subscriptionName, serviceName,
//!  meter, meterCategory, meterSubcategory, resourceLocation, <reserved>,
//!  chargeType, currency]
//! ```
//!
//! The CSV column order differs, so the permutation is kept in one table,
//! [`USAGE_ROW_SCHEMA`].

use crate::models::{BillingPeriod, Column, ResourceGroup, UsageRow};
use serde_json::Value;
use thiserror::Error;

/// Where a CSV column takes its value from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    /// Position in the raw row.
    Raw(usize),
    /// Last element of the raw row.
    RawLast,
    GroupName,
    GroupTags,
    PeriodStart,
    PeriodEnd,
}

/// Source of every output column, in CSV order.
pub const USAGE_ROW_SCHEMA: [(Column, Source); 16] = [
    (Column::ResourceId, Source::Raw(2)),
    (Column::BillingPeriodStartDate, Source::PeriodStart),
    (Column::BillingPeriodEndDate, Source::PeriodEnd),
    (Column::Date, Source::Raw(1)),
    (Column::SubscriptionId, Source::Raw(3)),
    (Column::SubscriptionName, Source::Raw(4)),
    (Column::Meter, Source::Raw(6)),
    (Column::MeterCategory, Source::Raw(7)),
    (Column::MeterSubcategory, Source::Raw(8)),
    (Column::ResourceGroupName, Source::GroupName),
    (Column::ResourceLocation, Source::Raw(9)),
    (Column::ServiceName, Source::Raw(5)),
    (Column::CostInUsd, Source::Raw(0)),
    (Column::BillingCurrency, Source::RawLast),
    (Column::Tags, Source::GroupTags),
    (Column::ChargeType, Source::Raw(11)),
];

#[derive(Debug, Error, PartialEq)]
pub enum MappingError {
    #[error("raw row has {len} values, column {column} needs index {index}")]
    MissingValue {
        column: Column,
        index: usize,
        len: usize,
    },

    #[error("cost value {0} is not a number")]
    InvalidCost(String),
}

/// Map one raw query row into a [`UsageRow`] for `group`.
pub fn map_raw_row(
    raw: &[Value],
    group: &ResourceGroup,
    period: &BillingPeriod,
) -> Result<UsageRow, MappingError> {
    let mut row = UsageRow::default();
    for (column, source) in USAGE_ROW_SCHEMA {
        let value = resolve(column, source, raw, group, period)?;
        if column == Column::CostInUsd {
            row.cost = cost_value(&value)?;
        } else {
            row.set_text(column, render_value(&value));
        }
    }
    Ok(row)
}

fn resolve(
    column: Column,
    source: Source,
    raw: &[Value],
    group: &ResourceGroup,
    period: &BillingPeriod,
) -> Result<Value, MappingError> {
    let value = match source {
        Source::Raw(index) => raw
            .get(index)
            .cloned()
            .ok_or(MappingError::MissingValue {
                column,
                index,
                len: raw.len(),
            })?,
        Source::RawLast => raw.last().cloned().ok_or(MappingError::MissingValue {
            column,
            index: 0,
            len: 0,
        })?,
        Source::GroupName => Value::String(group.name.clone()),
        Source::GroupTags => Value::String(group.tags_field()),
        Source::PeriodStart => Value::String(period.start_date()),
        Source::PeriodEnd => Value::String(period.end_date()),
    };
    Ok(value)
}

/// Text for a CSV field: strings as-is, `null` empty, anything else as JSON.
pub fn render_value(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Numeric cost; the API sends a number but a numeric string is accepted.
pub fn cost_value(value: &Value) -> Result<f64, MappingError> {
    match value {
        Value::Number(n) => n
            .as_f64()
            .ok_or_else(|| MappingError::InvalidCost(n.to_string())),
        Value::String(s) => s
            .trim()
            .parse::<f64>()
            .map_err(|_| MappingError::InvalidCost(s.clone())),
        Value::Null => Ok(0.0),
        other => Err(MappingError::InvalidCost(other.to_string())),
    }
}
