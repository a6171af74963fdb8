//! Cost Management query request and response shapes.

use crate::models::BillingPeriod;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Dimensions the usage is grouped by, in request order.
pub const GROUPING_DIMENSIONS: [&str; 9] = [
    "ResourceId",
    "SubscriptionId",
    "SubscriptionName",
    "ServiceName",
    "Meter",
    "MeterCategory",
    "MeterSubcategory",
    "ResourceLocation",
    "ChargeType",
];

#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportType {
    ActualCost,
}

#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Timeframe {
    Custom,
}

#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Granularity {
    Daily,
}

#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    Dimension,
}

#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    In,
}

/// Body of `POST .../providers/Microsoft.CostManagement/query`.
#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct QueryDefinition {
    #[serde(rename = "type")]
    pub export_type: ExportType,
    pub timeframe: Timeframe,
    pub time_period: TimePeriod,
    pub dataset: Dataset,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct TimePeriod {
    pub from: String,
    pub to: String,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct Dataset {
    pub granularity: Granularity,
    pub filter: QueryFilter,
    pub aggregation: BTreeMap<String, Aggregation>,
    pub grouping: Vec<Grouping>,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct QueryFilter {
    pub dimensions: ComparisonExpression,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct ComparisonExpression {
    pub name: String,
    pub operator: Operator,
    pub values: Vec<String>,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct Aggregation {
    pub name: String,
    pub function: String,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct Grouping {
    #[serde(rename = "type")]
    pub column_type: ColumnType,
    pub name: String,
}

impl QueryDefinition {
    /// Daily actual cost for one resource group, grouped by [`GROUPING_DIMENSIONS`].
    pub fn for_resource_group(group_name: &str, period: &BillingPeriod) -> Self {
        let mut aggregation = BTreeMap::new();
        aggregation.insert(
            "totalCost".to_string(),
            Aggregation {
                name: "Cost".to_string(),
                function: "Sum".to_string(),
            },
        );

        QueryDefinition {
            export_type: ExportType::ActualCost,
            timeframe: Timeframe::Custom,
            time_period: TimePeriod {
                from: period.api_from(),
                to: period.api_to(),
            },
            dataset: Dataset {
                granularity: Granularity::Daily,
                filter: QueryFilter {
                    dimensions: ComparisonExpression {
                        name: "ResourceGroup".to_string(),
                        operator: Operator::In,
                        values: vec![group_name.to_string()],
                    },
                },
                aggregation,
                grouping: GROUPING_DIMENSIONS
                    .iter()
                    .map(|name| Grouping {
                        column_type: ColumnType::Dimension,
                        name: name.to_string(),
                    })
                    .collect(),
            },
        }
    }

    /// Resource group the query is filtered to.
    pub fn resource_group(&self) -> Option<&str> {
        self.dataset
            .filter
            .dimensions
            .values
            .first()
            .map(String::as_str)
    }
}

/// Response of the query API.
#[derive(Deserialize, Debug, Default)]
pub struct QueryResult {
    #[serde(default)]
    pub properties: QueryProperties,
}

#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct QueryProperties {
    pub next_link: Option<String>,
    #[serde(default)]
    pub columns: Vec<QueryColumn>,
    #[serde(default)]
    pub rows: Vec<Vec<Value>>,
}

#[derive(Deserialize, Debug, Clone)]
pub struct QueryColumn {
    pub name: String,
    #[serde(rename = "type")]
    pub column_type: String,
}
