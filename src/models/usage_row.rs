//! Flattened billing row written to the CSV.

use super::{BillingPeriod, ResourceGroup};
use std::fmt;

/// Output columns, in CSV order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Column {
    ResourceId,
    BillingPeriodStartDate,
    BillingPeriodEndDate,
    Date,
    SubscriptionId,
    SubscriptionName,
    Meter,
    MeterCategory,
    MeterSubcategory,
    ResourceGroupName,
    ResourceLocation,
    ServiceName,
    CostInUsd,
    BillingCurrency,
    Tags,
    ChargeType,
}

impl Column {
    pub const ALL: [Column; 16] = [
        Column::ResourceId,
        Column::BillingPeriodStartDate,
        Column::BillingPeriodEndDate,
        Column::Date,
        Column::SubscriptionId,
        Column::SubscriptionName,
        Column::Meter,
        Column::MeterCategory,
        Column::MeterSubcategory,
        Column::ResourceGroupName,
        Column::ResourceLocation,
        Column::ServiceName,
        Column::CostInUsd,
        Column::BillingCurrency,
        Column::Tags,
        Column::ChargeType,
    ];

    /// Header text for this column.
    pub fn header(self) -> &'static str {
        match self {
            Column::ResourceId => "ResourceId",
            // lower-case 'b' is what downstream sheets already key on
            Column::BillingPeriodStartDate => "billingPeriodStartDate",
            Column::BillingPeriodEndDate => "BillingPeriodEndDate",
            Column::Date => "Date",
            Column::SubscriptionId => "SubscriptionId",
            Column::SubscriptionName => "SubscriptionName",
            Column::Meter => "Meter",
            Column::MeterCategory => "MeterCategory",
            Column::MeterSubcategory => "MeterSubcategory",
            Column::ResourceGroupName => "ResourceGroupName",
            Column::ResourceLocation => "ResourceLocation",
            Column::ServiceName => "ServiceName",
            Column::CostInUsd => "CostInUsd",
            Column::BillingCurrency => "BillingCurrency",
            Column::Tags => "Tags",
            Column::ChargeType => "ChargeType",
        }
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.header())
    }
}

/// The fixed 16 column CSV header.
pub fn csv_header() -> [&'static str; 16] {
    Column::ALL.map(Column::header)
}

/// One CSV line: a usage row from the query API, the placeholder for a group
/// without usage, or a per group subtotal.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UsageRow {
    pub resource_id: String,
    pub billing_period_start: String,
    pub billing_period_end: String,
    pub date: String,
    pub subscription_id: String,
    pub subscription_name: String,
    pub meter: String,
    pub meter_category: String,
    pub meter_subcategory: String,
    pub resource_group_name: String,
    pub resource_location: String,
    pub service_name: String,
    pub cost: f64,
    pub billing_currency: String,
    pub tags: String,
    pub charge_type: String,
}

impl UsageRow {
    /// Row emitted for a resource group whose query returned nothing.
    pub fn placeholder(group: &ResourceGroup, period: &BillingPeriod) -> Self {
        UsageRow {
            billing_period_start: period.start_date(),
            billing_period_end: period.end_date(),
            resource_group_name: group.name.clone(),
            tags: group.tags_field(),
            cost: 0.0,
            ..Default::default()
        }
    }

    /// Synthetic total for one resource group.
    ///
    /// The label lands in the `ResourceLocation` column.
    pub fn subtotal(
        last_resource_id: &str,
        group_name: &str,
        period: &BillingPeriod,
        cost: f64,
        currency: &str,
    ) -> Self {
        UsageRow {
            billing_period_start: period.start_date(),
            billing_period_end: period.end_date(),
            resource_location: format!(
                "Total for linked account# {last_resource_id} ({group_name})"
            ),
            cost,
            billing_currency: currency.to_string(),
            ..Default::default()
        }
    }

    /// Assign a text column. `CostInUsd` is numeric and set through `cost`.
    pub fn set_text(&mut self, column: Column, value: String) {
        match column {
            Column::ResourceId => self.resource_id = value,
            Column::BillingPeriodStartDate => self.billing_period_start = value,
            Column::BillingPeriodEndDate => self.billing_period_end = value,
            Column::Date => self.date = value,
            Column::SubscriptionId => self.subscription_id = value,
            Column::SubscriptionName => self.subscription_name = value,
            Column::Meter => self.meter = value,
            Column::MeterCategory => self.meter_category = value,
            Column::MeterSubcategory => self.meter_subcategory = value,
            Column::ResourceGroupName => self.resource_group_name = value,
            Column::ResourceLocation => self.resource_location = value,
            Column::ServiceName => self.service_name = value,
            Column::CostInUsd => log::warn!("ignoring text value for {column}: {value}"),
            Column::BillingCurrency => self.billing_currency = value,
            Column::Tags => self.tags = value,
            Column::ChargeType => self.charge_type = value,
        }
    }

    /// Field values in header order.
    pub fn to_record(&self) -> [String; 16] {
        Column::ALL.map(|column| self.field(column))
    }

    fn field(&self, column: Column) -> String {
        match column {
            Column::ResourceId => self.resource_id.clone(),
            Column::BillingPeriodStartDate => self.billing_period_start.clone(),
            Column::BillingPeriodEndDate => self.billing_period_end.clone(),
            Column::Date => self.date.clone(),
            Column::SubscriptionId => self.subscription_id.clone(),
            Column::SubscriptionName => self.subscription_name.clone(),
            Column::Meter => self.meter.clone(),
            Column::MeterCategory => self.meter_category.clone(),
            Column::MeterSubcategory => self.meter_subcategory.clone(),
            Column::ResourceGroupName => self.resource_group_name.clone(),
            Column::ResourceLocation => self.resource_location.clone(),
            Column::ServiceName => self.service_name.clone(),
            Column::CostInUsd => self.cost.to_string(),
            Column::BillingCurrency => self.billing_currency.clone(),
            Column::Tags => self.tags.clone(),
            Column::ChargeType => self.charge_type.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::DateTime;

    fn september_2023() -> BillingPeriod {
        BillingPeriod::new(
            DateTime::parse_from_rfc3339("2023-09-01T00:00:00+00:00").unwrap(),
            DateTime::parse_from_rfc3339("2023-09-30T00:00:00+00:00").unwrap(),
        )
        .unwrap()
    }

    #[test]
    fn test_csv_header_fixed() {
        let header = csv_header();
        assert_eq!(header.len(), 16);
        assert_eq!(header[0], "ResourceId");
        assert_eq!(header[1], "billingPeriodStartDate");
        assert_eq!(header[12], "CostInUsd");
        assert_eq!(header[15], "ChargeType");
    }

    #[test]
    fn test_placeholder_row() {
        let group = ResourceGroup::new("rg-idle").with_tag("env", "dev");
        let row = UsageRow::placeholder(&group, &september_2023());
        let record = row.to_record();
        assert_eq!(
            record,
            [
                "",
                "2023-09-01",
                "2023-09-30",
                "",
                "",
                "",
                "",
                "",
                "",
                "rg-idle",
                "",
                "",
                "0",
                "",
                r#"{"env":"dev"}"#,
                "",
            ]
        );
    }

    #[test]
    fn test_subtotal_row_label() {
        let row = UsageRow::subtotal(
            "/subscriptions/s1/resourceGroups/rg-app/providers/vm1",
            "rg-app",
            &september_2023(),
            3.75,
            "USD",
        );
        assert_eq!(
            row.resource_location,
            "Total for linked account# /subscriptions/s1/resourceGroups/rg-app/providers/vm1 (rg-app)"
        );
        assert_eq!(row.resource_group_name, "");
        let record = row.to_record();
        assert_eq!(record[12], "3.75");
        assert_eq!(record[13], "USD");
        assert_eq!(record[14], "");
    }

    #[test]
    fn test_set_text_ignores_cost() {
        let mut row = UsageRow::default();
        row.set_text(Column::CostInUsd, "12".to_string());
        row.set_text(Column::Meter, "D2s v3".to_string());
        assert_eq!(row.cost, 0.0);
        assert_eq!(row.meter, "D2s v3");
    }
}
