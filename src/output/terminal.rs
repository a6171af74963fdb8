//! Terminal output utilities.

use crate::processing::ExportSummary;
use colored::Colorize;

/// Closing report of an export run, one line per entry.
pub fn summary_lines(summary: &ExportSummary) -> Vec<String> {
    let mut lines = vec![
        format!("subscriptions   : {}", summary.subscriptions),
        format!("resource groups : {}", summary.resource_groups),
        format!("usage rows      : {}", summary.usage_rows),
        format!("subtotal rows   : {}", summary.subtotal_rows),
        format!("total cost      : {:.2}", summary.total_cost),
    ];
    for (subscription, group) in &summary.failed_groups {
        lines.push(format!("skipped         : {subscription}/{group}"));
    }
    lines
}

/// Print the report and the output file to stdout.
pub fn print_summary(summary: &ExportSummary) {
    for line in summary_lines(summary) {
        println!("{line}");
    }
    if !summary.failed_groups.is_empty() {
        println!(
            "#{}# {} resource group(s) skipped after retries",
            "NOTE".on_red(),
            summary.failed_groups.len()
        );
    }
    println!(
        "file downloaded successfully :) {}",
        summary.output_path.display().to_string().green()
    );
}
