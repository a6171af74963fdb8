//! CSV output for billing rows.

use crate::models::{csv_header, BillingPeriod, UsageRow};
use itertools::Itertools;
use std::error::Error;
use std::path::{Path, PathBuf};

/// `Azure_Billing_Data_<Month>_<Year>.csv` for the period's start date.
pub fn billing_file_name(period: &BillingPeriod) -> String {
    format!(
        "Azure_Billing_Data_{}_{}.csv",
        period.month_name(),
        period.year()
    )
}

/// Where the CSV goes.
///
/// No output given: the file name in the current directory. An output ending
/// in `.csv` is used as the file path, anything else is taken as a directory.
pub fn resolve_output_path(output: Option<&Path>, period: &BillingPeriod) -> PathBuf {
    let file_name = billing_file_name(period);
    match output {
        None => PathBuf::from(file_name),
        Some(path)
            if path
                .extension()
                .is_some_and(|ext| ext.eq_ignore_ascii_case("csv")) =>
        {
            path.to_path_buf()
        }
        Some(dir) => dir.join(file_name),
    }
}

/// Create the directory `path` will be written into, if it is missing.
pub fn prepare_output_dir(path: &Path) -> Result<(), Box<dyn Error>> {
    let Some(dir) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) else {
        return Ok(());
    };
    std::fs::create_dir_all(dir)
        .map_err(|e| format!("Error creating output directory {}: {e}", dir.display()))?;
    log::debug!("output directory {} ready", dir.display());
    Ok(())
}

/// Render header, usage rows, then subtotal rows.
pub fn render_csv(usage: &[UsageRow], subtotals: &[UsageRow]) -> String {
    let mut out = String::new();
    out.push_str(&csv_line(csv_header().iter().copied()));
    for row in usage.iter().chain(subtotals) {
        let record = row.to_record();
        out.push_str(&csv_line(record.iter().map(String::as_str)));
    }
    out
}

/// Write the CSV, replacing any existing file.
pub fn write_billing_csv(
    path: &Path,
    usage: &[UsageRow],
    subtotals: &[UsageRow],
) -> Result<(), Box<dyn Error>> {
    let csv = render_csv(usage, subtotals);
    log::info!(
        "Writing {} rows to {}",
        usage.len() + subtotals.len(),
        path.display()
    );
    std::fs::write(path, csv)
        .map_err(|e| format!("Error writing csv file {}: {e}", path.display()))?;
    Ok(())
}

fn csv_line<'a>(fields: impl Iterator<Item = &'a str>) -> String {
    let mut line = fields.map(escape_csv_field).join(",");
    line.push('\n');
    line
}

fn escape_csv_field(input: &str) -> String {
    if input.contains([',', '"', '\n', '\r']) {
        // Quote the field and double any quotes inside it.
        // Excel does not like spaces after the comma between fields.
        let escaped = input.replace('"', "\"\"");
        format!("\"{escaped}\"")
    } else {
        input.to_string()
    }
}
