//! Output of the export.
//!
//! - [`csv`] - Billing CSV file
//! - [`terminal`] - Run summary on stdout

mod csv;
mod terminal;

pub use csv::{
    billing_file_name, prepare_output_dir, render_csv, resolve_output_path, write_billing_csv,
};
pub use terminal::{print_summary, summary_lines};
