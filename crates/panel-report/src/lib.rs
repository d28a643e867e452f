#![deny(unsafe_code)]

//! Output persistence for the panel pipeline.
//!
//! Owns the CSV output format, export renaming, and the all-missing
//! variable diagnostic report.

mod csv_out;
mod error;

pub use csv_out::{
    apply_export_renames, write_age_panel, write_missing_variables, write_period_panel,
};
pub use error::{ReportError, Result};
