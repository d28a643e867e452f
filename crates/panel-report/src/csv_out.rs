#![deny(unsafe_code)]

//! CSV persistence for the output panels.
//!
//! Export renaming happens here and only here: the pipeline works with
//! canonical names throughout, and the prettier analysis names from the
//! configuration are applied at the moment a frame leaves the system.

use std::collections::BTreeMap;
use std::fs::File;
use std::path::Path;

use polars::prelude::{Column, CsvWriter, DataFrame, SerWriter};
use tracing::info;

use panel_core::{age_panel_to_frame, period_panel_to_frame};
use panel_model::{AgePanel, PanelConfig, PeriodPanel};

use crate::error::{ReportError, Result};

/// Rename canonical columns to their configured export names.
///
/// Renames whose source column is absent are ignored (the variable may
/// not occur in this extract); a rename onto an existing column is an
/// error because it would silently shadow data.
pub fn apply_export_renames(
    df: &mut DataFrame,
    renames: &BTreeMap<String, String>,
) -> Result<()> {
    for (from, to) in renames {
        let names = df.get_column_names();
        if !names.iter().any(|name| name.as_str() == from) {
            continue;
        }
        if names.iter().any(|name| name.as_str() == to) {
            return Err(ReportError::RenameCollision {
                from: from.clone(),
                to: to.clone(),
            });
        }
        df.rename(from, to.as_str().into())?;
    }
    Ok(())
}

/// Persist the filled age panel as CSV, applying export renames.
pub fn write_age_panel(panel: &AgePanel, config: &PanelConfig, path: &Path) -> Result<()> {
    let mut df = age_panel_to_frame(panel)?;
    apply_export_renames(&mut df, &config.export_renames)?;
    write_frame(&mut df, path)?;
    info!(path = %path.display(), rows = df.height(), "age panel written");
    Ok(())
}

/// Persist the period panel as CSV, applying export renames.
pub fn write_period_panel(
    panel: &PeriodPanel,
    config: &PanelConfig,
    path: &Path,
) -> Result<()> {
    let mut df = period_panel_to_frame(panel)?;
    apply_export_renames(&mut df, &config.export_renames)?;
    write_frame(&mut df, path)?;
    info!(path = %path.display(), rows = df.height(), "period panel written");
    Ok(())
}

/// Persist the all-missing-variable diagnostic as a one-column CSV.
pub fn write_missing_variables(variables: &[String], path: &Path) -> Result<()> {
    let column = Column::new("variable".into(), variables.to_vec());
    let mut df = DataFrame::new(vec![column])?;
    write_frame(&mut df, path)?;
    info!(
        path = %path.display(),
        count = variables.len(),
        "all-missing variable report written"
    );
    Ok(())
}

fn write_frame(df: &mut DataFrame, path: &Path) -> Result<()> {
    let mut file = File::create(path).map_err(|source| ReportError::Create {
        path: path.to_path_buf(),
        source,
    })?;
    CsvWriter::new(&mut file)
        .include_header(true)
        .finish(df)
        .map_err(|source| ReportError::Write {
            path: path.to_path_buf(),
            source,
        })
}
