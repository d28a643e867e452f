#![deny(unsafe_code)]

//! Wide survey table ingestion.
//!
//! A wide table is one CSV file with one row per entity (subject or
//! informant) and one column per variable-per-wave. Values are numeric
//! survey codes; empty cells are missing. Ingestion keeps the table as a
//! Polars `DataFrame` and exposes typed column extraction on top of it.

use std::path::Path;

use polars::prelude::{CsvReadOptions, DataFrame, DataType, SerReader};
use tracing::info;

use crate::error::{IngestError, Result};

/// A loaded wide-format source table.
#[derive(Debug, Clone)]
pub struct WideTable {
    /// Short label used in logs and error messages (the file stem).
    name: String,
    /// Headers in source order, BOM/whitespace-normalized.
    headers: Vec<String>,
    df: DataFrame,
}

fn normalize_header(raw: &str) -> String {
    raw.trim().trim_matches('\u{feff}').to_string()
}

impl WideTable {
    /// Read a wide table from a CSV file with a header row.
    pub fn read_csv(path: &Path) -> Result<Self> {
        let df = CsvReadOptions::default()
            .with_has_header(true)
            .with_infer_schema_length(Some(1000))
            .try_into_reader_with_file_path(Some(path.to_path_buf()))
            .map_err(|source| IngestError::Read {
                path: path.to_path_buf(),
                source,
            })?
            .finish()
            .map_err(|source| IngestError::Read {
                path: path.to_path_buf(),
                source,
            })?;
        let name = path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        let table = Self::from_dataframe(name, df)?;
        info!(
            table = %table.name,
            rows = table.height(),
            columns = table.headers.len(),
            "wide table loaded"
        );
        Ok(table)
    }

    /// Wrap an already-built `DataFrame` (used by tests and callers that
    /// load tables some other way).
    pub fn from_dataframe(name: impl Into<String>, mut df: DataFrame) -> Result<Self> {
        let name = name.into();
        if df.height() == 0 {
            return Err(IngestError::EmptyTable { table: name });
        }
        let headers: Vec<String> = df
            .get_column_names()
            .iter()
            .map(|header| normalize_header(header))
            .collect();
        df.set_column_names(headers.iter().map(String::as_str))
            .map_err(|source| IngestError::Read {
                path: name.clone().into(),
                source,
            })?;
        Ok(Self { name, headers, df })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn height(&self) -> usize {
        self.df.height()
    }

    /// Column headers in source order.
    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.headers.iter().any(|header| header == name)
    }

    /// Extract a column as `f64` values, empty cells as `None`.
    pub fn numeric_column(&self, column: &str) -> Result<Vec<Option<f64>>> {
        let series = self
            .df
            .column(column)
            .map_err(|_| IngestError::MissingColumn {
                table: self.name.clone(),
                column: column.to_string(),
            })?
            .as_materialized_series();
        let casted =
            series
                .cast(&DataType::Float64)
                .map_err(|source| IngestError::NonNumericColumn {
                    table: self.name.clone(),
                    column: column.to_string(),
                    source,
                })?;
        let values = casted
            .f64()
            .map_err(|source| IngestError::NonNumericColumn {
                table: self.name.clone(),
                column: column.to_string(),
                source,
            })?
            .into_iter()
            .collect();
        Ok(values)
    }

    /// Extract a column as `i64` values, empty cells as `None`.
    ///
    /// Used for identifier and birth-year columns.
    pub fn integer_column(&self, column: &str) -> Result<Vec<Option<i64>>> {
        let series = self
            .df
            .column(column)
            .map_err(|_| IngestError::MissingColumn {
                table: self.name.clone(),
                column: column.to_string(),
            })?
            .as_materialized_series();
        let casted =
            series
                .cast(&DataType::Int64)
                .map_err(|source| IngestError::NonNumericColumn {
                    table: self.name.clone(),
                    column: column.to_string(),
                    source,
                })?;
        let values = casted
            .i64()
            .map_err(|source| IngestError::NonNumericColumn {
                table: self.name.clone(),
                column: column.to_string(),
                source,
            })?
            .into_iter()
            .collect();
        Ok(values)
    }
}
