#![deny(unsafe_code)]

use std::path::PathBuf;

use polars::error::PolarsError;

#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    #[error("failed to read table {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: PolarsError,
    },

    #[error("table {table} has no rows")]
    EmptyTable { table: String },

    #[error("table {table} has no column named {column}")]
    MissingColumn { table: String, column: String },

    #[error("column {column} of table {table} is not numeric: {source}")]
    NonNumericColumn {
        table: String,
        column: String,
        #[source]
        source: PolarsError,
    },
}

pub type Result<T> = std::result::Result<T, IngestError>;
