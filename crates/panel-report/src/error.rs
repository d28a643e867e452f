#![deny(unsafe_code)]

use std::path::PathBuf;

use polars::error::PolarsError;

#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    #[error("failed to create {path}: {source}")]
    Create {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: PolarsError,
    },

    #[error("export rename {from} -> {to} collides with an existing column")]
    RenameCollision { from: String, to: String },

    #[error(transparent)]
    Frame(#[from] PolarsError),
}

pub type Result<T> = std::result::Result<T, ReportError>;
