#![deny(unsafe_code)]

use std::path::PathBuf;

use panel_model::ModelError;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse TOML config {path}: {source}")]
    Toml {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("failed to parse CSV {path}: {message}")]
    Csv { path: PathBuf, message: String },

    #[error("alias table {path} row {row}: expected two columns (raw, canonical)")]
    AliasShape { path: PathBuf, row: usize },

    #[error("invalid legacy pattern `{pattern}`: {message}")]
    LegacyPattern { pattern: String, message: String },

    #[error("legacy pattern `{pattern}` must end in exactly two digits")]
    LegacyPatternSuffix { pattern: String },

    #[error(transparent)]
    Model(#[from] ModelError),
}

impl ConfigError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, ConfigError>;
