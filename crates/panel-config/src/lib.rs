#![deny(unsafe_code)]

//! Configuration loading for the panel pipeline.
//!
//! A run is described by one TOML file (age window, naming rules, source
//! column roles, period map, rescale rules, export renames), optionally
//! supplemented by a CSV alias table for surveys with hundreds of
//! truncated column-name variants.

mod error;
mod loader;

pub use error::{ConfigError, Result};
pub use loader::{load_alias_csv, load_config, merge_alias_csv, validate_legacy_patterns};
