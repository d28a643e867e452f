#![deny(unsafe_code)]

//! Loading and validating run configuration.
//!
//! The main entry point is [`load_config`], which reads a TOML file into a
//! [`PanelConfig`], runs structural validation (age window, period
//! partition, rescale rules) and verifies that every legacy name pattern
//! compiles. Large alias tables can be kept out of the TOML and merged in
//! from a two-column CSV with [`merge_alias_csv`].

use std::collections::BTreeMap;
use std::path::Path;

use regex::Regex;
use tracing::debug;

use panel_model::PanelConfig;

use crate::error::{ConfigError, Result};

/// Read, parse and validate a TOML configuration file.
pub fn load_config(path: &Path) -> Result<PanelConfig> {
    let text = std::fs::read_to_string(path).map_err(|source| ConfigError::io(path, source))?;
    let config: PanelConfig = toml::from_str(&text).map_err(|source| ConfigError::Toml {
        path: path.to_path_buf(),
        source,
    })?;
    config.validate()?;
    validate_legacy_patterns(&config)?;
    debug!(
        periods = config.periods.len(),
        prefixes = config.naming.prefixes.len(),
        aliases = config.naming.aliases.len(),
        "configuration loaded"
    );
    Ok(config)
}

/// Every legacy pattern must compile and must end in exactly two digit
/// characters so the codec can split off the 2-digit year.
pub fn validate_legacy_patterns(config: &PanelConfig) -> Result<()> {
    for legacy in &config.naming.legacy_patterns {
        Regex::new(&legacy.pattern).map_err(|err| ConfigError::LegacyPattern {
            pattern: legacy.pattern.clone(),
            message: err.to_string(),
        })?;
        let trimmed = legacy.pattern.trim_end_matches('$');
        if !trimmed.ends_with("\\d{2}") && !trimmed.ends_with("[0-9]{2}") {
            return Err(ConfigError::LegacyPatternSuffix {
                pattern: legacy.pattern.clone(),
            });
        }
    }
    Ok(())
}

/// Load a two-column CSV (raw name, canonical name) as an alias table.
pub fn load_alias_csv(path: &Path) -> Result<BTreeMap<String, String>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_path(path)
        .map_err(|err| ConfigError::Csv {
            path: path.to_path_buf(),
            message: err.to_string(),
        })?;
    let mut aliases = BTreeMap::new();
    for (idx, record) in reader.records().enumerate() {
        let record = record.map_err(|err| ConfigError::Csv {
            path: path.to_path_buf(),
            message: err.to_string(),
        })?;
        let row = idx + 2; // 1-based, after the header
        let (Some(raw), Some(canonical)) = (record.get(0), record.get(1)) else {
            return Err(ConfigError::AliasShape {
                path: path.to_path_buf(),
                row,
            });
        };
        let raw = raw.trim();
        let canonical = canonical.trim();
        if raw.is_empty() || canonical.is_empty() {
            return Err(ConfigError::AliasShape {
                path: path.to_path_buf(),
                row,
            });
        }
        aliases.insert(raw.to_string(), canonical.to_string());
    }
    Ok(aliases)
}

/// Merge aliases from a CSV file into an already-loaded configuration.
///
/// CSV entries win over TOML entries with the same raw name.
pub fn merge_alias_csv(config: &mut PanelConfig, path: &Path) -> Result<()> {
    let aliases = load_alias_csv(path)?;
    debug!(count = aliases.len(), path = %path.display(), "merging alias table");
    config.naming.aliases.extend(aliases);
    Ok(())
}
