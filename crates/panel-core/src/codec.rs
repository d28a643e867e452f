#![deny(unsafe_code)]

//! Raw column name decoding.
//!
//! Every column of a wide survey extract carries its temporal placement in
//! its name: a no-date marker suffix (`HEIGHT_XRND`), a 4-digit survey
//! year (`MATH_SCORE_2007`), or a legacy 2-digit year shape (`HGCREV90`).
//! Decoding splits the name into the canonical variable identity and that
//! temporal anchor, resolving the survey's naming quirks (removable
//! prefixes, truncated aliases, duplicate-year artifacts) from
//! configuration. The same canonical name collects contributions from many
//! raw columns across waves, so decoding must be deterministic: it is a
//! pure function of the raw name and the rules.

use std::collections::BTreeMap;

use regex::Regex;
use tracing::warn;

use panel_model::{CanonicalVariable, NamingRules, TemporalAnchor};

use crate::error::CoreError;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    #[error(
        "column name `{0}` matches neither the no-date marker nor a year-suffixed shape"
    )]
    UnrecognizedShape(String),

    #[error("column name `{0}` decodes to an empty canonical name")]
    EmptyName(String),
}

/// Compiled naming rules, built once per run from the configuration.
#[derive(Debug, Clone)]
pub struct NameRules {
    no_date_marker: String,
    separator: char,
    prefixes: Vec<String>,
    aliases: BTreeMap<String, String>,
    legacy: Vec<Regex>,
    century_pivot: u8,
}

impl NameRules {
    pub fn new(naming: &NamingRules) -> Result<Self, CoreError> {
        let mut legacy = Vec::with_capacity(naming.legacy_patterns.len());
        for pattern in &naming.legacy_patterns {
            let regex = Regex::new(&pattern.pattern).map_err(|err| CoreError::LegacyPattern {
                pattern: pattern.pattern.clone(),
                message: err.to_string(),
            })?;
            legacy.push(regex);
        }
        Ok(Self {
            no_date_marker: naming.no_date_marker.clone(),
            separator: naming.separator,
            prefixes: naming.prefixes.clone(),
            aliases: naming.aliases.clone(),
            legacy,
            century_pivot: naming.century_pivot,
        })
    }

    /// Decode a raw column name into its canonical variable.
    ///
    /// A name that matches neither recognized shape is an error — a
    /// malformed column name is an input defect, not a per-row condition.
    pub fn decode(&self, raw: &str) -> Result<CanonicalVariable, DecodeError> {
        if let Some(stem) = raw.strip_suffix(self.no_date_marker.as_str()) {
            if stem.is_empty() {
                return Err(DecodeError::EmptyName(raw.to_string()));
            }
            return Ok(CanonicalVariable::new(stem, TemporalAnchor::None));
        }

        let (working, year) = if let Some(year) = trailing_year(raw) {
            let stem = &raw[..raw.len() - 4];
            let stem = stem.strip_suffix(self.separator).unwrap_or(stem);
            (stem, year)
        } else if let Some((stem, year)) = self.match_legacy(raw) {
            (stem, year)
        } else {
            return Err(DecodeError::UnrecognizedShape(raw.to_string()));
        };

        let name = self.canonicalize(working);
        if name.is_empty() {
            return Err(DecodeError::EmptyName(raw.to_string()));
        }
        if has_digit_edge(&name) {
            warn!(raw, canonical = %name, "canonical name starts or ends with a digit");
        }
        Ok(CanonicalVariable::new(name, TemporalAnchor::Year(year)))
    }

    /// Match a legacy 2-digit-year shape and split off the year.
    fn match_legacy<'a>(&self, raw: &'a str) -> Option<(&'a str, i32)> {
        if !self.legacy.iter().any(|regex| regex.is_match(raw)) {
            return None;
        }
        if raw.len() < 2 || !raw.is_char_boundary(raw.len() - 2) {
            return None;
        }
        let (stem, digits) = raw.split_at(raw.len() - 2);
        let two_digit: u8 = digits.parse().ok()?;
        let year = if two_digit < self.century_pivot {
            2000 + i32::from(two_digit)
        } else {
            1900 + i32::from(two_digit)
        };
        Some((stem, year))
    }

    /// Reduce a year-stripped working name to its canonical form:
    /// remove at most one configured prefix (first match in order), apply
    /// the alias map, drop a leftover trailing digit run, trim separators.
    fn canonicalize(&self, working: &str) -> String {
        let mut name = working;
        for prefix in &self.prefixes {
            if let Some(stripped) = name.strip_prefix(prefix.as_str()) {
                name = stripped;
                break;
            }
        }
        if let Some(alias) = self.aliases.get(name) {
            name = alias;
        }
        let name = name.trim_end_matches(|c: char| c.is_ascii_digit());
        name.trim_matches(self.separator).to_string()
    }
}

/// Whether a canonical name begins or ends with a digit — the signature of
/// an unresolved naming collision. Diagnosed, never fatal.
pub fn has_digit_edge(name: &str) -> bool {
    let starts = name.chars().next().is_some_and(|c| c.is_ascii_digit());
    let ends = name.chars().next_back().is_some_and(|c| c.is_ascii_digit());
    starts || ends
}

fn trailing_year(raw: &str) -> Option<i32> {
    if raw.len() < 4 || !raw.is_char_boundary(raw.len() - 4) {
        return None;
    }
    let digits = &raw[raw.len() - 4..];
    if digits.chars().all(|c| c.is_ascii_digit()) {
        digits.parse().ok()
    } else {
        None
    }
}
