#![deny(unsafe_code)]

use std::fmt;

/// The temporal placement decoded from a raw wide-table column name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum TemporalAnchor {
    /// The column carries values observed in a specific survey year.
    Year(i32),
    /// The column carries a fact with no wave-specific year; its value is
    /// constant across all ages of a subject (e.g. sex, birth year).
    None,
}

impl TemporalAnchor {
    pub fn year(self) -> Option<i32> {
        match self {
            Self::Year(y) => Some(y),
            Self::None => None,
        }
    }
}

impl fmt::Display for TemporalAnchor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Year(y) => write!(f, "{y}"),
            Self::None => f.write_str("no-date"),
        }
    }
}

/// The canonical identity of a measured concept across survey waves.
///
/// Decoding a raw column name yields the de-aliased, de-prefixed,
/// year-stripped `name` plus the [`TemporalAnchor`] extracted from the
/// suffix. Many raw columns (one per wave) map to the same canonical name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct CanonicalVariable {
    pub name: String,
    pub anchor: TemporalAnchor,
}

impl CanonicalVariable {
    pub fn new(name: impl Into<String>, anchor: TemporalAnchor) -> Self {
        Self {
            name: name.into(),
            anchor,
        }
    }
}

impl fmt::Display for CanonicalVariable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} @ {}", self.name, self.anchor)
    }
}
