#![deny(unsafe_code)]

//! Configuration surface for panel construction.
//!
//! The content of these tables is domain-specific (they describe one
//! survey's naming quirks); their shape is fixed here. Loading from disk
//! lives in `panel-config`; this module owns the types and the
//! structural validation that the rest of the pipeline relies on.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{ModelError, Result};

/// A closed age range `[start, end]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgeRange {
    pub start: i32,
    pub end: i32,
}

impl AgeRange {
    pub fn new(start: i32, end: i32) -> Self {
        Self { start, end }
    }

    pub fn contains(&self, age: i32) -> bool {
        age >= self.start && age <= self.end
    }

    pub fn len(&self) -> usize {
        if self.start > self.end {
            0
        } else {
            (self.end - self.start + 1) as usize
        }
    }

    pub fn is_empty(&self) -> bool {
        self.start > self.end
    }
}

/// A fixed-shape legacy column name (e.g. `HGCREV79`) whose trailing two
/// digits encode the survey year via the century pivot rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LegacyPattern {
    /// Anchored regular expression the full raw name must match. The
    /// pattern is expected to end in exactly two digit characters.
    pub pattern: String,
}

/// Rules for decoding raw column names into canonical variables.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NamingRules {
    /// Suffix marking a no-date column (constant across ages), e.g. `_XRND`.
    pub no_date_marker: String,

    /// Separator between a variable name and its year suffix.
    #[serde(default = "default_separator")]
    pub separator: char,

    /// Prefixes stripped from anchored names, tried in order; at most one
    /// prefix is removed per name.
    #[serde(default)]
    pub prefixes: Vec<String>,

    /// Raw-name → canonical-name overrides applied after prefix removal.
    #[serde(default)]
    pub aliases: BTreeMap<String, String>,

    /// Legacy 2-digit-year column shapes.
    #[serde(default)]
    pub legacy_patterns: Vec<LegacyPattern>,

    /// Two-digit years below this pivot resolve to the 2000s, the rest to
    /// the 1900s.
    #[serde(default = "default_century_pivot")]
    pub century_pivot: u8,
}

fn default_separator() -> char {
    '_'
}

fn default_century_pivot() -> u8 {
    25
}

/// Roles of the key columns in the two source tables, by raw name.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceColumns {
    /// Subject identifier column of the primary table.
    pub subject_id: String,
    /// Birth-year column of the primary table (a no-date column).
    pub birth_year: String,
    /// Foreign-key column of the primary table referencing the informant.
    pub informant_id: String,
    /// Key column of the secondary (informant) table.
    pub informant_key: String,
}

/// One configured period: a contiguous closed age range.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeriodRange {
    pub index: i32,
    pub start: i32,
    pub end: i32,
    #[serde(default)]
    pub label: String,
}

impl PeriodRange {
    pub fn contains(&self, age: i32) -> bool {
        age >= self.start && age <= self.end
    }

    pub fn is_singleton(&self) -> bool {
        self.start == self.end
    }
}

/// Remap a variable's coded values onto a new scale.
///
/// A cell equal to the 1-based integer code `k` becomes `values[k - 1]`;
/// any other value passes through. When `ages` is set the rule applies
/// only to rows inside that closed range.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RescaleRule {
    pub variable: String,
    pub values: Vec<f64>,
    #[serde(default)]
    pub ages: Option<AgeRange>,
}

/// Full configuration for one panel-construction run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PanelConfig {
    /// Panel age window, including the pre-birth ages.
    pub window: AgeRange,

    /// Sentinel age row capturing pre-birth facts.
    #[serde(default = "default_pre_birth_age")]
    pub pre_birth_age: i32,

    pub naming: NamingRules,
    pub columns: SourceColumns,
    pub periods: Vec<PeriodRange>,

    /// Sentinel codes normalized to missing before gap filling.
    #[serde(default)]
    pub missing_codes: Vec<f64>,

    #[serde(default)]
    pub rescale: Vec<RescaleRule>,

    /// Canonical-name → export-name renames applied when panels are
    /// persisted.
    #[serde(default)]
    pub export_renames: BTreeMap<String, String>,
}

fn default_pre_birth_age() -> i32 {
    -1
}

impl PanelConfig {
    /// Ages that gap filling and aggregation operate on: `[0, window.end]`.
    pub fn fill_window(&self) -> AgeRange {
        AgeRange::new(0, self.window.end)
    }

    /// The configured singleton pre-birth period, if any.
    pub fn pre_birth_period(&self) -> Option<&PeriodRange> {
        self.periods
            .iter()
            .find(|p| p.start == self.pre_birth_age && p.end == self.pre_birth_age)
    }

    /// Structural validation; every failure here is fatal for a run.
    ///
    /// The period ranges (minus the optional pre-birth singleton) must
    /// exactly partition `[0, window.end]`: closed-closed, contiguous, no
    /// gaps, no overlaps. The aggregator assumes this and does not
    /// re-check it.
    pub fn validate(&self) -> Result<()> {
        if self.window.is_empty() {
            return Err(ModelError::InvalidWindow {
                min: self.window.start,
                max: self.window.end,
            });
        }
        if self.window.end < 0 {
            return Err(ModelError::InvalidWindow {
                min: self.window.start,
                max: self.window.end,
            });
        }
        if self.pre_birth_age >= 0 || !self.window.contains(self.pre_birth_age) {
            return Err(ModelError::InvalidPreBirthAge {
                pre_birth: self.pre_birth_age,
                min: self.window.start,
                max: self.window.end,
            });
        }

        let mut indices = BTreeMap::new();
        for period in &self.periods {
            if period.start > period.end {
                return Err(ModelError::InvalidPeriods(format!(
                    "period {} has start {} after end {}",
                    period.index, period.start, period.end
                )));
            }
            if indices.insert(period.index, ()).is_some() {
                return Err(ModelError::InvalidPeriods(format!(
                    "duplicate period index {}",
                    period.index
                )));
            }
        }

        let mut pre_birth = 0usize;
        let mut ranges: Vec<&PeriodRange> = Vec::new();
        for period in &self.periods {
            if period.start == self.pre_birth_age && period.end == self.pre_birth_age {
                pre_birth += 1;
            } else {
                ranges.push(period);
            }
        }
        if pre_birth > 1 {
            return Err(ModelError::InvalidPeriods(
                "more than one pre-birth period".to_string(),
            ));
        }

        ranges.sort_by_key(|p| p.start);
        let fill = self.fill_window();
        let mut expected = fill.start;
        for period in &ranges {
            if period.start != expected {
                return Err(ModelError::InvalidPeriods(format!(
                    "age {} is not covered exactly once (period {} starts at {})",
                    expected, period.index, period.start
                )));
            }
            expected = period.end + 1;
        }
        if expected != fill.end + 1 {
            return Err(ModelError::InvalidPeriods(format!(
                "ages {}..={} are not covered by any period",
                expected, fill.end
            )));
        }

        for rule in &self.rescale {
            if rule.values.is_empty() {
                return Err(ModelError::InvalidRescale {
                    variable: rule.variable.clone(),
                    message: "empty value list".to_string(),
                });
            }
            if let Some(ages) = &rule.ages
                && ages.is_empty()
            {
                return Err(ModelError::InvalidRescale {
                    variable: rule.variable.clone(),
                    message: format!("empty age range {}..={}", ages.start, ages.end),
                });
            }
        }

        Ok(())
    }
}
