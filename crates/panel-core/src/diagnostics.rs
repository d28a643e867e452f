#![deny(unsafe_code)]

//! Non-fatal findings accumulated across a run.
//!
//! Data sparsity is never an error: it is represented as missing values
//! and surfaced here for review instead.

use std::collections::BTreeSet;

use panel_model::SubjectId;

/// A subject whose pre-birth row could not be backfilled for a variable
/// because no negative-age value exists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackfillMiss {
    pub subject: SubjectId,
    pub variable: String,
}

#[derive(Debug, Clone, Default)]
pub struct RunDiagnostics {
    /// Canonical names starting or ending with a digit (unresolved naming
    /// collisions).
    pub digit_edge_names: BTreeSet<String>,

    /// Pre-birth backfills that found no negative-age value.
    pub backfill_misses: Vec<BackfillMiss>,

    /// Canonical variables with zero non-missing values across all
    /// subjects, captured on the merged panel before gap filling.
    pub all_missing_variables: Vec<String>,

    /// Anchored values dropped because the subject's age at the survey
    /// year fell outside the panel window.
    pub out_of_window_drops: usize,

    /// Cells remapped by rescale rules.
    pub rescaled_cells: usize,

    /// Cells filled by interpolation or nearest-value carry.
    pub filled_cells: usize,

    /// (subject, variable) series left entirely missing by the gap filler.
    pub empty_series: usize,
}

impl RunDiagnostics {
    pub fn record_digit_edge(&mut self, name: &str) {
        self.digit_edge_names.insert(name.to_string());
    }

    pub fn record_backfill_miss(&mut self, subject: SubjectId, variable: &str) {
        self.backfill_misses.push(BackfillMiss {
            subject,
            variable: variable.to_string(),
        });
    }
}
