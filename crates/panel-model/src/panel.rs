#![deny(unsafe_code)]

use std::collections::BTreeMap;

use crate::error::{ModelError, Result};
use crate::ids::SubjectId;

/// Output column holding the subject identifier.
pub const SUBJECT_COL: &str = "id";
/// Output column holding the integer age.
pub const AGE_COL: &str = "age";
/// Output column holding the period index.
pub const PERIOD_COL: &str = "period";

/// Long-format panel with one row per (subject, age).
///
/// The skeleton is dense: every subject owns one row for every age in the
/// configured window, created up front regardless of data availability.
/// Rows are addressed arithmetically — `subject block * window length +
/// age offset` — so placing a value is a single indexed write, never a
/// scan. Subjects are kept sorted by id so that iteration order (and any
/// table derived from it) is deterministic.
#[derive(Debug, Clone)]
pub struct AgePanel {
    subjects: Vec<SubjectId>,
    subject_blocks: BTreeMap<SubjectId, usize>,
    age_min: i32,
    age_max: i32,
    columns: BTreeMap<String, Vec<Option<f64>>>,
}

impl AgePanel {
    /// Create the dense skeleton for the given subjects and age window.
    ///
    /// Subjects are sorted by id; a duplicate id is an error.
    pub fn new(mut subjects: Vec<SubjectId>, age_min: i32, age_max: i32) -> Result<Self> {
        if age_min > age_max {
            return Err(ModelError::InvalidWindow {
                min: age_min,
                max: age_max,
            });
        }
        subjects.sort();
        let mut blocks = BTreeMap::new();
        for (block, subject) in subjects.iter().enumerate() {
            if blocks.insert(*subject, block).is_some() {
                return Err(ModelError::DuplicateSubject(*subject));
            }
        }
        Ok(Self {
            subjects,
            subject_blocks: blocks,
            age_min,
            age_max,
            columns: BTreeMap::new(),
        })
    }

    pub fn age_min(&self) -> i32 {
        self.age_min
    }

    pub fn age_max(&self) -> i32 {
        self.age_max
    }

    /// Number of age rows per subject.
    pub fn window_len(&self) -> usize {
        (self.age_max - self.age_min + 1) as usize
    }

    pub fn row_count(&self) -> usize {
        self.subjects.len() * self.window_len()
    }

    pub fn subjects(&self) -> &[SubjectId] {
        &self.subjects
    }

    pub fn contains_age(&self, age: i32) -> bool {
        age >= self.age_min && age <= self.age_max
    }

    /// Ages in the window, ascending.
    pub fn ages(&self) -> impl Iterator<Item = i32> + '_ {
        self.age_min..=self.age_max
    }

    /// Block index of a subject (its first row is `block * window_len`).
    pub fn subject_block(&self, subject: SubjectId) -> Option<usize> {
        self.subject_blocks.get(&subject).copied()
    }

    /// Flat row index for a (subject, age) cell, if both are known.
    pub fn row_index(&self, subject: SubjectId, age: i32) -> Option<usize> {
        if !self.contains_age(age) {
            return None;
        }
        let block = self.subject_block(subject)?;
        Some(block * self.window_len() + (age - self.age_min) as usize)
    }

    /// Canonical variable names present in the panel, sorted.
    pub fn variable_names(&self) -> impl Iterator<Item = &str> {
        self.columns.keys().map(String::as_str)
    }

    pub fn variable_count(&self) -> usize {
        self.columns.len()
    }

    pub fn has_variable(&self, name: &str) -> bool {
        self.columns.contains_key(name)
    }

    /// Create an all-missing column for `name` if it does not exist yet.
    pub fn ensure_variable(&mut self, name: &str) {
        if !self.columns.contains_key(name) {
            self.columns
                .insert(name.to_string(), vec![None; self.row_count()]);
        }
    }

    pub fn column(&self, name: &str) -> Option<&[Option<f64>]> {
        self.columns.get(name).map(Vec::as_slice)
    }

    pub fn column_mut(&mut self, name: &str) -> Option<&mut [Option<f64>]> {
        self.columns.get_mut(name).map(Vec::as_mut_slice)
    }

    pub fn get(&self, subject: SubjectId, age: i32, name: &str) -> Option<f64> {
        let row = self.row_index(subject, age)?;
        self.columns.get(name).and_then(|col| col[row])
    }

    /// Write a value at a (subject, age) cell under `name`.
    ///
    /// A `Some` value always wins (last write wins); a `None` value never
    /// clears a present cell. Returns false when the cell is outside the
    /// panel (unknown subject or out-of-window age) and the value was
    /// dropped.
    pub fn update(&mut self, subject: SubjectId, age: i32, name: &str, value: Option<f64>) -> bool {
        let Some(row) = self.row_index(subject, age) else {
            return false;
        };
        if value.is_some() {
            self.ensure_variable(name);
            let col = self.columns.get_mut(name).expect("column just ensured");
            col[row] = value;
        }
        true
    }

    /// Names of variables with zero non-missing values across all rows.
    pub fn all_missing_variables(&self) -> Vec<String> {
        self.columns
            .iter()
            .filter(|(_, col)| col.iter().all(Option::is_none))
            .map(|(name, _)| name.clone())
            .collect()
    }
}

/// Aggregated panel with one row per (subject, period index).
///
/// Built once by period aggregation and immutable afterwards; rows are
/// ordered by (subject, period) ascending with the pre-birth period first
/// within each subject.
#[derive(Debug, Clone)]
pub struct PeriodPanel {
    subjects: Vec<SubjectId>,
    period_indices: Vec<i32>,
    columns: BTreeMap<String, Vec<Option<f64>>>,
}

impl PeriodPanel {
    /// Create an empty period panel over sorted subjects and sorted,
    /// distinct period indices.
    pub fn new(subjects: Vec<SubjectId>, period_indices: Vec<i32>) -> Self {
        debug_assert!(subjects.windows(2).all(|w| w[0] < w[1]));
        debug_assert!(period_indices.windows(2).all(|w| w[0] < w[1]));
        Self {
            subjects,
            period_indices,
            columns: BTreeMap::new(),
        }
    }

    pub fn subjects(&self) -> &[SubjectId] {
        &self.subjects
    }

    pub fn period_indices(&self) -> &[i32] {
        &self.period_indices
    }

    pub fn row_count(&self) -> usize {
        self.subjects.len() * self.period_indices.len()
    }

    pub fn row_index(&self, subject: SubjectId, period: i32) -> Option<usize> {
        let block = self.subjects.binary_search(&subject).ok()?;
        let offset = self.period_indices.binary_search(&period).ok()?;
        Some(block * self.period_indices.len() + offset)
    }

    pub fn variable_names(&self) -> impl Iterator<Item = &str> {
        self.columns.keys().map(String::as_str)
    }

    pub fn variable_count(&self) -> usize {
        self.columns.len()
    }

    pub fn column(&self, name: &str) -> Option<&[Option<f64>]> {
        self.columns.get(name).map(Vec::as_slice)
    }

    pub fn get(&self, subject: SubjectId, period: i32, name: &str) -> Option<f64> {
        let row = self.row_index(subject, period)?;
        self.columns.get(name).and_then(|col| col[row])
    }

    /// Install a fully-built column. The length must equal `row_count`.
    pub fn insert_column(&mut self, name: impl Into<String>, values: Vec<Option<f64>>) {
        assert_eq!(values.len(), self.row_count(), "column length mismatch");
        self.columns.insert(name.into(), values);
    }
}
