#![deny(unsafe_code)]

//! Age panel construction from the primary wide table.
//!
//! The panel skeleton — one row per (subject, age) for every age in the
//! configured window — always exists regardless of data availability.
//! Each raw column is then projected onto it in a single pass: no-date
//! columns broadcast to every age row of their subject, anchored columns
//! land on the one row the subject's age at the survey year selects.
//! Placement is an indexed write against the dense skeleton; nothing is
//! re-scanned per cell.

use tracing::debug;

use panel_ingest::WideTable;
use panel_model::{AgePanel, PanelConfig, SubjectId, TemporalAnchor};

use crate::age::age_at;
use crate::codec::{NameRules, has_digit_edge};
use crate::diagnostics::RunDiagnostics;
use crate::error::{CoreError, Result};

/// Build the subject-by-age panel from the primary table.
///
/// Fails fast on a malformed column name, a missing subject id or birth
/// year, or a duplicate subject id — all structural defects. An anchored
/// value whose age falls outside the window is dropped silently (counted
/// in diagnostics), not an error.
pub fn build_age_panel(
    primary: &WideTable,
    config: &PanelConfig,
    rules: &NameRules,
    diagnostics: &mut RunDiagnostics,
) -> Result<AgePanel> {
    let subjects = subject_ids(primary, &config.columns.subject_id)?;
    let births = birth_years(primary, &config.columns.birth_year, &subjects)?;
    let mut panel = AgePanel::new(subjects.clone(), config.window.start, config.window.end)?;

    for raw in primary.headers() {
        if raw == &config.columns.subject_id {
            continue;
        }
        let decoded = rules.decode(raw)?;
        if has_digit_edge(&decoded.name) {
            diagnostics.record_digit_edge(&decoded.name);
        }
        let values = primary.numeric_column(raw)?;
        match decoded.anchor {
            TemporalAnchor::None => {
                broadcast_column(&mut panel, &subjects, &values, &decoded.name);
            }
            TemporalAnchor::Year(year) => {
                panel.ensure_variable(&decoded.name);
                for (row, subject) in subjects.iter().enumerate() {
                    let age = age_at(births[row], year);
                    let placed = panel.update(*subject, age, &decoded.name, values[row]);
                    if !placed && values[row].is_some() {
                        diagnostics.out_of_window_drops += 1;
                    }
                }
            }
        }
    }

    debug!(
        subjects = panel.subjects().len(),
        variables = panel.variable_count(),
        rows = panel.row_count(),
        "age panel built"
    );
    Ok(panel)
}

/// Subject ids of the primary table, in row order. An empty id cell is
/// fatal.
pub fn subject_ids(table: &WideTable, column: &str) -> Result<Vec<SubjectId>> {
    table
        .integer_column(column)?
        .iter()
        .enumerate()
        .map(|(row, id)| {
            id.map(SubjectId::new).ok_or(CoreError::MissingSubjectId {
                table: table.name().to_string(),
                row,
            })
        })
        .collect()
}

/// Birth years aligned with the subject rows. A subject without a birth
/// year cannot be placed on any age row, so an empty cell is fatal.
pub fn birth_years(
    table: &WideTable,
    column: &str,
    subjects: &[SubjectId],
) -> Result<Vec<i32>> {
    table
        .integer_column(column)?
        .iter()
        .zip(subjects)
        .map(|(year, subject)| {
            year.map(|y| y as i32)
                .ok_or(CoreError::MissingBirthYear { subject: *subject })
        })
        .collect()
}

/// Copy one value per subject into every age row of that subject.
pub(crate) fn broadcast_column(
    panel: &mut AgePanel,
    subjects: &[SubjectId],
    values: &[Option<f64>],
    name: &str,
) {
    panel.ensure_variable(name);
    let window_len = panel.window_len();
    let blocks: Vec<(usize, f64)> = subjects
        .iter()
        .zip(values)
        .filter_map(|(subject, value)| {
            value.map(|v| (panel.subject_block(*subject).expect("subject in panel"), v))
        })
        .collect();
    let col = panel.column_mut(name).expect("column just ensured");
    for (block, value) in blocks {
        col[block * window_len..(block + 1) * window_len].fill(Some(value));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use panel_model::PanelConfig;

    use crate::testutil::{int_col, num_col, test_config, wide_table};

    fn primary() -> WideTable {
        wide_table(
            "primary",
            vec![
                int_col("CPUBID_XRND", vec![Some(101), Some(102)]),
                int_col("CYRB_XRND", vec![Some(2000), Some(1995)]),
                int_col("MPUBID_XRND", vec![Some(11), Some(11)]),
                num_col("MATH_SCORE_2007", vec![Some(50.0), Some(81.0)]),
                num_col("MATH_SCORE_2008", vec![Some(60.0), None]),
            ],
        )
    }

    fn build(table: &WideTable, config: &PanelConfig) -> (AgePanel, RunDiagnostics) {
        let rules = NameRules::new(&config.naming).unwrap();
        let mut diagnostics = RunDiagnostics::default();
        let panel = build_age_panel(table, config, &rules, &mut diagnostics).unwrap();
        (panel, diagnostics)
    }

    #[test]
    fn skeleton_exists_for_every_subject_and_age() {
        let config = test_config();
        let (panel, _) = build(&primary(), &config);
        assert_eq!(panel.subjects().len(), 2);
        assert_eq!(panel.row_count(), 2 * 21);
        for subject in [SubjectId::new(101), SubjectId::new(102)] {
            for age in -1..=19 {
                assert!(panel.row_index(subject, age).is_some());
            }
        }
    }

    #[test]
    fn no_date_values_broadcast_to_all_ages() {
        let config = test_config();
        let (panel, _) = build(&primary(), &config);
        for age in -1..=19 {
            assert_eq!(panel.get(SubjectId::new(101), age, "CYRB"), Some(2000.0));
            assert_eq!(panel.get(SubjectId::new(101), age, "MPUBID"), Some(11.0));
        }
    }

    #[test]
    fn anchored_values_land_on_the_age_row() {
        let config = test_config();
        let (panel, _) = build(&primary(), &config);
        // birth 2000: 2007 -> age 7, 2008 -> age 8
        assert_eq!(panel.get(SubjectId::new(101), 7, "MATH_SCORE"), Some(50.0));
        assert_eq!(panel.get(SubjectId::new(101), 8, "MATH_SCORE"), Some(60.0));
        assert_eq!(panel.get(SubjectId::new(101), 6, "MATH_SCORE"), None);
        // birth 1995: 2007 -> age 12
        assert_eq!(panel.get(SubjectId::new(102), 12, "MATH_SCORE"), Some(81.0));
    }

    #[test]
    fn out_of_window_values_dropped_and_counted() {
        let config = test_config();
        let table = wide_table(
            "primary",
            vec![
                int_col("CPUBID_XRND", vec![Some(101)]),
                int_col("CYRB_XRND", vec![Some(2000)]),
                num_col("SCORE_2025", vec![Some(1.0)]), // age 25, outside window
            ],
        );
        let (panel, diagnostics) = build(&table, &config);
        assert!(panel.get(SubjectId::new(101), 19, "SCORE").is_none());
        assert_eq!(diagnostics.out_of_window_drops, 1);
    }

    #[test]
    fn later_non_missing_wins_and_missing_never_clears() {
        let mut config = test_config();
        // two raw columns aliased onto the same canonical cell
        config
            .naming
            .aliases
            .insert("MATH_RETEST".to_string(), "MATH_SCORE".to_string());
        config
            .naming
            .aliases
            .insert("MATH_RECHECK".to_string(), "MATH_SCORE".to_string());
        let table = wide_table(
            "primary",
            vec![
                int_col("CPUBID_XRND", vec![Some(101)]),
                int_col("CYRB_XRND", vec![Some(2000)]),
                num_col("MATH_SCORE_2007", vec![Some(50.0)]),
                num_col("MATH_RETEST_2007", vec![None]),
                num_col("MATH_RECHECK_2007", vec![Some(65.0)]),
            ],
        );
        let (panel, _) = build(&table, &config);
        // the missing retest must not clear the earlier 50; the later
        // non-missing recheck must overwrite it
        assert_eq!(panel.get(SubjectId::new(101), 7, "MATH_SCORE"), Some(65.0));
    }

    #[test]
    fn malformed_column_name_fails_fast() {
        let config = test_config();
        let table = wide_table(
            "primary",
            vec![
                int_col("CPUBID_XRND", vec![Some(101)]),
                int_col("CYRB_XRND", vec![Some(2000)]),
                num_col("NO_SHAPE_AT_ALL", vec![Some(1.0)]),
            ],
        );
        let rules = NameRules::new(&config.naming).unwrap();
        let mut diagnostics = RunDiagnostics::default();
        let err = build_age_panel(&table, &config, &rules, &mut diagnostics).unwrap_err();
        assert!(matches!(err, CoreError::Decode(_)));
    }

    #[test]
    fn missing_birth_year_is_fatal() {
        let config = test_config();
        let table = wide_table(
            "primary",
            vec![
                int_col("CPUBID_XRND", vec![Some(101)]),
                int_col("CYRB_XRND", vec![None]),
            ],
        );
        let rules = NameRules::new(&config.naming).unwrap();
        let mut diagnostics = RunDiagnostics::default();
        let err = build_age_panel(&table, &config, &rules, &mut diagnostics).unwrap_err();
        assert!(matches!(err, CoreError::MissingBirthYear { .. }));
    }

    #[test]
    fn duplicate_subject_id_is_fatal() {
        let config = test_config();
        let table = wide_table(
            "primary",
            vec![
                int_col("CPUBID_XRND", vec![Some(101), Some(101)]),
                int_col("CYRB_XRND", vec![Some(2000), Some(2001)]),
            ],
        );
        let rules = NameRules::new(&config.naming).unwrap();
        let mut diagnostics = RunDiagnostics::default();
        let err = build_age_panel(&table, &config, &rules, &mut diagnostics).unwrap_err();
        assert!(matches!(err, CoreError::Model(_)));
    }
}
