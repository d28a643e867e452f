#![deny(unsafe_code)]

//! Extending the age panel with informant-table variables.
//!
//! The secondary table is keyed by informant id, not subject id: every
//! lookup goes subject → foreign identifier → informant row. The
//! informant-row index is built once per merge; ages always come from the
//! subject's own birth year, never from anything in the informant record.
//! One informant row may serve several subjects.

use std::collections::BTreeMap;

use tracing::{debug, warn};

use panel_ingest::WideTable;
use panel_model::{AgePanel, InformantId, PanelConfig, SubjectId, TemporalAnchor};

use crate::age::age_at;
use crate::builder::{birth_years, broadcast_column, subject_ids};
use crate::codec::{NameRules, has_digit_edge};
use crate::diagnostics::RunDiagnostics;
use crate::error::{CoreError, Result};

/// Merge the secondary (informant) table into an existing age panel.
///
/// Column names are decoded exactly as in the primary pass; an
/// unrecognized shape is fatal. A subject whose foreign identifier is
/// missing, or resolves to no informant row, is fatal as well — both mean
/// the two tables do not actually link.
pub fn merge_informant_table(
    mut panel: AgePanel,
    primary: &WideTable,
    secondary: &WideTable,
    config: &PanelConfig,
    rules: &NameRules,
    diagnostics: &mut RunDiagnostics,
) -> Result<AgePanel> {
    let subjects = subject_ids(primary, &config.columns.subject_id)?;
    let births = birth_years(primary, &config.columns.birth_year, &subjects)?;
    let links = informant_links(primary, &config.columns.informant_id, &subjects)?;
    let informant_rows = informant_row_index(secondary, &config.columns.informant_key)?;

    // resolve every subject's informant row up front; a broken link is
    // fatal before any values move
    let mut source_rows = Vec::with_capacity(subjects.len());
    for (subject, informant) in subjects.iter().zip(&links) {
        let row = informant_rows
            .get(informant)
            .copied()
            .ok_or(CoreError::UnknownInformant {
                informant: *informant,
                subject: *subject,
                table: secondary.name().to_string(),
            })?;
        source_rows.push(row);
    }

    for raw in secondary.headers() {
        if raw == &config.columns.informant_key {
            continue;
        }
        let decoded = rules.decode(raw)?;
        if has_digit_edge(&decoded.name) {
            diagnostics.record_digit_edge(&decoded.name);
        }
        let column = secondary.numeric_column(raw)?;
        // reorder the informant column into subject order once per column
        let values: Vec<Option<f64>> = source_rows.iter().map(|row| column[*row]).collect();
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
                backfill_pre_birth(&mut panel, config, &decoded.name, diagnostics);
            }
        }
    }

    debug!(
        variables = panel.variable_count(),
        informants = informant_rows.len(),
        "informant table merged"
    );
    Ok(panel)
}

/// Foreign identifiers of the primary table, aligned with subject rows.
fn informant_links(
    table: &WideTable,
    column: &str,
    subjects: &[SubjectId],
) -> Result<Vec<InformantId>> {
    table
        .integer_column(column)?
        .iter()
        .zip(subjects)
        .map(|(id, subject)| {
            id.map(InformantId::new)
                .ok_or(CoreError::MissingInformantLink { subject: *subject })
        })
        .collect()
}

/// Key → row index for the secondary table, built once per merge.
fn informant_row_index(
    table: &WideTable,
    column: &str,
) -> Result<BTreeMap<InformantId, usize>> {
    let mut index = BTreeMap::new();
    for (row, key) in table.integer_column(column)?.iter().enumerate() {
        let informant = key.map(InformantId::new).ok_or(CoreError::MissingInformantKey {
            table: table.name().to_string(),
            row,
        })?;
        if index.insert(informant, row).is_some() {
            return Err(CoreError::DuplicateInformant {
                informant,
                table: table.name().to_string(),
            });
        }
    }
    Ok(index)
}

/// Ensure the sentinel pre-birth row carries a value for `name` wherever
/// any negative age does.
///
/// For each subject with an empty pre-birth cell, the greatest
/// (closest-to-zero) negative age holding a value is copied in. When no
/// negative age has one, the cell stays missing and the miss is recorded —
/// a value is never fabricated.
fn backfill_pre_birth(
    panel: &mut AgePanel,
    config: &PanelConfig,
    name: &str,
    diagnostics: &mut RunDiagnostics,
) {
    let pre_birth = config.pre_birth_age;
    for subject in panel.subjects().to_vec() {
        if panel.get(subject, pre_birth, name).is_some() {
            continue;
        }
        let donor = (config.window.start..=-1)
            .rev()
            .filter(|age| *age != pre_birth)
            .find_map(|age| panel.get(subject, age, name));
        match donor {
            Some(value) => {
                panel.update(subject, pre_birth, name, Some(value));
            }
            None => {
                warn!(%subject, variable = name, "no negative-age value for pre-birth backfill");
                diagnostics.record_backfill_miss(subject, name);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::builder::build_age_panel;
    use crate::testutil::{int_col, num_col, test_config, wide_table};

    fn primary() -> WideTable {
        wide_table(
            "primary",
            vec![
                int_col("CPUBID_XRND", vec![Some(101), Some(102)]),
                int_col("CYRB_XRND", vec![Some(1995), Some(1990)]),
                int_col("MPUBID_XRND", vec![Some(11), Some(12)]),
            ],
        )
    }

    fn merge(
        primary: &WideTable,
        secondary: &WideTable,
    ) -> Result<(AgePanel, RunDiagnostics)> {
        let config = test_config();
        let rules = NameRules::new(&config.naming).unwrap();
        let mut diagnostics = RunDiagnostics::default();
        let panel = build_age_panel(primary, &config, &rules, &mut diagnostics)?;
        let panel = merge_informant_table(
            panel,
            primary,
            secondary,
            &config,
            &rules,
            &mut diagnostics,
        )?;
        Ok((panel, diagnostics))
    }

    #[test]
    fn no_date_informant_values_broadcast_through_the_link() {
        let secondary = wide_table(
            "secondary",
            vec![
                int_col("CASEID_1979", vec![Some(12), Some(11)]),
                num_col("MOTHER_RACE_XRND", vec![Some(2.0), Some(3.0)]),
            ],
        );
        let (panel, _) = merge(&primary(), &secondary).unwrap();
        for age in -1..=19 {
            assert_eq!(
                panel.get(SubjectId::new(101), age, "MOTHER_RACE"),
                Some(3.0)
            );
            assert_eq!(
                panel.get(SubjectId::new(102), age, "MOTHER_RACE"),
                Some(2.0)
            );
        }
    }

    #[test]
    fn anchored_informant_values_use_subject_birth_year() {
        let secondary = wide_table(
            "secondary",
            vec![
                int_col("CASEID_1979", vec![Some(11), Some(12)]),
                num_col("INCOME_2000", vec![Some(40_000.0), Some(52_000.0)]),
            ],
        );
        let (panel, _) = merge(&primary(), &secondary).unwrap();
        // subject 101 born 1995: 2000 -> age 5; subject 102 born 1990: age 10
        assert_eq!(
            panel.get(SubjectId::new(101), 5, "INCOME"),
            Some(40_000.0)
        );
        assert_eq!(
            panel.get(SubjectId::new(102), 10, "INCOME"),
            Some(52_000.0)
        );
    }

    #[test]
    fn shared_informant_serves_multiple_subjects() {
        let shared_primary = wide_table(
            "primary",
            vec![
                int_col("CPUBID_XRND", vec![Some(101), Some(102)]),
                int_col("CYRB_XRND", vec![Some(1995), Some(1990)]),
                int_col("MPUBID_XRND", vec![Some(11), Some(11)]),
            ],
        );
        let secondary = wide_table(
            "secondary",
            vec![
                int_col("CASEID_1979", vec![Some(11)]),
                num_col("HIGHEST_GRADE_XRND", vec![Some(12.0)]),
            ],
        );
        let (panel, _) = merge(&shared_primary, &secondary).unwrap();
        assert_eq!(
            panel.get(SubjectId::new(101), 0, "HIGHEST_GRADE"),
            Some(12.0)
        );
        assert_eq!(
            panel.get(SubjectId::new(102), 0, "HIGHEST_GRADE"),
            Some(12.0)
        );
    }

    #[test]
    fn pre_birth_cell_left_missing_records_diagnostic() {
        // subject 101 born 1995; INCOME94 lands at age -1 for it, but for
        // subject 102 (born 1990) 1994 is age 4 — its pre-birth row has no
        // negative-age donor and must stay missing
        let secondary = wide_table(
            "secondary",
            vec![
                int_col("CASEID_1979", vec![Some(11), Some(12)]),
                num_col("INCOME_1994", vec![Some(30_000.0), Some(45_000.0)]),
            ],
        );
        let (panel, diagnostics) = merge(&primary(), &secondary).unwrap();
        assert_eq!(
            panel.get(SubjectId::new(101), -1, "INCOME"),
            Some(30_000.0)
        );
        assert_eq!(panel.get(SubjectId::new(102), -1, "INCOME"), None);
        assert_eq!(diagnostics.backfill_misses.len(), 1);
        assert_eq!(
            diagnostics.backfill_misses[0].subject,
            SubjectId::new(102)
        );
        assert_eq!(diagnostics.backfill_misses[0].variable, "INCOME");
    }

    #[test]
    fn backfill_copies_greatest_negative_age() {
        // widen the pre-birth window so age -2 exists as a donor
        let mut config = test_config();
        config.window.start = -3;
        config.periods.push(panel_model::PeriodRange {
            index: -2,
            start: -3,
            end: -2,
            label: String::new(),
        });
        let rules = NameRules::new(&config.naming).unwrap();
        let mut diagnostics = RunDiagnostics::default();
        let primary = wide_table(
            "primary",
            vec![
                int_col("CPUBID_XRND", vec![Some(101)]),
                int_col("CYRB_XRND", vec![Some(1996)]),
                int_col("MPUBID_XRND", vec![Some(11)]),
            ],
        );
        // 1994 is age -2 for a 1996 birth; the pre-birth row (-1) is empty
        let secondary = wide_table(
            "secondary",
            vec![
                int_col("CASEID_1979", vec![Some(11)]),
                num_col("INCOME_1994", vec![Some(28_000.0)]),
            ],
        );
        let panel = build_age_panel(&primary, &config, &rules, &mut diagnostics).unwrap();
        let panel = merge_informant_table(
            panel,
            &primary,
            &secondary,
            &config,
            &rules,
            &mut diagnostics,
        )
        .unwrap();
        assert_eq!(
            panel.get(SubjectId::new(101), -1, "INCOME"),
            Some(28_000.0)
        );
        assert_eq!(
            panel.get(SubjectId::new(101), -2, "INCOME"),
            Some(28_000.0)
        );
        assert!(diagnostics.backfill_misses.is_empty());
    }

    #[test]
    fn unknown_informant_is_fatal() {
        let secondary = wide_table(
            "secondary",
            vec![
                int_col("CASEID_1979", vec![Some(11)]), // no informant 12
                num_col("INCOME_2000", vec![Some(40_000.0)]),
            ],
        );
        let err = merge(&primary(), &secondary).unwrap_err();
        assert!(matches!(err, CoreError::UnknownInformant { .. }));
    }

    #[test]
    fn malformed_secondary_column_is_fatal() {
        let secondary = wide_table(
            "secondary",
            vec![
                int_col("CASEID_1979", vec![Some(11), Some(12)]),
                num_col("BADLY_NAMED", vec![Some(1.0), Some(2.0)]),
            ],
        );
        let err = merge(&primary(), &secondary).unwrap_err();
        assert!(matches!(err, CoreError::Decode(_)));
    }

    #[test]
    fn duplicate_informant_key_is_fatal() {
        let secondary = wide_table(
            "secondary",
            vec![
                int_col("CASEID_1979", vec![Some(11), Some(11)]),
                num_col("INCOME_2000", vec![Some(1.0), Some(2.0)]),
            ],
        );
        let err = merge(&primary(), &secondary).unwrap_err();
        assert!(matches!(err, CoreError::DuplicateInformant { .. }));
    }
}
