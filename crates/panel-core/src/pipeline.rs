#![deny(unsafe_code)]

//! Staged panel-construction pipeline.
//!
//! Stages run in a fixed order — build, merge, rescale, fill, aggregate —
//! and each returns a new table; no stage mutates a table it did not
//! create. The merge must complete before filling starts and filling
//! before aggregation; within a stage, per-subject work is independent.

use tracing::{info, info_span, warn};

use panel_ingest::WideTable;
use panel_model::{AgePanel, PanelConfig, PeriodPanel};

use crate::aggregate::aggregate_periods;
use crate::builder::build_age_panel;
use crate::codec::NameRules;
use crate::diagnostics::RunDiagnostics;
use crate::error::Result;
use crate::gapfill::fill_gaps;
use crate::merge::merge_informant_table;
use crate::rescale::apply_rescales;

/// Everything a run produces: the filled age panel, the period panel and
/// the non-fatal findings gathered along the way.
#[derive(Debug)]
pub struct PipelineOutput {
    pub age_panel: AgePanel,
    pub period_panel: PeriodPanel,
    pub diagnostics: RunDiagnostics,
}

/// Run the full pipeline over already-loaded tables.
///
/// Configuration is re-validated here so library callers get the same
/// fail-fast behavior as the CLI. Decode and linkage failures abort;
/// sparsity never does.
pub fn run_pipeline(
    primary: &WideTable,
    secondary: &WideTable,
    config: &PanelConfig,
) -> Result<PipelineOutput> {
    config.validate()?;
    let rules = NameRules::new(&config.naming)?;
    let mut diagnostics = RunDiagnostics::default();

    let panel = {
        let _span = info_span!("build_age_panel").entered();
        build_age_panel(primary, config, &rules, &mut diagnostics)?
    };

    let panel = {
        let _span = info_span!("merge_informant_table").entered();
        merge_informant_table(panel, primary, secondary, config, &rules, &mut diagnostics)?
    };

    let panel = {
        let _span = info_span!("apply_rescales").entered();
        apply_rescales(panel, config, &mut diagnostics)
    };

    // capture the all-missing variables on the merged, pre-fill panel:
    // gap filling cannot create data, but the pre-fill view is what a
    // reviewer needs to see
    diagnostics.all_missing_variables = panel.all_missing_variables();
    if !diagnostics.all_missing_variables.is_empty() {
        warn!(
            count = diagnostics.all_missing_variables.len(),
            "variables with no data across all subjects"
        );
    }

    let panel = {
        let _span = info_span!("fill_gaps").entered();
        fill_gaps(panel, config, &mut diagnostics)
    };

    let period_panel = {
        let _span = info_span!("aggregate_periods").entered();
        aggregate_periods(&panel, config)
    };

    info!(
        subjects = panel.subjects().len(),
        variables = panel.variable_count(),
        age_rows = panel.row_count(),
        period_rows = period_panel.row_count(),
        "pipeline complete"
    );

    Ok(PipelineOutput {
        age_panel: panel,
        period_panel,
        diagnostics,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    use panel_model::SubjectId;

    use crate::testutil::{int_col, num_col, test_config, wide_table};

    fn primary() -> WideTable {
        wide_table(
            "primary",
            vec![
                int_col("CPUBID_XRND", vec![Some(101)]),
                int_col("CYRB_XRND", vec![Some(2000)]),
                int_col("MPUBID_XRND", vec![Some(11)]),
                num_col("MATH_SCORE_2007", vec![Some(50.0)]),
                num_col("MATH_SCORE_2008", vec![Some(60.0)]),
            ],
        )
    }

    fn secondary() -> WideTable {
        wide_table(
            "secondary",
            vec![
                int_col("CASEID_1979", vec![Some(11)]),
                num_col("HIGHEST_GRADE_XRND", vec![Some(12.0)]),
            ],
        )
    }

    #[test]
    fn end_to_end_carry_and_period_mean() {
        let output = run_pipeline(&primary(), &secondary(), &test_config()).unwrap();
        let s = SubjectId::new(101);
        // known 7 -> 50, 8 -> 60; carry fills 6 -> 50 and 9 -> 60, so the
        // elementary period (ages 6..=9) averages to 55
        assert_eq!(
            output.period_panel.get(s, 1, "MATH_SCORE"),
            Some(55.0)
        );
        // informant's no-date value reaches every period
        assert_eq!(
            output.period_panel.get(s, 3, "HIGHEST_GRADE"),
            Some(12.0)
        );
    }

    #[test]
    fn runs_are_deterministic() {
        let first = run_pipeline(&primary(), &secondary(), &test_config()).unwrap();
        let second = run_pipeline(&primary(), &secondary(), &test_config()).unwrap();
        let frame_a = crate::frame::age_panel_to_frame(&first.age_panel).unwrap();
        let frame_b = crate::frame::age_panel_to_frame(&second.age_panel).unwrap();
        assert!(frame_a.equals_missing(&frame_b));
        let period_a = crate::frame::period_panel_to_frame(&first.period_panel).unwrap();
        let period_b = crate::frame::period_panel_to_frame(&second.period_panel).unwrap();
        assert!(period_a.equals_missing(&period_b));
    }

    #[test]
    fn invalid_config_rejected_before_any_work() {
        let mut config = test_config();
        config.periods.retain(|p| p.index != 2);
        assert!(run_pipeline(&primary(), &secondary(), &config).is_err());
    }

    #[test]
    fn all_missing_variables_surface_in_diagnostics() {
        let table = wide_table(
            "primary",
            vec![
                int_col("CPUBID_XRND", vec![Some(101)]),
                int_col("CYRB_XRND", vec![Some(2000)]),
                int_col("MPUBID_XRND", vec![Some(11)]),
                num_col("GHOST_SCORE_2007", vec![None]),
            ],
        );
        let output = run_pipeline(&table, &secondary(), &test_config()).unwrap();
        assert_eq!(
            output.diagnostics.all_missing_variables,
            vec!["GHOST_SCORE".to_string()]
        );
    }
}
