#![deny(unsafe_code)]

//! Panel ↔ DataFrame conversion at the pipeline boundary.
//!
//! Panels stay in their dense keyed form while being built and filled;
//! they become Polars `DataFrame`s only when handed to persistence or to
//! a caller. Row order matches the panels' own ordering, so conversion is
//! deterministic.

use polars::prelude::{Column, DataFrame, PolarsResult};

use panel_model::{AGE_COL, AgePanel, PERIOD_COL, PeriodPanel, SUBJECT_COL};

/// Convert the age panel to a long-format frame: `id`, `age`, then one
/// column per canonical variable, rows sorted by (id, age).
pub fn age_panel_to_frame(panel: &AgePanel) -> PolarsResult<DataFrame> {
    let window_len = panel.window_len();
    let mut ids: Vec<i64> = Vec::with_capacity(panel.row_count());
    let mut ages: Vec<i32> = Vec::with_capacity(panel.row_count());
    for subject in panel.subjects() {
        for age in panel.ages() {
            ids.push(subject.as_i64());
            ages.push(age);
        }
    }
    debug_assert_eq!(ids.len(), panel.subjects().len() * window_len);

    let mut columns: Vec<Column> = Vec::with_capacity(panel.variable_count() + 2);
    columns.push(Column::new(SUBJECT_COL.into(), ids));
    columns.push(Column::new(AGE_COL.into(), ages));
    for name in panel.variable_names() {
        let values = panel.column(name).expect("listed variable exists");
        columns.push(Column::new(name.into(), values.to_vec()));
    }
    DataFrame::new(columns)
}

/// Convert the period panel to a frame: `id`, `period`, then one column
/// per canonical variable, rows sorted by (id, period).
pub fn period_panel_to_frame(panel: &PeriodPanel) -> PolarsResult<DataFrame> {
    let mut ids: Vec<i64> = Vec::with_capacity(panel.row_count());
    let mut periods: Vec<i32> = Vec::with_capacity(panel.row_count());
    for subject in panel.subjects() {
        for period in panel.period_indices() {
            ids.push(subject.as_i64());
            periods.push(*period);
        }
    }

    let mut columns: Vec<Column> = Vec::with_capacity(panel.variable_count() + 2);
    columns.push(Column::new(SUBJECT_COL.into(), ids));
    columns.push(Column::new(PERIOD_COL.into(), periods));
    for name in panel.variable_names() {
        let values = panel.column(name).expect("listed variable exists");
        columns.push(Column::new(name.into(), values.to_vec()));
    }
    DataFrame::new(columns)
}

#[cfg(test)]
mod tests {
    use super::*;

    use panel_model::SubjectId;

    #[test]
    fn age_frame_has_id_age_then_variables() {
        let mut panel = AgePanel::new(vec![SubjectId::new(7)], -1, 1).unwrap();
        panel.update(SubjectId::new(7), 0, "SCORE", Some(5.0));
        let df = age_panel_to_frame(&panel).unwrap();
        assert_eq!(df.height(), 3);
        let names: Vec<String> = df
            .get_column_names()
            .iter()
            .map(|n| n.to_string())
            .collect();
        assert_eq!(names, vec!["id", "age", "SCORE"]);
        let ages: Vec<Option<i32>> = df
            .column("age")
            .unwrap()
            .as_materialized_series()
            .i32()
            .unwrap()
            .into_iter()
            .collect();
        assert_eq!(ages, vec![Some(-1), Some(0), Some(1)]);
    }

    #[test]
    fn period_frame_row_order_matches_panel() {
        let mut panel = PeriodPanel::new(
            vec![SubjectId::new(1), SubjectId::new(2)],
            vec![-1, 0],
        );
        panel.insert_column("X", vec![Some(1.0), Some(2.0), Some(3.0), Some(4.0)]);
        let df = period_panel_to_frame(&panel).unwrap();
        assert_eq!(df.height(), 4);
        let ids: Vec<Option<i64>> = df
            .column("id")
            .unwrap()
            .as_materialized_series()
            .i64()
            .unwrap()
            .into_iter()
            .collect();
        assert_eq!(ids, vec![Some(1), Some(1), Some(2), Some(2)]);
        let periods: Vec<Option<i32>> = df
            .column("period")
            .unwrap()
            .as_materialized_series()
            .i32()
            .unwrap()
            .into_iter()
            .collect();
        assert_eq!(periods, vec![Some(-1), Some(0), Some(-1), Some(0)]);
    }
}
