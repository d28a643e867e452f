#![deny(unsafe_code)]

//! Reducing the filled age panel to developmental periods.
//!
//! Each configured period is a closed age range; config validation
//! guarantees the non-pre-birth ranges partition `[0, age_max]` exactly,
//! so every age belongs to one period and the aggregator never has to
//! resolve overlaps. A cell of the period panel is the arithmetic mean of
//! the non-missing values across the period's ages; an all-missing group
//! stays missing. The singleton pre-birth period is passed through from
//! the sentinel age row with no averaging.

use tracing::debug;

use panel_model::{AgePanel, PanelConfig, PeriodPanel, PeriodRange};

/// Aggregate the filled age panel into the configured periods.
///
/// Output rows are ordered by (subject, period) ascending; with the
/// conventional negative pre-birth index that period sorts first.
pub fn aggregate_periods(panel: &AgePanel, config: &PanelConfig) -> PeriodPanel {
    let mut periods: Vec<&PeriodRange> = config.periods.iter().collect();
    periods.sort_by_key(|p| p.index);
    let indices: Vec<i32> = periods.iter().map(|p| p.index).collect();

    let mut out = PeriodPanel::new(panel.subjects().to_vec(), indices.clone());
    let pre_birth_age = config.pre_birth_age;

    for name in panel.variable_names() {
        let col = panel.column(name).expect("listed variable exists");
        let mut values: Vec<Option<f64>> = Vec::with_capacity(out.row_count());
        for subject in panel.subjects() {
            for period in &periods {
                let value = if period.start == pre_birth_age && period.end == pre_birth_age {
                    // pre-birth passthrough, no averaging
                    panel
                        .row_index(*subject, pre_birth_age)
                        .and_then(|row| col[row])
                } else {
                    mean_over_ages(panel, col, *subject, period)
                };
                values.push(value);
            }
        }
        out.insert_column(name.to_string(), values);
    }

    debug!(
        subjects = out.subjects().len(),
        periods = out.period_indices().len(),
        variables = out.variable_count(),
        "period panel aggregated"
    );
    out
}

/// Mean of the non-missing values across the period's ages, or `None`
/// when every age is missing.
fn mean_over_ages(
    panel: &AgePanel,
    col: &[Option<f64>],
    subject: panel_model::SubjectId,
    period: &PeriodRange,
) -> Option<f64> {
    let mut sum = 0.0;
    let mut count = 0usize;
    for age in period.start..=period.end {
        if let Some(row) = panel.row_index(subject, age)
            && let Some(value) = col[row]
        {
            sum += value;
            count += 1;
        }
    }
    if count == 0 {
        None
    } else {
        Some(sum / count as f64)
    }
}
