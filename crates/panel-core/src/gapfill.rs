#![deny(unsafe_code)]

//! Filling temporal gaps in the age panel.
//!
//! Surveys are biennial or irregular, so most subject/variable series have
//! holes. Filling is strictly per subject over the non-pre-birth ages
//! `[0, age_max]`; the pre-birth rows pass through untouched. The policy
//! is two-stage and must never extrapolate a model beyond the known
//! range:
//!
//! - sentinel codes ("refused", "don't know", …) are normalized to
//!   missing first;
//! - with fewer than two known points nothing is filled;
//! - with two or three known points, missing ages strictly inside the
//!   known range are linearly interpolated;
//! - with four or more, a natural cubic spline is used inside the known
//!   range instead;
//! - in both regimes, ages outside the known range take the nearest known
//!   value (constant carry).

use tracing::debug;

use panel_model::{AgePanel, PanelConfig};

use crate::diagnostics::RunDiagnostics;
use crate::interp::{NaturalCubicSpline, linear_at};

/// Known-point threshold at which interpolation switches from linear to
/// cubic.
const CUBIC_MIN_POINTS: usize = 4;

/// Fill missing cells per subject and variable. Present values are never
/// overwritten; only cells that are missing (after sentinel
/// normalization) receive filled values.
pub fn fill_gaps(
    mut panel: AgePanel,
    config: &PanelConfig,
    diagnostics: &mut RunDiagnostics,
) -> AgePanel {
    let fill = config.fill_window();
    let age_min = panel.age_min();
    let window_len = panel.window_len();
    let subject_count = panel.subjects().len();
    let lo = (fill.start - age_min) as usize;
    let hi = (fill.end - age_min) as usize;

    let names: Vec<String> = panel.variable_names().map(str::to_string).collect();
    for name in names {
        let col = panel.column_mut(&name).expect("listed variable exists");
        for block in 0..subject_count {
            let start = block * window_len;
            let series = &mut col[start + lo..=start + hi];
            normalize_sentinels(series, &config.missing_codes);
            diagnostics.filled_cells += fill_series(series);
            if series.iter().all(Option::is_none) {
                diagnostics.empty_series += 1;
            }
        }
    }

    debug!(
        filled = diagnostics.filled_cells,
        empty_series = diagnostics.empty_series,
        "gaps filled"
    );
    panel
}

/// Replace configured sentinel codes with missing.
fn normalize_sentinels(series: &mut [Option<f64>], codes: &[f64]) {
    if codes.is_empty() {
        return;
    }
    for cell in series.iter_mut() {
        if let Some(value) = *cell
            && codes.contains(&value)
        {
            *cell = None;
        }
    }
}

/// Fill one subject's series for one variable, indexed by age offset.
/// Returns the number of cells filled.
fn fill_series(series: &mut [Option<f64>]) -> usize {
    let known: Vec<(f64, f64)> = series
        .iter()
        .enumerate()
        .filter_map(|(offset, cell)| cell.map(|value| (offset as f64, value)))
        .collect();
    if known.len() < 2 {
        return 0;
    }

    let spline = if known.len() >= CUBIC_MIN_POINTS {
        NaturalCubicSpline::new(&known)
    } else {
        None
    };
    let (first_known, first_value) = known[0];
    let (last_known, last_value) = known[known.len() - 1];

    let mut filled = 0usize;
    for (offset, cell) in series.iter_mut().enumerate() {
        if cell.is_some() {
            continue;
        }
        let x = offset as f64;
        let value = if x < first_known {
            first_value
        } else if x > last_known {
            last_value
        } else if let Some(spline) = &spline {
            spline.value_at(x)
        } else {
            linear_at(&known, x)
        };
        *cell = Some(value);
        filled += 1;
    }
    filled
}
