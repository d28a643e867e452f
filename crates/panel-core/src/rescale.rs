#![deny(unsafe_code)]

//! Remapping coded values onto analysis scales.
//!
//! Survey items are often recorded as small ordinal codes (1 = "none",
//! 2 = "1 or 2", 3 = "3 or more", …) whose meaning — and sometimes whose
//! scale — differs between waves administered at different ages. A rescale
//! rule replaces the 1-based code `k` with `values[k - 1]`; a rule carrying
//! an age range applies only there and shadows the flat rule on that
//! range. Anything that is not a configured code passes through untouched.

use tracing::debug;

use panel_model::{AgePanel, PanelConfig, RescaleRule};

use crate::diagnostics::RunDiagnostics;

/// Apply all configured rescale rules. Runs between merging and gap
/// filling so interpolation sees the target scale, not the raw codes.
pub fn apply_rescales(
    mut panel: AgePanel,
    config: &PanelConfig,
    diagnostics: &mut RunDiagnostics,
) -> AgePanel {
    let age_min = panel.age_min();
    let window_len = panel.window_len();
    for rule_group in rules_by_variable(&config.rescale) {
        let variable = rule_group[0].variable.as_str();
        let Some(col) = panel.column_mut(variable) else {
            continue;
        };
        let mut remapped = 0usize;
        for (row, cell) in col.iter_mut().enumerate() {
            let Some(value) = *cell else { continue };
            let age = age_min + (row % window_len) as i32;
            let rule = pick_rule(&rule_group, age);
            let Some(rule) = rule else { continue };
            if let Some(mapped) = map_code(value, &rule.values) {
                *cell = Some(mapped);
                remapped += 1;
            }
        }
        if remapped > 0 {
            debug!(variable, cells = remapped, "rescaled");
            diagnostics.rescaled_cells += remapped;
        }
    }
    panel
}

/// Group the configured rules by variable, preserving configuration order
/// within each group.
fn rules_by_variable(rules: &[RescaleRule]) -> Vec<Vec<&RescaleRule>> {
    let mut groups: Vec<Vec<&RescaleRule>> = Vec::new();
    for rule in rules {
        if let Some(group) = groups
            .iter_mut()
            .find(|group| group[0].variable == rule.variable)
        {
            group.push(rule);
        } else {
            groups.push(vec![rule]);
        }
    }
    groups
}

/// The rule governing `age`: the first age-qualified rule containing it,
/// else the flat rule.
fn pick_rule<'a>(group: &[&'a RescaleRule], age: i32) -> Option<&'a RescaleRule> {
    group
        .iter()
        .find(|rule| rule.ages.as_ref().is_some_and(|ages| ages.contains(age)))
        .or_else(|| group.iter().find(|rule| rule.ages.is_none()))
        .copied()
}

/// Map a 1-based integer code onto the configured value list.
fn map_code(value: f64, values: &[f64]) -> Option<f64> {
    if value.fract() != 0.0 || value < 1.0 {
        return None;
    }
    let code = value as usize;
    values.get(code - 1).copied()
}
