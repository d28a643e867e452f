//! Run summary rendering.

use std::path::PathBuf;

use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL_CONDENSED;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use panel_core::PipelineOutput;
use panel_model::PanelConfig;

/// Counts and findings collected for the end-of-run report.
#[derive(Debug)]
pub struct RunSummary {
    pub subjects: usize,
    pub variables: usize,
    pub age_rows: usize,
    pub period_rows: usize,
    pub filled_cells: usize,
    pub rescaled_cells: usize,
    pub out_of_window_drops: usize,
    pub backfill_misses: usize,
    pub digit_edge_names: Vec<String>,
    pub all_missing_variables: Vec<String>,
    pub outputs: Vec<PathBuf>,
    pub dry_run: bool,
}

impl RunSummary {
    pub fn from_output(output: &PipelineOutput, outputs: Vec<PathBuf>, dry_run: bool) -> Self {
        Self {
            subjects: output.age_panel.subjects().len(),
            variables: output.age_panel.variable_count(),
            age_rows: output.age_panel.row_count(),
            period_rows: output.period_panel.row_count(),
            filled_cells: output.diagnostics.filled_cells,
            rescaled_cells: output.diagnostics.rescaled_cells,
            out_of_window_drops: output.diagnostics.out_of_window_drops,
            backfill_misses: output.diagnostics.backfill_misses.len(),
            digit_edge_names: output
                .diagnostics
                .digit_edge_names
                .iter()
                .cloned()
                .collect(),
            all_missing_variables: output.diagnostics.all_missing_variables.clone(),
            outputs,
            dry_run,
        }
    }
}

pub fn print_summary(summary: &RunSummary) {
    let mut table = Table::new();
    table.set_header(vec![header_cell("Metric"), header_cell("Value")]);
    apply_table_style(&mut table);
    align_column(&mut table, 1, CellAlignment::Right);
    table.add_row(vec![Cell::new("Subjects"), Cell::new(summary.subjects)]);
    table.add_row(vec![
        Cell::new("Canonical variables"),
        Cell::new(summary.variables),
    ]);
    table.add_row(vec![Cell::new("Age rows"), Cell::new(summary.age_rows)]);
    table.add_row(vec![
        Cell::new("Period rows"),
        Cell::new(summary.period_rows),
    ]);
    table.add_row(vec![
        Cell::new("Cells filled by interpolation/carry"),
        Cell::new(summary.filled_cells),
    ]);
    table.add_row(vec![
        Cell::new("Cells rescaled"),
        Cell::new(summary.rescaled_cells),
    ]);
    table.add_row(vec![
        Cell::new("Values dropped outside age window"),
        count_cell(summary.out_of_window_drops, Color::Yellow),
    ]);
    table.add_row(vec![
        Cell::new("Pre-birth backfill misses"),
        count_cell(summary.backfill_misses, Color::Yellow),
    ]);
    table.add_row(vec![
        Cell::new("All-missing variables"),
        count_cell(summary.all_missing_variables.len(), Color::Yellow),
    ]);
    println!("{table}");

    if !summary.digit_edge_names.is_empty() {
        println!("Digit-edged canonical names (unresolved collisions):");
        for name in &summary.digit_edge_names {
            println!("- {name}");
        }
    }

    if summary.dry_run {
        println!("Dry run: no files written.");
    } else {
        for path in &summary.outputs {
            println!("Wrote {}", path.display());
        }
    }
}

/// Period map table for the `check` command.
pub fn print_period_table(config: &PanelConfig) {
    let mut periods: Vec<_> = config.periods.iter().collect();
    periods.sort_by_key(|p| p.index);
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Period"),
        header_cell("Ages"),
        header_cell("Label"),
    ]);
    apply_table_style(&mut table);
    align_column(&mut table, 0, CellAlignment::Right);
    for period in periods {
        let ages = if period.is_singleton() {
            period.start.to_string()
        } else {
            format!("{}..={}", period.start, period.end)
        };
        table.add_row(vec![
            Cell::new(period.index),
            Cell::new(ages),
            Cell::new(&period.label),
        ]);
    }
    println!("{table}");
}

fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(100);
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

fn count_cell(count: usize, color: Color) -> Cell {
    if count > 0 {
        Cell::new(count).fg(color).add_attribute(Attribute::Bold)
    } else {
        Cell::new(count).fg(Color::DarkGrey)
    }
}
