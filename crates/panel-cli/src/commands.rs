//! Command implementations.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};

use panel_config::{load_config, merge_alias_csv};
use panel_core::run_pipeline;
use panel_ingest::WideTable;

use crate::cli::{CheckArgs, RunArgs};
use crate::summary::{RunSummary, print_period_table};

/// Build both panels and persist them (unless `--dry-run`).
pub fn run_panel(args: &RunArgs) -> Result<RunSummary> {
    let mut config = load_config(&args.config)
        .with_context(|| format!("load configuration {}", args.config.display()))?;
    if let Some(aliases) = &args.aliases {
        merge_alias_csv(&mut config, aliases)
            .with_context(|| format!("merge alias table {}", aliases.display()))?;
    }

    let spinner = stage_spinner("loading tables");
    let primary = WideTable::read_csv(&args.primary)
        .with_context(|| format!("read primary table {}", args.primary.display()))?;
    let secondary = WideTable::read_csv(&args.secondary)
        .with_context(|| format!("read secondary table {}", args.secondary.display()))?;
    spinner.finish_with_message(format!(
        "loaded {} subjects, {} informants",
        primary.height(),
        secondary.height()
    ));

    let spinner = stage_spinner("building panels");
    let output = run_pipeline(&primary, &secondary, &config)?;
    spinner.finish_with_message("panels built");

    let output_dir = args
        .output_dir
        .clone()
        .unwrap_or_else(|| default_output_dir(args));
    let mut outputs: Vec<PathBuf> = Vec::new();
    if !args.dry_run {
        std::fs::create_dir_all(&output_dir)
            .with_context(|| format!("create output directory {}", output_dir.display()))?;

        let age_path = output_dir.join("age_panel.csv");
        panel_report::write_age_panel(&output.age_panel, &config, &age_path)?;
        outputs.push(age_path);

        let period_path = output_dir.join("period_panel.csv");
        panel_report::write_period_panel(&output.period_panel, &config, &period_path)?;
        outputs.push(period_path);

        if !output.diagnostics.all_missing_variables.is_empty() {
            let missing_path = output_dir.join("missing_variables.csv");
            panel_report::write_missing_variables(
                &output.diagnostics.all_missing_variables,
                &missing_path,
            )?;
            outputs.push(missing_path);
        }
    }

    Ok(RunSummary::from_output(&output, outputs, args.dry_run))
}

/// Load and validate a configuration, then print its period map.
pub fn run_check(args: &CheckArgs) -> Result<()> {
    let config = load_config(&args.config)
        .with_context(|| format!("load configuration {}", args.config.display()))?;
    println!("Configuration OK: {}", args.config.display());
    println!(
        "Age window {}..={} (pre-birth age {}), {} prefixes, {} aliases, {} rescale rules",
        config.window.start,
        config.window.end,
        config.pre_birth_age,
        config.naming.prefixes.len(),
        config.naming.aliases.len(),
        config.rescale.len(),
    );
    print_period_table(&config);
    Ok(())
}

fn default_output_dir(args: &RunArgs) -> PathBuf {
    args.primary
        .parent()
        .map(|dir| dir.join("output"))
        .unwrap_or_else(|| PathBuf::from("output"))
}

fn stage_spinner(message: &'static str) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::with_template("{spinner} {msg}").expect("static template parses"),
    );
    spinner.set_message(message);
    spinner.enable_steady_tick(Duration::from_millis(120));
    spinner
}
