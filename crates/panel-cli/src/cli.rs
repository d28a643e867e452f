//! CLI argument definitions for the panel builder.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;

#[derive(Parser)]
#[command(
    name = "panelize",
    version,
    about = "Build subject-by-age and subject-by-period panels from wide survey tables",
    long_about = "Convert a wide-format longitudinal survey extract (one row per subject,\n\
                  one column per variable-per-wave) plus a linked informant table into a\n\
                  long subject-by-age panel and an aggregated subject-by-period panel.\n\
                  Column naming rules, the age window, and the period map come from a\n\
                  TOML configuration file."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for info, -vv for debug, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format (pretty for human, json for machine parsing).
    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Build both panels from a survey extract and persist them.
    Run(RunArgs),

    /// Validate a configuration file and print its period map.
    Check(CheckArgs),
}

#[derive(Parser)]
pub struct RunArgs {
    /// Path to the TOML configuration file.
    #[arg(value_name = "CONFIG")]
    pub config: PathBuf,

    /// Primary wide table (one row per subject).
    #[arg(long, value_name = "CSV")]
    pub primary: PathBuf,

    /// Secondary wide table (one row per informant).
    #[arg(long, value_name = "CSV")]
    pub secondary: PathBuf,

    /// Extra alias table (two columns: raw, canonical) merged over the
    /// configuration's aliases.
    #[arg(long, value_name = "CSV")]
    pub aliases: Option<PathBuf>,

    /// Output directory (default: <primary's directory>/output).
    #[arg(long = "output-dir", value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Run the pipeline and report without writing output files.
    #[arg(long = "dry-run")]
    pub dry_run: bool,
}

#[derive(Parser)]
pub struct CheckArgs {
    /// Path to the TOML configuration file.
    #[arg(value_name = "CONFIG")]
    pub config: PathBuf,
}

/// CLI log level choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}
