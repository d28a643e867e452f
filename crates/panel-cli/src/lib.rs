//! CLI library components for the survey panel builder.

pub mod cli;
pub mod commands;
pub mod logging;
pub mod summary;
