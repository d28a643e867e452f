#![deny(unsafe_code)]

//! Panel construction and temporal resolution engine.
//!
//! Turns two wide-format survey tables — subjects and their linked
//! informants — into a subject-by-age panel and a subject-by-period
//! panel. The flow is strictly one-directional:
//!
//! 1. [`codec`] decodes raw column names into canonical variables with a
//!    temporal anchor;
//! 2. [`builder`] projects the primary table onto the dense age panel;
//! 3. [`merge`] extends it with informant variables through the foreign
//!    key, including pre-birth backfill;
//! 4. [`rescale`] remaps configured coded values;
//! 5. [`gapfill`] interpolates per-subject gaps (linear or cubic inside
//!    the known range, constant carry outside it);
//! 6. [`aggregate`] reduces ages to periods by averaging.
//!
//! [`pipeline::run_pipeline`] wires the stages together; everything is
//! also callable on its own.

pub mod age;
pub mod aggregate;
pub mod builder;
pub mod codec;
pub mod diagnostics;
pub mod frame;
pub mod gapfill;
pub mod interp;
pub mod merge;
pub mod pipeline;
pub mod rescale;

mod error;
#[cfg(test)]
mod testutil;

pub use error::{CoreError, Result};

pub use aggregate::aggregate_periods;
pub use builder::build_age_panel;
pub use codec::{DecodeError, NameRules};
pub use diagnostics::{BackfillMiss, RunDiagnostics};
pub use frame::{age_panel_to_frame, period_panel_to_frame};
pub use gapfill::fill_gaps;
pub use merge::merge_informant_table;
pub use pipeline::{PipelineOutput, run_pipeline};
pub use rescale::apply_rescales;
