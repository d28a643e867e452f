#![deny(unsafe_code)]

//! Data model for longitudinal survey panel construction.
//!
//! This crate defines the core vocabulary shared by the rest of the
//! workspace: subject and informant identifiers, the temporal anchor
//! decoded from raw column names, the age panel and period panel
//! containers, and the configuration surface. It deliberately has no
//! dependency on the data plane (Polars) or on I/O.

mod config;
mod error;
mod ids;
mod panel;
mod variable;

pub use config::{
    AgeRange, LegacyPattern, NamingRules, PanelConfig, PeriodRange, RescaleRule, SourceColumns,
};
pub use error::{ModelError, Result};
pub use ids::{InformantId, SubjectId};
pub use panel::{AGE_COL, AgePanel, PERIOD_COL, PeriodPanel, SUBJECT_COL};
pub use variable::{CanonicalVariable, TemporalAnchor};
