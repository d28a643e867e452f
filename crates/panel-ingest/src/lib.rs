#![deny(unsafe_code)]

//! Wide-table ingestion for the panel pipeline.
//!
//! Loading is the boundary: everything downstream consumes a
//! [`WideTable`] and never touches the filesystem.

mod error;
mod wide_table;

pub use error::{IngestError, Result};
pub use wide_table::WideTable;
