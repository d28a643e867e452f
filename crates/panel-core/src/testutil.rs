#![deny(unsafe_code)]

//! Shared fixtures for unit tests.

use std::collections::BTreeMap;

use polars::prelude::{Column, DataFrame};

use panel_ingest::WideTable;
use panel_model::{AgeRange, NamingRules, PanelConfig, PeriodRange, SourceColumns};

pub(crate) fn test_config() -> PanelConfig {
    PanelConfig {
        window: AgeRange::new(-1, 19),
        pre_birth_age: -1,
        naming: NamingRules {
            no_date_marker: "_XRND".to_string(),
            separator: '_',
            prefixes: Vec::new(),
            aliases: BTreeMap::new(),
            legacy_patterns: Vec::new(),
            century_pivot: 25,
        },
        columns: SourceColumns {
            subject_id: "CPUBID_XRND".to_string(),
            birth_year: "CYRB_XRND".to_string(),
            informant_id: "MPUBID_XRND".to_string(),
            informant_key: "CASEID_1979".to_string(),
        },
        periods: vec![
            PeriodRange {
                index: -1,
                start: -1,
                end: -1,
                label: "pre-birth".to_string(),
            },
            PeriodRange {
                index: 0,
                start: 0,
                end: 5,
                label: "pre-elementary".to_string(),
            },
            PeriodRange {
                index: 1,
                start: 6,
                end: 9,
                label: "elementary".to_string(),
            },
            PeriodRange {
                index: 2,
                start: 10,
                end: 14,
                label: "secondary".to_string(),
            },
            PeriodRange {
                index: 3,
                start: 15,
                end: 19,
                label: "high school".to_string(),
            },
        ],
        missing_codes: Vec::new(),
        rescale: Vec::new(),
        export_renames: BTreeMap::new(),
    }
}

pub(crate) fn int_col(name: &str, values: Vec<Option<i64>>) -> Column {
    Column::new(name.into(), values)
}

pub(crate) fn num_col(name: &str, values: Vec<Option<f64>>) -> Column {
    Column::new(name.into(), values)
}

pub(crate) fn wide_table(name: &str, columns: Vec<Column>) -> WideTable {
    let df = DataFrame::new(columns).unwrap();
    WideTable::from_dataframe(name, df).unwrap()
}
