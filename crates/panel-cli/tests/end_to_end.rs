//! Full-pipeline test through the `run` command: config + CSVs in, panel
//! CSVs out.

use std::path::PathBuf;

use panel_cli::cli::RunArgs;
use panel_cli::commands::run_panel;
use panel_ingest::WideTable;

const CONFIG: &str = r#"
window = { start = -1, end = 19 }
pre_birth_age = -1
missing_codes = [-1.0, -2.0, -3.0, -4.0, -5.0, -7.0]

[naming]
no_date_marker = "_XRND"

[columns]
subject_id = "CPUBID_XRND"
birth_year = "CYRB_XRND"
informant_id = "MPUBID_XRND"
informant_key = "CASEID_1979"

[[periods]]
index = -1
start = -1
end = -1
label = "pre-birth"

[[periods]]
index = 0
start = 0
end = 5
label = "pre-elementary"

[[periods]]
index = 1
start = 6
end = 9
label = "elementary"

[[periods]]
index = 2
start = 10
end = 14
label = "secondary"

[[periods]]
index = 3
start = 15
end = 19
label = "high school"
"#;

fn write(dir: &std::path::Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, contents).unwrap();
    path
}

#[test]
fn run_produces_age_and_period_panels() {
    let dir = tempfile::tempdir().unwrap();
    let config = write(dir.path(), "panel.toml", CONFIG);
    // subject 101 born 2000: MATH_SCORE known at ages 7 and 8
    let primary = write(
        dir.path(),
        "children.csv",
        "CPUBID_XRND,CYRB_XRND,MPUBID_XRND,MATH_SCORE_2007,MATH_SCORE_2008\n\
         101,2000,11,50,60\n",
    );
    // the informant's income is recorded for 1994 but the cell is empty:
    // nothing lands anywhere, the pre-birth row has no donor, and the
    // variable ends up in the all-missing report
    let secondary = write(
        dir.path(),
        "mothers.csv",
        "CASEID_1979,INCOME_1994\n11,\n",
    );
    let output_dir = dir.path().join("out");

    let summary = run_panel(&RunArgs {
        config,
        primary,
        secondary,
        aliases: None,
        output_dir: Some(output_dir.clone()),
        dry_run: false,
    })
    .unwrap();

    assert_eq!(summary.subjects, 1);
    assert_eq!(summary.age_rows, 21);
    assert_eq!(summary.period_rows, 5);
    assert_eq!(summary.backfill_misses, 1);
    assert_eq!(
        summary.all_missing_variables,
        vec!["INCOME".to_string()]
    );
    assert_eq!(summary.outputs.len(), 3);

    let age_panel = WideTable::read_csv(&output_dir.join("age_panel.csv")).unwrap();
    assert_eq!(age_panel.height(), 21);
    let math = age_panel.numeric_column("MATH_SCORE").unwrap();
    // row 0 is age -1 (pre-birth, untouched), rows 1..=21 are ages 0..=19
    assert_eq!(math[0], None);
    for age in 0..=6 {
        assert_eq!(math[(age + 1) as usize], Some(50.0), "age {age}");
    }
    assert_eq!(math[8], Some(50.0)); // age 7
    assert_eq!(math[9], Some(60.0)); // age 8
    for age in 9..=19 {
        assert_eq!(math[(age + 1) as usize], Some(60.0), "age {age}");
    }
    // the empty informant variable stays entirely missing
    let income = age_panel.numeric_column("INCOME").unwrap();
    assert!(income.iter().all(Option::is_none));

    let period_panel = WideTable::read_csv(&output_dir.join("period_panel.csv")).unwrap();
    assert_eq!(period_panel.height(), 5);
    let math = period_panel.numeric_column("MATH_SCORE").unwrap();
    // periods -1, 0, 1, 2, 3: carry gives 50 below the known range and 60
    // above it; elementary (ages 6..=9) averages 50,50,60,60 -> 55
    assert_eq!(math, vec![None, Some(50.0), Some(55.0), Some(60.0), Some(60.0)]);

    let missing = std::fs::read_to_string(output_dir.join("missing_variables.csv")).unwrap();
    assert_eq!(missing, "variable\nINCOME\n");
}

#[test]
fn dry_run_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let config = write(dir.path(), "panel.toml", CONFIG);
    let primary = write(
        dir.path(),
        "children.csv",
        "CPUBID_XRND,CYRB_XRND,MPUBID_XRND,MATH_SCORE_2007\n101,2000,11,50\n",
    );
    let secondary = write(dir.path(), "mothers.csv", "CASEID_1979,AGE_1979\n11,22\n");
    let output_dir = dir.path().join("out");

    let summary = run_panel(&RunArgs {
        config,
        primary,
        secondary,
        aliases: None,
        output_dir: Some(output_dir.clone()),
        dry_run: true,
    })
    .unwrap();

    assert!(summary.dry_run);
    assert!(summary.outputs.is_empty());
    assert!(!output_dir.exists());
}
