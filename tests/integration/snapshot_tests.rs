//! Integration tests for report snapshots

use crate::common::{assertions, CliTestRunner};
use datadelta::snapshot::ReportSnapshot;
use datadelta::{DataDeltaError, ReportAssembler};
use std::fs;

#[test]
fn test_compare_saves_snapshot() {
    let runner = CliTestRunner::new().unwrap();
    let (old, new) = runner.write_sample_pair();
    let snapshot = runner.fixture().path_str("golden");

    runner.expect_success(&["compare", &old, &new, "-k", "id", "--snapshot", &snapshot]);

    let path = runner.fixture().root().join("golden.ddsnap");
    assertions::assert_file_exists_and_not_empty(&path);

    let report = ReportSnapshot::load(&path).unwrap();
    assert!(!report.record_count_changes.is_equal);
    assert_eq!(report.meta.title_text, "DataDelta: Dataset Comparison Report");
}

#[test]
fn test_snapshot_matches_fresh_comparison() {
    let runner = CliTestRunner::new().unwrap();
    let (old, new) = runner.write_sample_pair();
    let snapshot = runner.fixture().path_str("golden.ddsnap");

    runner.expect_success(&["compare", &old, &new, "-k", "id", "--snapshot", &snapshot]);
    let saved = ReportSnapshot::load(&snapshot).unwrap();

    let fixture = runner.fixture();
    let old_table = fixture.load(&fixture.root().join("old.csv")).unwrap();
    let new_table = fixture.load(&fixture.root().join("new.csv")).unwrap();
    let (fresh, _) = ReportAssembler::assemble(&old_table, &new_table, "id", None).unwrap();

    // Golden-file comparison ignores the timestamps in the metadata
    assert_eq!(saved.old_df_table_summary, fresh.old_df_table_summary);
    assert_eq!(saved.new_df_table_summary, fresh.new_df_table_summary);
    assert_eq!(saved.column_name_changes, fresh.column_name_changes);
    assert_eq!(saved.record_count_changes, fresh.record_count_changes);
    assert_eq!(saved.datatype_changes, fresh.datatype_changes);
    assert_eq!(saved.record_value_changes, fresh.record_value_changes);
    assert_eq!(saved.meta.is_all_equal, fresh.meta.is_all_equal);
}

#[test]
fn test_snapshot_is_not_overwritten() {
    let runner = CliTestRunner::new().unwrap();
    let (old, new) = runner.write_sample_pair();
    let existing = runner.fixture().create_raw("golden.ddsnap", "keep").unwrap();
    let snapshot = runner.fixture().path_str("golden.ddsnap");

    runner.expect_success(&["compare", &old, &new, "-k", "id", "--snapshot", &snapshot]);
    assert_eq!(fs::read_to_string(&existing).unwrap(), "keep");

    runner.expect_success(&["compare", &old, &new, "-k", "id", "--snapshot", &snapshot, "--overwrite"]);
    assert!(ReportSnapshot::load(&existing).is_ok());
}

#[test]
fn test_show_snapshot() {
    let runner = CliTestRunner::new().unwrap();
    let (old, new) = runner.write_sample_pair();
    let snapshot = runner.fixture().path_str("golden.ddsnap");

    runner.expect_success(&["compare", &old, &new, "-k", "id", "--snapshot", &snapshot]);
    runner.expect_success(&["show", &snapshot]);
    runner.expect_success(&["show", &snapshot, "--format", "json"]);
}

#[test]
fn test_show_rejects_non_snapshot() {
    let runner = CliTestRunner::new().unwrap();
    let bogus = runner.fixture().create_raw("bogus.ddsnap", "plain text").unwrap();

    let error = runner.expect_failure(&["show", bogus.to_str().unwrap()]);
    assert!(matches!(error, DataDeltaError::InvalidSnapshot { .. }));
}

#[test]
fn test_show_missing_snapshot() {
    let runner = CliTestRunner::new().unwrap();
    let missing = runner.fixture().path_str("missing.ddsnap");
    assert!(runner.run_command(&["show", &missing]).is_err());
}
