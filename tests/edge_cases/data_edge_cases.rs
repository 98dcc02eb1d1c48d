//! Edge cases in the data being compared

use crate::common::TestFixture;
use datadelta::{DataDeltaError, ReportAssembler, Table, Value};

fn table(ids: Vec<Value>, values: Vec<Value>) -> Table {
    Table::new()
        .with_column("id", "BIGINT", ids)
        .unwrap()
        .with_column("value", "VARCHAR", values)
        .unwrap()
}

#[test]
fn test_missing_primary_key_column() {
    let old = table(vec![1.into()], vec!["a".into()]);
    let new = Table::new()
        .with_column("key", "BIGINT", vec![1.into()])
        .unwrap();

    let err = ReportAssembler::assemble(&old, &new, "id", None).unwrap_err();
    assert!(matches!(err, DataDeltaError::MissingPrimaryKey { .. }));
}

#[test]
fn test_subset_column_missing_from_new_table() {
    let old = table(vec![1.into()], vec!["a".into()])
        .with_column("extra", "VARCHAR", vec!["x".into()])
        .unwrap();
    let new = table(vec![1.into()], vec!["a".into()]);
    let subset = vec!["value".to_string(), "extra".to_string()];

    let err = ReportAssembler::assemble(&old, &new, "id", Some(&subset)).unwrap_err();
    match err {
        DataDeltaError::MissingColumns { columns } => {
            assert_eq!(columns, vec!["extra".to_string()])
        }
        other => panic!("Expected MissingColumns, got: {}", other),
    }
}

#[test]
fn test_empty_table_is_rejected() {
    let empty = table(Vec::new(), Vec::new());
    let other = table(vec![1.into()], vec!["a".into()]);

    let err = ReportAssembler::assemble(&empty, &other, "id", None).unwrap_err();
    assert!(matches!(err, DataDeltaError::EmptyTable { rows: 0, .. }));
}

#[test]
fn test_nulls_on_both_sides_are_not_changes() {
    let old = table(
        vec![1.into(), 2.into()],
        vec![Value::Null, "b".into()],
    );
    let new = table(
        vec![1.into(), 2.into()],
        vec![Value::Null, Value::Null],
    );

    let (report, comparison) = ReportAssembler::assemble(&old, &new, "id", None).unwrap();

    let details = report.record_value_changes.details.as_ref().unwrap();
    assert_eq!(details.changed_records, vec![Value::Int(2)]);
    assert_eq!(comparison.unwrap().row_count(), 1);
}

#[test]
fn test_nan_matches_null() {
    let old = Table::new()
        .with_column("id", "BIGINT", vec![1.into()])
        .unwrap()
        .with_column("score", "DOUBLE", vec![Value::Float(f64::NAN)])
        .unwrap();
    let new = Table::new()
        .with_column("id", "BIGINT", vec![1.into()])
        .unwrap()
        .with_column("score", "DOUBLE", vec![Value::Null])
        .unwrap();

    let (report, _) = ReportAssembler::assemble(&old, &new, "id", None).unwrap();
    assert!(report.record_value_changes.is_equal);
}

#[test]
fn test_no_shared_records() {
    let old = table(vec![1.into(), 2.into()], vec!["a".into(), "b".into()]);
    let new = table(vec![3.into(), 4.into()], vec!["a".into(), "b".into()]);

    let (report, comparison) = ReportAssembler::assemble(&old, &new, "id", None).unwrap();

    assert!(report.record_value_changes.is_equal);
    assert!(comparison.is_none());
    let records = report.record_count_changes.details.as_ref().unwrap();
    assert_eq!(records.removed_records, Some(vec![Value::Int(1), Value::Int(2)]));
    assert_eq!(records.added_records, Some(vec![Value::Int(3), Value::Int(4)]));
}

#[test]
fn test_unicode_values() {
    let fixture = TestFixture::new().unwrap();
    let old = fixture
        .load(
            &fixture
                .create_raw("old.csv", "id,city\n1,Zürich\n2,東京\n3,Kraków\n")
                .unwrap(),
        )
        .unwrap();
    let new = fixture
        .load(
            &fixture
                .create_raw("new.csv", "id,city\n1,Zürich\n2,東京都\n3,Kraków\n")
                .unwrap(),
        )
        .unwrap();

    let (report, comparison) = ReportAssembler::assemble(&old, &new, "id", None).unwrap();

    let details = report.record_value_changes.details.as_ref().unwrap();
    assert_eq!(details.changed_records, vec![Value::Int(2)]);
    assert_eq!(
        comparison.unwrap().value(0, "city_NEW"),
        Some(&Value::Text("東京都".to_string()))
    );
}

#[test]
fn test_key_column_read_as_double() {
    let fixture = TestFixture::new().unwrap();
    let old = fixture
        .load(&fixture.create_raw("old.csv", "id,v\n1,a\n2,b\n").unwrap())
        .unwrap();
    let new = fixture
        .load(&fixture.create_raw("new.csv", "id,v\n1.0,a\n2.0,B\n").unwrap())
        .unwrap();
    assert_eq!(old.data_type("id"), Some("BIGINT"));
    assert_eq!(new.data_type("id"), Some("DOUBLE"));

    let (report, comparison) = ReportAssembler::assemble(&old, &new, "id", None).unwrap();

    assert!(report.record_count_changes.is_equal);
    let details = report.record_value_changes.details.as_ref().unwrap();
    assert_eq!(details.changed_records, vec![Value::Float(2.0)]);
    assert_eq!(details.changed_columns, vec!["v".to_string()]);
    assert_eq!(comparison.unwrap().row_count(), 1);
    // The key's declared type changed
    assert!(!report.datatype_changes.is_equal);
}

#[test]
fn test_text_primary_key() {
    let old = Table::new()
        .with_column("sku", "VARCHAR", vec!["b-2".into(), "a-1".into()])
        .unwrap()
        .with_column("qty", "BIGINT", vec![5.into(), 1.into()])
        .unwrap();
    let new = Table::new()
        .with_column("sku", "VARCHAR", vec!["a-1".into(), "b-2".into()])
        .unwrap()
        .with_column("qty", "BIGINT", vec![1.into(), 6.into()])
        .unwrap();

    let (report, _) = ReportAssembler::assemble(&old, &new, "sku", None).unwrap();

    assert!(report.record_count_changes.is_equal);
    let details = report.record_value_changes.details.as_ref().unwrap();
    assert_eq!(details.changed_records, vec![Value::Text("b-2".to_string())]);
    assert!(!report.meta.is_all_equal);
}
