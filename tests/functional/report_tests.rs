//! End-to-end report scenarios through the loader and the assembler

use crate::common::{sample_data, TestFixture};
use datadelta::comparison::{NEW_SUFFIX, OLD_SUFFIX};
use datadelta::report::ValueCategory;
use datadelta::{ReportAssembler, ReportSection, Value};

#[test]
fn test_identical_tables() {
    let fixture = TestFixture::new().unwrap();
    let path = fixture
        .create_csv("same.csv", &sample_data::old_csv_data())
        .unwrap();
    let table = fixture.load(&path).unwrap();

    let (report, comparison) = ReportAssembler::assemble(&table, &table, "id", None).unwrap();

    assert!(report.meta.is_all_equal);
    assert!(report.all_sections_equal());
    assert!(comparison.is_none());
    assert!(report.old_df_table_summary.is_primary_key_unique);
    assert_eq!(report.old_df_table_summary.number_of_records, 4);
}

#[test]
fn test_sample_pair_report() {
    let fixture = TestFixture::new().unwrap();
    let old = fixture
        .load(&fixture.create_csv("old.csv", &sample_data::old_csv_data()).unwrap())
        .unwrap();
    let new = fixture
        .load(&fixture.create_csv("new.csv", &sample_data::new_csv_data()).unwrap())
        .unwrap();

    let (report, comparison) = ReportAssembler::assemble(&old, &new, "id", None).unwrap();

    assert!(!report.meta.is_all_equal);
    assert!(report.column_name_changes.is_equal);
    assert!(report.datatype_changes.is_equal);

    let records = report.record_count_changes.details.as_ref().unwrap();
    assert_eq!(records.net_change, 0);
    assert_eq!(records.removed_records, Some(vec![Value::Int(1)]));
    assert_eq!(records.added_records, Some(vec![Value::Int(5)]));

    // The empty stock of record 4 is missing on both sides and not a change
    let values = report.record_value_changes.details.as_ref().unwrap();
    assert_eq!(values.changed_records, vec![Value::Int(2)]);
    assert_eq!(values.changed_columns, vec!["price".to_string()]);
    assert!(values
        .summary
        .contains(&"1 records have changed (33.3% of shared records)".to_string()));

    let comparison = comparison.unwrap();
    assert_eq!(comparison.row_count(), 1);
    assert_eq!(comparison.column_names()[0], "id");
    assert_eq!(
        comparison.value(0, &format!("price{}", OLD_SUFFIX)),
        Some(&Value::Float(0.75))
    );
    assert_eq!(
        comparison.value(0, &format!("price{}", NEW_SUFFIX)),
        Some(&Value::Float(0.80))
    );
}

#[test]
fn test_removed_column() {
    let fixture = TestFixture::new().unwrap();
    let old = fixture
        .load(
            &fixture
                .create_csv("old.csv", &sample_data::extra_column_csv_data())
                .unwrap(),
        )
        .unwrap();
    let new = fixture
        .load(&fixture.create_csv("new.csv", &sample_data::old_csv_data()).unwrap())
        .unwrap();

    let (report, comparison) = ReportAssembler::assemble(&old, &new, "id", None).unwrap();

    let columns = &report.column_name_changes;
    assert!(!columns.is_equal);
    let values = columns.values();
    assert_eq!(
        values,
        vec![(ValueCategory::RemovedColumns, vec!["category".to_string()])]
    );
    assert!(report.record_count_changes.is_equal);
    assert!(report.record_value_changes.is_equal);
    assert!(comparison.is_none());
}

#[test]
fn test_datatype_change_detected() {
    let fixture = TestFixture::new().unwrap();
    let old = fixture
        .load(
            &fixture
                .create_raw("old.csv", "id,price\n1,1.50\n2,2.50\n")
                .unwrap(),
        )
        .unwrap();
    let new = fixture
        .load(
            &fixture
                .create_raw("new.csv", "id,price\n1,1.50\n2,unknown\n")
                .unwrap(),
        )
        .unwrap();

    let (report, _) = ReportAssembler::assemble(&old, &new, "id", None).unwrap();

    let details = report.datatype_changes.details.as_ref().unwrap();
    assert_eq!(details.changed_columns, vec!["price".to_string()]);
    assert_eq!(details.summary_table[0].old_df_dtype, "DOUBLE");
    assert_eq!(details.summary_table[0].new_df_dtype, "VARCHAR");
}

#[test]
fn test_column_subset_limits_value_comparison() {
    let fixture = TestFixture::new().unwrap();
    let old = fixture
        .load(&fixture.create_csv("old.csv", &sample_data::old_csv_data()).unwrap())
        .unwrap();
    let new = fixture
        .load(&fixture.create_csv("new.csv", &sample_data::new_csv_data()).unwrap())
        .unwrap();
    let subset = vec!["name".to_string(), "stock".to_string()];

    let (report, comparison) =
        ReportAssembler::assemble(&old, &new, "id", Some(&subset)).unwrap();

    assert!(report.record_value_changes.is_equal);
    assert!(comparison.is_none());
    // Record additions and removals ignore the subset
    assert!(!report.record_count_changes.is_equal);
    assert_eq!(report.meta.column_subset, Some(subset));
    assert!(report
        .old_df_table_summary
        .summary_table
        .iter()
        .all(|row| ["id", "name", "stock"].contains(&row.column_name.as_str())));
}

#[test]
fn test_duplicate_keys_use_first_occurrence() {
    let fixture = TestFixture::new().unwrap();
    let old = fixture
        .load(
            &fixture
                .create_raw("old.csv", "id,value\n1,a\n2,b\n2,c\n")
                .unwrap(),
        )
        .unwrap();
    let new = fixture
        .load(&fixture.create_raw("new.csv", "id,value\n1,a\n2,b\n").unwrap())
        .unwrap();

    let (report, comparison) = ReportAssembler::assemble(&old, &new, "id", None).unwrap();

    assert!(!report.old_df_table_summary.is_primary_key_unique);
    assert!(report.new_df_table_summary.is_primary_key_unique);
    assert!(report.record_value_changes.is_equal);
    assert!(comparison.is_none());
    // Row counts differ, so the tables are not equal as a whole
    assert!(!report.meta.is_all_equal);
}

#[test]
fn test_json_input() {
    let fixture = TestFixture::new().unwrap();
    let old = fixture
        .load(
            &fixture
                .create_json("old.json", &sample_data::simple_json_data())
                .unwrap(),
        )
        .unwrap();
    let new = fixture
        .load(
            &fixture
                .create_json(
                    "new.json",
                    &serde_json::json!([
                        {"id": 1, "name": "Apple", "price": 1.50},
                        {"id": 2, "name": "Blueberry", "price": 0.75},
                        {"id": 3, "name": "Cherry", "price": 2.00}
                    ]),
                )
                .unwrap(),
        )
        .unwrap();

    let (report, comparison) = ReportAssembler::assemble(&old, &new, "id", None).unwrap();

    let values = report.record_value_changes.details.as_ref().unwrap();
    assert_eq!(values.changed_records, vec![Value::Int(2)]);
    assert_eq!(values.changed_columns, vec!["name".to_string()]);

    let comparison = comparison.unwrap();
    assert_eq!(
        comparison.value(0, "name_OLD"),
        Some(&Value::Text("Banana".to_string()))
    );
    assert_eq!(
        comparison.value(0, "name_NEW"),
        Some(&Value::Text("Blueberry".to_string()))
    );
}
