use std::path::PathBuf;
use std::sync::Arc;

use arrow::array::{ArrayRef, Float64Array, Int64Array, StringArray};
use arrow::record_batch::RecordBatch;
use chrono::NaiveDate;
use parquet::arrow::ArrowWriter;

use super::{load_file, parse_date, parse_risk_score, LoadError, RowPolicy};

#[test]
fn test_load_csv_drops_bad_rows() {
    let table = load_file(&fixture_filename("transactions.csv"), RowPolicy::RequiredColumns)
        .expect("fixture loads");

    let ids: Vec<&str> = table.records.iter().map(|t| t.id.as_str()).collect();
    assert_eq!(
        ids,
        vec!["TX0000000001", "TX0000000002", "TX0000000004", "TX0000000006", "TX0000000007"]
    );
    assert_eq!(table.dropped_rows, 4);

    let first = &table.records[0];
    assert_eq!(first.country, "Brazil");
    assert_eq!(first.transaction_type, "Offshore Transfer");
    assert!((first.amount - 3267530.413).abs() < 1e-9);
    assert_eq!(first.risk_score, 6);
    assert_eq!(first.industry, "Construction");
    assert_eq!(first.date, NaiveDate::from_ymd_opt(2013, 1, 1).unwrap());
    assert_eq!(first.extra.get("Tax Haven Country").map(String::as_str), Some("Singapore"));

    // Month-first slash date.
    assert_eq!(table.records[4].date, NaiveDate::from_ymd_opt(2013, 1, 15).unwrap());
}

#[test]
fn test_extra_columns_keep_header_order() {
    let table =
        load_file(&fixture_filename("transactions.csv"), RowPolicy::RequiredColumns).unwrap();
    assert_eq!(
        table.extra_columns,
        vec![
            "Person Involved",
            "Destination Country",
            "Reported by Authority",
            "Source of Money",
            "Shell Companies Involved",
            "Financial Institution",
            "Tax Haven Country",
        ]
    );
}

#[test]
fn test_any_column_policy_drops_rows_with_empty_extras() {
    let table = load_file(&fixture_filename("transactions.csv"), RowPolicy::AnyColumn).unwrap();
    assert_eq!(table.len(), 4);
    assert_eq!(table.dropped_rows, 5);
    assert!(table.records.iter().all(|t| t.id != "TX0000000006"));
}

#[test]
fn test_missing_file_is_not_found() {
    let result = load_file(&fixture_filename("does_not_exist.csv"), RowPolicy::default());
    assert!(matches!(result, Err(LoadError::NotFound(_))));
}

#[test]
fn test_missing_required_columns() {
    match load_file(&fixture_filename("missing_columns.csv"), RowPolicy::default()) {
        Err(LoadError::MissingColumns(cols)) => {
            assert_eq!(cols, vec!["Money Laundering Risk Score", "Industry"]);
        }
        other => panic!("Unexpected result: {other:?}"),
    }
}

#[test]
fn test_unsupported_extension() {
    let manifest = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("Cargo.toml");
    let result = load_file(&manifest, RowPolicy::default());
    assert!(matches!(result, Err(LoadError::UnsupportedFormat(ext)) if ext == "toml"));
}

#[test]
fn test_load_tsv() {
    let table =
        load_file(&fixture_filename("transactions.tsv"), RowPolicy::default()).unwrap();
    assert_eq!(table.len(), 2);
    assert_eq!(table.dropped_rows, 1);
    assert_eq!(table.records[1].risk_score, 7);
    assert_eq!(table.records[1].date, NaiveDate::from_ymd_opt(2013, 2, 1).unwrap());
    assert!(table.extra_columns.is_empty());
}

#[test]
fn test_load_json_records() {
    let table =
        load_file(&fixture_filename("transactions.json"), RowPolicy::default()).unwrap();
    let ids: Vec<&str> = table.records.iter().map(|t| t.id.as_str()).collect();
    assert_eq!(ids, vec!["TX1", "3"]);
    assert_eq!(table.dropped_rows, 2);
    assert_eq!(table.records[1].date, NaiveDate::from_ymd_opt(2013, 1, 3).unwrap());
    assert_eq!(table.extra_columns, vec!["Shell Companies Involved"]);
    assert_eq!(
        table.records[0].extra.get("Shell Companies Involved").map(String::as_str),
        Some("2")
    );
}

#[test]
fn test_load_parquet() {
    let ids: ArrayRef = Arc::new(StringArray::from(vec!["P1", "P2", "P3"]));
    let dates: ArrayRef = Arc::new(StringArray::from(vec!["2013-03-01", "2013-03-02", "garbage"]));
    let countries: ArrayRef = Arc::new(StringArray::from(vec!["India", "UK", "UK"]));
    let kinds: ArrayRef = Arc::new(StringArray::from(vec![
        "Cryptocurrency",
        "Cash Withdrawal",
        "Cash Withdrawal",
    ]));
    let amounts: ArrayRef = Arc::new(Float64Array::from(vec![Some(10.0), None, Some(30.0)]));
    let risks: ArrayRef = Arc::new(Int64Array::from(vec![4, 5, 6]));
    let industries: ArrayRef =
        Arc::new(StringArray::from(vec!["Finance", "Finance", "Arms Trade"]));

    let batch = RecordBatch::try_from_iter(vec![
        ("Transaction ID", ids),
        ("Date of Transaction", dates),
        ("Country", countries),
        ("Transaction Type", kinds),
        ("Amount (USD)", amounts),
        ("Money Laundering Risk Score", risks),
        ("Industry", industries),
    ])
    .unwrap();

    let path = std::env::temp_dir()
        .join(format!("transaction-dashboard-{}.parquet", std::process::id()));
    let file = std::fs::File::create(&path).unwrap();
    let mut writer = ArrowWriter::try_new(file, batch.schema(), None).unwrap();
    writer.write(&batch).unwrap();
    writer.close().unwrap();

    let table = load_file(&path, RowPolicy::default());
    let _ = std::fs::remove_file(&path);
    let table = table.unwrap();

    assert_eq!(table.len(), 1);
    assert_eq!(table.dropped_rows, 2);
    assert_eq!(table.records[0].id, "P1");
    assert_eq!(table.records[0].amount, 10.0);
    assert_eq!(table.records[0].risk_score, 4);
}

#[test]
fn test_parse_date_formats() {
    let jan2 = NaiveDate::from_ymd_opt(2013, 1, 2).unwrap();
    assert_eq!(parse_date("2013-01-02"), Some(jan2));
    assert_eq!(parse_date("2013-01-02 13:45:00"), Some(jan2));
    assert_eq!(parse_date("2013-01-02T13:45:00.250"), Some(jan2));
    assert_eq!(parse_date("2013-01-02T13:45:00+02:00"), Some(jan2));
    assert_eq!(parse_date("01/02/2013"), Some(jan2));
    assert_eq!(parse_date("2013/01/02"), Some(jan2));
    assert_eq!(parse_date("02 Jan 2013"), Some(jan2));
    // Day-first only when month-first is impossible.
    assert_eq!(parse_date("25/12/2013"), NaiveDate::from_ymd_opt(2013, 12, 25));
    assert_eq!(parse_date("yesterday"), None);
    assert_eq!(parse_date("2013-02-30"), None);
}

/// Return the path to a file within the test data directory
#[test]
fn test_parse_risk_score() {
    assert_eq!(parse_risk_score("7"), Some(7));
    assert_eq!(parse_risk_score("7.0"), Some(7));
    assert_eq!(parse_risk_score("7.5"), None);
    assert_eq!(parse_risk_score("1e300"), None);
    assert_eq!(parse_risk_score("-1e19"), None);
    assert_eq!(parse_risk_score("NaN"), None);
    assert_eq!(parse_risk_score("high"), None);
}

pub(crate) fn fixture_filename(filename: &str) -> PathBuf {
    let mut dir = fixture_dir();
    dir.push(filename);
    dir
}

pub(crate) fn fixture_dir() -> PathBuf {
    let mut dir = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    dir.push("fixture");
    dir
}
