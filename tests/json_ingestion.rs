use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use data_filter::IngestionError;
use data_filter::ingestion::json::{
    ingest_json_records_from_path, ingest_json_records_from_str, write_json_records_to_path,
};
use data_filter::types::Value;

fn tmp_file(ext: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    std::env::temp_dir().join(format!("data-filter-json-{nanos}.{ext}"))
}

#[test]
fn ingest_json_records_from_path_happy_path() {
    let rs = ingest_json_records_from_path("tests/fixtures/people.json").unwrap();

    assert_eq!(rs.record_count(), 4);
    assert_eq!(rs.records[0].get("id"), Some(&Value::Int64(1)));
    assert_eq!(rs.records[0].get("name"), Some(&Value::Utf8("Ada".to_string())));
    assert_eq!(rs.records[1].get("active"), Some(&Value::Bool(false)));
    assert_eq!(rs.records[2].get("score"), Some(&Value::Null));
    assert_eq!(rs.records[3].get("tags"), Some(&Value::from(vec!["kernel", "git", "math"])));
}

#[test]
fn records_may_have_different_fields() {
    let input = r#"{"data": [{"item": {"a": 1}}, {"item": {"b": "x"}}, {"item": {}}]}"#;
    let rs = ingest_json_records_from_str(input).unwrap();
    assert_eq!(rs.record_count(), 3);
    assert!(rs.records[0].contains("a") && !rs.records[0].contains("b"));
    assert!(rs.records[2].is_empty());
    assert_eq!(rs.field_names().into_iter().collect::<Vec<_>>(), vec!["a", "b"]);
}

#[test]
fn ingest_json_errors_on_invalid_json() {
    let err = ingest_json_records_from_str("{\"data\": [").unwrap_err();
    assert!(matches!(err, IngestionError::Json(_)));
    assert!(err.to_string().contains("json error"));
}

#[test]
fn lists_of_lists_are_rejected() {
    let input = r#"{"data": [{"item": {"grid": [[1, 2], [3]]}}]}"#;
    let err = ingest_json_records_from_str(input).unwrap_err();
    assert!(err.to_string().contains("field 'grid'"));
    assert!(err.to_string().contains("nested lists"));
}

#[test]
fn write_then_reload_preserves_records() {
    let rs = ingest_json_records_from_path("tests/fixtures/people.json").unwrap();
    let path = tmp_file("json");
    write_json_records_to_path(&path, &rs).unwrap();

    let text = std::fs::read_to_string(&path).unwrap();
    assert!(text.starts_with("{\n    \"data\": [\n        {\n            \"item\": {"));
    assert_eq!(ingest_json_records_from_path(&path).unwrap(), rs);
    let _ = std::fs::remove_file(&path);
}
