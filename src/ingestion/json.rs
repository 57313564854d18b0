//! JSON ingestion and export.
//!
//! Records are stored in a container document:
//!
//! ```json
//! {"data": [{"item": {"name": "Ada", "age": 36, "tags": ["x", "y"]}}]}
//! ```
//!
//! Every `item` becomes one [`Record`]. Values must be scalars, `null` or lists of scalars of a
//! single kind; nested objects and lists of lists are rejected.

use std::fs;
use std::io::Write;
use std::path::Path;

use serde::Serialize;

use crate::error::{IngestionError, IngestionResult};
use crate::types::{Record, RecordSet, Value};

/// Ingest a `{"data": [{"item": {...}}]}` file into a [`RecordSet`].
pub fn ingest_json_records_from_path(path: impl AsRef<Path>) -> IngestionResult<RecordSet> {
    let text = fs::read_to_string(path)?;
    ingest_json_records_from_str(&text)
}

/// Ingest JSON records from an in-memory string.
pub fn ingest_json_records_from_str(input: &str) -> IngestionResult<RecordSet> {
    if input.trim().is_empty() {
        return Err(IngestionError::SchemaMismatch {
            message: "json input is empty".to_string(),
        });
    }

    let doc: serde_json::Value = serde_json::from_str(input)?;
    let items = doc
        .get("data")
        .and_then(serde_json::Value::as_array)
        .ok_or_else(|| IngestionError::SchemaMismatch {
            message: "expected an object with a 'data' array".to_string(),
        })?;

    let mut records = Vec::with_capacity(items.len());
    for (idx0, entry) in items.iter().enumerate() {
        let row = idx0 + 1;
        let item = entry
            .get("item")
            .and_then(serde_json::Value::as_object)
            .ok_or_else(|| IngestionError::SchemaMismatch {
                message: format!("data entry {row} has no 'item' object"),
            })?;

        let mut record = Record::new();
        for (field, jv) in item {
            let value = value_from_json(jv).map_err(|message| IngestionError::UnsupportedValueShape {
                row,
                field: field.clone(),
                message,
            })?;
            record.insert(field.as_str(), value);
        }
        records.push(record);
    }

    log::debug!("parsed {} json record(s)", records.len());
    Ok(RecordSet::new(records))
}

/// Convert a JSON value into the record value model.
///
/// Integers that do not fit in `i64` become `Float64`. A list mixing integers and floats is
/// widened to floats; any other mix is an error.
pub(crate) fn value_from_json(v: &serde_json::Value) -> Result<Value, String> {
    match v {
        serde_json::Value::Null => Ok(Value::Null),
        serde_json::Value::Bool(b) => Ok(Value::Bool(*b)),
        serde_json::Value::Number(n) => match n.as_i64() {
            Some(i) => Ok(Value::Int64(i)),
            None => n
                .as_f64()
                .map(Value::Float64)
                .ok_or_else(|| format!("number {n} is out of range")),
        },
        serde_json::Value::String(s) => Ok(Value::Utf8(s.clone())),
        serde_json::Value::Array(items) => {
            let mut out = Vec::with_capacity(items.len());
            for item in items {
                match item {
                    serde_json::Value::Array(_) => return Err("nested lists are not supported".to_string()),
                    serde_json::Value::Object(_) => {
                        return Err("objects inside lists are not supported".to_string());
                    }
                    serde_json::Value::Null => return Err("lists may not contain null".to_string()),
                    scalar => out.push(value_from_json(scalar)?),
                }
            }
            let has_float = out.iter().any(|i| matches!(i, Value::Float64(_)));
            if has_float && out.iter().all(|i| i.as_f64().is_some()) {
                out = out.iter().filter_map(Value::as_f64).map(Value::Float64).collect();
            }
            let list = Value::List(out);
            list.check_shape("").map_err(|e| match e {
                crate::error::ProcessingError::UnsupportedValueShape { message, .. } => message,
                other => other.to_string(),
            })?;
            Ok(list)
        }
        serde_json::Value::Object(_) => Err("nested objects are not supported".to_string()),
    }
}

/// Convert a record value back to JSON. Non-finite floats become `null`.
pub(crate) fn value_to_json(v: &Value) -> serde_json::Value {
    match v {
        Value::Null => serde_json::Value::Null,
        Value::Int64(i) => serde_json::Value::from(*i),
        Value::Float64(f) => serde_json::Value::from(*f),
        Value::Bool(b) => serde_json::Value::Bool(*b),
        Value::Utf8(s) => serde_json::Value::String(s.clone()),
        Value::List(items) => serde_json::Value::Array(items.iter().map(value_to_json).collect()),
    }
}

fn records_to_document(records: &RecordSet) -> serde_json::Value {
    let data = records
        .iter()
        .map(|record| {
            let item: serde_json::Map<String, serde_json::Value> = record
                .iter()
                .map(|(k, v)| (k.to_owned(), value_to_json(v)))
                .collect();
            serde_json::json!({ "item": item })
        })
        .collect::<Vec<_>>();
    serde_json::json!({ "data": data })
}

/// Serialize records into the container document, indented with four spaces.
pub fn write_json_records_to_writer<W: Write>(writer: W, records: &RecordSet) -> IngestionResult<()> {
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut ser = serde_json::Serializer::with_formatter(writer, formatter);
    records_to_document(records).serialize(&mut ser)?;
    Ok(())
}

/// Serialize records to a pretty-printed JSON string.
pub fn write_json_records_to_string(records: &RecordSet) -> IngestionResult<String> {
    let mut buf = Vec::new();
    write_json_records_to_writer(&mut buf, records)?;
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

/// Write records to `path`, replacing any existing file.
pub fn write_json_records_to_path(path: impl AsRef<Path>, records: &RecordSet) -> IngestionResult<()> {
    let mut file = std::io::BufWriter::new(fs::File::create(path)?);
    write_json_records_to_writer(&mut file, records)?;
    file.write_all(b"\n")?;
    file.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_container_shape() {
        let input = r#"{"data": [
            {"item": {"name": "Ada", "age": 36, "score": 9.5, "tags": ["x"], "nick": null}},
            {"item": {"name": "Grace"}}
        ]}"#;
        let rs = ingest_json_records_from_str(input).unwrap();
        assert_eq!(rs.record_count(), 2);

        let ada = &rs.records[0];
        assert_eq!(ada.get("age"), Some(&Value::Int64(36)));
        assert_eq!(ada.get("score"), Some(&Value::Float64(9.5)));
        assert_eq!(ada.get("tags"), Some(&Value::from(vec!["x"])));
        assert_eq!(ada.get("nick"), Some(&Value::Null));
        assert!(!rs.records[1].contains("age"));
    }

    #[test]
    fn missing_data_or_item_is_schema_mismatch() {
        assert!(matches!(
            ingest_json_records_from_str(r#"[{"a": 1}]"#),
            Err(IngestionError::SchemaMismatch { .. })
        ));
        assert!(matches!(
            ingest_json_records_from_str(r#"{"data": [{"a": 1}]}"#),
            Err(IngestionError::SchemaMismatch { .. })
        ));
    }

    #[test]
    fn nested_shapes_are_rejected_with_location() {
        let input = r#"{"data": [{"item": {"a": 1}}, {"item": {"meta": {"x": 1}}}]}"#;
        match ingest_json_records_from_str(input) {
            Err(IngestionError::UnsupportedValueShape { row, field, .. }) => {
                assert_eq!(row, 2);
                assert_eq!(field, "meta");
            }
            other => panic!("unexpected result: {other:?}"),
        }

        let mixed = r#"{"data": [{"item": {"l": [1, "a"]}}]}"#;
        assert!(matches!(
            ingest_json_records_from_str(mixed),
            Err(IngestionError::UnsupportedValueShape { .. })
        ));
    }

    #[test]
    fn integer_float_lists_widen_and_huge_integers_become_floats() {
        let input = r#"{"data": [{"item": {"l": [1, 2.5], "big": 18446744073709551615}}]}"#;
        let rs = ingest_json_records_from_str(input).unwrap();
        assert_eq!(rs.records[0].get("l"), Some(&Value::from(vec![1.0, 2.5])));
        assert!(matches!(rs.records[0].get("big"), Some(Value::Float64(_))));
    }

    #[test]
    fn writes_four_space_indented_container() {
        let rs = RecordSet::new(vec![[("a", 1_i64)].into_iter().collect::<Record>()]);
        let text = write_json_records_to_string(&rs).unwrap();
        assert!(text.contains("\n    \"data\": ["));
        assert_eq!(ingest_json_records_from_str(&text).unwrap(), rs);
    }
}
