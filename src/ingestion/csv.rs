//! CSV ingestion and export.
//!
//! CSV files load into the tabular [`DataSet`] view. List cells are written and read as JSON
//! array text (`[1, 2, 3]`); empty cells are [`Value::Null`].

use std::path::Path;

use crate::error::{IngestionError, IngestionResult};
use crate::types::{DataSet, DataType, Field, Schema, Value};

use super::json::{value_from_json, value_to_json};

/// Ingest a CSV file into an in-memory [`DataSet`] using a caller-provided schema.
///
/// Rules:
///
/// - CSV must have headers.
/// - Headers must contain all schema fields (order can differ).
/// - Each value is parsed according to the schema field type.
pub fn ingest_csv_from_path(path: impl AsRef<Path>, schema: &Schema) -> IngestionResult<DataSet> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_path(path)?;
    ingest_csv_from_reader(&mut rdr, schema)
}

/// Ingest CSV data from an existing CSV reader.
pub fn ingest_csv_from_reader<R: std::io::Read>(
    rdr: &mut csv::Reader<R>,
    schema: &Schema,
) -> IngestionResult<DataSet> {
    let headers = rdr.headers()?.clone();

    // Map schema fields -> CSV column indexes (allows re-ordered CSV columns).
    let mut col_idxs = Vec::with_capacity(schema.fields.len());
    for field in &schema.fields {
        match headers.iter().position(|h| h == field.name) {
            Some(idx) => col_idxs.push(idx),
            None => {
                return Err(IngestionError::SchemaMismatch {
                    message: format!(
                        "missing required column '{field}'. headers={:?}",
                        headers.iter().collect::<Vec<_>>(),
                        field = field.name
                    ),
                });
            }
        }
    }

    let mut rows: Vec<Vec<Value>> = Vec::new();
    for (row_idx0, result) in rdr.records().enumerate() {
        // Report 1-based row number for users; +1 again because header is row 1.
        let user_row = row_idx0 + 2;
        let record = result?;

        let mut row: Vec<Value> = Vec::with_capacity(schema.fields.len());
        for (field, &csv_idx) in schema.fields.iter().zip(col_idxs.iter()) {
            let raw = record.get(csv_idx).unwrap_or("");
            row.push(parse_typed_value(user_row, &field.name, field.data_type, raw)?);
        }
        rows.push(row);
    }

    Ok(DataSet::new(schema.clone(), rows))
}

/// Ingest a CSV file, inferring each column's type from its cells.
///
/// A column is `Int64` if every non-empty cell parses as an integer, else `Float64` if every
/// cell parses as a float, else `Bool` if every cell is `true`/`false` (any case), else `List`
/// if every cell is a JSON array of scalars, else `Utf8`.
pub fn ingest_csv_infer_from_path(path: impl AsRef<Path>) -> IngestionResult<DataSet> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_path(path)?;
    ingest_csv_infer_from_reader(&mut rdr)
}

/// Inferring variant of [`ingest_csv_from_reader`].
pub fn ingest_csv_infer_from_reader<R: std::io::Read>(rdr: &mut csv::Reader<R>) -> IngestionResult<DataSet> {
    let headers = rdr.headers()?.clone();
    for (idx, name) in headers.iter().enumerate() {
        if headers.iter().take(idx).any(|h| h == name) {
            return Err(IngestionError::SchemaMismatch {
                message: format!("duplicate column '{name}'"),
            });
        }
    }

    let records = rdr.records().collect::<Result<Vec<_>, _>>()?;
    let fields = headers
        .iter()
        .enumerate()
        .map(|(idx, name)| {
            let cells = records.iter().map(|r| r.get(idx).unwrap_or(""));
            Field::new(name, infer_column_type(cells))
        })
        .collect();
    let schema = Schema::new(fields);

    let mut rows = Vec::with_capacity(records.len());
    for (row_idx0, record) in records.iter().enumerate() {
        let user_row = row_idx0 + 2;
        let row = schema
            .fields
            .iter()
            .enumerate()
            .map(|(idx, field)| {
                parse_typed_value(user_row, &field.name, field.data_type, record.get(idx).unwrap_or(""))
            })
            .collect::<IngestionResult<Vec<_>>>()?;
        rows.push(row);
    }

    log::debug!(
        "inferred csv schema: {:?}",
        schema
            .fields
            .iter()
            .map(|f| format!("{}:{}", f.name, f.data_type.name()))
            .collect::<Vec<_>>()
    );
    Ok(DataSet::new(schema, rows))
}

fn infer_column_type<'a>(cells: impl Iterator<Item = &'a str>) -> DataType {
    let cells: Vec<&str> = cells.map(str::trim).filter(|c| !c.is_empty()).collect();
    if cells.is_empty() {
        DataType::Utf8
    } else if cells.iter().all(|c| c.parse::<i64>().is_ok()) {
        DataType::Int64
    } else if cells.iter().all(|c| c.parse::<f64>().is_ok_and(f64::is_finite)) {
        DataType::Float64
    } else if cells
        .iter()
        .all(|c| c.eq_ignore_ascii_case("true") || c.eq_ignore_ascii_case("false"))
    {
        DataType::Bool
    } else if cells.iter().all(|c| parse_list(c).is_ok()) {
        DataType::List
    } else {
        DataType::Utf8
    }
}

/// Write a [`DataSet`] as CSV with a header row.
pub fn write_csv_to_path(path: impl AsRef<Path>, dataset: &DataSet) -> IngestionResult<()> {
    let mut wtr = csv::Writer::from_path(path)?;
    write_csv_to_writer(&mut wtr, dataset)
}

/// Write a [`DataSet`] to an existing CSV writer.
pub fn write_csv_to_writer<W: std::io::Write>(
    wtr: &mut csv::Writer<W>,
    dataset: &DataSet,
) -> IngestionResult<()> {
    wtr.write_record(dataset.schema.field_names())?;
    for row in &dataset.rows {
        wtr.write_record(row.iter().map(format_cell))?;
    }
    wtr.flush()?;
    Ok(())
}

fn format_cell(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::List(_) => value_to_json(value).to_string(),
        other => other.to_string(),
    }
}

fn parse_typed_value(
    row: usize,
    column: &str,
    data_type: DataType,
    raw: &str,
) -> IngestionResult<Value> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(Value::Null);
    }

    let parse_error = |message: String| IngestionError::ParseError {
        row,
        column: column.to_owned(),
        raw: raw.to_owned(),
        message,
    };

    match data_type {
        DataType::Utf8 => Ok(Value::Utf8(trimmed.to_owned())),
        DataType::Int64 => trimmed
            .parse::<i64>()
            .map(Value::Int64)
            .map_err(|e| parse_error(e.to_string())),
        DataType::Float64 => trimmed
            .parse::<f64>()
            .map(Value::Float64)
            .map_err(|e| parse_error(e.to_string())),
        DataType::Bool => parse_bool(trimmed).map(Value::Bool).map_err(parse_error),
        DataType::List => parse_list(trimmed).map_err(parse_error),
    }
}

fn parse_bool(s: &str) -> Result<bool, String> {
    match s.to_ascii_lowercase().as_str() {
        "true" | "t" | "1" | "yes" | "y" => Ok(true),
        "false" | "f" | "0" | "no" | "n" => Ok(false),
        _ => Err("expected bool (true/false/1/0/yes/no)".to_string()),
    }
}

fn parse_list(s: &str) -> Result<Value, String> {
    if !s.starts_with('[') {
        return Err("expected a list like [1, 2, 3]".to_string());
    }
    let json: serde_json::Value = serde_json::from_str(s).map_err(|e| e.to_string())?;
    match value_from_json(&json)? {
        list @ Value::List(_) => Ok(list),
        _ => Err("expected a list like [1, 2, 3]".to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reader(input: &str) -> csv::Reader<&[u8]> {
        csv::ReaderBuilder::new()
            .has_headers(true)
            .from_reader(input.as_bytes())
    }

    #[test]
    fn infers_column_types() {
        let input = "name,age,score,active,tags\n\
                     Ada,36,98.5,true,\"[\"\"x\"\", \"\"y\"\"]\"\n\
                     Grace,,87,FALSE,[]\n";
        let ds = ingest_csv_infer_from_reader(&mut reader(input)).unwrap();

        let types: Vec<DataType> = ds.schema.fields.iter().map(|f| f.data_type).collect();
        assert_eq!(
            types,
            vec![DataType::Utf8, DataType::Int64, DataType::Float64, DataType::Bool, DataType::List]
        );
        assert_eq!(ds.rows[1][1], Value::Null);
        assert_eq!(ds.rows[1][2], Value::Float64(87.0));
        assert_eq!(ds.rows[0][4], Value::from(vec!["x", "y"]));
        assert_eq!(ds.rows[1][4], Value::List(vec![]));
    }

    #[test]
    fn mixed_cells_fall_back_to_string() {
        let ds = ingest_csv_infer_from_reader(&mut reader("v\n1\nabc\n")).unwrap();
        assert_eq!(ds.schema.fields[0].data_type, DataType::Utf8);
        assert_eq!(ds.rows[0][0], Value::Utf8("1".to_string()));
    }

    #[test]
    fn non_finite_words_stay_strings() {
        let ds = ingest_csv_infer_from_reader(&mut reader("word\nnan\ninf\n")).unwrap();
        assert_eq!(ds.schema.fields[0].data_type, DataType::Utf8);
    }

    #[test]
    fn duplicate_headers_are_rejected() {
        let err = ingest_csv_infer_from_reader(&mut reader("a,a\n1,2\n")).unwrap_err();
        assert!(err.to_string().contains("duplicate column 'a'"));
    }

    #[test]
    fn written_csv_reloads_with_the_same_types() {
        let input = "id,ratio,tags\n1,3.0,\"[1, 2]\"\n2,,[]\n";
        let ds = ingest_csv_infer_from_reader(&mut reader(input)).unwrap();

        let mut wtr = csv::Writer::from_writer(Vec::new());
        write_csv_to_writer(&mut wtr, &ds).unwrap();
        let bytes = wtr.into_inner().unwrap();
        let text = String::from_utf8(bytes).unwrap();
        assert!(text.starts_with("id,ratio,tags\n1,3.0,"));

        let back = ingest_csv_infer_from_reader(&mut reader(&text)).unwrap();
        assert_eq!(back, ds);
    }
}
