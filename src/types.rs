//! Core data model types.
//!
//! A loaded file is held either as a tabular [`DataSet`] (a [`Schema`] of typed columns plus
//! row-major cells) or as a record-oriented [`RecordSet`] (an ordered sequence of [`Record`]s,
//! each a map from field name to [`Value`]). Both views describe the same kind of data and the
//! processing engines give identical answers for either.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use crate::error::{ProcessingError, ProcessingResult};

/// Logical data type for a schema field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataType {
    /// 64-bit signed integer.
    Int64,
    /// 64-bit floating point number.
    Float64,
    /// Boolean.
    Bool,
    /// UTF-8 string.
    Utf8,
    /// List of scalars; every list is homogeneous on its own.
    List,
}

impl DataType {
    /// Lower-case name used in messages and displays.
    pub fn name(self) -> &'static str {
        match self {
            DataType::Int64 => "int64",
            DataType::Float64 => "float64",
            DataType::Bool => "bool",
            DataType::Utf8 => "utf8",
            DataType::List => "list",
        }
    }
}

/// A single named, typed field in a [`Schema`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    /// Field/column name.
    pub name: String,
    /// Field data type.
    pub data_type: DataType,
}

impl Field {
    /// Create a new field.
    pub fn new(name: impl Into<String>, data_type: DataType) -> Self {
        Self {
            name: name.into(),
            data_type,
        }
    }
}

/// A list of fields describing the shape of a table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schema {
    /// Ordered list of fields.
    pub fields: Vec<Field>,
}

impl Schema {
    /// Create a new schema from fields.
    pub fn new(fields: Vec<Field>) -> Self {
        Self { fields }
    }

    /// Iterate field names in order.
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|f| f.name.as_str())
    }

    /// Returns the index of a field by name, if present.
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|f| f.name == name)
    }
}

/// A single field value.
///
/// [`Value::Null`] is the explicit "present but null" marker (an empty CSV cell, a JSON `null`).
/// The engines treat it like an absent field.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Missing/empty value.
    Null,
    /// 64-bit signed integer.
    Int64(i64),
    /// 64-bit float.
    Float64(f64),
    /// Boolean.
    Bool(bool),
    /// UTF-8 string.
    Utf8(String),
    /// Homogeneous list of scalars.
    List(Vec<Value>),
}

impl Value {
    /// Coerce a user-typed token: integer, else float, else `true`/`false`
    /// (case-insensitive), else string.
    pub fn from_token(token: &str) -> Self {
        if let Ok(v) = token.parse::<i64>() {
            Value::Int64(v)
        } else if let Ok(v) = token.parse::<f64>() {
            Value::Float64(v)
        } else if token.eq_ignore_ascii_case("true") {
            Value::Bool(true)
        } else if token.eq_ignore_ascii_case("false") {
            Value::Bool(false)
        } else {
            Value::Utf8(token.to_owned())
        }
    }

    /// Logical type of this value, or `None` for [`Value::Null`].
    pub fn data_type(&self) -> Option<DataType> {
        match self {
            Value::Null => None,
            Value::Int64(_) => Some(DataType::Int64),
            Value::Float64(_) => Some(DataType::Float64),
            Value::Bool(_) => Some(DataType::Bool),
            Value::Utf8(_) => Some(DataType::Utf8),
            Value::List(_) => Some(DataType::List),
        }
    }

    /// Lower-case kind name used in error messages.
    pub fn kind_name(&self) -> &'static str {
        self.data_type().map(DataType::name).unwrap_or("null")
    }

    /// `true` for [`Value::Null`].
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// `true` for strings, numbers and booleans.
    pub fn is_scalar(&self) -> bool {
        matches!(
            self,
            Value::Int64(_) | Value::Float64(_) | Value::Bool(_) | Value::Utf8(_)
        )
    }

    /// Numeric view of an integer or float.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int64(v) => Some(*v as f64),
            Value::Float64(v) => Some(*v),
            _ => None,
        }
    }

    /// String contents, if this is a string.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Utf8(s) => Some(s.as_str()),
            _ => None,
        }
    }

    /// List elements, if this is a list.
    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items.as_slice()),
            _ => None,
        }
    }

    /// Verify this value fits the scalar / homogeneous-scalar-list model.
    ///
    /// Lists may not contain nulls or nested lists, and every element must have the same kind
    /// (integers and floats are distinct kinds here).
    pub fn check_shape(&self, field: &str) -> ProcessingResult<()> {
        let Value::List(items) = self else {
            return Ok(());
        };

        let mut first: Option<DataType> = None;
        for item in items {
            if !item.is_scalar() {
                return Err(ProcessingError::UnsupportedValueShape {
                    field: field.to_owned(),
                    message: format!("list elements must be scalars, found {}", item.kind_name()),
                });
            }
            match (first, item.data_type()) {
                (None, dt) => first = dt,
                (Some(expected), Some(actual)) if expected != actual => {
                    return Err(ProcessingError::UnsupportedValueShape {
                        field: field.to_owned(),
                        message: format!(
                            "list elements must share one kind, found {} and {}",
                            expected.name(),
                            actual.name()
                        ),
                    });
                }
                _ => {}
            }
        }
        Ok(())
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("null"),
            Value::Int64(v) => write!(f, "{v}"),
            Value::Float64(v) => write!(f, "{v:?}"),
            Value::Bool(v) => write!(f, "{v}"),
            Value::Utf8(s) => f.write_str(s),
            Value::List(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    match item {
                        Value::Utf8(s) => write!(f, "{s:?}")?,
                        other => write!(f, "{other}")?,
                    }
                }
                f.write_str("]")
            }
        }
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int64(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float64(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Utf8(v.to_owned())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Utf8(v)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Value::List(items.into_iter().map(Into::into).collect())
    }
}

/// One record: a mapping from unique field name to value.
///
/// Field order is not significant.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Record {
    fields: BTreeMap<String, Value>,
}

impl Record {
    /// Empty record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a field, returning the previous value if the name was already present.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.fields.insert(name.into(), value.into())
    }

    /// Look up a field. `None` means absent, which is distinct from `Some(&Value::Null)`.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    /// Whether the field is present (possibly as null).
    pub fn contains(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    /// Iterate `(name, value)` pairs in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Field names in name order.
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    /// Number of fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// `true` when the record has no fields.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Record {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            fields: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

/// Record-oriented dataset: an ordered sequence of [`Record`]s.
///
/// Positions are not identities; filtering and sorting return a new `RecordSet`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RecordSet {
    pub records: Vec<Record>,
}

impl RecordSet {
    /// Wrap records in their original order.
    pub fn new(records: Vec<Record>) -> Self {
        Self { records }
    }

    /// Number of records.
    pub fn record_count(&self) -> usize {
        self.records.len()
    }

    /// `true` when there are no records.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Iterate records in order.
    pub fn iter(&self) -> impl Iterator<Item = &Record> {
        self.records.iter()
    }

    /// All field names used by at least one record, in name order.
    pub fn field_names(&self) -> BTreeSet<&str> {
        self.records.iter().flat_map(Record::field_names).collect()
    }

    /// Create a new set containing only records that match `predicate`.
    pub fn filter_records<F>(&self, mut predicate: F) -> Self
    where
        F: FnMut(&Record) -> bool,
    {
        Self {
            records: self
                .records
                .iter()
                .filter(|r| predicate(*r))
                .cloned()
                .collect(),
        }
    }
}

impl FromIterator<Record> for RecordSet {
    fn from_iter<I: IntoIterator<Item = Record>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

/// In-memory tabular dataset.
///
/// Rows are stored as `Vec<Vec<Value>>` in the same order as the [`Schema`] fields.
#[derive(Debug, Clone, PartialEq)]
pub struct DataSet {
    /// Schema describing row shape.
    pub schema: Schema,
    /// Row-major value storage.
    pub rows: Vec<Vec<Value>>,
}

impl DataSet {
    /// Create a dataset from schema and rows.
    pub fn new(schema: Schema, rows: Vec<Vec<Value>>) -> Self {
        Self { schema, rows }
    }

    /// Number of rows in the dataset.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Iterate the cells of column `idx`, one per row.
    pub fn column(&self, idx: usize) -> impl Iterator<Item = &Value> {
        self.rows.iter().map(move |row| row.get(idx).unwrap_or(&Value::Null))
    }

    /// Create a new dataset containing only rows that match `predicate`.
    ///
    /// The returned dataset preserves the original schema.
    pub fn filter_rows<F>(&self, mut predicate: F) -> Self
    where
        F: FnMut(&[Value]) -> bool,
    {
        let rows = self
            .rows
            .iter()
            .filter(|row| predicate(row.as_slice()))
            .cloned()
            .collect();
        Self {
            schema: self.schema.clone(),
            rows,
        }
    }

    /// Record-oriented view of this table. Null cells become absent fields.
    pub fn to_records(&self) -> RecordSet {
        self.rows
            .iter()
            .map(|row| {
                self.schema
                    .fields
                    .iter()
                    .zip(row)
                    .filter(|(_, v)| !v.is_null())
                    .map(|(f, v)| (f.name.clone(), v.clone()))
                    .collect::<Record>()
            })
            .collect()
    }

    /// Build a table from records.
    ///
    /// Columns are the union of all field names, in name order. A column's type is the kind of
    /// its first non-null value; integer/float mixes widen to float, any other mix is rejected.
    /// Fields missing from a record become null cells.
    pub fn from_records(records: &RecordSet) -> ProcessingResult<Self> {
        let names = records.field_names();
        let mut fields = Vec::with_capacity(names.len());

        for name in &names {
            let mut column_type: Option<DataType> = None;
            for value in records.iter().filter_map(|r| r.get(name)) {
                value.check_shape(name)?;
                let Some(dt) = value.data_type() else {
                    continue;
                };
                column_type = match column_type {
                    None => Some(dt),
                    Some(current) if current == dt => Some(current),
                    Some(DataType::Int64 | DataType::Float64)
                        if matches!(dt, DataType::Int64 | DataType::Float64) =>
                    {
                        Some(DataType::Float64)
                    }
                    Some(current) => {
                        return Err(ProcessingError::UnsupportedValueShape {
                            field: (*name).to_owned(),
                            message: format!(
                                "column mixes {} and {} values",
                                current.name(),
                                dt.name()
                            ),
                        });
                    }
                };
            }
            fields.push(Field::new(*name, column_type.unwrap_or(DataType::Utf8)));
        }

        let rows = records
            .iter()
            .map(|record| {
                fields
                    .iter()
                    .map(|field| match (record.get(&field.name), field.data_type) {
                        (None, _) => Value::Null,
                        (Some(Value::Int64(v)), DataType::Float64) => Value::Float64(*v as f64),
                        (Some(v), _) => v.clone(),
                    })
                    .collect()
            })
            .collect();

        Ok(Self::new(Schema::new(fields), rows))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_coercion_prefers_int_then_float_then_bool() {
        assert_eq!(Value::from_token("42"), Value::Int64(42));
        assert_eq!(Value::from_token("-3"), Value::Int64(-3));
        assert_eq!(Value::from_token("2.5"), Value::Float64(2.5));
        assert_eq!(Value::from_token("TRUE"), Value::Bool(true));
        assert_eq!(Value::from_token("False"), Value::Bool(false));
        assert_eq!(Value::from_token("Ada"), Value::Utf8("Ada".to_string()));
    }

    #[test]
    fn record_get_distinguishes_absent_from_null() {
        let mut r = Record::new();
        r.insert("a", Value::Null);
        assert_eq!(r.get("a"), Some(&Value::Null));
        assert_eq!(r.get("b"), None);
    }

    #[test]
    fn check_shape_rejects_nested_and_mixed_lists() {
        let nested = Value::List(vec![Value::List(vec![Value::Int64(1)])]);
        assert!(matches!(
            nested.check_shape("f"),
            Err(ProcessingError::UnsupportedValueShape { .. })
        ));

        let mixed = Value::List(vec![Value::Int64(1), Value::Utf8("x".into())]);
        assert!(mixed.check_shape("f").is_err());

        let with_null = Value::List(vec![Value::Null]);
        assert!(with_null.check_shape("f").is_err());

        assert!(Value::from(vec![1_i64, 2, 3]).check_shape("f").is_ok());
        assert!(Value::List(vec![]).check_shape("f").is_ok());
    }

    #[test]
    fn list_display_quotes_strings() {
        assert_eq!(Value::from(vec!["a", "b"]).to_string(), r#"["a", "b"]"#);
        assert_eq!(Value::from(vec![1_i64, 2]).to_string(), "[1, 2]");
    }

    #[test]
    fn table_round_trips_through_records() {
        let schema = Schema::new(vec![
            Field::new("id", DataType::Int64),
            Field::new("name", DataType::Utf8),
            Field::new("tags", DataType::List),
        ]);
        let ds = DataSet::new(
            schema,
            vec![
                vec![Value::Int64(1), Value::Utf8("a".into()), Value::from(vec!["x"])],
                vec![Value::Int64(2), Value::Null, Value::from(vec!["y", "z"])],
            ],
        );

        let records = ds.to_records();
        assert_eq!(records.record_count(), 2);
        assert_eq!(records.records[1].get("name"), None);

        let back = DataSet::from_records(&records).unwrap();
        assert_eq!(back.schema.field_names().collect::<Vec<_>>(), vec!["id", "name", "tags"]);
        assert_eq!(back.rows, ds.rows);
    }

    #[test]
    fn from_records_widens_int_and_float() {
        let records = RecordSet::new(vec![
            [("x", Value::Int64(1))].into_iter().collect(),
            [("x", Value::Float64(2.5))].into_iter().collect(),
        ]);
        let ds = DataSet::from_records(&records).unwrap();
        assert_eq!(ds.schema.fields[0].data_type, DataType::Float64);
        assert_eq!(ds.rows[0][0], Value::Float64(1.0));
    }

    #[test]
    fn from_records_rejects_mixed_kinds() {
        let records = RecordSet::new(vec![
            [("x", Value::Int64(1))].into_iter().collect(),
            [("x", Value::Utf8("one".into()))].into_iter().collect(),
        ]);
        assert!(matches!(
            DataSet::from_records(&records),
            Err(ProcessingError::UnsupportedValueShape { .. })
        ));
    }
}
