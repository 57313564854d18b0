//! Multi-key stable sorting for [`RecordSet`] and [`DataSet`].
//!
//! Sorting is strict: every record must supply every sort field. A list value sorts by its first
//! element; an empty list sorts as a "missing" key that precedes every other key in ascending
//! order.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use crate::error::{ProcessingError, ProcessingResult};
use crate::types::{DataSet, RecordSet, Value};

use super::compare::{ScalarClass, compare_scalars, observed};

/// Sort direction for one key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

impl SortDirection {
    /// The opposite direction.
    pub fn reversed(self) -> Self {
        match self {
            SortDirection::Ascending => SortDirection::Descending,
            SortDirection::Descending => SortDirection::Ascending,
        }
    }
}

/// One `(field, direction)` sort key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortKey {
    pub field: String,
    pub direction: SortDirection,
}

impl SortKey {
    pub fn new(field: impl Into<String>, direction: SortDirection) -> Self {
        Self {
            field: field.into(),
            direction,
        }
    }

    pub fn ascending(field: impl Into<String>) -> Self {
        Self::new(field, SortDirection::Ascending)
    }

    pub fn descending(field: impl Into<String>) -> Self {
        Self::new(field, SortDirection::Descending)
    }
}

/// Parses `field`, `field:asc` or `field:desc`.
impl FromStr for SortKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (field, direction) = match s.rsplit_once(':') {
            Some((field, dir)) if dir.eq_ignore_ascii_case("asc") => (field, SortDirection::Ascending),
            Some((field, dir)) if dir.eq_ignore_ascii_case("desc") => (field, SortDirection::Descending),
            _ => (s, SortDirection::Ascending),
        };
        if field.is_empty() {
            return Err(format!("invalid sort key '{s}': field name is empty"));
        }
        Ok(Self::new(field, direction))
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.direction {
            SortDirection::Ascending => write!(f, "{}:asc", self.field),
            SortDirection::Descending => write!(f, "{}:desc", self.field),
        }
    }
}

/// Value used to order one record under one key.
#[derive(Debug, Clone, Copy)]
enum SortValue<'a> {
    /// An empty list.
    Missing,
    Scalar(&'a Value),
}

fn sort_value<'a>(field: &str, position: usize, value: Option<&'a Value>) -> ProcessingResult<SortValue<'a>> {
    let value = observed(value).ok_or_else(|| ProcessingError::KeyNotFound {
        field: field.to_owned(),
        position,
    })?;
    value.check_shape(field)?;
    Ok(match value {
        Value::List(items) => items.first().map_or(SortValue::Missing, SortValue::Scalar),
        scalar => SortValue::Scalar(scalar),
    })
}

/// Reject key columns that mix kinds (or hold NaN) so the comparator is total.
fn check_comparable<'a>(field: &str, column: impl Iterator<Item = SortValue<'a>>) -> ProcessingResult<()> {
    let mut expected: Option<(ScalarClass, &'static str)> = None;
    for value in column {
        let SortValue::Scalar(v) = value else {
            continue;
        };
        if matches!(v, Value::Float64(f) if f.is_nan()) {
            return Err(ProcessingError::comparison(field, "NaN is not comparable"));
        }
        let Some(class) = ScalarClass::of(v) else {
            continue;
        };
        match expected {
            None => expected = Some((class, v.kind_name())),
            Some((c, kind)) if c != class => {
                return Err(ProcessingError::comparison(
                    field,
                    format!("{kind} value cannot be compared with {}", v.kind_name()),
                ));
            }
            Some(_) => {}
        }
    }
    Ok(())
}

fn cmp_sort_values(field: &str, a: SortValue<'_>, b: SortValue<'_>) -> Ordering {
    match (a, b) {
        (SortValue::Missing, SortValue::Missing) => Ordering::Equal,
        (SortValue::Missing, SortValue::Scalar(_)) => Ordering::Less,
        (SortValue::Scalar(_), SortValue::Missing) => Ordering::Greater,
        // Kinds were checked up front, so this cannot fail.
        (SortValue::Scalar(a), SortValue::Scalar(b)) => {
            compare_scalars(field, a, b).unwrap_or(Ordering::Equal)
        }
    }
}

/// Stable permutation ordering `key_values` (one row of sort values per item) under `keys`.
fn sorted_order(keys: &[SortKey], key_values: &[Vec<SortValue<'_>>]) -> ProcessingResult<Vec<usize>> {
    for (k, key) in keys.iter().enumerate() {
        check_comparable(&key.field, key_values.iter().map(|row| row[k]))?;
    }

    let mut order: Vec<usize> = (0..key_values.len()).collect();
    order.sort_by(|&a, &b| {
        for (k, key) in keys.iter().enumerate() {
            let ordering = cmp_sort_values(&key.field, key_values[a][k], key_values[b][k]);
            let ordering = match key.direction {
                SortDirection::Ascending => ordering,
                SortDirection::Descending => ordering.reverse(),
            };
            if ordering != Ordering::Equal {
                return ordering;
            }
        }
        Ordering::Equal
    });
    Ok(order)
}

/// Returns the records reordered by `keys` (first key is primary).
///
/// Records with equal keys keep their relative order. An empty `keys` slice returns an
/// unchanged copy.
pub fn sort_records(records: &RecordSet, keys: &[SortKey]) -> ProcessingResult<RecordSet> {
    let key_values = records
        .iter()
        .enumerate()
        .map(|(position, record)| {
            keys.iter()
                .map(|key| sort_value(&key.field, position, record.get(&key.field)))
                .collect::<ProcessingResult<Vec<_>>>()
        })
        .collect::<ProcessingResult<Vec<_>>>()?;

    let order = sorted_order(keys, &key_values)?;
    log::debug!("sorted {} records by {} key(s)", order.len(), keys.len());
    Ok(order.into_iter().map(|i| records.records[i].clone()).collect())
}

/// Single-key shortcut for [`sort_records`].
pub fn sort_records_by(
    records: &RecordSet,
    field: &str,
    direction: SortDirection,
) -> ProcessingResult<RecordSet> {
    sort_records(records, &[SortKey::new(field, direction)])
}

/// Returns the table's rows reordered by `keys`, with the same semantics as [`sort_records`].
///
/// A column missing from the schema is reported as missing from the first row.
pub fn sort_table(dataset: &DataSet, keys: &[SortKey]) -> ProcessingResult<DataSet> {
    let idxs: Vec<Option<usize>> = keys.iter().map(|k| dataset.schema.index_of(&k.field)).collect();
    let key_values = dataset
        .rows
        .iter()
        .enumerate()
        .map(|(position, row)| {
            keys.iter()
                .zip(&idxs)
                .map(|(key, idx)| sort_value(&key.field, position, idx.and_then(|i| row.get(i))))
                .collect::<ProcessingResult<Vec<_>>>()
        })
        .collect::<ProcessingResult<Vec<_>>>()?;

    let order = sorted_order(keys, &key_values)?;
    log::debug!("sorted {} rows by {} key(s)", order.len(), keys.len());
    let rows = order.into_iter().map(|i| dataset.rows[i].clone()).collect();
    Ok(DataSet::new(dataset.schema.clone(), rows))
}
