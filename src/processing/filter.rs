//! Predicate filtering for [`RecordSet`] and [`DataSet`].
//!
//! Filtering is stable: retained records keep their original relative order. A record whose
//! target field is absent (or null) is excluded by every predicate kind. Any error aborts the
//! whole filter and leaves the input untouched.

use std::cmp::Ordering;

use crate::error::{ProcessingError, ProcessingResult};
use crate::types::{DataSet, RecordSet, Value};

use super::compare::{Comparison, compare_scalars, observed};

/// A per-record filter condition.
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    /// Scalar field compared with `value`.
    Compare {
        field: String,
        comparison: Comparison,
        value: Value,
    },
    /// String field contains `substring`.
    Contains { field: String, substring: String },
    /// String field starts with `prefix`.
    StartsWith { field: String, prefix: String },
    /// String field ends with `suffix`.
    EndsWith { field: String, suffix: String },
    /// Every one of `elements` appears in the list field.
    ListContainsAll { field: String, elements: Vec<Value> },
    /// Smallest list element is `>= bound`.
    ListMin { field: String, bound: Value },
    /// Largest list element is `<= bound`.
    ListMax { field: String, bound: Value },
    /// Mean of a numeric list compared with `bound`.
    ListAverage {
        field: String,
        comparison: Comparison,
        bound: f64,
    },
    /// List length compared with `bound`.
    ListSize {
        field: String,
        comparison: Comparison,
        bound: usize,
    },
}

impl Predicate {
    /// Field value compared with `value`.
    pub fn compare(field: impl Into<String>, comparison: Comparison, value: impl Into<Value>) -> Self {
        Predicate::Compare {
            field: field.into(),
            comparison,
            value: value.into(),
        }
    }

    /// String field containing `substring`.
    pub fn contains(field: impl Into<String>, substring: impl Into<String>) -> Self {
        Predicate::Contains {
            field: field.into(),
            substring: substring.into(),
        }
    }

    /// String field starting with `prefix`.
    pub fn starts_with(field: impl Into<String>, prefix: impl Into<String>) -> Self {
        Predicate::StartsWith {
            field: field.into(),
            prefix: prefix.into(),
        }
    }

    /// String field ending with `suffix`.
    pub fn ends_with(field: impl Into<String>, suffix: impl Into<String>) -> Self {
        Predicate::EndsWith {
            field: field.into(),
            suffix: suffix.into(),
        }
    }

    /// List field holding every one of `elements`.
    pub fn list_contains_all(field: impl Into<String>, elements: Vec<Value>) -> Self {
        Predicate::ListContainsAll {
            field: field.into(),
            elements,
        }
    }

    /// List whose smallest element is at least `bound`.
    pub fn list_min(field: impl Into<String>, bound: impl Into<Value>) -> Self {
        Predicate::ListMin {
            field: field.into(),
            bound: bound.into(),
        }
    }

    /// List whose largest element is at most `bound`.
    pub fn list_max(field: impl Into<String>, bound: impl Into<Value>) -> Self {
        Predicate::ListMax {
            field: field.into(),
            bound: bound.into(),
        }
    }

    /// Numeric list whose mean satisfies `comparison` against `bound`.
    pub fn list_average(field: impl Into<String>, comparison: Comparison, bound: f64) -> Self {
        Predicate::ListAverage {
            field: field.into(),
            comparison,
            bound,
        }
    }

    /// List whose length satisfies `comparison` against `bound`.
    pub fn list_size(field: impl Into<String>, comparison: Comparison, bound: usize) -> Self {
        Predicate::ListSize {
            field: field.into(),
            comparison,
            bound,
        }
    }

    /// Name of the field this predicate reads.
    pub fn field(&self) -> &str {
        match self {
            Predicate::Compare { field, .. }
            | Predicate::Contains { field, .. }
            | Predicate::StartsWith { field, .. }
            | Predicate::EndsWith { field, .. }
            | Predicate::ListContainsAll { field, .. }
            | Predicate::ListMin { field, .. }
            | Predicate::ListMax { field, .. }
            | Predicate::ListAverage { field, .. }
            | Predicate::ListSize { field, .. } => field,
        }
    }

    /// Decide whether one record's value for [`Self::field`] is retained.
    ///
    /// `None` (and `Some(Value::Null)`) means the field is absent; the record is excluded.
    pub fn evaluate(&self, value: Option<&Value>) -> ProcessingResult<bool> {
        let Some(value) = observed(value) else {
            return Ok(false);
        };
        let field = self.field();
        value.check_shape(field)?;

        match self {
            Predicate::Compare {
                comparison, value: bound, ..
            } => {
                if !value.is_scalar() || !bound.is_scalar() {
                    return Err(ProcessingError::comparison(
                        field,
                        format!(
                            "{} value cannot be compared with {}; use a list filter for list fields",
                            value.kind_name(),
                            bound.kind_name()
                        ),
                    ));
                }
                Ok(comparison.accepts(compare_scalars(field, value, bound)?))
            }
            Predicate::Contains { substring, .. } => {
                Ok(value.as_str().is_some_and(|s| s.contains(substring.as_str())))
            }
            Predicate::StartsWith { prefix, .. } => {
                Ok(value.as_str().is_some_and(|s| s.starts_with(prefix.as_str())))
            }
            Predicate::EndsWith { suffix, .. } => {
                Ok(value.as_str().is_some_and(|s| s.ends_with(suffix.as_str())))
            }
            Predicate::ListContainsAll { elements, .. } => {
                let items = expect_list(field, value)?;
                for wanted in elements {
                    if !list_contains(field, items, wanted)? {
                        return Ok(false);
                    }
                }
                Ok(true)
            }
            Predicate::ListMin { bound, .. } => {
                let items = expect_list(field, value)?;
                let min = extreme(field, items, Ordering::Less, "min")?;
                Ok(compare_scalars(field, min, bound)? != Ordering::Less)
            }
            Predicate::ListMax { bound, .. } => {
                let items = expect_list(field, value)?;
                let max = extreme(field, items, Ordering::Greater, "max")?;
                Ok(compare_scalars(field, max, bound)? != Ordering::Greater)
            }
            Predicate::ListAverage { comparison, bound, .. } => {
                let items = expect_list(field, value)?;
                let avg = mean(field, items)?;
                let ordering = avg
                    .partial_cmp(bound)
                    .ok_or_else(|| ProcessingError::comparison(field, "NaN is not comparable"))?;
                Ok(comparison.accepts(ordering))
            }
            Predicate::ListSize { comparison, bound, .. } => {
                let items = expect_list(field, value)?;
                Ok(comparison.accepts(items.len().cmp(bound)))
            }
        }
    }
}

fn expect_list<'a>(field: &str, value: &'a Value) -> ProcessingResult<&'a [Value]> {
    value.as_list().ok_or_else(|| {
        ProcessingError::comparison(
            field,
            format!("list filter applied to a {} value", value.kind_name()),
        )
    })
}

fn list_contains(field: &str, items: &[Value], wanted: &Value) -> ProcessingResult<bool> {
    for item in items {
        if compare_scalars(field, item, wanted)? == Ordering::Equal {
            return Ok(true);
        }
    }
    Ok(false)
}

/// Smallest (`Less`) or largest (`Greater`) element of a non-empty list.
fn extreme<'a>(
    field: &str,
    items: &'a [Value],
    wanted: Ordering,
    operation: &str,
) -> ProcessingResult<&'a Value> {
    let (first, rest) = items
        .split_first()
        .ok_or_else(|| ProcessingError::empty_list(field, operation))?;
    let mut best = first;
    for item in rest {
        if compare_scalars(field, item, best)? == wanted {
            best = item;
        }
    }
    Ok(best)
}

fn mean(field: &str, items: &[Value]) -> ProcessingResult<f64> {
    if items.is_empty() {
        return Err(ProcessingError::empty_list(field, "average"));
    }
    let mut sum = 0.0;
    for item in items {
        sum += item.as_f64().ok_or_else(|| {
            ProcessingError::comparison(
                field,
                format!("average requires numeric elements, found {}", item.kind_name()),
            )
        })?;
    }
    Ok(sum / items.len() as f64)
}

/// Returns a new [`RecordSet`] containing the records that satisfy `predicate`, in order.
pub fn filter_records(records: &RecordSet, predicate: &Predicate) -> ProcessingResult<RecordSet> {
    let field = predicate.field();
    let mut kept = Vec::new();
    for record in records.iter() {
        if predicate.evaluate(record.get(field))? {
            kept.push(record.clone());
        }
    }
    log::debug!(
        "filter on '{field}': {} of {} records kept",
        kept.len(),
        records.record_count()
    );
    Ok(RecordSet::new(kept))
}

/// Returns a new [`DataSet`] containing the rows that satisfy `predicate`, in order.
///
/// A column missing from the schema behaves like a field absent from every row.
pub fn filter_table(dataset: &DataSet, predicate: &Predicate) -> ProcessingResult<DataSet> {
    let idx = dataset.schema.index_of(predicate.field());
    let decisions = dataset
        .rows
        .iter()
        .map(|row| predicate.evaluate(idx.and_then(|i| row.get(i))))
        .collect::<ProcessingResult<Vec<bool>>>()?;

    let mut decisions = decisions.into_iter();
    let out = dataset.filter_rows(|_| decisions.next().unwrap_or(false));
    log::debug!(
        "filter on column '{}': {} of {} rows kept",
        predicate.field(),
        out.row_count(),
        dataset.row_count()
    );
    Ok(out)
}
