//! Per-field summary statistics.
//!
//! Each field is classified by the kind of each observed value: numbers feed `numeric`
//! (min/max/average), booleans feed `boolean` (true/false percentages) and lists feed `list`
//! (min/max/average size). Absent and null values are skipped, so they never dilute an aggregate.
//! Strings are not summarized. Fields with no qualifying observations are left out of the result.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{ProcessingError, ProcessingResult};
use crate::types::{DataSet, RecordSet, Value};

/// How lists of numbers contribute to the `numeric` category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ListNumericPolicy {
    /// Lists only contribute their size to `list`.
    #[default]
    LengthOnly,
    /// A list of numbers also contributes its size to `numeric` under the same field name.
    DualCount,
}

/// Options for [`compute_stats`] and [`compute_table_stats`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StatsOptions {
    pub list_numeric_policy: ListNumericPolicy,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct NumericStats {
    pub min: f64,
    pub max: f64,
    pub average: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BooleanStats {
    pub true_percentage: f64,
    pub false_percentage: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ListStats {
    pub min_size: usize,
    pub max_size: usize,
    pub average_size: f64,
}

/// Statistics for a whole dataset. All three categories are always present, possibly empty.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Statistics {
    pub numeric: BTreeMap<String, NumericStats>,
    pub boolean: BTreeMap<String, BooleanStats>,
    pub list: BTreeMap<String, ListStats>,
}

impl Statistics {
    /// Numeric statistics for `field`, or [`ProcessingError::InsufficientData`].
    pub fn numeric_for(&self, field: &str) -> ProcessingResult<&NumericStats> {
        self.numeric.get(field).ok_or_else(|| insufficient(field))
    }

    /// Boolean statistics for `field`, or [`ProcessingError::InsufficientData`].
    pub fn boolean_for(&self, field: &str) -> ProcessingResult<&BooleanStats> {
        self.boolean.get(field).ok_or_else(|| insufficient(field))
    }

    /// List statistics for `field`, or [`ProcessingError::InsufficientData`].
    pub fn list_for(&self, field: &str) -> ProcessingResult<&ListStats> {
        self.list.get(field).ok_or_else(|| insufficient(field))
    }

    /// Keep only the entries for `field` in every category.
    pub fn only_field(&self, field: &str) -> ProcessingResult<Statistics> {
        let out = Statistics {
            numeric: self.numeric.iter().filter(|(k, _)| *k == field).map(|(k, v)| (k.clone(), *v)).collect(),
            boolean: self.boolean.iter().filter(|(k, _)| *k == field).map(|(k, v)| (k.clone(), *v)).collect(),
            list: self.list.iter().filter(|(k, _)| *k == field).map(|(k, v)| (k.clone(), *v)).collect(),
        };
        if out.numeric.is_empty() && out.boolean.is_empty() && out.list.is_empty() {
            return Err(insufficient(field));
        }
        Ok(out)
    }
}

fn insufficient(field: &str) -> ProcessingError {
    ProcessingError::InsufficientData {
        field: field.to_owned(),
    }
}

/// Running min/max/sum over observed numbers.
#[derive(Debug, Clone, Copy)]
struct Summary {
    count: usize,
    sum: f64,
    min: f64,
    max: f64,
}

impl Default for Summary {
    fn default() -> Self {
        Self {
            count: 0,
            sum: 0.0,
            min: f64::INFINITY,
            max: f64::NEG_INFINITY,
        }
    }
}

impl Summary {
    fn push(&mut self, v: f64) {
        self.count += 1;
        self.sum += v;
        self.min = self.min.min(v);
        self.max = self.max.max(v);
    }

    fn average(&self) -> f64 {
        self.sum / self.count as f64
    }
}

#[derive(Debug, Clone, Copy, Default)]
struct BoolCounts {
    true_count: usize,
    false_count: usize,
}

#[derive(Debug, Default)]
struct StatsBuilder {
    options: StatsOptions,
    numeric: BTreeMap<String, Summary>,
    boolean: BTreeMap<String, BoolCounts>,
    list: BTreeMap<String, Summary>,
}

impl StatsBuilder {
    fn new(options: StatsOptions) -> Self {
        Self {
            options,
            ..Default::default()
        }
    }

    fn observe(&mut self, field: &str, value: &Value) -> ProcessingResult<()> {
        value.check_shape(field)?;
        match value {
            Value::Null | Value::Utf8(_) => {}
            Value::Float64(v) if v.is_nan() => {
                return Err(ProcessingError::comparison(field, "NaN cannot be aggregated"));
            }
            Value::Int64(_) | Value::Float64(_) => {
                if let Some(v) = value.as_f64() {
                    self.numeric.entry(field.to_owned()).or_default().push(v);
                }
            }
            Value::Bool(b) => {
                let counts = self.boolean.entry(field.to_owned()).or_default();
                if *b {
                    counts.true_count += 1;
                } else {
                    counts.false_count += 1;
                }
            }
            Value::List(items) => {
                let size = items.len() as f64;
                self.list.entry(field.to_owned()).or_default().push(size);
                if self.options.list_numeric_policy == ListNumericPolicy::DualCount
                    && items.iter().all(|i| i.as_f64().is_some())
                {
                    self.numeric.entry(field.to_owned()).or_default().push(size);
                }
            }
        }
        Ok(())
    }

    fn finish(self) -> Statistics {
        let numeric = self
            .numeric
            .into_iter()
            .map(|(k, s)| {
                let stats = NumericStats {
                    min: s.min,
                    max: s.max,
                    average: s.average(),
                };
                (k, stats)
            })
            .collect();

        let boolean = self
            .boolean
            .into_iter()
            .map(|(k, c)| {
                let total = (c.true_count + c.false_count) as f64;
                let stats = BooleanStats {
                    true_percentage: c.true_count as f64 / total * 100.0,
                    false_percentage: c.false_count as f64 / total * 100.0,
                };
                (k, stats)
            })
            .collect();

        let list = self
            .list
            .into_iter()
            .map(|(k, s)| {
                let stats = ListStats {
                    min_size: s.min as usize,
                    max_size: s.max as usize,
                    average_size: s.average(),
                };
                (k, stats)
            })
            .collect();

        Statistics {
            numeric,
            boolean,
            list,
        }
    }
}

/// Compute statistics over a record-oriented dataset.
pub fn compute_stats(records: &RecordSet, options: &StatsOptions) -> ProcessingResult<Statistics> {
    let mut builder = StatsBuilder::new(*options);
    for record in records.iter() {
        for (field, value) in record.iter() {
            builder.observe(field, value)?;
        }
    }
    let stats = builder.finish();
    log::debug!(
        "stats over {} records: {} numeric, {} boolean, {} list field(s)",
        records.record_count(),
        stats.numeric.len(),
        stats.boolean.len(),
        stats.list.len()
    );
    Ok(stats)
}

/// Compute statistics over a table, column by column.
///
/// Gives the same result as [`compute_stats`] on [`DataSet::to_records`].
pub fn compute_table_stats(dataset: &DataSet, options: &StatsOptions) -> ProcessingResult<Statistics> {
    let mut builder = StatsBuilder::new(*options);
    for (idx, field) in dataset.schema.fields.iter().enumerate() {
        for value in dataset.column(idx) {
            builder.observe(&field.name, value)?;
        }
    }
    let stats = builder.finish();
    log::debug!(
        "stats over {} rows x {} columns",
        dataset.row_count(),
        dataset.schema.fields.len()
    );
    Ok(stats)
}
