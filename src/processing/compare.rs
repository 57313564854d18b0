//! Value comparison shared by the filter and sort engines.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use crate::error::{ProcessingError, ProcessingResult};
use crate::types::Value;

/// Comparison operator used by field and list-aggregate filters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Comparison {
    /// Equal to the bound.
    #[default]
    Eq,
    /// Strictly less than the bound.
    Lt,
    /// Strictly greater than the bound.
    Gt,
}

impl Comparison {
    /// Whether `ordering` (value relative to bound) satisfies this comparison.
    pub fn accepts(self, ordering: Ordering) -> bool {
        match self {
            Comparison::Eq => ordering == Ordering::Equal,
            Comparison::Lt => ordering == Ordering::Less,
            Comparison::Gt => ordering == Ordering::Greater,
        }
    }
}

impl FromStr for Comparison {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "eq" => Ok(Comparison::Eq),
            "lt" => Ok(Comparison::Lt),
            "gt" => Ok(Comparison::Gt),
            other => Err(format!("comparison must be 'eq', 'lt' or 'gt', got '{other}'")),
        }
    }
}

impl fmt::Display for Comparison {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Comparison::Eq => "eq",
            Comparison::Lt => "lt",
            Comparison::Gt => "gt",
        })
    }
}

/// Groups of scalar kinds that may be ordered against each other.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ScalarClass {
    Numeric,
    Text,
    Boolean,
}

impl ScalarClass {
    pub(crate) fn of(value: &Value) -> Option<Self> {
        match value {
            Value::Int64(_) | Value::Float64(_) => Some(ScalarClass::Numeric),
            Value::Utf8(_) => Some(ScalarClass::Text),
            Value::Bool(_) => Some(ScalarClass::Boolean),
            Value::Null | Value::List(_) => None,
        }
    }
}

/// Treat an explicit null like an absent field.
pub(crate) fn observed(value: Option<&Value>) -> Option<&Value> {
    value.filter(|v| !v.is_null())
}

/// Order two scalars of the same class.
///
/// Integers and floats compare numerically in any mix, strings by code point, `false < true`.
/// Every other pairing, and NaN, is a [`ProcessingError::Comparison`].
pub(crate) fn compare_scalars(field: &str, left: &Value, right: &Value) -> ProcessingResult<Ordering> {
    match (left, right) {
        (Value::Int64(a), Value::Int64(b)) => Ok(a.cmp(b)),
        (Value::Utf8(a), Value::Utf8(b)) => Ok(a.cmp(b)),
        (Value::Bool(a), Value::Bool(b)) => Ok(a.cmp(b)),
        (Value::Float64(a), Value::Float64(b)) => a.partial_cmp(b).ok_or_else(|| nan_error(field)),
        (Value::Int64(a), Value::Float64(b)) => cmp_int_float(*a, *b).ok_or_else(|| nan_error(field)),
        (Value::Float64(a), Value::Int64(b)) => cmp_int_float(*b, *a)
            .map(Ordering::reverse)
            .ok_or_else(|| nan_error(field)),
        _ => Err(ProcessingError::comparison(
            field,
            format!("{} value cannot be compared with {}", left.kind_name(), right.kind_name()),
        )),
    }
}

fn nan_error(field: &str) -> ProcessingError {
    ProcessingError::comparison(field, "NaN is not comparable")
}

/// Exact ordering of an integer against a float; casting the integer to `f64` loses
/// precision above 2^53.
fn cmp_int_float(int: i64, float: f64) -> Option<Ordering> {
    const TWO_POW_63: f64 = 9_223_372_036_854_775_808.0;
    if float.is_nan() {
        return None;
    }
    if float >= TWO_POW_63 {
        return Some(Ordering::Less);
    }
    if float < -TWO_POW_63 {
        return Some(Ordering::Greater);
    }
    let whole = float.trunc();
    // In range, so the cast is exact.
    match int.cmp(&(whole as i64)) {
        Ordering::Equal => 0.0_f64.partial_cmp(&(float - whole)),
        other => Some(other),
    }
}
