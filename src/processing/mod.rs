//! In-memory filter, sort and statistics engines.
//!
//! Every operation is a pure function from an input dataset to a new output value; inputs are
//! never mutated. Each engine has a record-oriented entry point ([`crate::types::RecordSet`]) and
//! a tabular one ([`crate::types::DataSet`]) sharing the same comparison and aggregation rules.
//!
//! Currently implemented:
//!
//! - [`filter_records()`] / [`filter_table()`]: keep records matching a [`Predicate`]
//! - [`sort_records()`] / [`sort_table()`]: stable multi-key sort by [`SortKey`]s
//! - [`compute_stats()`] / [`compute_table_stats()`]: numeric, boolean and list-size statistics
//!
//! ## Example: filter → sort → stats
//!
//! ```rust
//! use data_filter::processing::{
//!     compute_stats, filter_records, sort_records, Comparison, Predicate, SortKey, StatsOptions,
//! };
//! use data_filter::types::{Record, RecordSet, Value};
//!
//! let people: RecordSet = [
//!     [("name", Value::from("Ada")), ("age", Value::Int64(36))],
//!     [("name", Value::from("Grace")), ("age", Value::Int64(28))],
//!     [("name", Value::from("Alan")), ("age", Value::Int64(41))],
//! ]
//! .into_iter()
//! .map(|fields| fields.into_iter().collect::<Record>())
//! .collect();
//!
//! // Keep people older than 30.
//! let older = filter_records(&people, &Predicate::compare("age", Comparison::Gt, 30_i64)).unwrap();
//!
//! // Oldest first.
//! let sorted = sort_records(&older, &[SortKey::descending("age")]).unwrap();
//! assert_eq!(sorted.records[0].get("name"), Some(&Value::from("Alan")));
//!
//! let stats = compute_stats(&sorted, &StatsOptions::default()).unwrap();
//! assert_eq!(stats.numeric["age"].min, 36.0);
//! ```

pub mod compare;
pub mod filter;
pub mod sort;
pub mod stats;

pub use compare::Comparison;
pub use filter::{filter_records, filter_table, Predicate};
pub use sort::{sort_records, sort_records_by, sort_table, SortDirection, SortKey};
pub use stats::{
    compute_stats, compute_table_stats, BooleanStats, ListNumericPolicy, ListStats, NumericStats, Statistics,
    StatsOptions,
};
