//! `data-filter` loads CSV, JSON and XML files and lets you filter, sort and summarize them,
//! either through the library API or the interactive `data-filter` binary.
//!
//! Data comes in two engine-ready shapes:
//!
//! - [`types::RecordSet`]: a list of [`types::Record`]s, each a mapping from field name to
//!   [`types::Value`]. Fields may be absent from some records. JSON loads into this shape.
//! - [`types::DataSet`]: a table with a [`types::Schema`] and one row per record. CSV loads into
//!   this shape, with column types inferred from the cells.
//!
//! XML loads into an [`ingestion::XmlDocument`] tree, which can be displayed and saved but not
//! filtered, sorted or summarized.
//!
//! ## Values
//!
//! A value is a string, a 64-bit integer, a 64-bit float, a boolean, or a list of scalars that all
//! share one kind. [`types::Value::Null`] marks a present-but-empty value (an empty CSV cell, a JSON
//! `null`); the engines treat it exactly like an absent field.
//!
//! ## Quick example: load, filter, sort
//!
//! ```no_run
//! use data_filter::ingestion::{load_from_path, IngestionOptions, LoadedData};
//! use data_filter::processing::{filter_records, sort_records, Comparison, Predicate, SortKey};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let LoadedData::Records(people) = load_from_path("people.json", &IngestionOptions::default())? else {
//!     return Ok(());
//! };
//! let adults = filter_records(&people, &Predicate::compare("age", Comparison::Gt, 30_i64))?;
//! let sorted = sort_records(&adults, &[SortKey::descending("age")])?;
//! println!("{} records", sorted.record_count());
//! # Ok(())
//! # }
//! ```
//!
//! ## Modules
//!
//! - [`types`]: values, records, schemas and tables
//! - [`processing`]: filter, sort and statistics engines
//! - [`ingestion`]: CSV/JSON/XML loaders and savers with observer hooks
//! - [`config`]: TOML configuration
//! - [`session`], [`cli`], [`display`]: the interactive tool
//! - [`error`]: error types

pub mod cli;
pub mod config;
pub mod display;
pub mod error;
pub mod ingestion;
pub mod processing;
pub mod session;
pub mod types;

pub use error::{IngestionError, IngestionResult, ProcessingError, ProcessingResult};
