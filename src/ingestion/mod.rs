//! Load and save entrypoints and implementations.
//!
//! Most callers should use [`load_from_path`] / [`save_to_path`] (from [`unified`]) which:
//!
//! - auto-detect format by file extension (or you can override via [`IngestionOptions`])
//! - load into the format's native shape ([`LoadedData`])
//! - optionally report success/failure/alerts to an [`IngestionObserver`]
//!
//! Format-specific functions are also available under:
//! - [`csv`]
//! - [`json`]
//! - [`xml`]

pub mod csv;
pub mod json;
pub mod observability;
pub mod unified;
pub mod xml;

pub use observability::{
    CompositeObserver, FileObserver, IngestionAction, IngestionContext, IngestionObserver, IngestionSeverity,
    IngestionStats, LogObserver,
};
pub use unified::{load_from_path, save_to_path, IngestionFormat, IngestionOptions, LoadedData};
pub use xml::{XmlDocument, XmlNode};
