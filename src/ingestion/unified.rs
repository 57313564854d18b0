//! Unified load/save entrypoints.
//!
//! Most callers should use [`load_from_path`] and [`save_to_path`]:
//!
//! - If [`IngestionOptions::format`] is `None`, the format is inferred from the file extension,
//!   falling back to [`IngestionOptions::fallback_format`] for paths without one.
//! - If an [`super::observability::IngestionObserver`] is provided, success/failure/alerts are
//!   reported to it.

use std::fmt;
use std::path::Path;
use std::sync::Arc;

use serde::Deserialize;

use crate::error::{IngestionError, IngestionResult};
use crate::types::{DataSet, RecordSet};

use super::observability::{
    IngestionAction, IngestionContext, IngestionObserver, IngestionSeverity, IngestionStats,
};
use super::xml::{XmlDocument, XmlNode};
use super::{csv, json, xml};

/// Supported file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IngestionFormat {
    /// Comma-separated values, loaded as a table.
    Csv,
    /// `{"data": [{"item": {...}}]}` documents, loaded as records.
    Json,
    /// XML documents, loaded as a tree.
    Xml,
}

impl IngestionFormat {
    /// Parse a format from a file extension (case-insensitive).
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "csv" => Some(Self::Csv),
            "json" => Some(Self::Json),
            "xml" => Some(Self::Xml),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Json => "json",
            Self::Xml => "xml",
        }
    }
}

/// Data produced by a loader, in the shape native to its format.
#[derive(Debug, Clone, PartialEq)]
pub enum LoadedData {
    Table(DataSet),
    Records(RecordSet),
    Tree(XmlDocument),
}

impl LoadedData {
    /// Rows in a table, records in a record set, or direct children of an XML root.
    pub fn row_count(&self) -> usize {
        match self {
            LoadedData::Table(ds) => ds.row_count(),
            LoadedData::Records(rs) => rs.record_count(),
            LoadedData::Tree(doc) => match &doc.root {
                XmlNode::Element(children) => children
                    .iter()
                    .map(|(_, node)| match node {
                        XmlNode::Repeated(items) => items.len(),
                        _ => 1,
                    })
                    .sum(),
                _ => 0,
            },
        }
    }

    /// Short human-readable summary, e.g. `table with 3 rows`.
    pub fn describe(&self) -> String {
        match self {
            LoadedData::Table(ds) => format!(
                "table with {} rows and {} columns",
                ds.row_count(),
                ds.schema.fields.len()
            ),
            LoadedData::Records(rs) => format!("{} records", rs.record_count()),
            LoadedData::Tree(doc) => format!("xml document <{}>", doc.root_tag),
        }
    }
}

/// Options controlling load/save behavior.
///
/// Use [`Default`] for common cases.
#[derive(Clone)]
pub struct IngestionOptions {
    /// If `None`, detect the format from the file extension.
    pub format: Option<IngestionFormat>,
    /// Format used when the path has no extension and `format` is `None`.
    pub fallback_format: Option<IngestionFormat>,
    /// Optional observer for logging/alerts.
    pub observer: Option<Arc<dyn IngestionObserver>>,
    /// Severity threshold at which `on_alert` is invoked.
    pub alert_at_or_above: IngestionSeverity,
}

impl fmt::Debug for IngestionOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IngestionOptions")
            .field("format", &self.format)
            .field("fallback_format", &self.fallback_format)
            .field("observer_set", &self.observer.is_some())
            .field("alert_at_or_above", &self.alert_at_or_above)
            .finish()
    }
}

impl Default for IngestionOptions {
    fn default() -> Self {
        Self {
            format: None,
            fallback_format: None,
            observer: None,
            alert_at_or_above: IngestionSeverity::Critical,
        }
    }
}

/// Load a file in its native shape: CSV as a table, JSON as records, XML as a tree.
///
/// CSV column types are inferred (see [`csv::ingest_csv_infer_from_path`]).
///
/// When an observer is configured, this function reports:
///
/// - `on_success` on success, with row count stats
/// - `on_failure` on failure, with a computed severity
/// - `on_alert` on failure when the computed severity is >= `options.alert_at_or_above`
///
/// # Examples
///
/// ```no_run
/// use data_filter::ingestion::{load_from_path, IngestionOptions, LoadedData};
///
/// # fn main() -> Result<(), data_filter::IngestionError> {
/// match load_from_path("people.json", &IngestionOptions::default())? {
///     LoadedData::Records(rs) => println!("records={}", rs.record_count()),
///     other => println!("{}", other.describe()),
/// }
/// # Ok(())
/// # }
/// ```
///
/// ## Observability (log facade + alert threshold)
///
/// ```no_run
/// use std::sync::Arc;
///
/// use data_filter::ingestion::{load_from_path, IngestionOptions, IngestionSeverity, LogObserver};
///
/// let opts = IngestionOptions {
///     observer: Some(Arc::new(LogObserver)),
///     alert_at_or_above: IngestionSeverity::Critical,
///     ..Default::default()
/// };
///
/// // Missing files are treated as Critical and will trigger `on_alert` at this threshold.
/// let _err = load_from_path("does_not_exist.csv", &opts).unwrap_err();
/// ```
pub fn load_from_path(path: impl AsRef<Path>, options: &IngestionOptions) -> IngestionResult<LoadedData> {
    let path = path.as_ref();
    let fmt = resolve_format(path, options)?;

    let result = match fmt {
        IngestionFormat::Csv => csv::ingest_csv_infer_from_path(path).map(LoadedData::Table),
        IngestionFormat::Json => json::ingest_json_records_from_path(path).map(LoadedData::Records),
        IngestionFormat::Xml => xml::ingest_xml_from_path(path).map(LoadedData::Tree),
    };

    report(path, fmt, IngestionAction::Load, options, result.as_ref().map(LoadedData::row_count));
    result
}

/// Write `data` to `path` in the format chosen by `options` or the path's extension.
///
/// Tables and records convert into each other as needed (CSV from records uses
/// [`DataSet::from_records`], JSON from a table uses [`DataSet::to_records`]). An XML tree can
/// only be written as XML, and XML output needs a tree.
pub fn save_to_path(path: impl AsRef<Path>, data: &LoadedData, options: &IngestionOptions) -> IngestionResult<()> {
    let path = path.as_ref();
    let fmt = resolve_format(path, options)?;

    let result = match (fmt, data) {
        (IngestionFormat::Csv, LoadedData::Table(ds)) => csv::write_csv_to_path(path, ds),
        (IngestionFormat::Csv, LoadedData::Records(rs)) => DataSet::from_records(rs)
            .map_err(|e| IngestionError::SchemaMismatch { message: e.to_string() })
            .and_then(|ds| csv::write_csv_to_path(path, &ds)),
        (IngestionFormat::Json, LoadedData::Records(rs)) => json::write_json_records_to_path(path, rs),
        (IngestionFormat::Json, LoadedData::Table(ds)) => json::write_json_records_to_path(path, &ds.to_records()),
        (IngestionFormat::Xml, LoadedData::Tree(doc)) => xml::write_xml_to_path(path, doc),
        (fmt, data) => Err(IngestionError::SchemaMismatch {
            message: format!("cannot save {} as {}", data.describe(), fmt.name()),
        }),
    };

    report(path, fmt, IngestionAction::Save, options, result.as_ref().map(|_| data.row_count()));
    result
}

fn report(
    path: &Path,
    format: IngestionFormat,
    action: IngestionAction,
    options: &IngestionOptions,
    outcome: Result<usize, &IngestionError>,
) {
    let Some(obs) = options.observer.as_ref() else {
        return;
    };
    let ctx = IngestionContext {
        path: path.to_path_buf(),
        format,
        action,
    };
    match outcome {
        Ok(rows) => obs.on_success(&ctx, IngestionStats { rows }),
        Err(e) => {
            let sev = severity_for_error(e);
            obs.on_failure(&ctx, sev, e);
            if sev >= options.alert_at_or_above {
                obs.on_alert(&ctx, sev, e);
            }
        }
    }
}

fn severity_for_error(e: &IngestionError) -> IngestionSeverity {
    match e {
        IngestionError::Io(_) => IngestionSeverity::Critical,
        IngestionError::Csv(err) => match err.kind() {
            ::csv::ErrorKind::Io(_) => IngestionSeverity::Critical,
            _ => IngestionSeverity::Error,
        },
        IngestionError::Json(err) if err.is_io() => IngestionSeverity::Critical,
        IngestionError::Json(_)
        | IngestionError::Xml { .. }
        | IngestionError::SchemaMismatch { .. }
        | IngestionError::ParseError { .. }
        | IngestionError::UnsupportedValueShape { .. } => IngestionSeverity::Error,
    }
}

fn resolve_format(path: &Path, options: &IngestionOptions) -> IngestionResult<IngestionFormat> {
    if let Some(f) = options.format {
        return Ok(f);
    }

    let Some(ext) = path.extension().and_then(|s| s.to_str()) else {
        return options.fallback_format.ok_or_else(|| IngestionError::SchemaMismatch {
            message: format!(
                "cannot infer format: path has no extension ({})",
                path.display()
            ),
        });
    };

    IngestionFormat::from_extension(ext).ok_or_else(|| IngestionError::SchemaMismatch {
        message: format!(
            "unsupported file extension '{ext}' for path ({}); expected csv, json or xml",
            path.display()
        ),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extension_detection_is_case_insensitive() {
        assert_eq!(IngestionFormat::from_extension("CSV"), Some(IngestionFormat::Csv));
        assert_eq!(IngestionFormat::from_extension("Xml"), Some(IngestionFormat::Xml));
        assert_eq!(IngestionFormat::from_extension("yaml"), None);
    }

    #[test]
    fn fallback_format_applies_only_without_extension() {
        let opts = IngestionOptions {
            fallback_format: Some(IngestionFormat::Json),
            ..Default::default()
        };
        assert_eq!(resolve_format(Path::new("data"), &opts).unwrap(), IngestionFormat::Json);
        assert!(resolve_format(Path::new("data.txt"), &opts).is_err());
        assert!(resolve_format(Path::new("data"), &IngestionOptions::default()).is_err());
    }

    #[test]
    fn io_failures_are_critical() {
        let io = IngestionError::Io(std::io::Error::new(std::io::ErrorKind::NotFound, "missing"));
        assert_eq!(severity_for_error(&io), IngestionSeverity::Critical);
        let shape = IngestionError::SchemaMismatch { message: "x".to_string() };
        assert_eq!(severity_for_error(&shape), IngestionSeverity::Error);
    }
}
