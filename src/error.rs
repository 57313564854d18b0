use thiserror::Error;

/// Convenience result type for ingestion (load/save) operations.
pub type IngestionResult<T> = Result<T, IngestionError>;

/// Convenience result type for filter/sort/statistics operations.
pub type ProcessingResult<T> = Result<T, ProcessingError>;

/// Error type returned by loaders and savers.
///
/// This is a single error enum shared across CSV/JSON/XML ingestion.
#[derive(Debug, Error)]
pub enum IngestionError {
    /// Underlying I/O error (e.g. file not found, permission denied).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV read/write error.
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON syntax or serialization error.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// XML syntax or serialization error.
    #[error("xml error: {message}")]
    Xml { message: String },

    /// The input does not have the expected overall shape (missing columns, missing `data` key, etc.).
    #[error("schema mismatch: {message}")]
    SchemaMismatch { message: String },

    /// A value could not be parsed into the required [`crate::types::DataType`].
    #[error("failed to parse value at row {row} column '{column}': {message} (raw='{raw}')")]
    ParseError {
        row: usize,
        column: String,
        raw: String,
        message: String,
    },

    /// A field value is outside the scalar / homogeneous-scalar-list model.
    #[error("unsupported value shape at row {row} field '{field}': {message}")]
    UnsupportedValueShape {
        row: usize,
        field: String,
        message: String,
    },
}

/// Error type returned by the filter, sort and statistics engines.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ProcessingError {
    /// Two values of incompatible kinds were compared.
    #[error("cannot compare field '{field}': {message}")]
    Comparison { field: String, message: String },

    /// A list aggregate (min/max/average) was requested over an empty list.
    #[error("field '{field}': {operation} of an empty list is undefined")]
    EmptyList { field: String, operation: String },

    /// A sort key is missing from a record or row.
    #[error("key '{field}' not found in record {position}")]
    KeyNotFound { field: String, position: usize },

    /// Statistics were requested for a field with no qualifying observations.
    #[error("insufficient data: field '{field}' has no qualifying values")]
    InsufficientData { field: String },

    /// A value is outside the scalar / homogeneous-scalar-list model.
    #[error("unsupported value shape in field '{field}': {message}")]
    UnsupportedValueShape { field: String, message: String },
}

impl ProcessingError {
    pub(crate) fn comparison(field: &str, message: impl Into<String>) -> Self {
        Self::Comparison {
            field: field.to_owned(),
            message: message.into(),
        }
    }

    pub(crate) fn empty_list(field: &str, operation: &str) -> Self {
        Self::EmptyList {
            field: field.to_owned(),
            operation: operation.to_owned(),
        }
    }
}
