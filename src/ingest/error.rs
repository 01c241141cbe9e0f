use polars::error::PolarsError;
use std::path::PathBuf;
use thiserror::Error;

/// Fatal ingestion failures. Every variant aborts the run before any
/// aggregation happens; there is no partial recovery from a bad schema.
#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("Failed to open input file '{0}'")]
    OpenInput(PathBuf, #[source] PolarsError),

    #[error("Failed to read input schema")]
    SchemaInspection(#[source] PolarsError),

    #[error("Required column '{0}' not found in input")]
    MissingColumn(String),

    #[error("Column '{column}' has unsupported type {dtype}, expected a date or date string")]
    UnsupportedDateType { column: String, dtype: String },

    #[error("{rows} date value(s) could not be parsed")]
    UnparseableDate { rows: usize },

    #[error("Failed to normalize input table")]
    Normalize(#[source] PolarsError),
}
