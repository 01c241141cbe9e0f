use crate::export::ExportError;
use crate::ingest::SchemaError;
use polars::error::PolarsError;
use thiserror::Error;

/// Top-level error for a pipeline run.
#[derive(Debug, Error)]
pub enum BioclimError {
    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error(transparent)]
    Export(#[from] ExportError),

    #[error("Failed processing DataFrame: {0}")]
    DataFrameProcessing(#[from] PolarsError),

    #[error("Missing value in column '{column}' at row {row}")]
    MissingValue { column: String, row: usize },
}
