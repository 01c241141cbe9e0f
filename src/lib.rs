mod error;
mod export;
mod indices;
mod ingest;
mod monthly;
mod pipeline;
mod types;

pub use error::BioclimError;
pub use pipeline::*;

pub use export::{final_table, output_columns, write_table, ExportError, OutputGrain};
pub use indices::derive_indices;
pub use ingest::{normalize, read_input, SchemaError, TemperatureUnit};
pub use monthly::aggregate_monthly;

pub use types::columns::*;
pub use types::frames::{BioclimLazyFrame, MonthlyLazyFrame, NormalizedLazyFrame};
pub use types::records::{BioclimRow, MonthlyAggregate, RawRecord};
