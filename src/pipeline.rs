//! The pipeline driver: composes the four stages into a single run.
//!
//! Each stage takes the previous stage's table and returns a new one;
//! there is no shared working table. A run either produces the complete
//! output file or fails without touching the destination.

use crate::error::BioclimError;
use crate::export::{write_table, OutputGrain};
use crate::indices::derive_indices;
use crate::ingest::{normalize, read_input, TemperatureUnit};
use crate::monthly::aggregate_monthly;
use crate::types::frames::BioclimLazyFrame;
use bon::bon;
use log::info;
use polars::prelude::LazyFrame;
use std::path::Path;

/// Configured bioclimatic derivation pipeline.
///
/// Build one with [`BioclimPipeline::builder`], then call
/// [`run`](BioclimPipeline::run) for a file-to-file batch or
/// [`derive`](BioclimPipeline::derive) to transform an in-memory frame.
///
/// # Example
///
/// ```no_run
/// use bioclim::{BioclimError, BioclimPipeline, OutputGrain, TemperatureUnit};
/// use std::path::Path;
///
/// fn main() -> Result<(), BioclimError> {
///     let pipeline = BioclimPipeline::builder()
///         .temperature_unit(TemperatureUnit::Kelvin)
///         .grain(OutputGrain::Monthly)
///         .build();
///     pipeline.run(Path::new("data.csv"), Path::new("bio_variables.csv"))
/// }
/// ```
#[derive(Debug, Clone, Copy)]
pub struct BioclimPipeline {
    temperature_unit: TemperatureUnit,
    grain: OutputGrain,
}

#[bon]
impl BioclimPipeline {
    /// Creates a pipeline.
    ///
    /// * `.temperature_unit(TemperatureUnit)`: Optional. Unit of the
    ///   input temperature columns. Defaults to
    ///   [`TemperatureUnit::Celsius`] (no conversion).
    /// * `.grain(OutputGrain)`: Optional. Row grain of the output table.
    ///   Defaults to [`OutputGrain::Monthly`].
    #[builder]
    pub fn new(
        #[builder(default)] temperature_unit: TemperatureUnit,
        #[builder(default)] grain: OutputGrain,
    ) -> Self {
        Self {
            temperature_unit,
            grain,
        }
    }

    /// Runs the full batch: read, normalize, aggregate, derive, export.
    ///
    /// # Errors
    ///
    /// * [`BioclimError::Schema`] for a missing column or unparseable
    ///   date; fatal before any aggregation, and no output file is
    ///   created.
    /// * [`BioclimError::Export`] if the output cannot be written; the
    ///   destination is only replaced once the complete file exists.
    pub fn run(&self, input: &Path, output: &Path) -> Result<(), BioclimError> {
        info!("reading climate records from {}", input.display());
        let raw = read_input(input)?;
        let table = self.derive(raw)?;
        write_table(&table, self.grain, output)?;
        Ok(())
    }

    /// Transforms an in-memory raw frame into the bioclimatic table,
    /// skipping file I/O. The frame must carry the source column names
    /// (see [`crate::SOURCE_COLUMN_MAP`]).
    ///
    /// # Errors
    ///
    /// Returns [`BioclimError::Schema`] on schema problems and
    /// [`BioclimError::DataFrameProcessing`] on computation failures.
    ///
    /// # Example
    ///
    /// ```
    /// use bioclim::BioclimPipeline;
    /// use polars::df;
    /// use polars::prelude::*;
    ///
    /// let raw = df!(
    ///     "STATE" => ["A"],
    ///     "Date" => ["2020-07-14"],
    ///     "temperature_2m_MEAN" => [18.0],
    ///     "temperature_2m_max_MEAN" => [24.0],
    ///     "temperature_2m_min_MEAN" => [12.0],
    ///     "total_precipitation_sum_MEAN" => [3.5],
    /// )
    /// .unwrap();
    ///
    /// let pipeline = BioclimPipeline::builder().build();
    /// let rows = pipeline.derive(raw.lazy()).unwrap().collect_rows().unwrap();
    /// assert_eq!(rows[0].bio12, Some(3.5));
    /// ```
    pub fn derive(&self, raw: LazyFrame) -> Result<BioclimLazyFrame, BioclimError> {
        let normalized = normalize(raw, self.temperature_unit)?;
        let monthly = aggregate_monthly(&normalized);
        derive_indices(&normalized, &monthly)
    }
}
