//! Lazy frame wrappers for the three pipeline grains.
//!
//! Each stage of the pipeline hands the next one a thin wrapper around a
//! Polars `LazyFrame` with a known schema: normalized raw records, monthly
//! aggregates, and the final bioclimatic table. The wrappers keep the
//! benefits of lazy evaluation while making it impossible to feed a frame
//! into the wrong stage.

use crate::error::BioclimError;
use crate::types::columns::{COL_LOCATION_ID, COL_YEAR};
use crate::types::records::{BioclimRow, MonthlyAggregate, RawRecord};
use polars::prelude::{col, lit, Expr, LazyFrame};

/// Normalized raw records: one row per (location_id, date) with canonical
/// column names, derived `year`/`month`, and Celsius temperatures.
///
/// Produced by [`crate::normalize`]; consumed by the monthly aggregator
/// and, for the raw-grain indices, by the derivation engine.
#[derive(Clone)]
pub struct NormalizedLazyFrame {
    /// The underlying Polars LazyFrame.
    pub frame: LazyFrame,
}

impl std::fmt::Debug for NormalizedLazyFrame {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NormalizedLazyFrame").finish_non_exhaustive()
    }
}

impl NormalizedLazyFrame {
    pub fn new(frame: LazyFrame) -> Self {
        Self { frame }
    }

    /// Returns a new frame filtered by an arbitrary Polars predicate.
    pub fn filter(&self, predicate: Expr) -> NormalizedLazyFrame {
        NormalizedLazyFrame::new(self.frame.clone().filter(predicate))
    }

    /// Collects the frame into [`RawRecord`] rows.
    ///
    /// # Errors
    ///
    /// Returns [`BioclimError::DataFrameProcessing`] if collection fails or
    /// a column is missing from the frame.
    pub fn collect_records(&self) -> Result<Vec<RawRecord>, BioclimError> {
        let df = self.frame.clone().collect()?;
        (0..df.height())
            .map(|idx| RawRecord::from_frame(&df, idx))
            .collect()
    }
}

/// Monthly aggregates: exactly one row per (location_id, year, month)
/// present in the input, sorted by that key.
///
/// Produced by [`crate::aggregate_monthly`].
#[derive(Clone)]
pub struct MonthlyLazyFrame {
    /// The underlying Polars LazyFrame.
    pub frame: LazyFrame,
}

impl MonthlyLazyFrame {
    pub fn new(frame: LazyFrame) -> Self {
        Self { frame }
    }

    /// Returns a new frame filtered by an arbitrary Polars predicate.
    pub fn filter(&self, predicate: Expr) -> MonthlyLazyFrame {
        MonthlyLazyFrame::new(self.frame.clone().filter(predicate))
    }

    /// Restricts the frame to a single location and year.
    pub fn get_for_year(&self, location_id: &str, year: i32) -> MonthlyLazyFrame {
        self.filter(
            col(COL_LOCATION_ID)
                .eq(lit(location_id))
                .and(col(COL_YEAR).eq(lit(year))),
        )
    }

    /// Collects the frame into [`MonthlyAggregate`] rows.
    ///
    /// # Errors
    ///
    /// Returns [`BioclimError::DataFrameProcessing`] if collection fails or
    /// a column is missing from the frame.
    pub fn collect_aggregates(&self) -> Result<Vec<MonthlyAggregate>, BioclimError> {
        let df = self.frame.clone().collect()?;
        (0..df.height())
            .map(|idx| MonthlyAggregate::from_frame(&df, idx))
            .collect()
    }
}

/// The final bioclimatic table: one row per (location_id, year, month)
/// carrying the monthly aggregates plus bio01..bio19, with annual scalars
/// repeated on every month of their year.
///
/// Produced by [`crate::derive_indices`]; consumed by the exporter.
#[derive(Clone)]
pub struct BioclimLazyFrame {
    /// The underlying Polars LazyFrame.
    pub frame: LazyFrame,
}

impl BioclimLazyFrame {
    pub fn new(frame: LazyFrame) -> Self {
        Self { frame }
    }

    /// Returns a new frame filtered by an arbitrary Polars predicate.
    pub fn filter(&self, predicate: Expr) -> BioclimLazyFrame {
        BioclimLazyFrame::new(self.frame.clone().filter(predicate))
    }

    /// Restricts the frame to a single location and year.
    pub fn get_for_year(&self, location_id: &str, year: i32) -> BioclimLazyFrame {
        self.filter(
            col(COL_LOCATION_ID)
                .eq(lit(location_id))
                .and(col(COL_YEAR).eq(lit(year))),
        )
    }

    /// Collects the frame into [`BioclimRow`] rows.
    ///
    /// # Errors
    ///
    /// Returns [`BioclimError::DataFrameProcessing`] if collection fails or
    /// a column is missing from the frame.
    pub fn collect_rows(&self) -> Result<Vec<BioclimRow>, BioclimError> {
        let df = self.frame.clone().collect()?;
        (0..df.height())
            .map(|idx| BioclimRow::from_frame(&df, idx))
            .collect()
    }
}
