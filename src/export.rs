//! Final pipeline stage: column selection and file output.
//!
//! The exporter owns the output contract: a fixed column order per grain,
//! a header row, `NaN` as the null marker, and an all-or-nothing file
//! write (the table is fully collected and written to a temporary file
//! next to the destination, then atomically renamed into place).

use crate::types::columns::{
    BIO01, BIO02, BIO03, BIO04, BIO05, BIO06, BIO07, BIO08, BIO09, BIO10, BIO11, BIO12, BIO13,
    BIO14, BIO15, BIO16, BIO17, BIO18, BIO19, BIO_COLUMNS, COL_LOCATION_ID, COL_MONTH,
    COL_TEMP_MAX, COL_TEMP_MEAN, COL_TEMP_MIN, COL_YEAR,
};
use crate::types::frames::BioclimLazyFrame;
use log::info;
use polars::prelude::*;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use thiserror::Error;

/// Row grain of the exported table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputGrain {
    /// One row per (location_id, year, month); annual scalars repeated.
    #[default]
    Monthly,
    /// One row per (location_id, year). Monthly temperature columns
    /// collapse to their annual mean/max/min; monthly-varying indices
    /// (bio02, bio03, bio08-bio11) take the last available month's value.
    Annual,
}

/// Failures while writing the output file.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("Failed to collect final table")]
    Collect(#[source] PolarsError),

    #[error("I/O error writing output '{0}'")]
    WriteIo(PathBuf, #[source] std::io::Error),

    #[error("Failed to serialize CSV output '{0}'")]
    CsvWrite(PathBuf, #[source] PolarsError),

    #[error("Failed to persist output '{0}'")]
    Persist(PathBuf, #[source] tempfile::PersistError),
}

/// The exact output column order for a grain.
pub fn output_columns(grain: OutputGrain) -> Vec<&'static str> {
    let mut columns = match grain {
        OutputGrain::Monthly => vec![
            COL_LOCATION_ID,
            COL_YEAR,
            COL_MONTH,
            COL_TEMP_MEAN,
            COL_TEMP_MAX,
            COL_TEMP_MIN,
        ],
        OutputGrain::Annual => vec![
            COL_LOCATION_ID,
            COL_YEAR,
            COL_TEMP_MEAN,
            COL_TEMP_MAX,
            COL_TEMP_MIN,
        ],
    };
    columns.extend(BIO_COLUMNS);
    columns
}

/// Selects (and for [`OutputGrain::Annual`], collapses) the final table
/// into the exported column set and order.
pub fn final_table(table: &BioclimLazyFrame, grain: OutputGrain) -> LazyFrame {
    let frame = match grain {
        OutputGrain::Monthly => table.frame.clone(),
        OutputGrain::Annual => collapse_annual(table.frame.clone()),
    };
    let selection: Vec<Expr> = output_columns(grain).into_iter().map(col).collect();
    frame.select(selection)
}

fn collapse_annual(frame: LazyFrame) -> LazyFrame {
    frame
        .sort(
            [COL_LOCATION_ID, COL_YEAR, COL_MONTH],
            SortMultipleOptions::default(),
        )
        .group_by_stable([col(COL_LOCATION_ID), col(COL_YEAR)])
        .agg([
            col(COL_TEMP_MEAN).mean(),
            col(COL_TEMP_MAX).max(),
            col(COL_TEMP_MIN).min(),
            col(BIO01).first(),
            col(BIO02).last(),
            col(BIO03).last(),
            col(BIO04).first(),
            col(BIO05).first(),
            col(BIO06).first(),
            col(BIO07).first(),
            col(BIO08).last(),
            col(BIO09).last(),
            col(BIO10).last(),
            col(BIO11).last(),
            col(BIO12).first(),
            col(BIO13).first(),
            col(BIO14).first(),
            col(BIO15).first(),
            col(BIO16).first(),
            col(BIO17).first(),
            col(BIO18).first(),
            col(BIO19).first(),
        ])
}

/// Writes the final table as delimited text with a header row.
///
/// The table is collected first, so any deferred computation error aborts
/// before the filesystem is touched; the CSV is then written to a
/// temporary file in the destination directory and renamed into place.
/// Either the complete output file exists afterwards or no file at all.
///
/// # Errors
///
/// Returns an [`ExportError`] if collection, writing, or the final rename
/// fails.
pub fn write_table(
    table: &BioclimLazyFrame,
    grain: OutputGrain,
    path: &Path,
) -> Result<(), ExportError> {
    let mut df = final_table(table, grain)
        .collect()
        .map_err(ExportError::Collect)?;

    let dir = path.parent().filter(|p| !p.as_os_str().is_empty());
    let mut tmp = match dir {
        Some(dir) => NamedTempFile::new_in(dir),
        None => NamedTempFile::new(),
    }
    .map_err(|e| ExportError::WriteIo(path.to_path_buf(), e))?;

    CsvWriter::new(tmp.as_file_mut())
        .include_header(true)
        .with_null_value("NaN".to_string())
        .finish(&mut df)
        .map_err(|e| ExportError::CsvWrite(path.to_path_buf(), e))?;

    tmp.persist(path)
        .map_err(|e| ExportError::Persist(path.to_path_buf(), e))?;
    info!("wrote {} row(s) to {}", df.height(), path.display());
    Ok(())
}
