//! First pipeline stage: turns a raw climate table into the canonical
//! record layout every later stage assumes.
//!
//! Normalization renames the source columns, parses the date column and
//! derives `year`/`month` from it, and optionally shifts temperatures from
//! Kelvin to Celsius. All schema problems are surfaced here, before any
//! aggregation runs.

use crate::ingest::error::SchemaError;
use crate::types::columns::{
    COL_DATE, COL_MONTH, COL_TEMP_MAX, COL_TEMP_MEAN, COL_TEMP_MIN, COL_YEAR, KELVIN_OFFSET,
    SOURCE_COLUMN_MAP, SOURCE_DATE,
};
use crate::types::frames::NormalizedLazyFrame;
use log::{info, warn};
use polars::prelude::*;
use std::path::Path;

/// Unit of the temperature columns in the input file.
///
/// The pipeline always produces Celsius output; [`TemperatureUnit::Kelvin`]
/// subtracts 273.15 from `temp_mean`, `temp_max` and `temp_min` during
/// normalization, before any aggregation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TemperatureUnit {
    /// Temperatures are already in Celsius; no conversion is applied.
    #[default]
    Celsius,
    /// Temperatures are in Kelvin and are converted to Celsius.
    Kelvin,
}

/// Opens a delimited input file as a lazy scan.
///
/// The file must have a header row carrying the source column names (see
/// [`crate::SOURCE_COLUMN_MAP`]). No data is read until the pipeline
/// collects.
///
/// # Errors
///
/// Returns [`SchemaError::OpenInput`] if the file cannot be opened or is
/// not parseable as CSV.
pub fn read_input(path: &Path) -> Result<LazyFrame, SchemaError> {
    LazyCsvReader::new(path)
        .with_has_header(true)
        .finish()
        .map_err(|e| SchemaError::OpenInput(path.to_path_buf(), e))
}

/// Normalizes a raw climate table into the canonical record layout.
///
/// Steps, in order:
///
/// 1. Verify every required source column is present.
/// 2. Rename source columns to their canonical names.
/// 3. Parse the date column (date strings, `Date`, or `Datetime` input are
///    accepted) and derive `year` and `month` from it.
/// 4. Apply the Kelvin offset if `unit` is [`TemperatureUnit::Kelvin`].
///
/// The caller's frame is not mutated; a new lazy plan is returned.
///
/// # Errors
///
/// * [`SchemaError::MissingColumn`] if a required source column is absent.
/// * [`SchemaError::UnparseableDate`] if any date cell cannot be parsed.
///   This is checked eagerly so a bad file aborts the run before the
///   aggregation stages, as a whole-file failure.
/// * [`SchemaError::UnsupportedDateType`] if the date column is neither a
///   string nor a temporal type.
///
/// # Example
///
/// ```
/// use bioclim::{normalize, TemperatureUnit, COL_YEAR};
/// use polars::df;
/// use polars::prelude::*;
///
/// let raw = df!(
///     "STATE" => ["A"],
///     "Date" => ["2020-07-14"],
///     "temperature_2m_MEAN" => [291.0],
///     "temperature_2m_max_MEAN" => [296.0],
///     "temperature_2m_min_MEAN" => [286.0],
///     "total_precipitation_sum_MEAN" => [3.5],
/// )
/// .unwrap();
///
/// let normalized = normalize(raw.lazy(), TemperatureUnit::Kelvin).unwrap();
/// let df = normalized.frame.collect().unwrap();
/// assert_eq!(df.column(COL_YEAR).unwrap().i32().unwrap().get(0), Some(2020));
/// ```
pub fn normalize(
    frame: LazyFrame,
    unit: TemperatureUnit,
) -> Result<NormalizedLazyFrame, SchemaError> {
    let mut frame = frame;
    let schema = frame
        .collect_schema()
        .map_err(SchemaError::SchemaInspection)?;

    for (source, _) in SOURCE_COLUMN_MAP {
        if schema.get(source).is_none() {
            return Err(SchemaError::MissingColumn(source.to_string()));
        }
    }

    let date_dtype = schema.get(SOURCE_DATE).cloned().unwrap_or(DataType::Null);
    let date_expr = match &date_dtype {
        DataType::String => col(COL_DATE).str().to_date(StrptimeOptions {
            strict: false,
            ..Default::default()
        }),
        DataType::Date => col(COL_DATE),
        DataType::Datetime(_, _) => col(COL_DATE).cast(DataType::Date),
        other => {
            return Err(SchemaError::UnsupportedDateType {
                column: SOURCE_DATE.to_string(),
                dtype: other.to_string(),
            })
        }
    };

    let frame = frame
        .rename(
            SOURCE_COLUMN_MAP.iter().map(|(source, _)| *source),
            SOURCE_COLUMN_MAP.iter().map(|(_, canonical)| *canonical),
            true,
        )
        .with_columns([date_expr.alias(COL_DATE)])
        .with_columns([
            col(COL_DATE).dt().year().alias(COL_YEAR),
            col(COL_DATE)
                .dt()
                .month()
                .cast(DataType::Int32)
                .alias(COL_MONTH),
        ]);

    // Non-strict parsing leaves unparseable cells null; a bad date is a
    // fatal schema problem, so count them up front.
    let unparseable = frame
        .clone()
        .filter(col(COL_DATE).is_null())
        .select([len()])
        .collect()
        .map_err(SchemaError::Normalize)?;
    let rows = unparseable
        .column("len")
        .and_then(|c| c.u32())
        .map_err(SchemaError::Normalize)?
        .get(0)
        .unwrap_or(0) as usize;
    if rows > 0 {
        warn!("{rows} row(s) with unparseable dates in input");
        return Err(SchemaError::UnparseableDate { rows });
    }

    let frame = match unit {
        TemperatureUnit::Celsius => frame,
        TemperatureUnit::Kelvin => {
            info!("converting temperature columns from Kelvin to Celsius");
            frame.with_columns([
                (col(COL_TEMP_MEAN) - lit(KELVIN_OFFSET)).alias(COL_TEMP_MEAN),
                (col(COL_TEMP_MAX) - lit(KELVIN_OFFSET)).alias(COL_TEMP_MAX),
                (col(COL_TEMP_MIN) - lit(KELVIN_OFFSET)).alias(COL_TEMP_MIN),
            ])
        }
    };

    Ok(NormalizedLazyFrame::new(frame))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::columns::{
        COL_LOCATION_ID, COL_PRECIP_TOTAL, SOURCE_LOCATION_ID, SOURCE_PRECIP_TOTAL,
        SOURCE_TEMP_MAX, SOURCE_TEMP_MEAN, SOURCE_TEMP_MIN,
    };
    use polars::df;

    fn source_frame() -> DataFrame {
        df!(
            SOURCE_LOCATION_ID => ["A", "A", "B"],
            SOURCE_DATE => ["2020-01-15", "2020-02-15", "2021-12-31"],
            SOURCE_TEMP_MEAN => [10.0, 11.0, 20.0],
            SOURCE_TEMP_MAX => [15.0, 16.0, 25.0],
            SOURCE_TEMP_MIN => [5.0, 6.0, 15.0],
            SOURCE_PRECIP_TOTAL => [1.0, 2.0, 3.0],
        )
        .unwrap()
    }

    #[test]
    fn renames_and_derives_year_month() {
        let normalized = normalize(source_frame().lazy(), TemperatureUnit::Celsius).unwrap();
        let df = normalized.frame.collect().unwrap();

        for name in [
            COL_LOCATION_ID,
            COL_DATE,
            COL_YEAR,
            COL_MONTH,
            COL_TEMP_MEAN,
            COL_TEMP_MAX,
            COL_TEMP_MIN,
            COL_PRECIP_TOTAL,
        ] {
            assert!(df.column(name).is_ok(), "missing column {name}");
        }

        let years = df.column(COL_YEAR).unwrap().i32().unwrap();
        let months = df.column(COL_MONTH).unwrap().i32().unwrap();
        assert_eq!(years.get(0), Some(2020));
        assert_eq!(months.get(0), Some(1));
        assert_eq!(years.get(2), Some(2021));
        assert_eq!(months.get(2), Some(12));
    }

    #[test]
    fn missing_column_is_fatal() {
        let df = source_frame().drop(SOURCE_PRECIP_TOTAL).unwrap();
        let err = normalize(df.lazy(), TemperatureUnit::Celsius).unwrap_err();
        match err {
            SchemaError::MissingColumn(name) => assert_eq!(name, SOURCE_PRECIP_TOTAL),
            other => panic!("expected MissingColumn, got {other:?}"),
        }
    }

    #[test]
    fn unparseable_date_is_fatal() {
        let df = df!(
            SOURCE_LOCATION_ID => ["A", "A"],
            SOURCE_DATE => ["2020-01-15", "not a date"],
            SOURCE_TEMP_MEAN => [10.0, 11.0],
            SOURCE_TEMP_MAX => [15.0, 16.0],
            SOURCE_TEMP_MIN => [5.0, 6.0],
            SOURCE_PRECIP_TOTAL => [1.0, 2.0],
        )
        .unwrap();
        let err = normalize(df.lazy(), TemperatureUnit::Celsius).unwrap_err();
        match err {
            SchemaError::UnparseableDate { rows } => assert_eq!(rows, 1),
            other => panic!("expected UnparseableDate, got {other:?}"),
        }
    }

    #[test]
    fn kelvin_offset_round_trips() {
        let normalized = normalize(source_frame().lazy(), TemperatureUnit::Kelvin).unwrap();
        let df = normalized.frame.collect().unwrap();
        let original = source_frame();

        for (canonical, source) in [
            (COL_TEMP_MEAN, SOURCE_TEMP_MEAN),
            (COL_TEMP_MAX, SOURCE_TEMP_MAX),
            (COL_TEMP_MIN, SOURCE_TEMP_MIN),
        ] {
            let converted = df.column(canonical).unwrap().f64().unwrap();
            let raw = original.column(source).unwrap().f64().unwrap();
            for i in 0..df.height() {
                let back = converted.get(i).unwrap() + KELVIN_OFFSET;
                assert!((back - raw.get(i).unwrap()).abs() < 1e-9);
            }
        }
    }

    #[test]
    fn celsius_input_is_untouched() {
        let normalized = normalize(source_frame().lazy(), TemperatureUnit::Celsius).unwrap();
        let df = normalized.frame.collect().unwrap();
        let temps = df.column(COL_TEMP_MEAN).unwrap().f64().unwrap();
        assert_eq!(temps.get(0), Some(10.0));
    }
}
