//! Collectable row structs for the three pipeline grains, with helpers to
//! extract them from a collected `DataFrame`.

use crate::error::BioclimError;
use crate::types::columns::{
    BIO01, BIO02, BIO03, BIO04, BIO05, BIO06, BIO07, BIO08, BIO09, BIO10, BIO11, BIO12, BIO13,
    BIO14, BIO15, BIO16, BIO17, BIO18, BIO19, COL_DATE, COL_LOCATION_ID, COL_MONTH,
    COL_PRECIP_TOTAL, COL_TEMP_MAX, COL_TEMP_MEAN, COL_TEMP_MIN, COL_YEAR,
};
use chrono::{Duration, NaiveDate};
use polars::prelude::*;
use serde::{Deserialize, Serialize};

fn require_str(df: &DataFrame, name: &str, idx: usize) -> Result<String, BioclimError> {
    df.column(name)?
        .str()?
        .get(idx)
        .map(str::to_string)
        .ok_or_else(|| BioclimError::MissingValue {
            column: name.to_string(),
            row: idx,
        })
}

fn require_i32(df: &DataFrame, name: &str, idx: usize) -> Result<i32, BioclimError> {
    df.column(name)?
        .i32()?
        .get(idx)
        .ok_or_else(|| BioclimError::MissingValue {
            column: name.to_string(),
            row: idx,
        })
}

fn opt_f64(df: &DataFrame, name: &str, idx: usize) -> Result<Option<f64>, BioclimError> {
    Ok(df.column(name)?.f64()?.get(idx))
}

fn require_date(df: &DataFrame, name: &str, idx: usize) -> Result<NaiveDate, BioclimError> {
    let days = df.column(name)?
        .date()?
        .get(idx)
        .ok_or_else(|| BioclimError::MissingValue {
            column: name.to_string(),
            row: idx,
        })?;
    // Date columns store days since the Unix epoch.
    let epoch = NaiveDate::from_ymd_opt(1970, 1, 1).unwrap_or_default();
    Ok(epoch + Duration::days(days as i64))
}

/// One normalized input record: a single location on a single date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawRecord {
    pub location_id: String,
    pub date: NaiveDate,
    pub year: i32,
    pub month: i32,
    pub temp_mean: Option<f64>,
    pub temp_max: Option<f64>,
    pub temp_min: Option<f64>,
    pub precip_total: Option<f64>,
}

impl RawRecord {
    /// Reads one row of a collected normalized frame.
    pub fn from_frame(df: &DataFrame, idx: usize) -> Result<Self, BioclimError> {
        Ok(Self {
            location_id: require_str(df, COL_LOCATION_ID, idx)?,
            date: require_date(df, COL_DATE, idx)?,
            year: require_i32(df, COL_YEAR, idx)?,
            month: require_i32(df, COL_MONTH, idx)?,
            temp_mean: opt_f64(df, COL_TEMP_MEAN, idx)?,
            temp_max: opt_f64(df, COL_TEMP_MAX, idx)?,
            temp_min: opt_f64(df, COL_TEMP_MIN, idx)?,
            precip_total: opt_f64(df, COL_PRECIP_TOTAL, idx)?,
        })
    }
}

/// One monthly aggregate: a single location's reduced values for one
/// calendar month.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyAggregate {
    pub location_id: String,
    pub year: i32,
    /// Calendar month, 1-12.
    pub month: i32,
    /// Mean of the raw `temp_mean` values over the month.
    pub temp_mean: Option<f64>,
    /// Minimum of the raw `temp_min` values over the month.
    pub temp_min: Option<f64>,
    /// Maximum of the raw `temp_max` values over the month.
    pub temp_max: Option<f64>,
    /// Sum of the raw `precip_total` values over the month.
    pub precip_total: Option<f64>,
}

impl MonthlyAggregate {
    /// Reads one row of a collected monthly frame.
    pub fn from_frame(df: &DataFrame, idx: usize) -> Result<Self, BioclimError> {
        Ok(Self {
            location_id: require_str(df, COL_LOCATION_ID, idx)?,
            year: require_i32(df, COL_YEAR, idx)?,
            month: require_i32(df, COL_MONTH, idx)?,
            temp_mean: opt_f64(df, COL_TEMP_MEAN, idx)?,
            temp_min: opt_f64(df, COL_TEMP_MIN, idx)?,
            temp_max: opt_f64(df, COL_TEMP_MAX, idx)?,
            precip_total: opt_f64(df, COL_PRECIP_TOTAL, idx)?,
        })
    }
}

/// One row of the final bioclimatic table. A derived, read-only
/// projection: annual scalars are repeated on every month of their year,
/// rolling-window indices vary per month.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BioclimRow {
    pub location_id: String,
    pub year: i32,
    pub month: i32,
    pub temp_mean: Option<f64>,
    pub temp_max: Option<f64>,
    pub temp_min: Option<f64>,
    pub bio01: Option<f64>,
    pub bio02: Option<f64>,
    pub bio03: Option<f64>,
    pub bio04: Option<f64>,
    pub bio05: Option<f64>,
    pub bio06: Option<f64>,
    pub bio07: Option<f64>,
    pub bio08: Option<f64>,
    pub bio09: Option<f64>,
    pub bio10: Option<f64>,
    pub bio11: Option<f64>,
    pub bio12: Option<f64>,
    pub bio13: Option<f64>,
    pub bio14: Option<f64>,
    pub bio15: Option<f64>,
    pub bio16: Option<f64>,
    pub bio17: Option<f64>,
    pub bio18: Option<f64>,
    pub bio19: Option<f64>,
}

impl BioclimRow {
    /// Reads one row of a collected bioclimatic frame.
    pub fn from_frame(df: &DataFrame, idx: usize) -> Result<Self, BioclimError> {
        Ok(Self {
            location_id: require_str(df, COL_LOCATION_ID, idx)?,
            year: require_i32(df, COL_YEAR, idx)?,
            month: require_i32(df, COL_MONTH, idx)?,
            temp_mean: opt_f64(df, COL_TEMP_MEAN, idx)?,
            temp_max: opt_f64(df, COL_TEMP_MAX, idx)?,
            temp_min: opt_f64(df, COL_TEMP_MIN, idx)?,
            bio01: opt_f64(df, BIO01, idx)?,
            bio02: opt_f64(df, BIO02, idx)?,
            bio03: opt_f64(df, BIO03, idx)?,
            bio04: opt_f64(df, BIO04, idx)?,
            bio05: opt_f64(df, BIO05, idx)?,
            bio06: opt_f64(df, BIO06, idx)?,
            bio07: opt_f64(df, BIO07, idx)?,
            bio08: opt_f64(df, BIO08, idx)?,
            bio09: opt_f64(df, BIO09, idx)?,
            bio10: opt_f64(df, BIO10, idx)?,
            bio11: opt_f64(df, BIO11, idx)?,
            bio12: opt_f64(df, BIO12, idx)?,
            bio13: opt_f64(df, BIO13, idx)?,
            bio14: opt_f64(df, BIO14, idx)?,
            bio15: opt_f64(df, BIO15, idx)?,
            bio16: opt_f64(df, BIO16, idx)?,
            bio17: opt_f64(df, BIO17, idx)?,
            bio18: opt_f64(df, BIO18, idx)?,
            bio19: opt_f64(df, BIO19, idx)?,
        })
    }
}
