//! Per-(location_id, year) scalar reductions.

use crate::types::columns::{
    BIO01, BIO04, BIO05, BIO06, BIO12, BIO13, BIO14, BIO15, COL_LOCATION_ID, COL_PRECIP_TOTAL,
    COL_TEMP_MAX, COL_TEMP_MEAN, COL_TEMP_MIN, COL_YEAR,
};
use crate::types::frames::{MonthlyLazyFrame, NormalizedLazyFrame};
use polars::prelude::*;

/// Annual scalars computed from the monthly aggregates: bio01 (annual
/// mean temperature), bio05/bio06 (warmest-month max / coldest-month
/// min), bio12-bio14 (annual/wettest/driest precipitation) and bio15
/// (precipitation seasonality).
///
/// bio15 is the coefficient of variation of monthly precipitation as a
/// percentage; a year with zero mean precipitation divides zero by zero
/// and propagates NaN into the cell instead of failing. A year with a
/// single month is the other undefined case: the sample standard
/// deviation of one value is null, so bio15 exports as NaN there too,
/// regardless of the mean.
pub(crate) fn annual_scalars(monthly: &MonthlyLazyFrame) -> LazyFrame {
    monthly
        .frame
        .clone()
        .group_by([col(COL_LOCATION_ID), col(COL_YEAR)])
        .agg([
            col(COL_TEMP_MEAN).mean().alias(BIO01),
            col(COL_TEMP_MAX).max().alias(BIO05),
            col(COL_TEMP_MIN).min().alias(BIO06),
            col(COL_PRECIP_TOTAL).sum().alias(BIO12),
            col(COL_PRECIP_TOTAL).max().alias(BIO13),
            col(COL_PRECIP_TOTAL).min().alias(BIO14),
            (col(COL_PRECIP_TOTAL).std(1) / col(COL_PRECIP_TOTAL).mean() * lit(100.0))
                .alias(BIO15),
        ])
}

/// bio04, temperature seasonality: the sample standard deviation
/// (divisor n-1) of the raw per-record `temp_mean` series of each
/// (location_id, year).
pub(crate) fn temperature_seasonality(normalized: &NormalizedLazyFrame) -> LazyFrame {
    normalized
        .frame
        .clone()
        .group_by([col(COL_LOCATION_ID), col(COL_YEAR)])
        .agg([col(COL_TEMP_MEAN).std(1).alias(BIO04)])
}
