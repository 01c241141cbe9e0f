//! Shared 3-month rolling series for the quarter-based indices.
//!
//! bio08-bio11 are the rolling extrema of the per-(location, year)
//! cumulative precipitation/temperature sums, and bio16-bio19 come from
//! the rolling 3-month precipitation sums. Note that these are the
//! reference pipeline's literal formulas, kept for output compatibility:
//! bio08-bio11 are cumulative-sum extrema rather than the canonical
//! WorldClim "mean temperature of wettest/driest quarter", and
//! bio16/bio18 and bio17/bio19 are formula-identical pairs.
//!
//! Every series is computed over the explicit, month-ordered sequence of
//! one (location_id, year) group and attached back to the monthly table
//! by key join, never by row position. Windows use a minimum period of
//! one month, so a partial first window (and a partial year) still yields
//! values.

use crate::types::columns::{
    BIO08, BIO09, BIO10, BIO11, BIO16, BIO17, BIO18, BIO19, COL_LOCATION_ID, COL_MONTH,
    COL_PRECIP_TOTAL, COL_TEMP_MEAN, COL_YEAR,
};
use crate::types::frames::MonthlyLazyFrame;
use log::warn;
use polars::df;
use polars::prelude::*;

const QUARTER_WINDOW: usize = 3;

/// The cumulative and rolling series of one (location_id, year) group,
/// ordered by month. Each vector has one entry per month present.
struct QuarterSeries {
    /// Rolling max of cumulative precipitation (bio08).
    cum_precip_roll_max: Vec<f64>,
    /// Rolling min of cumulative precipitation (bio09).
    cum_precip_roll_min: Vec<f64>,
    /// Rolling max of cumulative mean temperature (bio10).
    cum_temp_roll_max: Vec<f64>,
    /// Rolling min of cumulative mean temperature (bio11).
    cum_temp_roll_min: Vec<f64>,
    /// Rolling 3-month precipitation sums (bio16-bio19).
    precip_roll_sum: Vec<f64>,
}

impl QuarterSeries {
    fn compute(temp_mean: &[f64], precip: &[f64]) -> Self {
        let cum_precip = cumulative_sum(precip);
        let cum_temp = cumulative_sum(temp_mean);
        Self {
            cum_precip_roll_max: rolling_extremum(&cum_precip, f64::max),
            cum_precip_roll_min: rolling_extremum(&cum_precip, f64::min),
            cum_temp_roll_max: rolling_extremum(&cum_temp, f64::max),
            cum_temp_roll_min: rolling_extremum(&cum_temp, f64::min),
            precip_roll_sum: rolling_sum(precip),
        }
    }

    /// Max over the rolling precipitation sums (bio16, and bio18 by the
    /// reference's duplicate formula).
    fn wettest_quarter(&self) -> f64 {
        self.precip_roll_sum.iter().copied().fold(f64::NAN, f64::max)
    }

    /// Min over the rolling precipitation sums (bio17 and bio19).
    fn driest_quarter(&self) -> f64 {
        self.precip_roll_sum.iter().copied().fold(f64::NAN, f64::min)
    }
}

fn cumulative_sum(values: &[f64]) -> Vec<f64> {
    values
        .iter()
        .scan(0.0, |acc, v| {
            *acc += v;
            Some(*acc)
        })
        .collect()
}

/// Rolling reduction over a trailing window of [`QUARTER_WINDOW`] entries
/// with a minimum period of one.
fn rolling_extremum(values: &[f64], reduce: fn(f64, f64) -> f64) -> Vec<f64> {
    (0..values.len())
        .map(|i| {
            let lo = i.saturating_sub(QUARTER_WINDOW - 1);
            values[lo..=i]
                .iter()
                .copied()
                .reduce(reduce)
                .unwrap_or(f64::NAN)
        })
        .collect()
}

fn rolling_sum(values: &[f64]) -> Vec<f64> {
    (0..values.len())
        .map(|i| {
            let lo = i.saturating_sub(QUARTER_WINDOW - 1);
            values[lo..=i].iter().sum()
        })
        .collect()
}

/// Computes the quarter-based index tables from the monthly aggregates.
///
/// Returns two keyed tables ready for joining back onto the monthly
/// frame: one at (location_id, year, month) grain carrying bio08-bio11,
/// and one at (location_id, year) grain carrying bio16-bio19.
pub(crate) fn quarter_tables(monthly: &MonthlyLazyFrame) -> PolarsResult<(DataFrame, DataFrame)> {
    let df = monthly
        .frame
        .clone()
        .sort(
            [COL_LOCATION_ID, COL_YEAR, COL_MONTH],
            SortMultipleOptions::default(),
        )
        .collect()?;

    let ids = df.column(COL_LOCATION_ID)?.str()?;
    let years = df.column(COL_YEAR)?.i32()?;
    let months = df.column(COL_MONTH)?.i32()?;
    let temps = df.column(COL_TEMP_MEAN)?.f64()?;
    let precs = df.column(COL_PRECIP_TOTAL)?.f64()?;

    let height = df.height();
    let mut out_id: Vec<String> = Vec::with_capacity(height);
    let mut out_year: Vec<i32> = Vec::with_capacity(height);
    let mut out_month: Vec<i32> = Vec::with_capacity(height);
    let mut bio08: Vec<f64> = Vec::with_capacity(height);
    let mut bio09: Vec<f64> = Vec::with_capacity(height);
    let mut bio10: Vec<f64> = Vec::with_capacity(height);
    let mut bio11: Vec<f64> = Vec::with_capacity(height);

    let mut ann_id: Vec<String> = Vec::new();
    let mut ann_year: Vec<i32> = Vec::new();
    let mut bio16: Vec<f64> = Vec::new();
    let mut bio17: Vec<f64> = Vec::new();

    let key = |i: usize| (ids.get(i), years.get(i));
    let mut partial_years = 0usize;
    let mut start = 0usize;
    for end in 1..=height {
        if end < height && key(end) == key(start) {
            continue;
        }

        let temp: Vec<f64> = (start..end)
            .map(|i| temps.get(i).unwrap_or(f64::NAN))
            .collect();
        let prec: Vec<f64> = (start..end)
            .map(|i| precs.get(i).unwrap_or(f64::NAN))
            .collect();
        let series = QuarterSeries::compute(&temp, &prec);

        let group_id = ids.get(start).unwrap_or_default().to_string();
        let group_year = years.get(start).unwrap_or(0);
        if end - start < 12 {
            partial_years += 1;
        }

        for (offset, i) in (start..end).enumerate() {
            out_id.push(group_id.clone());
            out_year.push(group_year);
            out_month.push(months.get(i).unwrap_or(0));
            bio08.push(series.cum_precip_roll_max[offset]);
            bio09.push(series.cum_precip_roll_min[offset]);
            bio10.push(series.cum_temp_roll_max[offset]);
            bio11.push(series.cum_temp_roll_min[offset]);
        }
        ann_id.push(group_id);
        ann_year.push(group_year);
        bio16.push(series.wettest_quarter());
        bio17.push(series.driest_quarter());

        start = end;
    }

    if partial_years > 0 {
        warn!("{partial_years} location/year group(s) cover fewer than 12 months; quarter windows degrade to partial windows");
    }

    let monthly_rolling = df!(
        COL_LOCATION_ID => out_id,
        COL_YEAR => out_year,
        COL_MONTH => out_month,
        BIO08 => bio08,
        BIO09 => bio09,
        BIO10 => bio10,
        BIO11 => bio11,
    )?;
    let annual = df!(
        COL_LOCATION_ID => ann_id,
        COL_YEAR => ann_year,
        BIO16 => bio16.clone(),
        BIO17 => bio17.clone(),
        BIO18 => bio16,
        BIO19 => bio17,
    )?;

    Ok((monthly_rolling, annual))
}
