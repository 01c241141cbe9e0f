//! Second pipeline stage: reduces normalized records to one row per
//! (location_id, year, month).
//!
//! Reductions per group: arithmetic mean of `temp_mean`, minimum of
//! `temp_min`, maximum of `temp_max`, sum of `precip_total`. Grouping is
//! by exact key match; no fuzzy date merging. The result is sorted by the
//! group key so downstream rolling windows see months in calendar order.

use crate::types::columns::{
    COL_LOCATION_ID, COL_MONTH, COL_PRECIP_TOTAL, COL_TEMP_MAX, COL_TEMP_MEAN, COL_TEMP_MIN,
    COL_YEAR,
};
use crate::types::frames::{MonthlyLazyFrame, NormalizedLazyFrame};
use polars::prelude::*;

/// Aggregates normalized records into monthly aggregates.
///
/// A group with a single record reduces trivially: its mean, min, max and
/// sum are that record's own values. Re-aggregating a table that is
/// already monthly (one row per location/year/month) is therefore
/// idempotent.
///
/// # Example
///
/// ```
/// use bioclim::{aggregate_monthly, NormalizedLazyFrame, COL_PRECIP_TOTAL};
/// use polars::df;
/// use polars::prelude::*;
///
/// let normalized = NormalizedLazyFrame::new(
///     df!(
///         "location_id" => ["A", "A"],
///         "year" => [2020i32, 2020],
///         "month" => [1i32, 1],
///         "temp_mean" => [10.0, 12.0],
///         "temp_max" => [15.0, 17.0],
///         "temp_min" => [5.0, 7.0],
///         "precip_total" => [1.0, 2.0],
///     )
///     .unwrap()
///     .lazy(),
/// );
///
/// let monthly = aggregate_monthly(&normalized).frame.collect().unwrap();
/// assert_eq!(monthly.height(), 1);
/// let precip = monthly.column(COL_PRECIP_TOTAL).unwrap().f64().unwrap();
/// assert_eq!(precip.get(0), Some(3.0));
/// ```
pub fn aggregate_monthly(normalized: &NormalizedLazyFrame) -> MonthlyLazyFrame {
    let frame = normalized
        .frame
        .clone()
        .group_by([col(COL_LOCATION_ID), col(COL_YEAR), col(COL_MONTH)])
        .agg([
            col(COL_TEMP_MEAN).mean(),
            col(COL_TEMP_MIN).min(),
            col(COL_TEMP_MAX).max(),
            col(COL_PRECIP_TOTAL).sum(),
        ])
        .sort(
            [COL_LOCATION_ID, COL_YEAR, COL_MONTH],
            SortMultipleOptions::default(),
        );
    MonthlyLazyFrame::new(frame)
}

#[cfg(test)]
mod tests {
    use super::*;
    use polars::df;

    fn normalized(
        ids: Vec<&str>,
        years: Vec<i32>,
        months: Vec<i32>,
        temps: Vec<f64>,
        tmaxs: Vec<f64>,
        tmins: Vec<f64>,
        precs: Vec<f64>,
    ) -> NormalizedLazyFrame {
        NormalizedLazyFrame::new(
            df!(
                COL_LOCATION_ID => ids,
                COL_YEAR => years,
                COL_MONTH => months,
                COL_TEMP_MEAN => temps,
                COL_TEMP_MAX => tmaxs,
                COL_TEMP_MIN => tmins,
                COL_PRECIP_TOTAL => precs,
            )
            .unwrap()
            .lazy(),
        )
    }

    #[test]
    fn reduces_per_group() {
        let input = normalized(
            vec!["A", "A", "A", "B"],
            vec![2020, 2020, 2020, 2020],
            vec![1, 1, 2, 1],
            vec![10.0, 14.0, 20.0, 0.0],
            vec![15.0, 18.0, 25.0, 1.0],
            vec![5.0, 3.0, 15.0, -1.0],
            vec![1.0, 2.5, 4.0, 0.0],
        );

        let rows = aggregate_monthly(&input).collect_aggregates().unwrap();
        assert_eq!(rows.len(), 3);

        let a_jan = &rows[0];
        assert_eq!(a_jan.location_id, "A");
        assert_eq!((a_jan.year, a_jan.month), (2020, 1));
        assert_eq!(a_jan.temp_mean, Some(12.0));
        assert_eq!(a_jan.temp_max, Some(18.0));
        assert_eq!(a_jan.temp_min, Some(3.0));
        assert_eq!(a_jan.precip_total, Some(3.5));

        let b_jan = &rows[2];
        assert_eq!(b_jan.location_id, "B");
        assert_eq!(b_jan.precip_total, Some(0.0));
    }

    #[test]
    fn single_record_group_reduces_trivially() {
        let input = normalized(
            vec!["A"],
            vec![2020],
            vec![7],
            vec![21.5],
            vec![28.0],
            vec![14.0],
            vec![0.3],
        );
        let rows = aggregate_monthly(&input).collect_aggregates().unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].temp_mean, Some(21.5));
        assert_eq!(rows[0].temp_max, Some(28.0));
        assert_eq!(rows[0].temp_min, Some(14.0));
        assert_eq!(rows[0].precip_total, Some(0.3));
    }

    #[test]
    fn aggregation_is_idempotent_on_monthly_input() {
        let input = normalized(
            vec!["A", "A", "B"],
            vec![2020, 2020, 2021],
            vec![1, 2, 6],
            vec![10.0, 11.0, 18.0],
            vec![15.0, 16.0, 24.0],
            vec![5.0, 6.0, 12.0],
            vec![1.0, 2.0, 3.0],
        );

        let once = aggregate_monthly(&input).frame.collect().unwrap();
        let twice = aggregate_monthly(&NormalizedLazyFrame::new(once.clone().lazy()))
            .frame
            .collect()
            .unwrap();
        assert!(once.equals(&twice));
    }
}
