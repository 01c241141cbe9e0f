//! Third pipeline stage: the bioclimatic derivation engine.
//!
//! Computes bio01-bio19 for every (location_id, year) present in the
//! monthly aggregates and joins every annual scalar back onto each of the
//! year's monthly rows, so the final table is at monthly grain with
//! annual values repeated. bio02 and bio03 vary per month (bio02 is the
//! monthly max-min range), as do the rolling indices bio08-bio11.

mod annual;
mod rolling;

use crate::error::BioclimError;
use crate::types::columns::{
    BIO02, BIO03, BIO05, BIO06, BIO07, COL_LOCATION_ID, COL_MONTH, COL_TEMP_MAX, COL_TEMP_MIN,
    COL_YEAR,
};
use crate::types::frames::{BioclimLazyFrame, MonthlyLazyFrame, NormalizedLazyFrame};
use log::info;
use polars::prelude::*;

/// Derives the full bioclimatic table from the normalized records and
/// their monthly aggregates.
///
/// Annual scalars (bio01, bio04-bio07, bio12-bio19) are computed once per
/// (location_id, year) and joined back by key; rolling indices
/// (bio08-bio11) are joined by (location_id, year, month). bio03 divides
/// bio02 by bio07, so a year with zero annual temperature range
/// propagates NaN there rather than failing.
///
/// # Errors
///
/// Returns [`BioclimError::DataFrameProcessing`] if the rolling-series
/// computation cannot collect the monthly frame.
///
/// # Example
///
/// ```
/// use bioclim::{aggregate_monthly, derive_indices, NormalizedLazyFrame};
/// use polars::df;
/// use polars::prelude::*;
///
/// let normalized = NormalizedLazyFrame::new(
///     df!(
///         "location_id" => vec!["A"; 12],
///         "year" => vec![2020i32; 12],
///         "month" => (1..=12).collect::<Vec<i32>>(),
///         "temp_mean" => (10..=21).map(f64::from).collect::<Vec<f64>>(),
///         "temp_max" => (15..=26).map(f64::from).collect::<Vec<f64>>(),
///         "temp_min" => (5..=16).map(f64::from).collect::<Vec<f64>>(),
///         "precip_total" => vec![5.0; 12],
///     )
///     .unwrap()
///     .lazy(),
/// );
///
/// let monthly = aggregate_monthly(&normalized);
/// let table = derive_indices(&normalized, &monthly).unwrap();
/// let rows = table.collect_rows().unwrap();
/// assert_eq!(rows.len(), 12);
/// assert_eq!(rows[0].bio12, Some(60.0));
/// ```
pub fn derive_indices(
    normalized: &NormalizedLazyFrame,
    monthly: &MonthlyLazyFrame,
) -> Result<BioclimLazyFrame, BioclimError> {
    let annual_scalars = annual::annual_scalars(monthly);
    let seasonality = annual::temperature_seasonality(normalized);
    let (quarter_monthly, quarter_annual) = rolling::quarter_tables(monthly)?;
    info!("derived quarter series for {} location/year group(s)", quarter_annual.height());

    let year_key = [col(COL_LOCATION_ID), col(COL_YEAR)];
    let month_key = [col(COL_LOCATION_ID), col(COL_YEAR), col(COL_MONTH)];

    let frame = monthly
        .frame
        .clone()
        .join(
            annual_scalars,
            year_key.clone(),
            year_key.clone(),
            JoinArgs::new(JoinType::Left),
        )
        .join(
            seasonality,
            year_key.clone(),
            year_key.clone(),
            JoinArgs::new(JoinType::Left),
        )
        .join(
            quarter_annual.lazy(),
            year_key.clone(),
            year_key,
            JoinArgs::new(JoinType::Left),
        )
        .join(
            quarter_monthly.lazy(),
            month_key.clone(),
            month_key,
            JoinArgs::new(JoinType::Left),
        )
        .with_columns([(col(COL_TEMP_MAX) - col(COL_TEMP_MIN)).alias(BIO02)])
        .with_columns([(col(BIO05) - col(BIO06)).alias(BIO07)])
        .with_columns([(col(BIO02) / col(BIO07) * lit(100.0)).alias(BIO03)])
        .sort(
            [COL_LOCATION_ID, COL_YEAR, COL_MONTH],
            SortMultipleOptions::default(),
        );

    Ok(BioclimLazyFrame::new(frame))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::monthly::aggregate_monthly;
    use crate::types::columns::{COL_PRECIP_TOTAL, COL_TEMP_MEAN};
    use polars::df;

    fn year_of_rising_temps() -> NormalizedLazyFrame {
        NormalizedLazyFrame::new(
            df!(
                COL_LOCATION_ID => vec!["A"; 12],
                COL_YEAR => vec![2020i32; 12],
                COL_MONTH => (1..=12).collect::<Vec<i32>>(),
                COL_TEMP_MEAN => (10..=21).map(f64::from).collect::<Vec<f64>>(),
                COL_TEMP_MAX => (15..=26).map(f64::from).collect::<Vec<f64>>(),
                COL_TEMP_MIN => (5..=16).map(f64::from).collect::<Vec<f64>>(),
                COL_PRECIP_TOTAL => vec![5.0; 12],
            )
            .unwrap()
            .lazy(),
        )
    }

    #[test]
    fn scenario_full_year() {
        let normalized = year_of_rising_temps();
        let monthly = aggregate_monthly(&normalized);
        let rows = derive_indices(&normalized, &monthly)
            .unwrap()
            .collect_rows()
            .unwrap();
        assert_eq!(rows.len(), 12);

        let january = &rows[0];
        assert!((january.bio01.unwrap() - 15.5).abs() < 1e-9);
        assert_eq!(january.bio12, Some(60.0));
        assert_eq!(january.bio13, Some(5.0));
        assert_eq!(january.bio14, Some(5.0));
        assert!((january.bio15.unwrap() - 0.0).abs() < 1e-9);

        // Annual scalars repeat on every month of the year.
        for row in &rows {
            assert_eq!(row.bio01, january.bio01);
            assert_eq!(row.bio05, Some(26.0));
            assert_eq!(row.bio06, Some(5.0));
            assert_eq!(row.bio07, Some(21.0));
            assert_eq!(row.bio16, Some(15.0));
            assert_eq!(row.bio17, Some(5.0));
            assert_eq!(row.bio18, row.bio16);
            assert_eq!(row.bio19, row.bio17);
        }

        // bio02 is a per-month range; bio03 follows it.
        assert_eq!(january.bio02, Some(10.0));
        assert!((january.bio03.unwrap() - 10.0 / 21.0 * 100.0).abs() < 1e-9);

        // bio04 is the sample std of the raw temp_mean series.
        let expected_std = (143.5f64 / 11.0).sqrt();
        assert!((january.bio04.unwrap() - expected_std).abs() < 1e-9);

        // Rolling indices vary per month.
        assert_eq!(rows[0].bio08, Some(5.0));
        assert_eq!(rows[11].bio08, Some(60.0));
        assert_eq!(rows[3].bio09, Some(10.0));
        assert_eq!(rows[11].bio10, Some(186.0));
        assert_eq!(rows[0].bio11, Some(10.0));
    }

    #[test]
    fn bio03_is_nan_when_annual_range_is_zero() {
        // A year at constant temperature: bio05 == bio06, so bio07 is 0
        // and bio03 divides zero by zero.
        let normalized = NormalizedLazyFrame::new(
            df!(
                COL_LOCATION_ID => vec!["A"; 12],
                COL_YEAR => vec![2020i32; 12],
                COL_MONTH => (1..=12).collect::<Vec<i32>>(),
                COL_TEMP_MEAN => vec![10.0; 12],
                COL_TEMP_MAX => vec![10.0; 12],
                COL_TEMP_MIN => vec![10.0; 12],
                COL_PRECIP_TOTAL => vec![5.0; 12],
            )
            .unwrap()
            .lazy(),
        );
        let monthly = aggregate_monthly(&normalized);
        let rows = derive_indices(&normalized, &monthly)
            .unwrap()
            .collect_rows()
            .unwrap();
        assert_eq!(rows.len(), 12);
        for row in &rows {
            assert_eq!(row.bio02, Some(0.0));
            assert_eq!(row.bio07, Some(0.0));
            assert!(row.bio03.unwrap().is_nan());
        }
    }

    #[test]
    fn bio07_is_never_negative() {
        let normalized = year_of_rising_temps();
        let monthly = aggregate_monthly(&normalized);
        let rows = derive_indices(&normalized, &monthly)
            .unwrap()
            .collect_rows()
            .unwrap();
        for row in rows {
            assert!(row.bio07.unwrap() >= 0.0);
        }
    }

    #[test]
    fn partial_year_still_yields_rows() {
        let normalized = NormalizedLazyFrame::new(
            df!(
                COL_LOCATION_ID => vec!["A"; 2],
                COL_YEAR => vec![2020i32; 2],
                COL_MONTH => vec![1i32, 2],
                COL_TEMP_MEAN => vec![10.0, 12.0],
                COL_TEMP_MAX => vec![15.0, 17.0],
                COL_TEMP_MIN => vec![5.0, 7.0],
                COL_PRECIP_TOTAL => vec![3.0, 4.0],
            )
            .unwrap()
            .lazy(),
        );
        let monthly = aggregate_monthly(&normalized);
        let rows = derive_indices(&normalized, &monthly)
            .unwrap()
            .collect_rows()
            .unwrap();
        assert_eq!(rows.len(), 2);
        // Partial windows under the minimum-period-1 policy.
        assert_eq!(rows[0].bio08, Some(3.0));
        assert_eq!(rows[1].bio08, Some(7.0));
        assert_eq!(rows[1].bio16, Some(7.0));
        assert_eq!(rows[1].bio17, Some(3.0));
    }

    #[test]
    fn multiple_locations_keep_their_own_scalars() {
        let normalized = NormalizedLazyFrame::new(
            df!(
                COL_LOCATION_ID => ["A", "B"],
                COL_YEAR => [2020i32, 2020],
                COL_MONTH => [1i32, 1],
                COL_TEMP_MEAN => [10.0, 20.0],
                COL_TEMP_MAX => [15.0, 25.0],
                COL_TEMP_MIN => [5.0, 15.0],
                COL_PRECIP_TOTAL => [1.0, 9.0],
            )
            .unwrap()
            .lazy(),
        );
        let monthly = aggregate_monthly(&normalized);
        let rows = derive_indices(&normalized, &monthly)
            .unwrap()
            .collect_rows()
            .unwrap();
        assert_eq!(rows.len(), 2);
        let a = rows.iter().find(|r| r.location_id == "A").unwrap();
        let b = rows.iter().find(|r| r.location_id == "B").unwrap();
        assert_eq!(a.bio12, Some(1.0));
        assert_eq!(b.bio12, Some(9.0));
        assert_eq!(a.bio01, Some(10.0));
        assert_eq!(b.bio01, Some(20.0));
    }
}
