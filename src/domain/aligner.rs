//! Period alignment of an asset series against a liquidity series.
//!
//! Both inputs are reduced to one observation per calendar month (the last
//! one in that month) and inner-joined on [`PeriodKey`]. A month present in
//! only one of the two series has nothing to correlate against and is
//! dropped. Empty output is a normal result, not an error.

use crate::domain::series::{PeriodKey, TimeSeries};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq)]
pub struct AlignedRow {
    pub period: PeriodKey,
    pub asset_value: f64,
    pub liquidity_value: f64,
}

/// A labelled aligned table, ready for dual-axis charting.
#[derive(Debug, Clone, PartialEq)]
pub struct AlignedTable {
    pub asset_label: String,
    pub rows: Vec<AlignedRow>,
}

impl AlignedTable {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }
}

/// Last-value-of-month resampling.
///
/// Sorts internally, so the input order never matters. A series that is
/// already monthly comes back with the same values.
pub fn downsample_monthly(series: &TimeSeries) -> BTreeMap<PeriodKey, f64> {
    let mut periods = BTreeMap::new();
    for obs in series.sorted() {
        periods.insert(PeriodKey::from_date(obs.date), obs.value);
    }
    periods
}

/// Join `asset` and `liquidity` on calendar month.
pub fn align(asset: &TimeSeries, liquidity: &TimeSeries) -> Vec<AlignedRow> {
    if asset.is_empty() || liquidity.is_empty() {
        return Vec::new();
    }

    let asset_months = downsample_monthly(asset);
    let liquidity_months = downsample_monthly(liquidity);

    asset_months
        .into_iter()
        .filter_map(|(period, asset_value)| {
            liquidity_months
                .get(&period)
                .map(|&liquidity_value| AlignedRow {
                    period,
                    asset_value,
                    liquidity_value,
                })
        })
        .collect()
}

/// [`align`] with the display label attached.
pub fn align_labelled(asset: &TimeSeries, liquidity: &TimeSeries, asset_label: &str) -> AlignedTable {
    AlignedTable {
        asset_label: asset_label.to_string(),
        rows: align(asset, liquidity),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::series::Observation;
    use chrono::{Duration, NaiveDate};
    use proptest::prelude::*;
    use std::collections::BTreeSet;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn daily(start: NaiveDate, days: i64, base: f64) -> TimeSeries {
        (0..days)
            .map(|i| Observation::new(start + Duration::days(i), base + i as f64))
            .collect()
    }

    fn month_starts(year: i32, months: std::ops::RangeInclusive<u32>, base: f64) -> TimeSeries {
        months
            .map(|m| Observation::new(d(year, m, 1), base + m as f64))
            .collect()
    }

    #[test]
    fn downsample_picks_last_observation_of_each_month() {
        let series = daily(d(2024, 1, 30), 4, 100.0);
        // 2024-01-30=100, 01-31=101, 02-01=102, 02-02=103
        let months = downsample_monthly(&series);
        assert_eq!(months.len(), 2);
        assert_eq!(months[&PeriodKey::new(2024, 1)], 101.0);
        assert_eq!(months[&PeriodKey::new(2024, 2)], 103.0);
    }

    #[test]
    fn downsample_is_noop_for_monthly_series() {
        let series = month_starts(2024, 1..=6, 0.0);
        let months = downsample_monthly(&series);
        assert_eq!(months.len(), 6);
        for m in 1..=6u32 {
            assert_eq!(months[&PeriodKey::new(2024, m)], m as f64);
        }
    }

    #[test]
    fn downsample_skips_nan_in_favour_of_earlier_value() {
        let series = TimeSeries::from_pairs(vec![
            (d(2024, 1, 10), 5.0),
            (d(2024, 1, 31), f64::NAN),
        ]);
        let months = downsample_monthly(&series);
        assert_eq!(months[&PeriodKey::new(2024, 1)], 5.0);
    }

    #[test]
    fn daily_asset_joins_monthly_liquidity() {
        let asset = daily(d(2024, 1, 1), 91, 0.0); // Jan..Mar 2024
        let liquidity = month_starts(2024, 2..=5, 20_000.0);

        let rows = align(&asset, &liquidity);

        let periods: Vec<String> = rows.iter().map(|r| r.period.to_string()).collect();
        assert_eq!(periods, vec!["2024-02", "2024-03"]);
        // Feb 29 is day index 59, Mar 31 is day index 90
        assert_eq!(rows[0].asset_value, 59.0);
        assert_eq!(rows[0].liquidity_value, 20_002.0);
        assert_eq!(rows[1].asset_value, 90.0);
        assert_eq!(rows[1].liquidity_value, 20_003.0);
    }

    #[test]
    fn month_end_and_month_start_stamps_match() {
        let asset = TimeSeries::from_pairs(vec![(d(2024, 1, 31), 1.0)]);
        let liquidity = TimeSeries::from_pairs(vec![(d(2024, 1, 1), 2.0)]);
        let rows = align(&asset, &liquidity);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].period, PeriodKey::new(2024, 1));
    }

    #[test]
    fn empty_inputs_give_empty_output() {
        let series = month_starts(2024, 1..=3, 0.0);
        assert!(align(&TimeSeries::empty(), &series).is_empty());
        assert!(align(&series, &TimeSeries::empty()).is_empty());
    }

    #[test]
    fn disjoint_periods_give_empty_output() {
        let asset = month_starts(2023, 1..=6, 0.0);
        let liquidity = month_starts(2024, 1..=6, 0.0);
        assert!(align(&asset, &liquidity).is_empty());
    }

    #[test]
    fn labelled_table_carries_label() {
        let series = month_starts(2024, 1..=2, 0.0);
        let table = align_labelled(&series, &series, "NASDAQ");
        assert_eq!(table.asset_label, "NASDAQ");
        assert_eq!(table.len(), 2);
    }

    fn arb_series() -> impl Strategy<Value = Vec<(i64, f64)>> {
        prop::collection::vec((0i64..900, -1.0e6f64..1.0e6), 0..60)
    }

    /// A series together with an arbitrary permutation of its points.
    fn series_and_permutation() -> impl Strategy<Value = (Vec<(i64, f64)>, Vec<(i64, f64)>)> {
        arb_series().prop_flat_map(|points| (Just(points.clone()), Just(points).prop_shuffle()))
    }

    fn build(points: &[(i64, f64)]) -> TimeSeries {
        let base = d(2022, 1, 1);
        points
            .iter()
            .map(|&(offset, v)| Observation::new(base + Duration::days(offset), v))
            .collect()
    }

    proptest! {
        #[test]
        fn periods_are_exact_intersection(a in arb_series(), b in arb_series()) {
            let sa = build(&a);
            let sb = build(&b);
            let rows = align(&sa, &sb);

            let ka: BTreeSet<PeriodKey> = downsample_monthly(&sa).into_keys().collect();
            let kb: BTreeSet<PeriodKey> = downsample_monthly(&sb).into_keys().collect();
            let expected: Vec<PeriodKey> = ka.intersection(&kb).copied().collect();
            let got: Vec<PeriodKey> = rows.iter().map(|r| r.period).collect();

            prop_assert_eq!(got, expected);
        }

        #[test]
        fn output_is_independent_of_input_order(
            (a, a_shuffled) in series_and_permutation(),
            (b, b_shuffled) in series_and_permutation(),
        ) {
            let original = align(&build(&a), &build(&b));
            let shuffled = align(&build(&a_shuffled), &build(&b_shuffled));
            prop_assert_eq!(original, shuffled);
        }

        #[test]
        fn align_is_idempotent(a in arb_series(), b in arb_series()) {
            let sa = build(&a);
            let sb = build(&b);
            prop_assert_eq!(align(&sa, &sb), align(&sa, &sb));
        }

        #[test]
        fn empty_side_always_yields_nothing(a in arb_series()) {
            let sa = build(&a);
            prop_assert!(align(&sa, &TimeSeries::empty()).is_empty());
            prop_assert!(align(&TimeSeries::empty(), &sa).is_empty());
        }
    }
}
