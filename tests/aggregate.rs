use chrono::{DateTime, Duration, FixedOffset, NaiveDate, TimeZone, Utc};
use heatmap_card::data::aggregate::{smooth, Aggregator, SMOOTHING_TOLERANCE};
use heatmap_card::data::grid::Resolution;
use heatmap_card::data::statistics::{AggregationMode, StatisticSample};
use heatmap_card::HeatmapError;

// Helper: build a UTC timestamp
fn utc(year: i32, month: u32, day: u32, h: u32, m: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, h, m, 0).unwrap()
}

fn hourly_means(start: DateTime<Utc>, means: &[f64]) -> Vec<StatisticSample> {
    means
        .iter()
        .enumerate()
        .map(|(i, &m)| StatisticSample::mean(start + Duration::hours(i as i64), m))
        .collect()
}

fn hourly_sums(start: DateTime<Utc>, sums: &[f64]) -> Vec<StatisticSample> {
    sums.iter()
        .enumerate()
        .map(|(i, &s)| StatisticSample::sum(start + Duration::hours(i as i64), s))
        .collect()
}

#[test]
fn measurement_fills_one_day() {
    let agg = Aggregator::new(Utc, Resolution::Standard);
    let grid = agg.measurement(&hourly_means(utc(2024, 3, 1, 0, 0), &[1.0, 2.0, 3.0]));

    assert_eq!(grid.rows.len(), 1);
    let row = &grid.rows[0];
    assert_eq!(row.values.len(), 24);
    assert_eq!(&row.values[0..3], &[Some(1.0), Some(2.0), Some(3.0)]);
    assert!(row.values[3..].iter().all(Option::is_none));
    assert_eq!(row.date_label, "Mar 01");
}

#[test]
fn measurement_truncates_today_at_last_bucket() {
    let agg = Aggregator::new(Utc, Resolution::Standard).with_now(utc(2024, 3, 2, 2, 30));
    // No sample for 02:00 yet.
    let samples = hourly_means(utc(2024, 3, 1, 22, 0), &[5.0, 6.0, 7.0, 8.0]);
    let grid = agg.measurement(&samples);

    assert_eq!(grid.rows.len(), 2);
    // Today comes first and stops at 01:00.
    assert_eq!(grid.rows[0].date, NaiveDate::from_ymd_opt(2024, 3, 2).unwrap());
    assert_eq!(grid.rows[0].values, vec![Some(7.0), Some(8.0)]);
    // Earlier days keep all 24 buckets.
    assert_eq!(grid.rows[1].values.len(), 24);
    assert_eq!(grid.rows[1].values[22], Some(5.0));
    assert_eq!(grid.rows[1].values[0], None);
}

#[test]
fn rows_are_most_recent_first() {
    let agg = Aggregator::new(Utc, Resolution::Standard);
    let samples = hourly_means(utc(2024, 3, 1, 12, 0), &[1.0; 72]);
    let grid = agg.measurement(&samples);
    let dates: Vec<_> = grid.rows.iter().map(|r| r.date.to_string()).collect();
    assert_eq!(dates, vec!["2024-03-04", "2024-03-03", "2024-03-02", "2024-03-01"]);
}

#[test]
fn cumulative_uses_first_sample_as_baseline() {
    let agg = Aggregator::new(Utc, Resolution::Standard);
    let grid = agg.cumulative(&hourly_sums(utc(2024, 3, 1, 0, 0), &[10.0, 15.0, 15.0, 25.0]));

    assert_eq!(grid.rows.len(), 1);
    let values = &grid.rows[0].values;
    assert_eq!(values.len(), 24);
    assert_eq!(&values[1..4], &[Some(5.0), Some(0.0), Some(10.0)]);
    // Cumulative rows start at zero consumption, not at "no data".
    assert_eq!(values[0], Some(0.0));
    assert_eq!(values[23], Some(0.0));
}

#[test]
fn cumulative_deltas_are_rounded() {
    let agg = Aggregator::new(Utc, Resolution::Standard);
    let grid = agg.cumulative(&hourly_sums(utc(2024, 3, 1, 0, 0), &[0.1, 0.3, 0.6]));
    assert_eq!(&grid.rows[0].values[1..3], &[Some(0.2), Some(0.3)]);
}

#[test]
fn high_resolution_uses_five_minute_buckets() {
    let agg = Aggregator::new(Utc, Resolution::High);
    let samples = vec![
        StatisticSample::mean(utc(2024, 3, 1, 0, 0), 1.0),
        StatisticSample::mean(utc(2024, 3, 1, 0, 5), 2.0),
        StatisticSample::mean(utc(2024, 3, 1, 13, 55), 3.0),
    ];
    let grid = agg.measurement(&samples);
    assert_eq!(grid.buckets_per_day, 288);
    let values = &grid.rows[0].values;
    assert_eq!(values.len(), 288);
    assert_eq!(values[0], Some(1.0));
    assert_eq!(values[1], Some(2.0));
    assert_eq!(values[13 * 12 + 11], Some(3.0));
}

#[test]
fn days_follow_the_local_time_zone() {
    let tz = FixedOffset::west_opt(5 * 3600).unwrap();
    let agg = Aggregator::new(tz, Resolution::Standard);
    // 03:00 UTC on Mar 2 is still Mar 1 at 22:00 local.
    let grid = agg.measurement(&[StatisticSample::mean(utc(2024, 3, 2, 3, 0), 4.0)]);
    assert_eq!(grid.rows[0].date, NaiveDate::from_ymd_opt(2024, 3, 1).unwrap());
    assert_eq!(grid.rows[0].values[22], Some(4.0));
}

#[test]
fn aggregate_dispatches_on_mode() {
    let agg = Aggregator::new(Utc, Resolution::Standard);
    let samples = hourly_sums(utc(2024, 3, 1, 0, 0), &[0.0, 0.0, 0.0, 3.0]);

    let raw = agg.aggregate(AggregationMode::Cumulative, &samples, false).unwrap();
    assert_eq!(&raw.rows[0].values[1..4], &[Some(0.0), Some(0.0), Some(3.0)]);

    let smoothed = agg.aggregate(AggregationMode::Cumulative, &samples, true).unwrap();
    assert_eq!(&smoothed.rows[0].values[1..4], &[Some(1.0), Some(1.0), Some(1.0)]);

    // Means are absent on sum-only samples.
    let measured = agg.aggregate(AggregationMode::Measurement, &samples, true).unwrap();
    assert!(measured.rows[0].values.iter().all(Option::is_none));
}

#[test]
fn smoothing_invariant_holds_for_many_series() {
    let start = utc(2024, 3, 1, 0, 0);
    let series: [&[f64]; 5] = [
        &[0.0, 0.0, 1.0, 1.0, 1.0, 2.0, 2.0, 2.0, 2.0, 3.0],
        &[100.0, 100.0, 100.0],
        &[0.5, 1.25, 2.0, 9.75],
        &[3.0, 3.0, 3.0, 3.0, 7.77, 7.77, 8.0, 8.0, 8.0, 12.01],
        &[1.0, 1.0, 2.0, 2.0, 2.0, 2.0, 2.0, 2.0, 2.0, 2.0, 2.0, 5.0],
    ];
    for sums in series {
        let raw = hourly_sums(start, sums);
        let out = smooth(&raw).unwrap();
        let first = out[0].sum.unwrap();
        let last = out[out.len() - 1].sum.unwrap();
        let expected = sums[sums.len() - 1] - sums[0];
        assert!(
            ((last - first) - expected).abs() <= SMOOTHING_TOLERANCE,
            "{sums:?}: {} vs {expected}",
            last - first
        );
        // Smoothed totals never go backwards.
        assert!(out.windows(2).all(|w| w[1].sum >= w[0].sum));
    }
}

#[test]
fn unknown_state_class_has_no_strategy() {
    assert_eq!(AggregationMode::from_state_class("measurement").unwrap(), AggregationMode::Measurement);
    assert_eq!(AggregationMode::from_state_class("total").unwrap(), AggregationMode::Cumulative);
    assert_eq!(
        AggregationMode::from_state_class("total_increasing").unwrap(),
        AggregationMode::Cumulative
    );
    let err = AggregationMode::from_state_class("snapshot").unwrap_err();
    assert!(matches!(err, HeatmapError::UnrecognizedAggregationMode(ref s) if s == "snapshot"));
}
