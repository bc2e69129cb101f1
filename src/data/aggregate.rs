//! Turns ordered statistics samples into an [`AggregatedGrid`].
//!
//! * Measurement sources put each sample's `mean` into its bucket. Buckets
//!   without a sample stay `None`.
//! * Cumulative sources put the increase since the previous sample into the
//!   bucket. Rows start out filled with `0.0`: a counter that did not report
//!   did not move.
//! * [`smooth`] optionally spreads the jumps of a coarsely reporting counter
//!   across the samples in between before deltas are taken.
//!
//! Rows come out most recent day first. When the aggregator knows the
//! current time, the row for today stops at the last bucket that has been
//! observed, so hours that have not happened yet are absent rather than
//! empty.

use chrono::{DateTime, NaiveDate, TimeZone, Timelike, Utc};

use crate::data::grid::{AggregatedGrid, GridRow, Resolution};
use crate::data::round2;
use crate::data::statistics::{AggregationMode, StatisticSample};
use crate::error::{HeatmapError, Result};

/// Largest tolerated difference between raw and smoothed series totals.
pub const SMOOTHING_TOLERANCE: f64 = 0.01;

#[derive(Debug, Clone)]
pub struct Aggregator<Tz: TimeZone> {
    tz: Tz,
    resolution: Resolution,
    now: Option<DateTime<Utc>>,
}

impl<Tz: TimeZone> Aggregator<Tz> {
    pub fn new(tz: Tz, resolution: Resolution) -> Self {
        Self {
            tz,
            resolution,
            now: None,
        }
    }

    /// Enables truncation of the row for the current day.
    pub fn with_now(mut self, now: DateTime<Utc>) -> Self {
        self.now = Some(now);
        self
    }

    pub fn resolution(&self) -> Resolution {
        self.resolution
    }

    /// Aggregate with the strategy for `mode`, smoothing cumulative series
    /// first when asked to.
    pub fn aggregate(
        &self,
        mode: AggregationMode,
        samples: &[StatisticSample],
        smoothing: bool,
    ) -> Result<AggregatedGrid> {
        match mode {
            AggregationMode::Measurement => Ok(self.measurement(samples)),
            AggregationMode::Cumulative if smoothing => Ok(self.cumulative(&smooth(samples)?)),
            AggregationMode::Cumulative => Ok(self.cumulative(samples)),
        }
    }

    pub fn measurement(&self, samples: &[StatisticSample]) -> AggregatedGrid {
        let buckets = self.resolution.buckets_per_day();
        let mut rows: Vec<GridRow> = Vec::new();
        let mut last_idx = 0;

        for sample in samples {
            let (date, idx) = self.locate(&sample.start);
            if rows.last().map(|r| r.date) != Some(date) {
                rows.push(GridRow::new(date, buckets, None));
            }
            if let Some(row) = rows.last_mut() {
                row.values[idx] = sample.mean;
            }
            last_idx = idx;
        }

        self.finish(rows, last_idx)
    }

    pub fn cumulative(&self, samples: &[StatisticSample]) -> AggregatedGrid {
        let buckets = self.resolution.buckets_per_day();
        let mut rows: Vec<GridRow> = Vec::new();
        let mut previous: Option<f64> = None;
        let mut last_idx = 0;

        for sample in samples {
            let Some(sum) = sample.sum else {
                continue;
            };
            let Some(prev) = previous.replace(sum) else {
                continue;
            };
            let (date, idx) = self.locate(&sample.start);
            if rows.last().map(|r| r.date) != Some(date) {
                rows.push(GridRow::new(date, buckets, Some(0.0)));
            }
            if let Some(row) = rows.last_mut() {
                row.values[idx] = Some(round2(sum - prev));
            }
            last_idx = idx;
        }

        self.finish(rows, last_idx)
    }

    /// Local day and bucket index of a timestamp.
    fn locate(&self, start: &DateTime<Utc>) -> (NaiveDate, usize) {
        let local = start.with_timezone(&self.tz);
        let idx = local.hour() as usize * self.resolution.buckets_per_hour()
            + local.minute() as usize / self.resolution.minutes_per_bucket();
        (local.date_naive(), idx)
    }

    fn finish(&self, mut rows: Vec<GridRow>, last_idx: usize) -> AggregatedGrid {
        if let (Some(now), Some(row)) = (self.now, rows.last_mut()) {
            let today = now.with_timezone(&self.tz).date_naive();
            if row.date >= today {
                row.values.truncate(last_idx + 1);
            }
        }
        rows.reverse();
        AggregatedGrid {
            rows,
            buckets_per_day: self.resolution.buckets_per_day(),
        }
    }
}

/// Spread the increase between plateaus of a cumulative series evenly over
/// the samples in between.
///
/// A plateau is a maximal run of samples reporting the same total. For each
/// pair of consecutive plateaus the running total is interpolated linearly
/// by sample index from the first plateau's start to the next plateau's
/// start, rounded to two decimals. The final plateau stays flat. Samples
/// without a `sum` are dropped.
///
/// Fails with [`HeatmapError::SmoothingInvariantViolation`] if the series
/// total changed by more than [`SMOOTHING_TOLERANCE`].
pub fn smooth(samples: &[StatisticSample]) -> Result<Vec<StatisticSample>> {
    let raw: Vec<(&StatisticSample, f64)> = samples
        .iter()
        .filter_map(|s| s.sum.map(|sum| (s, sum)))
        .collect();
    if raw.len() < 2 {
        return Ok(raw.into_iter().map(|(s, _)| s.clone()).collect());
    }

    let mut plateaus = vec![0];
    plateaus.extend((1..raw.len()).filter(|&i| raw[i].1 != raw[i - 1].1));

    let mut totals: Vec<f64> = raw.iter().map(|(_, sum)| *sum).collect();
    for pair in plateaus.windows(2) {
        let (from, to) = (pair[0], pair[1]);
        let (start, end) = (raw[from].1, raw[to].1);
        let steps = (to - from) as f64;
        for (offset, total) in totals[from..to].iter_mut().enumerate() {
            *total = round2(start + (end - start) * offset as f64 / steps);
        }
    }

    let raw_total = raw[raw.len() - 1].1 - raw[0].1;
    let smoothed_total = totals[totals.len() - 1] - totals[0];
    if (smoothed_total - raw_total).abs() > SMOOTHING_TOLERANCE + f64::EPSILON {
        return Err(HeatmapError::SmoothingInvariantViolation {
            raw: raw_total,
            smoothed: smoothed_total,
        });
    }

    Ok(raw
        .iter()
        .zip(totals)
        .map(|((sample, _), total)| StatisticSample {
            sum: Some(total),
            ..(*sample).clone()
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, FixedOffset};

    fn hourly_sums(sums: &[f64]) -> Vec<StatisticSample> {
        let base = Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap();
        sums.iter()
            .enumerate()
            .map(|(i, &s)| StatisticSample::sum(base + Duration::hours(i as i64), s))
            .collect()
    }

    fn sums(samples: &[StatisticSample]) -> Vec<f64> {
        samples.iter().filter_map(|s| s.sum).collect()
    }

    #[test]
    fn smoothing_spreads_plateau_jumps() {
        let out = smooth(&hourly_sums(&[0.0, 0.0, 0.0, 6.0, 6.0])).unwrap();
        assert_eq!(sums(&out), vec![0.0, 2.0, 4.0, 6.0, 6.0]);
    }

    #[test]
    fn smoothing_keeps_flat_series_flat() {
        let out = smooth(&hourly_sums(&[5.0, 5.0, 5.0])).unwrap();
        assert_eq!(sums(&out), vec![5.0, 5.0, 5.0]);
    }

    #[test]
    fn smoothing_leaves_strictly_increasing_series_alone() {
        let out = smooth(&hourly_sums(&[1.0, 2.5, 4.0, 9.0])).unwrap();
        assert_eq!(sums(&out), vec![1.0, 2.5, 4.0, 9.0]);
    }

    #[test]
    fn smoothing_short_series_is_identity() {
        assert!(smooth(&[]).unwrap().is_empty());
        assert_eq!(sums(&smooth(&hourly_sums(&[3.0])).unwrap()), vec![3.0]);
    }

    #[test]
    fn smoothing_preserves_total() {
        let raw = hourly_sums(&[1.0, 1.0, 1.0, 2.0, 2.0, 2.0, 2.0, 10.0, 10.0, 11.33]);
        let out = smooth(&raw).unwrap();
        let s = sums(&out);
        let total = s[s.len() - 1] - s[0];
        assert!((total - (11.33 - 1.0)).abs() <= SMOOTHING_TOLERANCE);
        assert_eq!(out.len(), raw.len());
        assert_eq!(out[4].start, raw[4].start);
    }

    #[test]
    fn locate_uses_local_time() {
        let tz = FixedOffset::east_opt(2 * 3600).unwrap();
        let agg = Aggregator::new(tz, Resolution::High);
        let start = Utc.with_ymd_and_hms(2024, 3, 1, 22, 17, 0).unwrap();
        let (date, idx) = agg.locate(&start);
        assert_eq!(date, NaiveDate::from_ymd_opt(2024, 3, 2).unwrap());
        assert_eq!(idx, 3);
    }
}
