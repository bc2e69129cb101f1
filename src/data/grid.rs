//! The aggregated day × bucket grid and the resolution that shapes it.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::data::statistics::Period;

// ─────────────────────────────────────────────────────────────────────────────
// Resolution
// ─────────────────────────────────────────────────────────────────────────────

/// Time-of-day bucket width.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Resolution {
    /// One bucket per hour.
    #[default]
    Standard,
    /// Five-minute buckets, twelve per hour.
    High,
}

impl Resolution {
    pub fn buckets_per_hour(&self) -> usize {
        match self {
            Resolution::Standard => 1,
            Resolution::High => 12,
        }
    }

    pub fn minutes_per_bucket(&self) -> usize {
        60 / self.buckets_per_hour()
    }

    pub fn buckets_per_day(&self) -> usize {
        24 * self.buckets_per_hour()
    }

    /// Statistics period to request for this resolution.
    pub fn period(&self) -> Period {
        match self {
            Resolution::Standard => Period::Hour,
            Resolution::High => Period::FiveMinute,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// DataRange
// ─────────────────────────────────────────────────────────────────────────────

/// Observed or configured value bounds used to normalise relative scales.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DataRange {
    pub min: f64,
    pub max: f64,
}

impl DataRange {
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    pub fn span(&self) -> f64 {
        self.max - self.min
    }

    /// Position of `value` within the range, clamped to `[0, 1]`.
    /// A zero-width (or inverted) range maps everything to the midpoint.
    pub fn normalize(&self, value: f64) -> f64 {
        let span = self.span();
        if !(span > 0.0) {
            return 0.5;
        }
        ((value - self.min) / span).clamp(0.0, 1.0)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// AggregatedGrid
// ─────────────────────────────────────────────────────────────────────────────

/// One calendar day of bucket values. `None` means no data, never zero.
#[derive(Debug, Clone, PartialEq)]
pub struct GridRow {
    pub date_label: String,
    pub date: NaiveDate,
    pub values: Vec<Option<f64>>,
}

impl GridRow {
    pub fn new(date: NaiveDate, buckets: usize, fill: Option<f64>) -> Self {
        Self {
            date_label: date.format("%b %d").to_string(),
            date,
            values: vec![fill; buckets],
        }
    }
}

/// Rows are ordered most recent day first.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AggregatedGrid {
    pub rows: Vec<GridRow>,
    pub buckets_per_day: usize,
}

impl AggregatedGrid {
    pub fn empty(resolution: Resolution) -> Self {
        Self {
            rows: Vec::new(),
            buckets_per_day: resolution.buckets_per_day(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Every non-null value, row by row.
    pub fn values(&self) -> impl Iterator<Item = f64> + '_ {
        self.rows
            .iter()
            .flat_map(|row| row.values.iter())
            .filter_map(|v| *v)
    }

    pub fn min_of(&self) -> Option<f64> {
        self.values().reduce(f64::min)
    }

    pub fn max_of(&self) -> Option<f64> {
        self.values().reduce(f64::max)
    }

    /// Observed extremes, if the grid holds any value.
    pub fn range(&self) -> Option<DataRange> {
        Some(DataRange::new(self.min_of()?, self.max_of()?))
    }
}
