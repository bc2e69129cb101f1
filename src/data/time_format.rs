//! Time-of-day labels for grid column headers and cell tooltips.

use chrono::{Duration, NaiveTime, Timelike};
use serde::{Deserialize, Serialize};

use crate::data::grid::Resolution;

/// Placeholder shown in unlabelled header columns.
pub const HEADER_FILLER: &str = "·";

/// Every n-th hour gets a header label.
pub const HEADER_LABEL_EVERY: u32 = 4;

/// Clock style for hour labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum TimeFormat {
    #[default]
    #[serde(rename = "24h")]
    H24,
    #[serde(rename = "12h")]
    H12,
}

impl TimeFormat {
    /// Label for a full hour: `"08"` or `"8 AM"`.
    pub fn hour_label(&self, hour: u32) -> String {
        match self {
            TimeFormat::H24 => format!("{hour:02}"),
            TimeFormat::H12 => {
                let (h12, suffix) = twelve_hour(hour);
                format!("{h12} {suffix}")
            }
        }
    }

    /// Label for a clock time: `"13:05"`, or `"1 PM"` / `"1:05 PM"`.
    pub fn time_label(&self, time: NaiveTime) -> String {
        match self {
            TimeFormat::H24 => time.format("%H:%M").to_string(),
            TimeFormat::H12 if time.minute() == 0 => self.hour_label(time.hour()),
            TimeFormat::H12 => {
                let (h12, suffix) = twelve_hour(time.hour());
                format!("{h12}:{:02} {suffix}", time.minute())
            }
        }
    }
}

fn twelve_hour(hour: u32) -> (u32, &'static str) {
    let suffix = if hour % 24 < 12 { "AM" } else { "PM" };
    match hour % 12 {
        0 => (12, suffix),
        h => (h, suffix),
    }
}

/// One header label per bucket column.
///
/// The first bucket of every fourth hour is labelled, as is the last column
/// (hour 23). Everything else gets [`HEADER_FILLER`].
pub fn column_headers(resolution: Resolution, format: TimeFormat) -> Vec<String> {
    let per_hour = resolution.buckets_per_hour();
    let total = resolution.buckets_per_day();
    (0..total)
        .map(|idx| {
            let hour = (idx / per_hour) as u32;
            let first_in_hour = idx % per_hour == 0;
            if idx == total - 1 || (first_in_hour && hour % HEADER_LABEL_EVERY == 0) {
                format.hour_label(hour)
            } else {
                HEADER_FILLER.to_string()
            }
        })
        .collect()
}

/// Start and end of a bucket, e.g. `"13:00 - 14:00"`.
pub fn bucket_range(idx: usize, resolution: Resolution, format: TimeFormat) -> String {
    let minutes = resolution.minutes_per_bucket() as i64;
    let start = NaiveTime::MIN + Duration::minutes(idx as i64 * minutes);
    let end = start + Duration::minutes(minutes);
    format!("{} - {}", format.time_label(start), format.time_label(end))
}
