//! The statistics boundary: query shape, sample records and the source trait.
//!
//! The card never talks to a recorder directly. A [`StatisticsSource`] is
//! handed a [`StatisticsQuery`] and answers with the samples it has per
//! source id. A missing id in the response means "no data yet", which is a
//! displayed status rather than an error.

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Duration, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::config::{HeatmapConfig, MAX_DAYS};
use crate::data::units::UnitSystem;
use crate::error::{HeatmapError, Result};

/// One long-term statistics record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatisticSample {
    pub start: DateTime<Utc>,
    #[serde(default)]
    pub mean: Option<f64>,
    #[serde(default)]
    pub sum: Option<f64>,
}

impl StatisticSample {
    pub fn mean(start: DateTime<Utc>, mean: f64) -> Self {
        Self {
            start,
            mean: Some(mean),
            sum: None,
        }
    }

    pub fn sum(start: DateTime<Utc>, sum: f64) -> Self {
        Self {
            start,
            mean: None,
            sum: Some(sum),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Aggregation mode
// ─────────────────────────────────────────────────────────────────────────────

/// How a source's samples are turned into bucket values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AggregationMode {
    /// Instantaneous readings; buckets hold the period mean.
    Measurement,
    /// Monotonic totals; buckets hold the increase since the previous sample.
    Cumulative,
}

impl AggregationMode {
    /// Map a sensor `state_class` to its aggregation strategy.
    pub fn from_state_class(state_class: &str) -> Result<Self> {
        match state_class {
            "measurement" => Ok(AggregationMode::Measurement),
            "total" | "total_increasing" => Ok(AggregationMode::Cumulative),
            other => Err(HeatmapError::UnrecognizedAggregationMode(other.to_string())),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Query
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Period {
    #[serde(rename = "5minute")]
    FiveMinute,
    #[serde(rename = "hour")]
    Hour,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatisticType {
    Sum,
    Mean,
}

/// A request for long-term statistics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatisticsQuery {
    pub start_time: DateTime<Utc>,
    pub statistic_ids: Vec<String>,
    pub period: Period,
    pub types: Vec<StatisticType>,
    /// Units the source should convert values to, per domain.
    pub units: BTreeMap<String, String>,
}

impl StatisticsQuery {
    /// Query covering the configured number of days up to `now`.
    ///
    /// The window opens at 23:00 local time, `days` days before today, so
    /// the oldest row starts with the last hour of the preceding day. Day
    /// counts outside `1..=MAX_DAYS` are clamped.
    pub fn for_config<Tz: TimeZone>(
        config: &HeatmapConfig,
        now: &DateTime<Tz>,
        units: Option<&UnitSystem>,
    ) -> Self {
        let days = Duration::try_days(config.days.clamp(1, MAX_DAYS)).unwrap_or(Duration::zero());
        let start_time = now
            .date_naive()
            .checked_sub_signed(days)
            .and_then(|date| date.and_hms_opt(23, 0, 0))
            .and_then(|naive| now.timezone().from_local_datetime(&naive).earliest())
            .map(|dt| dt.with_timezone(&Utc))
            .or_else(|| now.with_timezone(&Utc).checked_sub_signed(days))
            .unwrap_or_else(|| now.with_timezone(&Utc));

        let mut unit_map = BTreeMap::new();
        unit_map.insert("energy".to_string(), "kWh".to_string());
        if let Some(temperature) = units.and_then(|u| u.unit_for("temperature")) {
            unit_map.insert("temperature".to_string(), temperature.to_string());
        }

        Self {
            start_time,
            statistic_ids: config.entity.iter().cloned().collect(),
            period: config.resolution.period(),
            types: vec![StatisticType::Sum, StatisticType::Mean],
            units: unit_map,
        }
    }
}

/// Samples per source id, each ordered by `start`.
pub type StatisticsResponse = HashMap<String, Vec<StatisticSample>>;

/// Anything that can answer a [`StatisticsQuery`].
pub trait StatisticsSource {
    fn fetch(&mut self, query: &StatisticsQuery) -> Result<StatisticsResponse>;
}

/// A source backed by series held in memory.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    series: HashMap<String, Vec<StatisticSample>>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_series(mut self, id: impl Into<String>, mut samples: Vec<StatisticSample>) -> Self {
        samples.sort_by_key(|s| s.start);
        self.series.insert(id.into(), samples);
        self
    }
}

impl StatisticsSource for MemorySource {
    fn fetch(&mut self, query: &StatisticsQuery) -> Result<StatisticsResponse> {
        let mut response = StatisticsResponse::new();
        for id in &query.statistic_ids {
            if let Some(samples) = self.series.get(id) {
                let window: Vec<_> = samples
                    .iter()
                    .filter(|s| s.start >= query.start_time)
                    .cloned()
                    .collect();
                response.insert(id.clone(), window);
            }
        }
        Ok(response)
    }
}
