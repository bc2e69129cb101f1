//! Card state: configuration, the bound entity, the built scale and the grid.
//!
//! [`HeatmapCard`] holds explicit state instead of re-rendering on every
//! property change. Setters raise [`HeatmapCard::needs_rebuild`]; the owner
//! calls [`HeatmapCard::rebuild_scale`] before drawing and feeds statistics
//! through [`HeatmapCard::ingest`] whenever a fetch completes.

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::color::Color;
use crate::config::HeatmapConfig;
use crate::data::aggregate::Aggregator;
use crate::data::engine::{RenderableScale, ScaleEngine};
use crate::data::grid::{AggregatedGrid, DataRange};
use crate::data::round2;
use crate::data::statistics::{
    AggregationMode, StatisticsQuery, StatisticsResponse, StatisticsSource,
};
use crate::data::time_format::bucket_range;
use crate::data::units::UnitSystem;
use crate::error::{HeatmapError, Result};

/// Text shown for cells and grids without data.
pub const NO_DATA: &str = "No data";

/// What the card knows about the entity it displays.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct EntityInfo {
    pub entity_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub friendly_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device_class: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state_class: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit_of_measurement: Option<String>,
}

impl EntityInfo {
    pub fn new(entity_id: impl Into<String>) -> Self {
        Self {
            entity_id: entity_id.into(),
            ..Self::default()
        }
    }
}

/// Grid state shown under the table.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum GridStatus {
    /// Nothing fetched yet.
    #[default]
    Loading,
    Ready,
    /// The source answered without samples for the entity.
    NoData,
    Error(String),
}

impl GridStatus {
    pub fn message(&self) -> Option<String> {
        match self {
            GridStatus::Loading | GridStatus::Ready => None,
            GridStatus::NoData => Some(NO_DATA.to_string()),
            GridStatus::Error(msg) => Some(msg.clone()),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct HeatmapCard {
    config: HeatmapConfig,
    entity: Option<EntityInfo>,
    units: UnitSystem,
    scale: Option<RenderableScale>,
    grid: AggregatedGrid,
    status: GridStatus,
    needs_rebuild: bool,
}

impl HeatmapCard {
    /// A card for a validated configuration.
    pub fn new(config: HeatmapConfig, units: UnitSystem) -> Result<Self> {
        let mut card = Self {
            units,
            ..Self::default()
        };
        card.set_config(config)?;
        Ok(card)
    }

    /// Replace the configuration. Invalid configurations are rejected and
    /// the previous one stays in effect.
    pub fn set_config(&mut self, config: HeatmapConfig) -> Result<()> {
        config.validate()?;
        if config.entity != self.config.entity || config.resolution != self.config.resolution {
            self.grid = AggregatedGrid::empty(config.resolution);
            self.status = GridStatus::Loading;
        }
        self.config = config;
        self.needs_rebuild = true;
        Ok(())
    }

    pub fn config(&self) -> &HeatmapConfig {
        &self.config
    }

    pub fn set_entity(&mut self, entity: EntityInfo) {
        if self.entity.as_ref() != Some(&entity) {
            self.entity = Some(entity);
            self.needs_rebuild = true;
        }
    }

    pub fn entity(&self) -> Option<&EntityInfo> {
        self.entity.as_ref()
    }

    pub fn set_units(&mut self, units: UnitSystem) {
        if self.units != units {
            self.units = units;
            self.needs_rebuild = true;
        }
    }

    pub fn units(&self) -> &UnitSystem {
        &self.units
    }

    /// The entity's own category, else the configured override.
    pub fn category(&self) -> Option<&str> {
        self.entity
            .as_ref()
            .and_then(|e| e.device_class.as_deref())
            .or(self.config.device_class.as_deref())
    }

    /// True after any change that invalidates the built scale.
    pub fn needs_rebuild(&self) -> bool {
        self.needs_rebuild || self.scale.is_none()
    }

    /// Rebuild the scale from the current configuration and context.
    pub fn rebuild_scale(&mut self, engine: &ScaleEngine<'_>) -> Result<&RenderableScale> {
        let scale = engine.resolve(self.config.scale.as_ref(), self.category(), Some(&self.units))?;
        log::debug!(
            "rebuilt scale `{}` for {:?}",
            scale.name,
            self.config.entity.as_deref().unwrap_or_default()
        );
        self.needs_rebuild = false;
        Ok(&*self.scale.insert(scale))
    }

    pub fn scale(&self) -> Option<&RenderableScale> {
        self.scale.as_ref()
    }

    /// Statistics request for the configured window ending at `now`.
    pub fn query<Tz: TimeZone>(&self, now: &DateTime<Tz>) -> StatisticsQuery {
        StatisticsQuery::for_config(&self.config, now, Some(&self.units))
    }

    /// Fetch from `source` and ingest the answer. Source failures become a
    /// visible status, never an error.
    pub fn refresh<Tz: TimeZone>(&mut self, source: &mut dyn StatisticsSource, tz: Tz, now: DateTime<Utc>) {
        let query = self.query(&now.with_timezone(&tz));
        log::debug!("fetching statistics for {:?} since {}", query.statistic_ids, query.start_time);
        match source.fetch(&query) {
            Ok(response) => self.ingest(&response, tz, now),
            Err(e) => {
                log::warn!("statistics fetch failed: {e}");
                self.grid = AggregatedGrid::empty(self.config.resolution);
                self.status = GridStatus::Error(e.to_string());
            }
        }
    }

    /// Rebuild the grid from a statistics response.
    ///
    /// Aggregation problems leave the grid empty and set the status; they are
    /// never returned. A smoothing invariant failure falls back to the
    /// unsmoothed grid.
    pub fn ingest<Tz: TimeZone>(&mut self, response: &StatisticsResponse, tz: Tz, now: DateTime<Utc>) {
        match self.aggregate(response, tz, now) {
            Ok(Some(grid)) => {
                self.grid = grid;
                self.status = GridStatus::Ready;
            }
            Ok(None) => {
                log::warn!(
                    "no statistics for {:?}",
                    self.config.entity.as_deref().unwrap_or_default()
                );
                self.grid = AggregatedGrid::empty(self.config.resolution);
                self.status = GridStatus::NoData;
            }
            Err(e) => {
                log::warn!("failed to aggregate statistics: {e}");
                self.grid = AggregatedGrid::empty(self.config.resolution);
                self.status = GridStatus::Error(e.to_string());
            }
        }
    }

    fn aggregate<Tz: TimeZone>(
        &self,
        response: &StatisticsResponse,
        tz: Tz,
        now: DateTime<Utc>,
    ) -> Result<Option<AggregatedGrid>> {
        let Some(samples) = self
            .config
            .entity
            .as_ref()
            .and_then(|id| response.get(id))
            .filter(|samples| !samples.is_empty())
        else {
            return Ok(None);
        };

        let state_class = self
            .entity
            .as_ref()
            .and_then(|e| e.state_class.as_deref())
            .unwrap_or_default();
        let mode = AggregationMode::from_state_class(state_class)?;
        let aggregator = Aggregator::new(tz, self.config.resolution).with_now(now);

        match aggregator.aggregate(mode, samples, self.config.smoothing) {
            Err(e @ HeatmapError::SmoothingInvariantViolation { .. }) => {
                log::error!("{e}; showing unsmoothed data");
                aggregator.aggregate(mode, samples, false).map(Some)
            }
            other => other.map(Some),
        }
    }

    pub fn grid(&self) -> &AggregatedGrid {
        &self.grid
    }

    pub fn status(&self) -> &GridStatus {
        &self.status
    }

    /// Range used to normalise relative scales: configured bounds win,
    /// `auto` bounds come from the grid extremes.
    pub fn data_range(&self) -> Option<DataRange> {
        let min = self.config.data.min.fixed().or_else(|| self.grid.min_of())?;
        let max = self.config.data.max.fixed().or_else(|| self.grid.max_of())?;
        Some(DataRange::new(min, max))
    }

    /// Card header. An explicit empty title hides it.
    pub fn title(&self) -> Option<String> {
        match self.config.title.as_deref() {
            Some("") => None,
            Some(title) => Some(title.to_string()),
            None => self.entity.as_ref().and_then(|e| e.friendly_name.clone()),
        }
    }

    /// Layout height in dashboard rows.
    pub fn card_size(&self) -> usize {
        1 + (self.config.days.max(0) as usize).div_ceil(6)
    }

    /// Unit shown next to values: the scale's, else the entity's.
    pub fn display_unit(&self) -> Option<&str> {
        self.scale
            .as_ref()
            .and_then(|s| s.display_unit.as_deref())
            .or_else(|| self.entity.as_ref().and_then(|e| e.unit_of_measurement.as_deref()))
    }

    /// Colour of a grid cell. `None` for empty cells or before the scale is built.
    pub fn cell_color(&self, value: Option<f64>) -> Option<Color> {
        let scale = self.scale.as_ref()?;
        Some(scale.color_for(value?, self.data_range()))
    }

    /// Text for the click-to-inspect tooltip of one cell.
    pub fn tooltip(&self, row: usize, bucket: usize) -> Option<CellDetails> {
        let grid_row = self.grid.rows.get(row)?;
        let value = *grid_row.values.get(bucket)?;
        Some(CellDetails {
            date_label: grid_row.date_label.clone(),
            time_range: bucket_range(bucket, self.config.resolution, self.config.display.time_format),
            value: value.map(round2),
            unit: self.display_unit().map(str::to_string),
        })
    }
}

/// Contents of a cell tooltip.
#[derive(Debug, Clone, PartialEq)]
pub struct CellDetails {
    pub date_label: String,
    pub time_range: String,
    /// Rounded to two decimals.
    pub value: Option<f64>,
    pub unit: Option<String>,
}

impl CellDetails {
    pub fn header(&self) -> String {
        format!("{} {}", self.date_label, self.time_range)
    }

    pub fn value_text(&self) -> String {
        match (self.value, self.unit.as_deref()) {
            (Some(v), Some(unit)) => format!("{v} {unit}"),
            (Some(v), None) => v.to_string(),
            (None, _) => NO_DATA.to_string(),
        }
    }
}
