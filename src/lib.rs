//! heatmap-card crate root: re-exports and module wiring.
//!
//! Calendar heatmaps of hourly (or 5-minute) sensor statistics, split into:
//! - `color`: colour parsing and gradient interpolation
//! - `data`: scale catalog, scale engine, time bucketing and aggregation
//! - `config`: card configuration and validation
//! - `card`: card state binding configuration, entity, scale and grid
//! - `editor`: configuration editor logic
//! - `panels` / `app`: egui views and the standalone eframe application

pub mod app;
pub mod card;
pub mod color;
pub mod config;
pub mod data;
pub mod editor;
pub mod error;
pub mod panels;

// Public re-exports for a compact external API
pub use app::{run_heatmap, HeatmapApp, RefreshThrottle};
pub use card::{CellDetails, EntityInfo, GridStatus, HeatmapCard};
pub use color::{Color, Gradient};
pub use config::{HeatmapConfig, RangeBound};
pub use data::aggregate::{smooth, Aggregator};
pub use data::catalog::ScaleCatalog;
pub use data::engine::{RenderableScale, ScaleEngine};
pub use data::grid::{AggregatedGrid, DataRange, Resolution};
pub use data::scale::{ScaleChoice, ScaleDefinition, ScaleKind};
pub use data::statistics::{AggregationMode, MemorySource, StatisticSample, StatisticsQuery, StatisticsSource};
pub use data::time_format::TimeFormat;
pub use data::units::UnitSystem;
pub use editor::ConfigEditor;
pub use error::{ConfigError, HeatmapError, Result};
