//! Error types for configuration, scale building and aggregation.

use thiserror::Error;

/// Problems with the user-supplied card configuration.
///
/// These are operator-fixable and are surfaced as a blocking error state
/// before the first render.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("an entity (statistics source id) must be defined")]
    MissingSource,
    #[error("`days` needs to be between 1 and {max}, got {0}", max = crate::config::MAX_DAYS)]
    InvalidDayCount(i64),
    #[error("`{field}` needs to be either `auto` or a number, got `{value}`")]
    InvalidRangeBound { field: String, value: String },
}

/// Crate-wide error type.
#[derive(Debug, Error)]
pub enum HeatmapError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("unknown scale `{0}`")]
    UnknownScaleKey(String),

    #[error("invalid custom scale: {0}")]
    InvalidCustomScale(String),

    #[error("unknown color `{0}`")]
    UnknownColorSpec(String),

    /// The smoothing pass changed the total consumption of a series. This is
    /// a logic error, never a data quality problem.
    #[error("smoothing changed the series total from {raw:.2} to {smoothed:.2}")]
    SmoothingInvariantViolation { raw: f64, smoothed: f64 },

    #[error("unknown state_class `{0}`, no aggregation strategy available")]
    UnrecognizedAggregationMode(String),

    #[error("invalid scale catalog data: {0}")]
    CatalogData(String),

    #[error("invalid configuration document: {0}")]
    ConfigData(String),

    #[error("statistics query failed: {0}")]
    Statistics(String),
}

pub type Result<T, E = HeatmapError> = std::result::Result<T, E>;
