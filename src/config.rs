//! Card configuration: the document the host stores and the editor mutates.
//!
//! Parsing is lenient (unknown keys are ignored, everything but `entity`
//! has a default). [`HeatmapConfig::validate`] applies the rules a card
//! checks when it is handed a new configuration.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize, Serializer};

use crate::data::grid::Resolution;
use crate::data::scale::ScaleChoice;
use crate::data::time_format::TimeFormat;
use crate::error::{ConfigError, HeatmapError, Result};

/// Number of days shown when the configuration does not say.
pub const DEFAULT_DAYS: i64 = 21;

/// Largest accepted number of days.
pub const MAX_DAYS: i64 = 3650;

fn default_days() -> i64 {
    DEFAULT_DAYS
}

fn default_true() -> bool {
    true
}

// ─────────────────────────────────────────────────────────────────────────────
// RangeBound
// ─────────────────────────────────────────────────────────────────────────────

/// One end of the value range used by relative scales.
///
/// Values that are neither `auto` nor numeric are kept as
/// [`RangeBound::Invalid`] so validation can report them.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(from = "RangeBoundRepr")]
pub enum RangeBound {
    /// Use the observed extreme of the grid.
    #[default]
    Auto,
    Fixed(f64),
    Invalid(String),
}

impl RangeBound {
    pub fn is_auto(&self) -> bool {
        matches!(self, RangeBound::Auto)
    }

    pub fn fixed(&self) -> Option<f64> {
        match self {
            RangeBound::Fixed(v) => Some(*v),
            _ => None,
        }
    }

    /// Interpret editor text: blank or `auto` is [`RangeBound::Auto`].
    pub fn parse(text: &str) -> Self {
        let trimmed = text.trim();
        if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("auto") {
            return RangeBound::Auto;
        }
        match trimmed.parse::<f64>() {
            Ok(v) if v.is_finite() => RangeBound::Fixed(v),
            _ => RangeBound::Invalid(trimmed.to_string()),
        }
    }

    fn check(&self, field: &str) -> Result<(), ConfigError> {
        match self {
            RangeBound::Invalid(value) => Err(ConfigError::InvalidRangeBound {
                field: field.to_string(),
                value: value.clone(),
            }),
            _ => Ok(()),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RangeBoundRepr {
    Number(f64),
    Text(String),
    Other(serde_json::Value),
}

impl From<RangeBoundRepr> for RangeBound {
    fn from(repr: RangeBoundRepr) -> Self {
        match repr {
            RangeBoundRepr::Number(v) => RangeBound::Fixed(v),
            RangeBoundRepr::Text(text) => RangeBound::parse(&text),
            RangeBoundRepr::Other(serde_json::Value::Null) => RangeBound::Auto,
            RangeBoundRepr::Other(value) => RangeBound::Invalid(value.to_string()),
        }
    }
}

impl Serialize for RangeBound {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            RangeBound::Auto => serializer.serialize_str("auto"),
            RangeBound::Fixed(v) => serializer.serialize_f64(*v),
            RangeBound::Invalid(text) => serializer.serialize_str(text),
        }
    }
}

/// `data:` section.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DataBounds {
    #[serde(default)]
    pub min: RangeBound,
    #[serde(default)]
    pub max: RangeBound,
}

/// `display:` section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisplayConfig {
    #[serde(default = "default_true")]
    pub legend: bool,
    #[serde(default)]
    pub time_format: TimeFormat,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            legend: true,
            time_format: TimeFormat::default(),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// HeatmapConfig
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeatmapConfig {
    /// Statistics source id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entity: Option<String>,
    /// Card title. Absent means "use the entity's friendly name"; an empty
    /// string hides the title.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default = "default_days")]
    pub days: i64,
    /// Category override for entities that do not report one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device_class: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scale: Option<ScaleChoice>,
    #[serde(default)]
    pub data: DataBounds,
    #[serde(default)]
    pub display: DisplayConfig,
    /// Spread coarse counter updates over time (cumulative sources only).
    #[serde(default)]
    pub smoothing: bool,
    #[serde(default)]
    pub resolution: Resolution,
}

impl Default for HeatmapConfig {
    fn default() -> Self {
        Self {
            entity: None,
            title: None,
            days: DEFAULT_DAYS,
            device_class: None,
            scale: None,
            data: DataBounds::default(),
            display: DisplayConfig::default(),
            smoothing: false,
            resolution: Resolution::default(),
        }
    }
}

impl HeatmapConfig {
    pub fn for_entity(entity: impl Into<String>) -> Self {
        Self {
            entity: Some(entity.into()),
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.entity.as_deref().map_or(true, |e| e.trim().is_empty()) {
            return Err(ConfigError::MissingSource);
        }
        if !(1..=MAX_DAYS).contains(&self.days) {
            return Err(ConfigError::InvalidDayCount(self.days));
        }
        self.data.min.check("data.min")?;
        self.data.max.check("data.max")?;
        Ok(())
    }

    pub fn from_yaml_str(text: &str) -> Result<Self> {
        serde_yaml::from_str(text).map_err(|e| HeatmapError::ConfigData(e.to_string()))
    }

    pub fn from_json_str(text: &str) -> Result<Self> {
        serde_json::from_str(text).map_err(|e| HeatmapError::ConfigData(e.to_string()))
    }

    pub fn to_yaml_string(&self) -> Result<String> {
        serde_yaml::to_string(self).map_err(|e| HeatmapError::ConfigData(e.to_string()))
    }

    pub fn to_json_string(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| HeatmapError::ConfigData(e.to_string()))
    }

    /// Read a YAML (or, by `.json` extension, JSON) configuration file.
    pub fn load_from_path(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .map_err(|e| HeatmapError::ConfigData(format!("failed to read {path:?}: {e}")))?;
        if path.extension().is_some_and(|ext| ext == "json") {
            Self::from_json_str(&text)
        } else {
            Self::from_yaml_str(&text)
        }
    }

    pub fn save_to_path(&self, path: &Path) -> Result<()> {
        let text = if path.extension().is_some_and(|ext| ext == "json") {
            self.to_json_string()?
        } else {
            self.to_yaml_string()?
        };
        fs::write(path, text)
            .map_err(|e| HeatmapError::ConfigData(format!("failed to write {path:?}: {e}")))
    }
}
