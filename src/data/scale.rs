//! Scale definitions: the static description of a colour scale.
//!
//! A [`ScaleDefinition`] is never mutated once constructed. The scale engine
//! clones the steps before converting units or building the gradient.

use serde::{Deserialize, Serialize};

use crate::error::{HeatmapError, Result};

/// Whether step values are physical quantities or positions in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScaleKind {
    /// Breakpoints are real-world values (°C, ppm, ...).
    Absolute,
    /// Breakpoints are normalised; the observed data range is stretched onto
    /// the scale at render time.
    #[default]
    Relative,
}

impl ScaleKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScaleKind::Absolute => "absolute",
            ScaleKind::Relative => "relative",
        }
    }
}

/// One colour stop of a scale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScaleStep {
    /// Colour literal, parsed when the scale is built.
    pub color: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<f64>,
    /// Optional caption for this band (e.g. "Good", "Poor").
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub legend: Option<String>,
}

impl ScaleStep {
    pub fn new(color: impl Into<String>, value: Option<f64>) -> Self {
        Self {
            color: color.into(),
            value,
            legend: None,
        }
    }
}

/// Licence attached to a catalog scale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct License {
    pub name: String,
    pub url: String,
}

/// Display-only scale documentation. `text` is trusted HTML for catalog
/// scales and is never shown for user-supplied ones.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Documentation {
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub license: Option<License>,
}

/// A named (catalog) or inline (custom) colour scale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScaleDefinition {
    /// Catalog key; absent for inline custom scales.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    #[serde(default)]
    pub name: String,
    #[serde(rename = "type", default)]
    pub kind: ScaleKind,
    #[serde(default)]
    pub steps: Vec<ScaleStep>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub documentation: Option<Documentation>,
    /// Sensor category this scale is meant for; only used for lookups.
    #[serde(rename = "device_class", default, skip_serializing_if = "Option::is_none")]
    pub category_hint: Option<String>,
}

impl ScaleDefinition {
    /// Check the structural rules every scale must satisfy.
    ///
    /// * at least one step
    /// * absolute scales: every step has a value, values non-decreasing
    /// * relative scales: values (when present) lie in `[0, 1]` and, when
    ///   every step has one, are non-decreasing
    pub fn validate(&self) -> Result<()> {
        let label = self.key.as_deref().unwrap_or("custom");
        let invalid = |msg: String| HeatmapError::InvalidCustomScale(format!("{label}: {msg}"));

        if self.steps.is_empty() {
            return Err(invalid("a scale needs at least one step".into()));
        }

        let values: Vec<f64> = self.steps.iter().filter_map(|s| s.value).collect();
        match self.kind {
            ScaleKind::Absolute => {
                if let Some(idx) = self.steps.iter().position(|s| s.value.is_none()) {
                    return Err(invalid(format!(
                        "step {idx} of an absolute scale has no value"
                    )));
                }
            }
            ScaleKind::Relative => {
                if let Some(v) = values.iter().find(|v| !(0.0..=1.0).contains(*v)) {
                    return Err(invalid(format!(
                        "relative step value {v} is outside [0, 1]"
                    )));
                }
            }
        }

        if values.len() == self.steps.len() && values.windows(2).any(|w| w[1] < w[0]) {
            return Err(invalid("step values must be non-decreasing".into()));
        }
        Ok(())
    }

    /// True when every step carries an explicit breakpoint.
    pub fn has_full_domain(&self) -> bool {
        self.steps.iter().all(|s| s.value.is_some())
    }
}

/// Fields a catalog can be filtered on with [`crate::data::catalog::ScaleCatalog::by_attribute`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScaleAttribute {
    Kind,
    DeviceClass,
    Unit,
    Key,
}

impl ScaleAttribute {
    pub(crate) fn value_of<'a>(&self, scale: &'a ScaleDefinition) -> Option<&'a str> {
        match self {
            ScaleAttribute::Kind => Some(scale.kind.as_str()),
            ScaleAttribute::DeviceClass => scale.category_hint.as_deref(),
            ScaleAttribute::Unit => scale.unit.as_deref(),
            ScaleAttribute::Key => scale.key.as_deref(),
        }
    }
}

/// How a configuration refers to its scale: by catalog key or inline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ScaleChoice {
    Named(String),
    Custom(ScaleDefinition),
}

impl ScaleChoice {
    pub fn is_custom(&self) -> bool {
        matches!(self, ScaleChoice::Custom(_))
    }

    /// Catalog key, if this is a named choice.
    pub fn key(&self) -> Option<&str> {
        match self {
            ScaleChoice::Named(key) => Some(key),
            ScaleChoice::Custom(_) => None,
        }
    }
}

impl From<&str> for ScaleChoice {
    fn from(key: &str) -> Self {
        ScaleChoice::Named(key.to_string())
    }
}
