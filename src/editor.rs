//! Configuration editor logic, independent of the widgets that drive it.
//!
//! The editor keeps a working copy of the card configuration. Field edits
//! address the configuration by dotted path (`data.min`) and are applied to
//! its JSON form so any key can be set the same way. Picking a new entity or
//! device class also picks that category's default scale.

use std::collections::BTreeMap;

use serde_json::{Map, Value};

use crate::card::EntityInfo;
use crate::color::Color;
use crate::config::HeatmapConfig;
use crate::data::catalog::ScaleCatalog;
use crate::data::engine::{ScaleEngine, LEGEND_SAMPLES};
use crate::data::scale::{Documentation, ScaleAttribute, ScaleChoice, ScaleDefinition, ScaleKind};
use crate::error::{HeatmapError, Result};

/// State classes that are kept in long-term statistics.
pub const SUPPORTED_STATE_CLASSES: [&str; 3] = ["measurement", "total", "total_increasing"];

/// Scale picker tab.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ScaleTab {
    #[default]
    Absolute,
    Relative,
    Custom,
}

impl ScaleTab {
    pub const ALL: [ScaleTab; 3] = [ScaleTab::Absolute, ScaleTab::Relative, ScaleTab::Custom];

    pub fn label(&self) -> &'static str {
        match self {
            ScaleTab::Absolute => "Absolute",
            ScaleTab::Relative => "Relative",
            ScaleTab::Custom => "Custom",
        }
    }

    /// Scale kind whose catalog entries this tab lists.
    pub fn kind(&self) -> Option<ScaleKind> {
        match self {
            ScaleTab::Absolute => Some(ScaleKind::Absolute),
            ScaleTab::Relative => Some(ScaleKind::Relative),
            ScaleTab::Custom => None,
        }
    }
}

/// Tab that shows the configured scale.
pub fn tab_for_scale(catalog: &ScaleCatalog, choice: Option<&ScaleChoice>) -> ScaleTab {
    match choice {
        Some(ScaleChoice::Custom(_)) => ScaleTab::Custom,
        Some(ScaleChoice::Named(key)) => match catalog.lookup(key).map(|def| def.kind) {
            Ok(ScaleKind::Relative) => ScaleTab::Relative,
            _ => ScaleTab::Absolute,
        },
        None => ScaleTab::Absolute,
    }
}

/// A relative scale entry with its gradient, for picker previews.
#[derive(Debug, Clone, PartialEq)]
pub struct ScalePreview {
    pub key: String,
    pub name: String,
    pub legend_css: String,
    /// Evenly sampled colours of the scale.
    pub swatch: Vec<Color>,
}

/// A value coming from an editor widget.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Text(String),
    Number(f64),
    Flag(bool),
}

impl FieldValue {
    /// Text input: numeric text becomes a number, anything else is kept verbatim.
    pub fn from_input(text: &str) -> Self {
        match text.trim().parse::<f64>() {
            Ok(v) if v.is_finite() => FieldValue::Number(v),
            _ => FieldValue::Text(text.to_string()),
        }
    }

    fn into_json(self) -> Value {
        match self {
            FieldValue::Text(text) => Value::String(text),
            FieldValue::Number(v) if v.fract() == 0.0 && v.abs() < i64::MAX as f64 => {
                Value::from(v as i64)
            }
            FieldValue::Number(v) => Value::from(v),
            FieldValue::Flag(b) => Value::Bool(b),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ConfigEditor {
    config: HeatmapConfig,
    entities: BTreeMap<String, EntityInfo>,
    active_tab: ScaleTab,
}

impl ConfigEditor {
    pub fn new(
        catalog: &ScaleCatalog,
        config: HeatmapConfig,
        entities: impl IntoIterator<Item = EntityInfo>,
    ) -> Self {
        let active_tab = tab_for_scale(catalog, config.scale.as_ref());
        Self {
            config,
            entities: entities
                .into_iter()
                .map(|e| (e.entity_id.clone(), e))
                .collect(),
            active_tab,
        }
    }

    pub fn config(&self) -> &HeatmapConfig {
        &self.config
    }

    pub fn into_config(self) -> HeatmapConfig {
        self.config
    }

    pub fn entities(&self) -> impl Iterator<Item = &EntityInfo> {
        self.entities.values()
    }

    /// The selected entity, if it is known.
    pub fn entity(&self) -> Option<&EntityInfo> {
        self.config.entity.as_ref().and_then(|id| self.entities.get(id))
    }

    /// The entity's device class, else the configured override.
    pub fn device_class(&self) -> Option<&str> {
        self.entity()
            .and_then(|e| e.device_class.as_deref())
            .or(self.config.device_class.as_deref())
    }

    /// The device-class picker is only offered for entities without one.
    pub fn show_device_class_picker(&self) -> bool {
        self.entity().is_some_and(|e| e.device_class.is_none())
    }

    /// Scale tabs need a category to suggest anything.
    pub fn show_scale_tabs(&self) -> bool {
        self.device_class().is_some()
    }

    pub fn active_tab(&self) -> ScaleTab {
        self.active_tab
    }

    pub fn set_active_tab(&mut self, tab: ScaleTab) {
        self.active_tab = tab;
    }

    /// Catalog pickers are disabled while an inline scale is configured.
    pub fn pickers_disabled(&self) -> bool {
        self.config.scale.as_ref().is_some_and(ScaleChoice::is_custom)
    }

    /// Catalog key of the scale in effect, defaults included.
    pub fn selected_key<'c>(&'c self, catalog: &'c ScaleCatalog) -> Option<&'c str> {
        match &self.config.scale {
            Some(ScaleChoice::Named(key)) => Some(key),
            Some(ScaleChoice::Custom(_)) => None,
            None => Some(catalog.default_for(self.device_class())),
        }
    }

    /// Absolute scales made for the current device class.
    pub fn absolute_choices<'c>(&self, catalog: &'c ScaleCatalog) -> Vec<&'c ScaleDefinition> {
        match self.device_class() {
            Some(class) => catalog.by_attribute(ScaleAttribute::DeviceClass, class),
            None => Vec::new(),
        }
    }

    /// Every relative scale, with its legend gradient.
    pub fn relative_choices(&self, engine: &ScaleEngine<'_>) -> Vec<ScalePreview> {
        engine
            .catalog()
            .by_attribute(ScaleAttribute::Kind, ScaleKind::Relative.as_str())
            .into_iter()
            .filter_map(|def| {
                let key = def.key.clone()?;
                let built = engine.build_named(&key, None, None).ok()?;
                Some(ScalePreview {
                    key,
                    name: def.name.clone(),
                    swatch: built.gradient().colors(LEGEND_SAMPLES),
                    legend_css: built.legend_gradient_css,
                })
            })
            .collect()
    }

    /// Documentation for the tab, if the scale in effect is a catalog scale
    /// of that tab's kind.
    pub fn scale_docs<'c>(&'c self, catalog: &'c ScaleCatalog, tab: ScaleTab) -> Option<&'c Documentation> {
        let def = catalog.lookup(self.selected_key(catalog)?).ok()?;
        if Some(def.kind) != tab.kind() {
            return None;
        }
        def.documentation.as_ref()
    }

    /// Warning for entities whose state class is not kept in long-term statistics.
    pub fn state_class_warning(&self) -> Option<String> {
        let entity = self.entity()?;
        let state_class = entity.state_class.as_deref();
        if state_class.is_some_and(|sc| SUPPORTED_STATE_CLASSES.contains(&sc)) {
            return None;
        }
        Some(format!(
            "This entity has a state_class attribute set to {}. Its data is not saved to \
             long-term statistics, which drive the heatmap; no results will be shown.",
            state_class.unwrap_or("undefined")
        ))
    }

    /// Smoothing only applies to cumulative sources.
    pub fn smoothing_available(&self) -> bool {
        self.entity()
            .and_then(|e| e.state_class.as_deref())
            .is_some_and(|sc| matches!(sc, "total" | "total_increasing"))
    }

    /// Set the field at `path` (e.g. `days`, `data.min`) to `value`.
    ///
    /// Setting `device_class` also selects that class's default scale.
    /// Setting `entity` to one with its own device class selects that class's
    /// default scale and drops the `device_class` override.
    pub fn update(&mut self, catalog: &ScaleCatalog, path: &str, value: FieldValue) -> Result<()> {
        let mut doc = serde_json::to_value(&self.config)
            .map_err(|e| HeatmapError::ConfigData(e.to_string()))?;
        let Value::Object(root) = &mut doc else {
            return Err(HeatmapError::ConfigData("configuration is not a mapping".into()));
        };

        let mut default_scale = None;
        match (path, &value) {
            ("device_class", FieldValue::Text(class)) => {
                default_scale = Some(catalog.default_for(Some(class)));
            }
            ("entity", FieldValue::Text(id)) => {
                if let Some(class) = self.entities.get(id).and_then(|e| e.device_class.as_deref()) {
                    default_scale = Some(catalog.default_for(Some(class)));
                    root.remove("device_class");
                }
            }
            _ => {}
        }
        if let Some(key) = default_scale {
            root.insert("scale".into(), Value::String(key.to_string()));
        }

        set_path(root, path, value.into_json());

        self.config = serde_json::from_value(doc).map_err(|e| HeatmapError::ConfigData(e.to_string()))?;
        if default_scale.is_some() {
            self.active_tab = tab_for_scale(catalog, self.config.scale.as_ref());
        }
        log::debug!("editor set `{path}`");
        Ok(())
    }

    /// Toggle the `auto` checkbox of a range bound (`data.min` / `data.max`).
    pub fn set_auto(&mut self, catalog: &ScaleCatalog, path: &str, auto: bool) -> Result<()> {
        let value = if auto {
            FieldValue::Text("auto".into())
        } else {
            FieldValue::Number(0.0)
        };
        self.update(catalog, path, value)
    }
}

/// Documentation text with markup removed, for widgets that cannot render HTML.
pub fn plain_text(html: &str) -> String {
    let mut out = String::with_capacity(html.len());
    let mut in_tag = false;
    for ch in html.chars() {
        match ch {
            '<' => in_tag = true,
            '>' if in_tag => in_tag = false,
            _ if !in_tag => out.push(ch),
            _ => {}
        }
    }
    out.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Write `value` at a dotted path, creating intermediate mappings.
fn set_path(root: &mut Map<String, Value>, path: &str, value: Value) {
    let mut segments: Vec<&str> = path.split('.').collect();
    let Some(last) = segments.pop() else {
        return;
    };
    let mut node = root;
    for segment in segments {
        let entry = node
            .entry(segment.to_string())
            .or_insert_with(|| Value::Object(Map::new()));
        if !entry.is_object() {
            *entry = Value::Object(Map::new());
        }
        let Value::Object(next) = entry else {
            return;
        };
        node = next;
    }
    node.insert(last.to_string(), value);
}
