//! The scale catalog: built-in scale definitions and the per-category defaults.
//!
//! The catalog is read-only after construction. [`ScaleCatalog::builtin`]
//! returns a process-wide instance parsed once from the YAML shipped in
//! `assets/`.

use std::collections::{BTreeMap, HashMap};

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::color::Color;
use crate::data::scale::{ScaleAttribute, ScaleDefinition};
use crate::error::{HeatmapError, Result};

/// Scale used whenever a category has no default of its own.
pub const DEFAULT_SCALE_KEY: &str = "iron red";

const BUILTIN_SCALES: &str = include_str!("../../assets/scales.yaml");
const BUILTIN_CATEGORIES: &str = include_str!("../../assets/categories.yaml");

static BUILTIN: Lazy<ScaleCatalog> = Lazy::new(|| {
    ScaleCatalog::from_yaml(BUILTIN_SCALES, BUILTIN_CATEGORIES)
        .expect("built-in scale catalog is valid")
});

/// Registry entry for one sensor category (Home Assistant device class).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryEntry {
    pub category: String,
    /// Key of the scale to suggest for this category.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_scale: Option<String>,
    /// Which entry of a [`crate::data::units::UnitSystem`] applies to this
    /// category's values.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit_system: Option<String>,
}

/// Named scale definitions plus the category registry.
#[derive(Debug, Clone)]
pub struct ScaleCatalog {
    scales: Vec<ScaleDefinition>,
    by_key: HashMap<String, usize>,
    categories: BTreeMap<String, CategoryEntry>,
    fallback_key: String,
}

impl ScaleCatalog {
    /// The catalog compiled into the crate.
    pub fn builtin() -> &'static ScaleCatalog {
        &BUILTIN
    }

    /// Parse a catalog from its YAML data files.
    pub fn from_yaml(scales_yaml: &str, categories_yaml: &str) -> Result<Self> {
        let scales: Vec<ScaleDefinition> = serde_yaml::from_str(scales_yaml)
            .map_err(|e| HeatmapError::CatalogData(format!("scales: {e}")))?;
        let categories: Vec<CategoryEntry> = serde_yaml::from_str(categories_yaml)
            .map_err(|e| HeatmapError::CatalogData(format!("categories: {e}")))?;
        Self::new(scales, categories)
    }

    /// Build a catalog, validating every scale and every category default.
    pub fn new(scales: Vec<ScaleDefinition>, categories: Vec<CategoryEntry>) -> Result<Self> {
        let mut by_key = HashMap::with_capacity(scales.len());
        for (idx, scale) in scales.iter().enumerate() {
            let key = scale.key.clone().ok_or_else(|| {
                HeatmapError::CatalogData(format!("scale `{}` has no key", scale.name))
            })?;
            scale.validate()?;
            for step in &scale.steps {
                Color::parse(&step.color)?;
            }
            if by_key.insert(key.clone(), idx).is_some() {
                return Err(HeatmapError::CatalogData(format!("duplicate scale key `{key}`")));
            }
        }

        let mut registry = BTreeMap::new();
        for entry in categories {
            if let Some(default) = &entry.default_scale {
                if !by_key.contains_key(default) {
                    return Err(HeatmapError::CatalogData(format!(
                        "category `{}` defaults to unknown scale `{default}`",
                        entry.category
                    )));
                }
            }
            registry.insert(entry.category.clone(), entry);
        }

        let catalog = Self {
            scales,
            by_key,
            categories: registry,
            fallback_key: DEFAULT_SCALE_KEY.to_string(),
        };
        log::debug!(
            "scale catalog loaded: {} scales, {} categories",
            catalog.scales.len(),
            catalog.categories.len()
        );
        Ok(catalog)
    }

    /// Replace the global fallback scale. The key must exist.
    pub fn with_fallback(mut self, key: &str) -> Result<Self> {
        self.lookup(key)?;
        self.fallback_key = key.to_string();
        Ok(self)
    }

    pub fn scales(&self) -> &[ScaleDefinition] {
        &self.scales
    }

    pub fn categories(&self) -> impl Iterator<Item = &CategoryEntry> {
        self.categories.values()
    }

    pub fn category(&self, name: &str) -> Option<&CategoryEntry> {
        self.categories.get(name)
    }

    pub fn fallback_key(&self) -> &str {
        &self.fallback_key
    }

    /// Scale definition by key.
    pub fn lookup(&self, key: &str) -> Result<&ScaleDefinition> {
        self.by_key
            .get(key)
            .map(|&idx| &self.scales[idx])
            .ok_or_else(|| HeatmapError::UnknownScaleKey(key.to_string()))
    }

    /// All scales whose `field` equals `value`, in catalog order.
    pub fn by_attribute(&self, field: ScaleAttribute, value: &str) -> Vec<&ScaleDefinition> {
        self.scales
            .iter()
            .filter(|scale| field.value_of(scale) == Some(value))
            .collect()
    }

    /// Default scale key for a category. Never fails: unknown categories and
    /// categories without a default get the global fallback.
    pub fn default_for(&self, category: Option<&str>) -> &str {
        category
            .and_then(|c| self.categories.get(c))
            .and_then(|entry| entry.default_scale.as_deref())
            .unwrap_or(&self.fallback_key)
    }

    /// Unit-system domain relevant to a category, if any.
    pub fn unit_domain_for(&self, category: &str) -> Option<&str> {
        self.categories
            .get(category)
            .and_then(|entry| entry.unit_system.as_deref())
    }
}
