//! The scale engine: turns a [`ScaleDefinition`] into a [`RenderableScale`].
//!
//! Building a scale:
//! 1. copies the steps (catalog data and user-supplied config stay untouched),
//! 2. converts step values when the caller's unit system prefers another unit
//!    and a conversion is registered for the category's domain,
//! 3. binds a [`Gradient`] to the step values (or spaces colours evenly when
//!    not every step has a value),
//! 4. samples the gradient into a CSS stop list for the legend.
//!
//! Documentation is only kept for catalog scales; user-supplied text is
//! never displayed.

use crate::color::{Color, Gradient};
use crate::data::catalog::ScaleCatalog;
use crate::data::grid::DataRange;
use crate::data::round2;
use crate::data::scale::{Documentation, ScaleChoice, ScaleDefinition, ScaleKind, ScaleStep};
use crate::data::units::{conversion_for, UnitSystem};
use crate::error::Result;

/// Number of colours sampled for the legend gradient (one stop every 5%).
pub const LEGEND_SAMPLES: usize = 21;

/// Number of ticks drawn under a relative scale's legend.
pub const RELATIVE_TICKS: usize = 6;

/// Where a scale definition came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScaleOrigin {
    /// Shipped with the crate; documentation is trusted.
    Catalog,
    /// Supplied inline by the user.
    Custom,
}

/// A legend axis label.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LegendTick {
    /// Horizontal position along the legend, 0-100.
    pub position_percent: f64,
    pub label: f64,
}

/// A scale ready for rendering.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderableScale {
    pub key: Option<String>,
    pub name: String,
    pub kind: ScaleKind,
    /// Steps after unit conversion.
    pub steps: Vec<ScaleStep>,
    /// Unit of the (possibly converted) step values.
    pub display_unit: Option<String>,
    pub documentation: Option<Documentation>,
    /// `"<color> 0%, <color> 5%, ..., <color> 100%"`
    pub legend_gradient_css: String,
    pub origin: ScaleOrigin,
    gradient: Gradient,
}

impl RenderableScale {
    pub fn gradient(&self) -> &Gradient {
        &self.gradient
    }

    /// Colour for an already-scaled input.
    ///
    /// Absolute scales take the raw physical value. Relative scales expect a
    /// value normalised to `[0, 1]`; anything outside is clamped.
    pub fn color_at(&self, x: f64) -> Color {
        match self.kind {
            ScaleKind::Absolute => self.gradient.at(x),
            ScaleKind::Relative => self.gradient.at(x.clamp(0.0, 1.0)),
        }
    }

    /// Colour for a raw data value, normalising against `range` for relative
    /// scales. A relative scale without a usable range renders its midpoint.
    pub fn color_for(&self, value: f64, range: Option<DataRange>) -> Color {
        match self.kind {
            ScaleKind::Absolute => self.gradient.at(value),
            ScaleKind::Relative => {
                let t = range.map(|r| r.normalize(value)).unwrap_or(0.5);
                self.color_at(t)
            }
        }
    }

    /// Legend tick layout.
    ///
    /// Relative scales get six evenly spaced ticks labelled from the data
    /// range (none without a range); absolute scales get one tick per step.
    pub fn ticks(&self, range: Option<DataRange>) -> Vec<LegendTick> {
        match self.kind {
            ScaleKind::Relative => {
                let Some(range) = range else {
                    return Vec::new();
                };
                let diff = range.max - range.min;
                let last = (RELATIVE_TICKS - 1) as f64;
                (0..RELATIVE_TICKS)
                    .map(|i| LegendTick {
                        position_percent: i as f64 * 100.0 / last,
                        label: round2(range.min + diff / last * i as f64),
                    })
                    .collect()
            }
            ScaleKind::Absolute => {
                let values: Vec<f64> = self.steps.iter().filter_map(|s| s.value).collect();
                let (Some(&first), Some(&last)) = (values.first(), values.last()) else {
                    return Vec::new();
                };
                let span = last - first;
                values
                    .iter()
                    .map(|&v| LegendTick {
                        position_percent: if span > 0.0 {
                            (v - first) / span * 100.0
                        } else {
                            0.0
                        },
                        label: v,
                    })
                    .collect()
            }
        }
    }

    /// Full CSS background for the legend bar.
    pub fn legend_css(&self) -> String {
        format!("linear-gradient(90deg, {})", self.legend_gradient_css)
    }
}

/// Builds [`RenderableScale`]s against a catalog.
#[derive(Debug, Clone, Copy)]
pub struct ScaleEngine<'a> {
    catalog: &'a ScaleCatalog,
}

impl ScaleEngine<'static> {
    /// Engine over the built-in catalog.
    pub fn builtin() -> Self {
        Self::new(ScaleCatalog::builtin())
    }
}

impl<'a> ScaleEngine<'a> {
    pub fn new(catalog: &'a ScaleCatalog) -> Self {
        Self { catalog }
    }

    pub fn catalog(&self) -> &'a ScaleCatalog {
        self.catalog
    }

    /// Build the scale a configuration asks for. Without an explicit choice
    /// the category default (or the global fallback) is used.
    pub fn resolve(
        &self,
        choice: Option<&ScaleChoice>,
        category: Option<&str>,
        units: Option<&UnitSystem>,
    ) -> Result<RenderableScale> {
        match choice {
            Some(ScaleChoice::Named(key)) => self.build_named(key, category, units),
            Some(ScaleChoice::Custom(def)) => self.build(def, ScaleOrigin::Custom, category, units),
            None => self.build_named(self.catalog.default_for(category), category, units),
        }
    }

    /// Build a catalog scale by key.
    pub fn build_named(
        &self,
        key: &str,
        category: Option<&str>,
        units: Option<&UnitSystem>,
    ) -> Result<RenderableScale> {
        let def = self.catalog.lookup(key)?;
        self.build(def, ScaleOrigin::Catalog, category, units)
    }

    /// Build a scale from a definition.
    pub fn build(
        &self,
        def: &ScaleDefinition,
        origin: ScaleOrigin,
        category: Option<&str>,
        units: Option<&UnitSystem>,
    ) -> Result<RenderableScale> {
        def.validate()?;

        let mut steps = def.steps.clone();
        let mut display_unit = def.unit.clone();

        if let (Some(unit), Some(category), Some(units)) = (def.unit.as_deref(), category, units) {
            let target = self
                .catalog
                .unit_domain_for(category)
                .and_then(|domain| Some((domain, units.unit_for(domain)?)));
            if let Some((domain, target)) = target {
                if target != unit {
                    if let Some(convert) = conversion_for(domain, unit, target) {
                        for step in steps.iter_mut() {
                            step.value = step.value.map(convert);
                        }
                        display_unit = Some(target.to_string());
                    }
                }
            }
        }

        let colors = steps
            .iter()
            .map(|s| Color::parse(&s.color))
            .collect::<Result<Vec<_>>>()?;
        // Unit conversion keeps every breakpoint, so the definition decides.
        let gradient = if def.has_full_domain() {
            let domain: Vec<f64> = steps.iter().filter_map(|s| s.value).collect();
            Gradient::with_domain(colors, &domain)
        } else {
            Gradient::new(colors)
        };

        let legend_gradient_css = gradient
            .colors(LEGEND_SAMPLES)
            .iter()
            .enumerate()
            .map(|(idx, color)| format!("{color} {}%", idx * 5))
            .collect::<Vec<_>>()
            .join(", ");

        let documentation = match origin {
            ScaleOrigin::Catalog => def.documentation.clone(),
            ScaleOrigin::Custom => None,
        };

        log::debug!(
            "built {} scale `{}` ({} steps, unit {:?})",
            def.kind.as_str(),
            def.key.as_deref().unwrap_or(&def.name),
            steps.len(),
            display_unit
        );

        Ok(RenderableScale {
            key: def.key.clone(),
            name: def.name.clone(),
            kind: def.kind,
            steps,
            display_unit,
            documentation,
            legend_gradient_css,
            origin,
            gradient,
        })
    }
}
