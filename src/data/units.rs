//! Unit systems and the conversions the scale engine knows how to apply.
//!
//! Converted values are truncated to whole units.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A conversion between two units of the same physical domain.
pub type Conversion = fn(f64) -> f64;

/// The caller's preferred unit per physical-quantity domain
/// (e.g. `"temperature" -> "°F"`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UnitSystem {
    units: BTreeMap<String, String>,
}

impl UnitSystem {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn metric() -> Self {
        Self::new()
            .with("temperature", "°C")
            .with("length", "km")
            .with("mass", "kg")
            .with("pressure", "Pa")
            .with("volume", "L")
            .with("wind_speed", "m/s")
    }

    pub fn us_customary() -> Self {
        Self::new()
            .with("temperature", "°F")
            .with("length", "mi")
            .with("mass", "lb")
            .with("pressure", "psi")
            .with("volume", "gal")
            .with("wind_speed", "mph")
    }

    pub fn with(mut self, domain: impl Into<String>, unit: impl Into<String>) -> Self {
        self.units.insert(domain.into(), unit.into());
        self
    }

    pub fn unit_for(&self, domain: &str) -> Option<&str> {
        self.units.get(domain).map(String::as_str)
    }
}

fn celsius_to_fahrenheit(v: f64) -> f64 {
    (v * 1.8 + 32.0).trunc()
}

fn fahrenheit_to_celsius(v: f64) -> f64 {
    ((v - 32.0) / 1.8).trunc()
}

/// Look up the conversion for `domain` from unit `from` to unit `to`.
pub fn conversion_for(domain: &str, from: &str, to: &str) -> Option<Conversion> {
    match (domain, from, to) {
        ("temperature", "°C", "°F") => Some(celsius_to_fahrenheit),
        ("temperature", "°F", "°C") => Some(fahrenheit_to_celsius),
        _ => None,
    }
}
