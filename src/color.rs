//! Colour literals and gradient interpolation.
//!
//! [`Color`] is a plain 8-bit sRGB colour that can be parsed from the colour
//! literals used in scale definitions (`#rgb`, `#rrggbb`, `rgb(r, g, b)` and
//! CSS colour names). [`Gradient`] maps a number onto a list of colours bound
//! to a numeric domain, interpolating in Oklab so that lightness changes
//! evenly between neighbouring stops.

use std::fmt;
use std::str::FromStr;

use eframe::egui::Color32;
use palette::{IntoColor, Mix, Oklab, Srgb, Xyz};

use crate::error::{HeatmapError, Result};

/// An opaque 8-bit sRGB colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const BLACK: Color = Color::from_rgb(0, 0, 0);
    pub const WHITE: Color = Color::from_rgb(255, 255, 255);

    pub const fn from_rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parse a colour literal.
    ///
    /// Accepts `#rgb` / `#rrggbb` hex codes, `rgb(r, g, b)` with 0-255
    /// components and CSS colour names (case-insensitive).
    pub fn parse(spec: &str) -> Result<Self> {
        let s = spec.trim();
        let unknown = || HeatmapError::UnknownColorSpec(spec.to_string());

        if s.starts_with('#') {
            let rgb = Srgb::<u8>::from_str(s).map_err(|_| unknown())?;
            return Ok(Self::from_rgb(rgb.red, rgb.green, rgb.blue));
        }

        let lower = s.to_ascii_lowercase();
        if let Some(args) = lower
            .strip_prefix("rgb(")
            .and_then(|rest| rest.strip_suffix(')'))
        {
            let parts: Vec<u8> = args
                .split(',')
                .map(|p| p.trim().parse::<u8>())
                .collect::<std::result::Result<_, _>>()
                .map_err(|_| unknown())?;
            return match parts.as_slice() {
                [r, g, b] => Ok(Self::from_rgb(*r, *g, *b)),
                _ => Err(unknown()),
            };
        }

        palette::named::from_str(&lower)
            .map(|rgb| Self::from_rgb(rgb.red, rgb.green, rgb.blue))
            .ok_or_else(unknown)
    }

    /// Lowercase `#rrggbb` representation.
    pub fn to_hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    /// Relative luminance (CIE Y, 0.0 = black, 1.0 = white).
    pub fn luminance(&self) -> f32 {
        let xyz: Xyz = self.to_srgb().into_color();
        xyz.y
    }

    /// Black or white, whichever reads better on top of this colour.
    pub fn contrasting_text(&self) -> Color {
        if self.luminance() > 0.4 {
            Color::BLACK
        } else {
            Color::WHITE
        }
    }

    pub fn to_color32(&self) -> Color32 {
        Color32::from_rgb(self.r, self.g, self.b)
    }

    fn to_srgb(self) -> Srgb {
        Srgb::new(self.r, self.g, self.b).into_format()
    }

    fn from_srgb(rgb: Srgb) -> Self {
        let channel = |c: f32| (c.clamp(0.0, 1.0) * 255.0).round() as u8;
        Self::from_rgb(channel(rgb.red), channel(rgb.green), channel(rgb.blue))
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl FromStr for Color {
    type Err = HeatmapError;

    fn from_str(s: &str) -> Result<Self> {
        Color::parse(s)
    }
}

impl From<Color> for Color32 {
    fn from(c: Color) -> Self {
        c.to_color32()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Gradient
// ─────────────────────────────────────────────────────────────────────────────

/// A colour ramp bound to a numeric domain.
///
/// Each colour sits at a position in the domain; inputs between two positions
/// are interpolated, inputs outside the domain take the nearest end colour.
#[derive(Debug, Clone, PartialEq)]
pub struct Gradient {
    colors: Vec<Color>,
    /// Stop positions normalised to [0, 1], same length as `colors`.
    positions: Vec<f64>,
    min: f64,
    max: f64,
}

impl Gradient {
    /// Evenly spaced colours over the implicit domain `[0, 1]`.
    pub fn new(colors: Vec<Color>) -> Self {
        let last = colors.len().saturating_sub(1).max(1) as f64;
        let positions = (0..colors.len()).map(|i| i as f64 / last).collect();
        Self {
            colors,
            positions,
            min: 0.0,
            max: 1.0,
        }
    }

    /// Colours pinned to explicit breakpoints.
    ///
    /// Falls back to [`Gradient::new`] when `domain` does not have exactly one
    /// breakpoint per colour.
    pub fn with_domain(colors: Vec<Color>, domain: &[f64]) -> Self {
        if domain.len() != colors.len() || colors.is_empty() {
            return Self::new(colors);
        }
        let min = domain[0];
        let max = domain[domain.len() - 1];
        let span = max - min;
        let positions = domain
            .iter()
            .map(|v| if span > 0.0 { (v - min) / span } else { 0.0 })
            .collect();
        Self {
            colors,
            positions,
            min,
            max,
        }
    }

    /// The `(first, last)` breakpoint of the domain.
    pub fn domain(&self) -> (f64, f64) {
        (self.min, self.max)
    }

    /// Colour at `x`, clamped to the domain end colours.
    pub fn at(&self, x: f64) -> Color {
        let (first, last) = match (self.colors.first(), self.colors.last()) {
            (Some(f), Some(l)) => (*f, *l),
            _ => return Color::BLACK,
        };
        let span = self.max - self.min;
        let t = if span > 0.0 { (x - self.min) / span } else { 0.0 };
        if t.is_nan() || t <= self.positions[0] {
            return first;
        }
        if t >= self.positions[self.positions.len() - 1] {
            return last;
        }

        for i in 0..self.positions.len() - 1 {
            let (p0, p1) = (self.positions[i], self.positions[i + 1]);
            if t >= p0 && t < p1 {
                let factor = ((t - p0) / (p1 - p0)) as f32;
                let a: Oklab = self.colors[i].to_srgb().into_color();
                let b: Oklab = self.colors[i + 1].to_srgb().into_color();
                let rgb: Srgb = a.mix(b, factor).into_color();
                return Color::from_srgb(rgb);
            }
        }
        last
    }

    /// `n` colours sampled evenly from the start to the end of the domain.
    pub fn colors(&self, n: usize) -> Vec<Color> {
        match n {
            0 => Vec::new(),
            1 => vec![self.at(self.min)],
            _ => {
                let step = (self.max - self.min) / (n - 1) as f64;
                (0..n).map(|i| self.at(self.min + step * i as f64)).collect()
            }
        }
    }
}
