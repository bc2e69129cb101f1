//! Standalone heatmap application.
//!
//! | Sub-module        | Responsibility |
//! | ----------------- | -------------- |
//! | [`heatmap_app`]   | [`HeatmapApp`] (eframe) wrapper: panels, scale rebuilds, throttled refetch |
//! | [`run`]           | Top-level [`run_heatmap()`] entry point |

mod heatmap_app;
mod run;

pub use heatmap_app::{HeatmapApp, RefreshThrottle};
pub use run::run_heatmap;
