//! Top-level entry point for running the heatmap card as a native window.

use eframe::egui;

use super::HeatmapApp;

/// Open `app` in a native window. Blocks until the window is closed.
///
/// A default window size is applied when `options` does not set one.
pub fn run_heatmap(app: HeatmapApp, mut options: eframe::NativeOptions) -> eframe::Result<()> {
    if options.viewport.inner_size.is_none() {
        options.viewport = options
            .viewport
            .clone()
            .with_inner_size(egui::vec2(1280.0, 780.0));
    }

    let title = app.title.clone();
    log::info!("starting `{title}`");
    eframe::run_native(&title, options, Box::new(|_cc| Ok(Box::new(app))))
}
