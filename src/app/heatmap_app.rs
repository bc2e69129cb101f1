//! [`HeatmapApp`] wraps a [`HeatmapCard`] with its heatmap and editor panels
//! and implements [`eframe::App`]. It owns the statistics source and decides
//! when to refetch.

use std::time::{Duration, Instant};

use chrono::Utc;
use eframe::egui;

use crate::card::{EntityInfo, HeatmapCard};
use crate::config::HeatmapConfig;
use crate::data::catalog::ScaleCatalog;
use crate::data::engine::ScaleEngine;
use crate::data::statistics::StatisticsSource;
use crate::data::units::UnitSystem;
use crate::editor::ConfigEditor;
use crate::error::Result;
use crate::panels::editor_ui::EditorPanel;
use crate::panels::heatmap_ui::HeatmapPanel;
use crate::panels::panel_trait::{CardData, Panel};

// ─────────────────────────────────────────────────────────────────────────────
// RefreshThrottle
// ─────────────────────────────────────────────────────────────────────────────

/// Limits how often statistics are refetched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RefreshThrottle {
    interval: Duration,
    last: Option<Instant>,
}

impl RefreshThrottle {
    pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(10 * 60);

    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last: None,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// True before the first fetch and once `interval` has passed since the last.
    pub fn due(&self, now: Instant) -> bool {
        match self.last {
            None => true,
            Some(last) => now.saturating_duration_since(last) >= self.interval,
        }
    }

    pub fn mark(&mut self, now: Instant) {
        self.last = Some(now);
    }

    /// Make the next [`due`](Self::due) check succeed.
    pub fn reset(&mut self) {
        self.last = None;
    }
}

impl Default for RefreshThrottle {
    fn default() -> Self {
        Self::new(Self::DEFAULT_INTERVAL)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// HeatmapApp
// ─────────────────────────────────────────────────────────────────────────────

pub struct HeatmapApp {
    pub card: HeatmapCard,
    /// Window title.
    pub title: String,
    catalog: &'static ScaleCatalog,
    source: Box<dyn StatisticsSource>,
    heatmap: HeatmapPanel,
    editor: EditorPanel,
    throttle: RefreshThrottle,
    /// Last scale build failure, shown above the card.
    scale_error: Option<String>,
    /// Result of the last config save.
    notice: Option<String>,
}

impl HeatmapApp {
    /// Build the app for a configuration. `entities` are the sources the
    /// editor offers; the configured entity is looked up among them.
    pub fn new(
        config: HeatmapConfig,
        units: UnitSystem,
        entities: Vec<EntityInfo>,
        source: Box<dyn StatisticsSource>,
    ) -> Result<Self> {
        let catalog = ScaleCatalog::builtin();
        let card = HeatmapCard::new(config.clone(), units)?;
        let editor = ConfigEditor::new(catalog, config, entities);
        let mut app = Self {
            card,
            title: "Heatmap card".to_string(),
            catalog,
            source,
            heatmap: HeatmapPanel::default(),
            editor: EditorPanel::new(editor),
            throttle: RefreshThrottle::default(),
            scale_error: None,
            notice: None,
        };
        app.sync_entity();
        Ok(app)
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_throttle(mut self, throttle: RefreshThrottle) -> Self {
        self.throttle = throttle;
        self
    }

    /// Keep the card bound to the entity the editor has selected.
    fn sync_entity(&mut self) {
        if let Some(entity) = self.editor.editor().entity() {
            self.card.set_entity(entity.clone());
        }
    }

    fn rebuild_if_needed(&mut self) {
        if !self.card.needs_rebuild() {
            return;
        }
        match self.card.rebuild_scale(&ScaleEngine::new(self.catalog)) {
            Ok(_) => self.scale_error = None,
            Err(e) => {
                log::warn!("failed to build scale: {e}");
                self.scale_error = Some(e.to_string());
            }
        }
    }

    fn refresh(&mut self, now: Instant) {
        self.card
            .refresh(self.source.as_mut(), chrono::Local, Utc::now());
        self.throttle.mark(now);
        log::debug!("next statistics refresh in {:?}", self.throttle.interval());
    }

    fn render_menu(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::top("heatmap_menu").show(ctx, |ui| {
            egui::MenuBar::new().ui(ui, |ui| {
                ui.menu_button("View", |ui| {
                    self.heatmap.render_menu(ui);
                    self.editor.render_menu(ui);
                    ui.separator();
                    ui.checkbox(&mut self.heatmap.state_mut().detached, "Heatmap in window");
                    ui.checkbox(&mut self.editor.state_mut().detached, "Editor in window");
                });
                if let Some(notice) = &self.notice {
                    ui.separator();
                    ui.label(notice.as_str());
                }
            });
        });
    }
}

impl eframe::App for HeatmapApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.sync_entity();
        self.rebuild_if_needed();

        let now = Instant::now();
        if self.throttle.due(now) {
            self.refresh(now);
        }

        self.render_menu(ctx);

        let mut data = CardData {
            card: &mut self.card,
            engine: ScaleEngine::new(self.catalog),
            request_refresh: false,
            request_save_config: None,
        };

        let editor_state = *self.editor.state();
        if editor_state.visible && !editor_state.detached {
            egui::SidePanel::right("heatmap_editor")
                .resizable(true)
                .default_width(340.0)
                .min_width(240.0)
                .show(ctx, |ui| {
                    egui::ScrollArea::vertical().show(ui, |ui| {
                        self.editor.render_panel(ui, &mut data);
                    });
                });
        }

        egui::CentralPanel::default().show(ctx, |ui| {
            if let Some(err) = &self.scale_error {
                ui.colored_label(ui.visuals().error_fg_color, err.as_str());
            }
            let state = *self.heatmap.state();
            if state.visible && !state.detached {
                egui::ScrollArea::vertical().show(ui, |ui| {
                    self.heatmap.render_panel(ui, &mut data);
                });
            }
        });

        self.heatmap.show_detached(ctx, &mut data);
        self.editor.show_detached(ctx, &mut data);

        let CardData {
            request_refresh,
            request_save_config,
            ..
        } = data;

        if let Some(path) = request_save_config {
            self.notice = Some(match self.card.config().save_to_path(&path) {
                Ok(()) => format!("Saved {}", path.display()),
                Err(e) => {
                    log::warn!("failed to save config: {e}");
                    e.to_string()
                }
            });
        }

        if request_refresh {
            self.throttle.reset();
            ctx.request_repaint();
        } else {
            ctx.request_repaint_after(Duration::from_secs(30));
        }
    }
}
