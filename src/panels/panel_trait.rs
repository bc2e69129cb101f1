use std::path::PathBuf;

use egui::{Context, Ui};

use crate::card::HeatmapCard;
use crate::data::engine::ScaleEngine;

#[derive(Debug, Clone, Copy)]
pub struct PanelState {
    pub title: &'static str,
    pub icon: &'static str,
    pub visible: bool,
    pub detached: bool,
}

impl PanelState {
    pub fn new(title: &'static str, icon: &'static str) -> Self {
        Self {
            title,
            icon,
            visible: true,
            detached: false,
        }
    }
}

/// What panels get to read and mutate during one frame.
pub struct CardData<'a> {
    pub card: &'a mut HeatmapCard,
    pub engine: ScaleEngine<'a>,
    /// Set by a panel to have the app refetch statistics after this frame.
    pub request_refresh: bool,
    pub request_save_config: Option<PathBuf>,
}

pub trait Panel {
    fn state(&self) -> &PanelState;
    fn state_mut(&mut self) -> &mut PanelState;

    fn title(&self) -> &'static str {
        self.state().title
    }

    fn title_and_icon(&self) -> String {
        format!("{} {}", self.state().icon, self.state().title)
    }

    fn render_menu(&mut self, ui: &mut Ui) {
        let label = self.title_and_icon();
        ui.checkbox(&mut self.state_mut().visible, label);
    }

    fn render_panel(&mut self, ui: &mut Ui, data: &mut CardData<'_>);

    /// Show the panel in its own window while detached.
    fn show_detached(&mut self, ctx: &Context, data: &mut CardData<'_>) {
        let state = *self.state();
        if !(state.visible && state.detached) {
            return;
        }
        let mut open = true;
        let mut dock_clicked = false;
        egui::Window::new(state.title)
            .open(&mut open)
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    ui.strong(state.title);
                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        if ui
                            .button("Dock")
                            .on_hover_text("Attach this panel to the side bar")
                            .clicked()
                        {
                            dock_clicked = true;
                        }
                    });
                });
                ui.separator();
                self.render_panel(ui, data);
            });

        let st = self.state_mut();
        if dock_clicked {
            st.detached = false;
        } else if !open {
            st.visible = false;
            st.detached = false;
        }
    }
}
