//! The heatmap card view: title, day × hour table, status line, legend and
//! the click-to-inspect detail box.

use egui::{Align2, CornerRadius, FontId, Pos2, Rect, Sense, Stroke, StrokeKind, Ui};

use super::panel_trait::{CardData, Panel, PanelState};
use crate::card::HeatmapCard;
use crate::data::engine::RenderableScale;
use crate::data::time_format::{column_headers, HEADER_FILLER};

const ROW_TITLE_WIDTH: f32 = 56.0;
const LEGEND_HEIGHT: f32 = 10.0;
const LEGEND_SLICES: usize = 100;

#[derive(Debug, Clone)]
pub struct HeatmapPanel {
    state: PanelState,
    /// Selected (row, bucket) for the detail box.
    pub selected: Option<(usize, usize)>,
    pub cell_height: f32,
}

impl Default for HeatmapPanel {
    fn default() -> Self {
        Self {
            state: PanelState::new("Heatmap", "▦"),
            selected: None,
            cell_height: 16.0,
        }
    }
}

impl Panel for HeatmapPanel {
    fn state(&self) -> &PanelState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut PanelState {
        &mut self.state
    }

    fn render_panel(&mut self, ui: &mut Ui, data: &mut CardData<'_>) {
        let card: &HeatmapCard = &*data.card;
        if let Some(title) = card.title() {
            ui.heading(title);
        }
        let Some(scale) = card.scale() else {
            ui.label("No scale available.");
            return;
        };

        self.render_table(ui, card);

        if let Some(msg) = card.status().message() {
            ui.add_space(6.0);
            ui.strong(msg);
        }
        if card.config().display.legend {
            ui.add_space(12.0);
            render_legend(ui, card, scale);
        }
        self.render_details(ui, card);

        ui.add_space(4.0);
        if ui
            .small_button("Refresh")
            .on_hover_text("Fetch statistics again now")
            .clicked()
        {
            data.request_refresh = true;
        }
    }
}

impl HeatmapPanel {
    fn render_table(&mut self, ui: &mut Ui, card: &HeatmapCard) {
        let config = card.config();
        let headers = column_headers(config.resolution, config.display.time_format);
        let avail_w = ui.available_width();
        let col_w = ((avail_w - ROW_TITLE_WIDTH) / headers.len().max(1) as f32).max(1.0);
        let visuals = ui.visuals().clone();
        let text_color = visuals.weak_text_color();
        let font = FontId::proportional(11.0);

        // Fillers are skipped at high resolution.
        let (header_rect, _) = ui.allocate_exact_size(egui::vec2(avail_w, 14.0), Sense::hover());
        let painter = ui.painter();
        painter.text(
            Pos2::new(header_rect.left(), header_rect.center().y),
            Align2::LEFT_CENTER,
            "Date",
            font.clone(),
            text_color,
        );
        for (col, label) in headers.iter().enumerate() {
            if label == HEADER_FILLER && headers.len() > 24 {
                continue;
            }
            let x = header_rect.left() + ROW_TITLE_WIDTH + (col as f32 + 0.5) * col_w;
            painter.text(
                Pos2::new(x, header_rect.center().y),
                Align2::CENTER_CENTER,
                label,
                font.clone(),
                text_color,
            );
        }

        for (row_idx, row) in card.grid().rows.iter().enumerate() {
            let (rect, resp) =
                ui.allocate_exact_size(egui::vec2(avail_w, self.cell_height), Sense::click());
            let painter = ui.painter();
            painter.text(
                Pos2::new(rect.left(), rect.center().y),
                Align2::LEFT_CENTER,
                &row.date_label,
                font.clone(),
                text_color,
            );

            for (bucket, value) in row.values.iter().enumerate() {
                let cell = Rect::from_min_size(
                    Pos2::new(rect.left() + ROW_TITLE_WIDTH + bucket as f32 * col_w, rect.top()),
                    egui::vec2(col_w, self.cell_height),
                );
                match card.cell_color(*value) {
                    Some(color) => {
                        painter.rect_filled(cell, CornerRadius::ZERO, color.to_color32());
                    }
                    None => {
                        painter.rect_stroke(
                            cell.shrink(1.0),
                            CornerRadius::same(1),
                            Stroke::new(0.5, visuals.widgets.noninteractive.bg_stroke.color),
                            StrokeKind::Inside,
                        );
                    }
                }
                if self.selected == Some((row_idx, bucket)) {
                    let outline = match card.cell_color(*value) {
                        Some(color) => color.contrasting_text().to_color32(),
                        None => visuals.strong_text_color(),
                    };
                    painter.rect_stroke(cell, CornerRadius::same(2), Stroke::new(2.0, outline), StrokeKind::Outside);
                }
            }

            if resp.clicked() {
                if let Some(pos) = resp.interact_pointer_pos() {
                    let bucket = ((pos.x - rect.left() - ROW_TITLE_WIDTH) / col_w).floor();
                    if bucket >= 0.0 && (bucket as usize) < row.values.len() {
                        let hit = (row_idx, bucket as usize);
                        self.selected = if self.selected == Some(hit) { None } else { Some(hit) };
                    }
                }
            }
        }
    }

    fn render_details(&mut self, ui: &mut Ui, card: &HeatmapCard) {
        let Some((row, bucket)) = self.selected else {
            return;
        };
        let Some(details) = card.tooltip(row, bucket) else {
            self.selected = None;
            return;
        };
        ui.add_space(8.0);
        egui::Frame::group(ui.style()).show(ui, |ui| {
            ui.small(details.header());
            ui.label(egui::RichText::new(details.value_text()).size(16.0));
        });
    }
}

/// Gradient bar with ticks underneath.
fn render_legend(ui: &mut Ui, card: &HeatmapCard, scale: &RenderableScale) {
    let avail_w = ui.available_width();
    let width = avail_w * 0.8;
    let left_pad = avail_w * 0.15;
    let (rect, _) = ui.allocate_exact_size(egui::vec2(avail_w, LEGEND_HEIGHT + 28.0), Sense::hover());
    let bar = Rect::from_min_size(
        Pos2::new(rect.left() + left_pad, rect.top()),
        egui::vec2(width, LEGEND_HEIGHT),
    );
    let painter = ui.painter();

    let colors = scale.gradient().colors(LEGEND_SLICES);
    let slice_w = width / LEGEND_SLICES as f32;
    for (i, color) in colors.iter().enumerate() {
        let slice = Rect::from_min_size(
            Pos2::new(bar.left() + i as f32 * slice_w, bar.top()),
            egui::vec2(slice_w + 0.5, LEGEND_HEIGHT),
        );
        painter.rect_filled(slice, CornerRadius::ZERO, color.to_color32());
    }
    let text_color = ui.visuals().text_color();
    painter.rect_stroke(bar, CornerRadius::ZERO, Stroke::new(1.0, text_color), StrokeKind::Outside);

    let unit = card.display_unit().unwrap_or_default();
    for tick in scale.ticks(card.data_range()) {
        let x = bar.left() + width * (tick.position_percent as f32 / 100.0);
        painter.line_segment(
            [Pos2::new(x, bar.bottom()), Pos2::new(x, bar.bottom() + 6.0)],
            Stroke::new(1.0, text_color.gamma_multiply(0.7)),
        );
        painter.text(
            Pos2::new(x, bar.bottom() + 8.0),
            Align2::CENTER_TOP,
            format!("{} {}", tick.label, unit).trim_end(),
            FontId::proportional(10.0),
            text_color.gamma_multiply(0.7),
        );
    }
}
