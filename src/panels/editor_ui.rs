//! Config editor panel. All decisions live in [`ConfigEditor`]; this file
//! only maps them onto widgets and pushes the result into the card.

use egui::{Color32, CornerRadius, Sense, Ui};

use super::panel_trait::{CardData, Panel, PanelState};
use crate::config::RangeBound;
use crate::data::catalog::ScaleCatalog;
use crate::data::engine::ScaleEngine;
use crate::data::grid::Resolution;
use crate::data::scale::ScaleChoice;
use crate::editor::{plain_text, ConfigEditor, FieldValue, ScalePreview, ScaleTab};
use crate::error::Result;

pub struct EditorPanel {
    state: PanelState,
    editor: ConfigEditor,
    error: Option<String>,
    days_text: String,
    min_text: String,
    max_text: String,
    save_path: String,
}

impl EditorPanel {
    pub fn new(editor: ConfigEditor) -> Self {
        let config = editor.config();
        let bound_text = |b: &RangeBound| b.fixed().map(|v| v.to_string()).unwrap_or_default();
        Self {
            state: PanelState::new("Editor", "✏"),
            days_text: config.days.to_string(),
            min_text: bound_text(&config.data.min),
            max_text: bound_text(&config.data.max),
            save_path: "heatmap-card.yaml".to_string(),
            editor,
            error: None,
        }
    }

    pub fn editor(&self) -> &ConfigEditor {
        &self.editor
    }

    fn apply(&mut self, result: Result<()>) -> bool {
        match result {
            Ok(()) => true,
            Err(e) => {
                self.error = Some(e.to_string());
                false
            }
        }
    }

    fn set(&mut self, catalog: &ScaleCatalog, path: &str, value: FieldValue) -> bool {
        let result = self.editor.update(catalog, path, value);
        self.apply(result)
    }
}

impl Panel for EditorPanel {
    fn state(&self) -> &PanelState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut PanelState {
        &mut self.state
    }

    fn render_panel(&mut self, ui: &mut Ui, data: &mut CardData<'_>) {
        let engine = data.engine;
        let catalog = engine.catalog();
        let mut changed = false;

        changed |= self.render_entity(ui, catalog);

        if let Some(warning) = self.editor.state_class_warning() {
            ui.colored_label(ui.visuals().warn_fg_color, warning);
        }

        if self.editor.show_device_class_picker() {
            changed |= self.render_device_class(ui, catalog);
        }

        ui.horizontal(|ui| {
            ui.label("Days");
            let resp = ui
                .text_edit_singleline(&mut self.days_text)
                .on_hover_text("Days of data to include in the heatmap. Defaults to 21");
            if resp.changed() {
                let value = FieldValue::from_input(&self.days_text);
                changed |= self.set(catalog, "days", value);
            }
        });

        if self.editor.show_scale_tabs() {
            ui.separator();
            changed |= self.render_scale_tabs(ui, &engine);
        }

        ui.separator();
        changed |= self.render_card_elements(ui, catalog);

        if let Some(err) = &self.error {
            ui.colored_label(ui.visuals().error_fg_color, err.as_str());
        }

        if changed {
            match data.card.set_config(self.editor.config().clone()) {
                Ok(()) => {
                    self.error = None;
                    data.request_refresh = true;
                }
                Err(e) => self.error = Some(e.to_string()),
            }
        }

        ui.separator();
        ui.horizontal(|ui| {
            ui.text_edit_singleline(&mut self.save_path);
            if ui.button("Save config").clicked() {
                data.request_save_config = Some(self.save_path.clone().into());
            }
        });
    }
}

impl EditorPanel {
    fn render_entity(&mut self, ui: &mut Ui, catalog: &ScaleCatalog) -> bool {
        let current = self.editor.config().entity.clone().unwrap_or_default();
        let mut picked = current.clone();
        egui::ComboBox::from_label("Entity")
            .selected_text(if current.is_empty() { "Pick an entity" } else { current.as_str() })
            .show_ui(ui, |ui| {
                for entity in self.editor.entities() {
                    let label = match &entity.friendly_name {
                        Some(name) => format!("{name} ({})", entity.entity_id),
                        None => entity.entity_id.clone(),
                    };
                    ui.selectable_value(&mut picked, entity.entity_id.clone(), label);
                }
            });
        picked != current && self.set(catalog, "entity", FieldValue::Text(picked))
    }

    fn render_device_class(&mut self, ui: &mut Ui, catalog: &ScaleCatalog) -> bool {
        let current = self.editor.config().device_class.clone().unwrap_or_default();
        let mut picked = current.clone();
        egui::ComboBox::from_label("Device class")
            .selected_text(current.as_str())
            .show_ui(ui, |ui| {
                for entry in catalog.categories() {
                    ui.selectable_value(&mut picked, entry.category.clone(), entry.category.as_str());
                }
            })
            .response
            .on_hover_text("What device_class best represents this entity?");
        picked != current && self.set(catalog, "device_class", FieldValue::Text(picked))
    }

    fn render_scale_tabs(&mut self, ui: &mut Ui, engine: &ScaleEngine<'_>) -> bool {
        let catalog = engine.catalog();
        let mut tab = self.editor.active_tab();
        ui.horizontal(|ui| {
            for candidate in ScaleTab::ALL {
                ui.selectable_value(&mut tab, candidate, candidate.label());
            }
        });
        self.editor.set_active_tab(tab);

        let changed = match tab {
            ScaleTab::Absolute => self.render_absolute(ui, catalog),
            ScaleTab::Relative => self.render_relative(ui, engine),
            ScaleTab::Custom => {
                ui.heading("Custom scale");
                ui.label("Custom scales are edited in the configuration file (`scale:` with `type` and `steps`).");
                false
            }
        };

        if let Some(docs) = self.editor.scale_docs(catalog, tab) {
            ui.add_space(6.0);
            ui.strong("About this scale");
            ui.label(plain_text(&docs.text));
            if let Some(license) = &docs.license {
                ui.add_space(4.0);
                ui.strong("Scale license");
                ui.horizontal_wrapped(|ui| {
                    ui.label("This scale is licensed separately under");
                    ui.hyperlink_to(license.name.as_str(), &license.url);
                });
            }
        }
        changed
    }

    fn render_absolute(&mut self, ui: &mut Ui, catalog: &ScaleCatalog) -> bool {
        ui.heading("Scales for this device class");
        if self.editor.pickers_disabled() {
            ui.label("Using a custom scale, picker disabled");
            return false;
        }
        let choices = self.editor.absolute_choices(catalog);
        if choices.is_empty() {
            ui.label("There are no predefined scales for this device class");
            return false;
        }
        let current = self.editor.selected_key(catalog).unwrap_or_default().to_string();
        let mut picked = current.clone();
        for def in choices {
            if let Some(key) = &def.key {
                ui.radio_value(&mut picked, key.clone(), def.name.as_str());
            }
        }
        picked != current && self.set(catalog, "scale", FieldValue::Text(picked))
    }

    fn render_relative(&mut self, ui: &mut Ui, engine: &ScaleEngine<'_>) -> bool {
        let catalog = engine.catalog();
        let mut changed = false;
        ui.heading("Color scales");
        if self.editor.pickers_disabled() {
            ui.label("Using a custom scale, picker disabled");
        } else {
            let previews = self.editor.relative_choices(engine);
            let current = self.editor.selected_key(catalog).unwrap_or_default().to_string();
            let mut picked = current.clone();
            let selected_name = previews
                .iter()
                .find(|p| p.key == current)
                .map(|p| p.name.clone())
                .unwrap_or_else(|| current.clone());
            egui::ComboBox::from_id_salt("relative_scale")
                .selected_text(selected_name)
                .width(260.0)
                .show_ui(ui, |ui| {
                    for preview in &previews {
                        ui.horizontal(|ui| {
                            swatch(ui, preview);
                            ui.selectable_value(&mut picked, preview.key.clone(), preview.name.as_str());
                        });
                    }
                });
            if picked != current {
                changed |= self.set(catalog, "scale", FieldValue::Text(picked));
            }
        }

        ui.heading("Range");
        changed |= self.render_bound(ui, catalog, "data.min", "Minimum value");
        changed |= self.render_bound(ui, catalog, "data.max", "Maximum value");
        changed
    }

    fn render_bound(&mut self, ui: &mut Ui, catalog: &ScaleCatalog, path: &str, label: &str) -> bool {
        let bounds = &self.editor.config().data;
        let mut auto = if path == "data.min" { bounds.min.is_auto() } else { bounds.max.is_auto() };
        let mut changed = false;
        ui.horizontal(|ui| {
            ui.label(label);
            let text = if path == "data.min" { &mut self.min_text } else { &mut self.max_text };
            let resp = ui.add_enabled(!auto, egui::TextEdit::singleline(text).desired_width(80.0));
            let typed = resp.changed().then(|| FieldValue::from_input(text));
            if ui
                .checkbox(&mut auto, "Auto")
                .on_hover_text("Infer from the sensor data")
                .changed()
            {
                let result = self.editor.set_auto(catalog, path, auto);
                changed |= self.apply(result);
            } else if let Some(value) = typed {
                changed |= self.set(catalog, path, value);
            }
        });
        changed
    }

    fn render_card_elements(&mut self, ui: &mut Ui, catalog: &ScaleCatalog) -> bool {
        let mut changed = false;
        ui.heading("Card elements");
        let config = self.editor.config().clone();

        let mut title = config.title.clone().unwrap_or_default();
        let placeholder = self
            .editor
            .entity()
            .and_then(|e| e.friendly_name.clone())
            .unwrap_or_default();
        ui.horizontal(|ui| {
            ui.label("Card title");
            if ui
                .add(egui::TextEdit::singleline(&mut title).hint_text(placeholder))
                .changed()
            {
                changed |= self.set(catalog, "title", FieldValue::Text(title.clone()));
            }
        });

        let mut high_res = config.resolution == Resolution::High;
        if ui
            .checkbox(&mut high_res, "High resolution (usually only 10 days kept)")
            .changed()
        {
            let value = if high_res { "high" } else { "standard" };
            changed |= self.set(catalog, "resolution", FieldValue::Text(value.into()));
        }

        let mut smoothing = config.smoothing;
        let available = self.editor.smoothing_available();
        if ui
            .add_enabled(available, egui::Checkbox::new(&mut smoothing, "Smooth low-precision data"))
            .changed()
        {
            changed |= self.set(catalog, "smoothing", FieldValue::Flag(smoothing));
        }

        let mut legend = config.display.legend;
        if ui.checkbox(&mut legend, "Show legend").changed() {
            changed |= self.set(catalog, "display.legend", FieldValue::Flag(legend));
        }

        if matches!(config.scale, Some(ScaleChoice::Custom(_))) {
            ui.small("A custom scale is configured.");
        }
        changed
    }
}

/// Small gradient preview next to a relative scale's name.
fn swatch(ui: &mut Ui, preview: &ScalePreview) {
    let (rect, _) = ui.allocate_exact_size(egui::vec2(120.0, 12.0), Sense::hover());
    let n = preview.swatch.len().max(1);
    let w = rect.width() / n as f32;
    let painter = ui.painter();
    for (i, color) in preview.swatch.iter().enumerate() {
        let slice = egui::Rect::from_min_size(
            egui::pos2(rect.left() + i as f32 * w, rect.top()),
            egui::vec2(w + 0.5, rect.height()),
        );
        painter.rect_filled(slice, CornerRadius::ZERO, Color32::from(*color));
    }
}
