use heatmap_card::card::EntityInfo;
use heatmap_card::config::{HeatmapConfig, RangeBound};
use heatmap_card::data::catalog::ScaleCatalog;
use heatmap_card::data::engine::ScaleEngine;
use heatmap_card::data::scale::{ScaleChoice, ScaleKind};
use heatmap_card::editor::{tab_for_scale, ConfigEditor, FieldValue, ScaleTab};
use heatmap_card::HeatmapError;

fn entities() -> Vec<EntityInfo> {
    vec![
        EntityInfo {
            friendly_name: Some("Outdoor".into()),
            device_class: Some("temperature".into()),
            state_class: Some("measurement".into()),
            ..EntityInfo::new("sensor.outdoor")
        },
        EntityInfo {
            device_class: Some("energy".into()),
            state_class: Some("total_increasing".into()),
            ..EntityInfo::new("sensor.energy")
        },
        EntityInfo {
            state_class: Some("measurement".into()),
            ..EntityInfo::new("sensor.unclassified")
        },
        EntityInfo::new("sensor.no_statistics"),
    ]
}

fn editor_for(entity: &str) -> ConfigEditor {
    ConfigEditor::new(ScaleCatalog::builtin(), HeatmapConfig::for_entity(entity), entities())
}

#[test]
fn tab_follows_configured_scale() {
    let catalog = ScaleCatalog::builtin();
    assert_eq!(tab_for_scale(catalog, None), ScaleTab::Absolute);
    assert_eq!(tab_for_scale(catalog, Some(&"iron red".into())), ScaleTab::Relative);
    assert_eq!(tab_for_scale(catalog, Some(&"pm25".into())), ScaleTab::Absolute);

    let inline = catalog.lookup("stoplight").unwrap().clone();
    assert_eq!(tab_for_scale(catalog, Some(&ScaleChoice::Custom(inline))), ScaleTab::Custom);
    assert_eq!(ScaleTab::Custom.kind(), None);
    assert_eq!(ScaleTab::Relative.kind(), Some(ScaleKind::Relative));
}

#[test]
fn device_class_picker_only_without_entity_class() {
    assert!(!editor_for("sensor.outdoor").show_device_class_picker());
    assert!(editor_for("sensor.unclassified").show_device_class_picker());
    assert!(editor_for("sensor.outdoor").show_scale_tabs());
    assert!(!editor_for("sensor.unclassified").show_scale_tabs());
}

#[test]
fn picking_a_device_class_picks_its_default_scale() {
    let catalog = ScaleCatalog::builtin();
    let mut editor = editor_for("sensor.unclassified");
    editor
        .update(catalog, "device_class", FieldValue::Text("carbon_dioxide".into()))
        .unwrap();
    assert_eq!(editor.config().device_class.as_deref(), Some("carbon_dioxide"));
    assert_eq!(editor.config().scale, Some(ScaleChoice::Named("carbon dioxide".into())));
    assert_eq!(editor.active_tab(), ScaleTab::Absolute);
    assert!(editor.show_scale_tabs());

    // No default of its own: global fallback, which is relative.
    editor
        .update(catalog, "device_class", FieldValue::Text("humidity".into()))
        .unwrap();
    assert_eq!(editor.config().scale, Some(ScaleChoice::Named("iron red".into())));
    assert_eq!(editor.active_tab(), ScaleTab::Relative);
}

#[test]
fn picking_a_classified_entity_drops_the_override() {
    let catalog = ScaleCatalog::builtin();
    let mut editor = editor_for("sensor.unclassified");
    editor
        .update(catalog, "device_class", FieldValue::Text("carbon_dioxide".into()))
        .unwrap();

    editor
        .update(catalog, "entity", FieldValue::Text("sensor.outdoor".into()))
        .unwrap();
    assert_eq!(editor.config().entity.as_deref(), Some("sensor.outdoor"));
    assert_eq!(editor.config().device_class, None);
    assert_eq!(editor.config().scale, Some(ScaleChoice::Named("outdoor temperature".into())));
    assert_eq!(editor.device_class(), Some("temperature"));
}

#[test]
fn picking_an_unclassified_entity_keeps_the_scale() {
    let catalog = ScaleCatalog::builtin();
    let mut editor = editor_for("sensor.outdoor");
    editor.update(catalog, "scale", FieldValue::Text("stoplight".into())).unwrap();
    editor
        .update(catalog, "entity", FieldValue::Text("sensor.unclassified".into()))
        .unwrap();
    assert_eq!(editor.config().scale, Some(ScaleChoice::Named("stoplight".into())));
}

#[test]
fn nested_fields_and_numbers() {
    let catalog = ScaleCatalog::builtin();
    let mut editor = editor_for("sensor.outdoor");

    editor.update(catalog, "days", FieldValue::from_input("14")).unwrap();
    assert_eq!(editor.config().days, 14);

    editor.update(catalog, "data.min", FieldValue::from_input("-5.5")).unwrap();
    assert_eq!(editor.config().data.min, RangeBound::Fixed(-5.5));

    editor.set_auto(catalog, "data.min", true).unwrap();
    assert_eq!(editor.config().data.min, RangeBound::Auto);
    editor.set_auto(catalog, "data.max", false).unwrap();
    assert_eq!(editor.config().data.max, RangeBound::Fixed(0.0));

    editor.update(catalog, "display.legend", FieldValue::Flag(false)).unwrap();
    assert!(!editor.config().display.legend);
    editor.update(catalog, "resolution", FieldValue::Text("high".into())).unwrap();
    assert_eq!(editor.config().resolution, heatmap_card::Resolution::High);
}

#[test]
fn rejected_edit_keeps_config() {
    let catalog = ScaleCatalog::builtin();
    let mut editor = editor_for("sensor.outdoor");
    let before = editor.config().clone();
    let err = editor.update(catalog, "days", FieldValue::from_input("a week")).unwrap_err();
    assert!(matches!(err, HeatmapError::ConfigData(_)));
    assert_eq!(editor.config(), &before);
}

#[test]
fn state_class_warning() {
    assert!(editor_for("sensor.outdoor").state_class_warning().is_none());
    assert!(editor_for("sensor.energy").state_class_warning().is_none());
    let warning = editor_for("sensor.no_statistics").state_class_warning().unwrap();
    assert!(warning.contains("state_class attribute set to undefined"));
    // Unknown entities have nothing to warn about.
    assert!(editor_for("sensor.not_listed").state_class_warning().is_none());
}

#[test]
fn smoothing_only_for_cumulative_entities() {
    assert!(editor_for("sensor.energy").smoothing_available());
    assert!(!editor_for("sensor.outdoor").smoothing_available());
    assert!(!editor_for("sensor.no_statistics").smoothing_available());
}

#[test]
fn scale_choices() {
    let catalog = ScaleCatalog::builtin();
    let editor = editor_for("sensor.outdoor");

    let absolute: Vec<_> = editor
        .absolute_choices(catalog)
        .iter()
        .filter_map(|d| d.key.clone())
        .collect();
    assert!(absolute.contains(&"outdoor temperature".to_string()));
    assert!(!absolute.contains(&"iron red".to_string()));

    let relative = editor.relative_choices(&ScaleEngine::builtin());
    assert_eq!(relative.len(), 8);
    let iron = relative.iter().find(|p| p.key == "iron red").unwrap();
    assert_eq!(iron.swatch.len(), 21);
    assert!(iron.legend_css.ends_with("100%"));
}

#[test]
fn docs_only_for_the_matching_tab() {
    let catalog = ScaleCatalog::builtin();
    let editor = editor_for("sensor.outdoor");
    assert_eq!(editor.selected_key(catalog), Some("outdoor temperature"));
    assert!(editor.scale_docs(catalog, ScaleTab::Absolute).is_some());
    assert!(editor.scale_docs(catalog, ScaleTab::Relative).is_none());
    assert!(editor.scale_docs(catalog, ScaleTab::Custom).is_none());
}

#[test]
fn inline_scale_disables_pickers() {
    let catalog = ScaleCatalog::builtin();
    let mut config = HeatmapConfig::for_entity("sensor.outdoor");
    config.scale = Some(ScaleChoice::Custom(catalog.lookup("stoplight").unwrap().clone()));
    let editor = ConfigEditor::new(catalog, config, entities());
    assert!(editor.pickers_disabled());
    assert_eq!(editor.active_tab(), ScaleTab::Custom);
    assert_eq!(editor.selected_key(catalog), None);
}
