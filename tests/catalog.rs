use heatmap_card::data::catalog::{ScaleCatalog, DEFAULT_SCALE_KEY};
use heatmap_card::data::scale::{ScaleAttribute, ScaleKind};
use heatmap_card::HeatmapError;

#[test]
fn builtin_catalog_ships_all_scales() {
    let catalog = ScaleCatalog::builtin();
    assert_eq!(catalog.scales().len(), 20);
    for key in ["black hot", "iron red", "outdoor temperature", "pm25", "wind speed beaufort"] {
        assert!(catalog.lookup(key).is_ok(), "missing `{key}`");
    }
}

#[test]
fn unknown_key_is_reported() {
    let err = ScaleCatalog::builtin().lookup("no such scale").unwrap_err();
    assert!(matches!(err, HeatmapError::UnknownScaleKey(ref k) if k == "no such scale"));
}

#[test]
fn category_defaults() {
    let catalog = ScaleCatalog::builtin();
    assert_eq!(catalog.default_for(Some("temperature")), "outdoor temperature");
    assert_eq!(catalog.default_for(Some("carbon_dioxide")), "carbon dioxide");
    assert_eq!(catalog.default_for(Some("pm25")), "pm25");
}

#[test]
fn default_for_never_fails() {
    let catalog = ScaleCatalog::builtin();
    assert_eq!(catalog.default_for(None), DEFAULT_SCALE_KEY);
    assert_eq!(catalog.default_for(Some("not_a_device_class")), "iron red");
    // Known category without a default of its own.
    assert_eq!(catalog.default_for(Some("timestamp")), "iron red");
}

#[test]
fn unit_domain_only_for_temperature() {
    let catalog = ScaleCatalog::builtin();
    assert_eq!(catalog.unit_domain_for("temperature"), Some("temperature"));
    assert_eq!(catalog.unit_domain_for("carbon_dioxide"), None);
}

#[test]
fn filter_by_kind_and_device_class() {
    let catalog = ScaleCatalog::builtin();

    let relative = catalog.by_attribute(ScaleAttribute::Kind, "relative");
    assert!(!relative.is_empty());
    assert!(relative.iter().all(|s| s.kind == ScaleKind::Relative));
    assert!(relative.iter().any(|s| s.key.as_deref() == Some("iron red")));

    let temperature = catalog.by_attribute(ScaleAttribute::DeviceClass, "temperature");
    let keys: Vec<_> = temperature.iter().filter_map(|s| s.key.as_deref()).collect();
    assert!(keys.contains(&"outdoor temperature"));
    assert!(keys.contains(&"indoor temperature"));
    assert!(temperature.iter().all(|s| s.kind == ScaleKind::Absolute));
}

#[test]
fn catalog_rejects_bad_category_default() {
    let scales = r##"
- key: mono
  name: Mono
  type: relative
  steps:
  - value: 0
    color: '#000'
  - value: 1
    color: '#fff'
"##;
    let categories = r#"
- category: temperature
  default_scale: missing
"#;
    let err = ScaleCatalog::from_yaml(scales, categories).unwrap_err();
    assert!(matches!(err, HeatmapError::CatalogData(_)));
}

#[test]
fn catalog_rejects_invalid_scale() {
    let scales = r##"
- key: broken
  name: Broken
  type: absolute
  steps:
  - value: 10
    color: '#000'
  - color: '#fff'
"##;
    let err = ScaleCatalog::from_yaml(scales, "[]").unwrap_err();
    assert!(matches!(err, HeatmapError::InvalidCustomScale(_)));
}

#[test]
fn custom_fallback() {
    let catalog = ScaleCatalog::builtin().clone().with_fallback("white hot").unwrap();
    assert_eq!(catalog.default_for(Some("nope")), "white hot");
    assert!(ScaleCatalog::builtin().clone().with_fallback("nope").is_err());
}
