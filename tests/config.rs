use heatmap_card::config::{DataBounds, HeatmapConfig, RangeBound, DEFAULT_DAYS, MAX_DAYS};
use heatmap_card::data::grid::Resolution;
use heatmap_card::data::scale::{ScaleChoice, ScaleKind};
use heatmap_card::data::time_format::TimeFormat;
use heatmap_card::{ConfigError, HeatmapError};

#[test]
fn minimal_yaml_gets_defaults() {
    let config = HeatmapConfig::from_yaml_str("entity: sensor.outdoor").unwrap();
    assert_eq!(config.entity.as_deref(), Some("sensor.outdoor"));
    assert_eq!(config.days, DEFAULT_DAYS);
    assert_eq!(config.days, 21);
    assert!(config.display.legend);
    assert_eq!(config.display.time_format, TimeFormat::H24);
    assert!(!config.smoothing);
    assert_eq!(config.resolution, Resolution::Standard);
    assert_eq!(config.data, DataBounds::default());
    assert!(config.scale.is_none());
    assert!(config.validate().is_ok());
}

#[test]
fn full_yaml() {
    let yaml = r#"
entity: sensor.energy
title: Energy
days: 14
device_class: energy
scale: stoplight
data:
  min: 0
  max: auto
display:
  legend: false
  time_format: 12h
smoothing: true
resolution: high
"#;
    let config = HeatmapConfig::from_yaml_str(yaml).unwrap();
    assert_eq!(config.title.as_deref(), Some("Energy"));
    assert_eq!(config.days, 14);
    assert_eq!(config.scale, Some(ScaleChoice::Named("stoplight".into())));
    assert_eq!(config.data.min, RangeBound::Fixed(0.0));
    assert_eq!(config.data.max, RangeBound::Auto);
    assert!(!config.display.legend);
    assert_eq!(config.display.time_format, TimeFormat::H12);
    assert!(config.smoothing);
    assert_eq!(config.resolution, Resolution::High);
    assert!(config.validate().is_ok());
}

#[test]
fn inline_scale() {
    let yaml = r##"
entity: sensor.x
scale:
  type: absolute
  unit: ppm
  steps:
  - value: 400
    color: green
  - value: 1000
    color: '#ff0000'
"##;
    let config = HeatmapConfig::from_yaml_str(yaml).unwrap();
    let Some(ScaleChoice::Custom(def)) = &config.scale else {
        panic!("expected an inline scale, got {:?}", config.scale);
    };
    assert_eq!(def.kind, ScaleKind::Absolute);
    assert_eq!(def.steps.len(), 2);
    assert_eq!(def.unit.as_deref(), Some("ppm"));
    assert!(def.key.is_none());
    assert!(def.has_full_domain());

    let config = HeatmapConfig::from_yaml_str("entity: s\nscale: {type: relative, steps: [{color: red}, {color: blue}]}").unwrap();
    let Some(ScaleChoice::Custom(def)) = &config.scale else {
        panic!("expected an inline scale, got {:?}", config.scale);
    };
    assert!(!def.has_full_domain());
}

#[test]
fn missing_entity_is_rejected() {
    assert_eq!(HeatmapConfig::default().validate(), Err(ConfigError::MissingSource));
    assert_eq!(HeatmapConfig::for_entity("  ").validate(), Err(ConfigError::MissingSource));
}

#[test]
fn day_count_must_be_in_range() {
    let mut config = HeatmapConfig::for_entity("sensor.x");
    config.days = 0;
    assert_eq!(config.validate(), Err(ConfigError::InvalidDayCount(0)));
    config.days = -3;
    assert_eq!(config.validate(), Err(ConfigError::InvalidDayCount(-3)));

    config.days = MAX_DAYS;
    assert!(config.validate().is_ok());
    config.days = 100_000_000;
    assert_eq!(config.validate(), Err(ConfigError::InvalidDayCount(100_000_000)));
    assert!(ConfigError::InvalidDayCount(0).to_string().contains("between 1 and 3650"));
}

#[test]
fn range_bounds_are_auto_or_numbers() {
    let config = HeatmapConfig::from_yaml_str("entity: s\ndata: {min: cold, max: '12.5'}").unwrap();
    assert_eq!(config.data.max, RangeBound::Fixed(12.5));
    assert_eq!(
        config.validate(),
        Err(ConfigError::InvalidRangeBound {
            field: "data.min".into(),
            value: "cold".into()
        })
    );

    let config = HeatmapConfig::from_json_str(r#"{"entity": "s", "data": {"min": null, "max": [1]}}"#).unwrap();
    assert_eq!(config.data.min, RangeBound::Auto);
    assert!(matches!(
        config.validate(),
        Err(ConfigError::InvalidRangeBound { ref field, .. }) if field == "data.max"
    ));
}

#[test]
fn range_bound_parse() {
    assert_eq!(RangeBound::parse(""), RangeBound::Auto);
    assert_eq!(RangeBound::parse("AUTO"), RangeBound::Auto);
    assert_eq!(RangeBound::parse(" -4 "), RangeBound::Fixed(-4.0));
    assert_eq!(RangeBound::parse("nan"), RangeBound::Invalid("nan".into()));
}

#[test]
fn malformed_document_is_a_config_data_error() {
    let err = HeatmapConfig::from_yaml_str("days: [1, 2").unwrap_err();
    assert!(matches!(err, HeatmapError::ConfigData(_)));
}

#[test]
fn yaml_and_json_survive_a_save() {
    let mut config = HeatmapConfig::for_entity("sensor.x");
    config.data.min = RangeBound::Fixed(2.5);
    config.scale = Some("iron red".into());

    let yaml = config.to_yaml_string().unwrap();
    assert!(yaml.contains("max: auto"));
    assert_eq!(HeatmapConfig::from_yaml_str(&yaml).unwrap(), config);

    let json = config.to_json_string().unwrap();
    assert_eq!(HeatmapConfig::from_json_str(&json).unwrap(), config);
}

#[test]
fn save_and_load_files() {
    let dir = std::env::temp_dir().join(format!("heatmap-card-config-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    let mut config = HeatmapConfig::for_entity("sensor.x");
    config.days = 9;

    for name in ["card.yaml", "card.json"] {
        let path = dir.join(name);
        config.save_to_path(&path).unwrap();
        assert_eq!(HeatmapConfig::load_from_path(&path).unwrap(), config);
    }

    let err = HeatmapConfig::load_from_path(&dir.join("missing.yaml")).unwrap_err();
    assert!(matches!(err, HeatmapError::ConfigData(_)));
    let _ = std::fs::remove_dir_all(&dir);
}
