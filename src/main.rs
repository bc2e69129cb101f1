//! Demo: a heatmap card over synthetic statistics.
//!
//! ```text
//! heatmap-card [config.yaml]
//! ```
//!
//! Without a config file the card shows an outdoor temperature sensor. Set
//! `RUST_LOG=debug` to follow scale rebuilds and fetches.

use std::path::PathBuf;

use chrono::{DateTime, Duration, DurationRound, Utc};

use heatmap_card::{
    run_heatmap, EntityInfo, HeatmapApp, HeatmapConfig, MemorySource, StatisticSample, UnitSystem,
};

const TEMPERATURE_ID: &str = "sensor.outdoor_temperature";
const ENERGY_ID: &str = "sensor.energy_meter";
const CO2_ID: &str = "sensor.living_room_co2";
const DEMO_DAYS: i64 = 30;

fn entities() -> Vec<EntityInfo> {
    vec![
        EntityInfo {
            friendly_name: Some("Outdoor temperature".into()),
            device_class: Some("temperature".into()),
            state_class: Some("measurement".into()),
            unit_of_measurement: Some("°C".into()),
            ..EntityInfo::new(TEMPERATURE_ID)
        },
        EntityInfo {
            friendly_name: Some("Energy meter".into()),
            device_class: Some("energy".into()),
            state_class: Some("total_increasing".into()),
            unit_of_measurement: Some("kWh".into()),
            ..EntityInfo::new(ENERGY_ID)
        },
        EntityInfo {
            friendly_name: Some("Living room CO2".into()),
            state_class: Some("measurement".into()),
            unit_of_measurement: Some("ppm".into()),
            ..EntityInfo::new(CO2_ID)
        },
    ]
}

/// Hourly starts covering the demo window, oldest first.
fn hours(now: DateTime<Utc>) -> impl Iterator<Item = (usize, DateTime<Utc>)> {
    let end = now.duration_trunc(Duration::hours(1)).unwrap_or(now);
    let count = (DEMO_DAYS * 24) as usize;
    (0..count).map(move |i| (i, end - Duration::hours((count - 1 - i) as i64)))
}

fn synthetic_source(now: DateTime<Utc>) -> MemorySource {
    let day_phase = |i: usize| (i % 24) as f64 / 24.0 * std::f64::consts::TAU;

    let temperature = hours(now)
        .map(|(i, start)| {
            let trend = (i as f64 / 24.0 / 9.0).sin() * 4.0;
            StatisticSample::mean(start, 12.0 + trend - 6.0 * day_phase(i).cos())
        })
        .collect();

    // Meter reading in whole kWh, so the series has plateaus to smooth.
    let mut total = 0.0_f64;
    let energy = hours(now)
        .map(|(i, start)| {
            total += 0.35 + 0.3 * (1.0 - day_phase(i).cos());
            StatisticSample::sum(start, total.floor())
        })
        .collect();

    let co2 = hours(now)
        .map(|(i, start)| {
            let occupied = matches!(i % 24, 7..=9 | 18..=23);
            StatisticSample::mean(start, if occupied { 1100.0 } else { 520.0 } + (i % 7) as f64 * 15.0)
        })
        .collect();

    MemorySource::new()
        .with_series(TEMPERATURE_ID, temperature)
        .with_series(ENERGY_ID, energy)
        .with_series(CO2_ID, co2)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let config = match std::env::args().nth(1).map(PathBuf::from) {
        Some(path) => {
            log::info!("loading config from {}", path.display());
            HeatmapConfig::load_from_path(&path)?
        }
        None => HeatmapConfig::for_entity(TEMPERATURE_ID),
    };

    let source = synthetic_source(Utc::now());
    let app = HeatmapApp::new(config, UnitSystem::metric(), entities(), Box::new(source))?
        .with_title("Heatmap card demo");

    run_heatmap(app, eframe::NativeOptions::default())?;
    Ok(())
}
