pub mod aggregate;
pub mod catalog;
pub mod engine;
pub mod grid;
pub mod scale;
pub mod statistics;
pub mod time_format;
pub mod units;

/// Round to two decimals, the precision every displayed value uses.
pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
