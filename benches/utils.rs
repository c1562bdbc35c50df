use metfor::{HectoPascal, Kelvin, Meters};
use optional::{some, Optioned};
use sounding_parcel::Sounding;

/// A few soundings to time the analysis on: standard lapse rate, stable, and a capping
/// inversion over a moist boundary layer.
pub fn load_all_test_soundings() -> [Sounding; 3] {
    let standard = make_sounding(|h| 298.15 - 0.0065 * h, |h| 293.15 - 0.002 * h);
    let stable = make_sounding(|h| 298.15 - 0.005 * h, |h| 288.15 - 0.002 * h);
    let capped = make_sounding(
        |h| {
            if h <= 600.0 {
                300.15 - 0.0095 * h
            } else if h <= 900.0 {
                294.45 + 0.01 * (h - 600.0)
            } else {
                297.45 - 0.007 * (h - 900.0)
            }
        },
        |h| 294.15 - 0.0025 * h,
    );

    [standard, stable, capped]
}

fn make_sounding(t: impl Fn(f64) -> f64, dp: impl Fn(f64) -> f64) -> Sounding {
    let heights: Vec<f64> = (0..=120).map(|i| i as f64 * 100.0).collect();

    let press: Vec<Optioned<HectoPascal>> = heights
        .iter()
        .map(|&h| some(HectoPascal(1000.0 * (1.0 - 2.25577e-5 * h).powf(5.25588))))
        .collect();
    let height: Vec<Optioned<Meters>> = heights.iter().map(|&h| some(Meters(h))).collect();
    let temp: Vec<Optioned<Kelvin>> = heights.iter().map(|&h| some(Kelvin(t(h)))).collect();
    let dew: Vec<Optioned<Kelvin>> = heights
        .iter()
        .map(|&h| some(Kelvin(dp(h).min(t(h)))))
        .collect();

    Sounding::new()
        .with_pressure_profile(press)
        .with_height_profile(height)
        .with_temperature_profile(temp)
        .with_dew_point_profile(dew)
}
