#![allow(dead_code)]
use chrono::{NaiveDate, NaiveDateTime};
use metfor::{Celsius, HectoPascal, Kelvin, Meters, Quantity};
use optional::{some, Optioned};
use sounding_parcel::{PressureOrder, Sounding};

/// Top of the synthetic soundings in meters.
pub const TOP: f64 = 5000.0;
const SPACING: f64 = 100.0;

/// Valid time stamped on the synthetic soundings.
pub fn valid_time() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2020, 7, 15)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .unwrap()
}

/// Standard atmosphere pressure at a height, with 1000 hPa at the surface.
pub fn pressure_at(height: f64) -> f64 {
    1000.0 * (1.0 - 2.25577e-5 * height).powf(5.25588)
}

/// A sounding from the surface to `TOP` with linear temperature and dew point profiles.
///
/// Lapse rates are in Kelvin per kilometer, positive for cooling with height.
pub fn linear_sounding(t_sfc: Celsius, lapse: f64, dp_sfc: Celsius, dp_lapse: f64) -> Sounding {
    let t_sfc = Kelvin::from(t_sfc).unpack();
    let dp_sfc = Kelvin::from(dp_sfc).unpack();

    profile_sounding(
        |h| t_sfc - lapse * h / 1000.0,
        |h| dp_sfc - dp_lapse * h / 1000.0,
    )
    .with_source_description("synthetic linear profile".to_owned())
}

/// A 300 K surface under a nearly isothermal layer up to 500 m, then a sharp drop to 1000 m and
/// a standard lapse rate above. The surface dew point is 290 K.
pub fn inversion_sounding() -> Sounding {
    profile_sounding(
        |h| {
            if h <= 500.0 {
                300.0 - 0.002 * h
            } else if h <= 1000.0 {
                299.0 - 0.016 * (h - 500.0)
            } else {
                291.0 - 0.0065 * (h - 1000.0)
            }
        },
        |h| 290.0 - 0.002 * h,
    )
    .with_source_description("synthetic capping inversion".to_owned())
}

/// Temperature and dew point in Kelvin as functions of height, every `SPACING` up to `TOP`.
pub fn profile_sounding(t: impl Fn(f64) -> f64, dp: impl Fn(f64) -> f64) -> Sounding {
    let heights = heights();

    Sounding::new()
        .with_valid_time(valid_time())
        .with_pressure_profile(optioned(&heights, |h| HectoPascal(pressure_at(h))))
        .with_height_profile(optioned(&heights, Meters))
        .with_temperature_profile(optioned(&heights, |h| Kelvin(t(h))))
        .with_dew_point_profile(optioned(&heights, |h| Kelvin(dp(h))))
}

/// The same sounding stored top down.
pub fn reversed(snd: &Sounding) -> Sounding {
    fn rev<T: Copy>(vals: &[T]) -> Vec<T> {
        vals.iter().rev().cloned().collect()
    }

    Sounding::new()
        .with_valid_time(snd.valid_time())
        .with_pressure_order(PressureOrder::Ascending)
        .with_pressure_profile(rev(snd.pressure_profile()))
        .with_height_profile(rev(snd.height_profile()))
        .with_temperature_profile(rev(snd.temperature_profile()))
        .with_dew_point_profile(rev(snd.dew_point_profile()))
}

/// A humidity only sounding at every 50 hPa from 1000 to 100 hPa.
pub fn humidity_sounding(rh: impl Fn(f64) -> f64) -> Sounding {
    let pressures: Vec<f64> = (0..19).map(|i| 1000.0 - 50.0 * i as f64).collect();

    Sounding::new()
        .with_pressure_profile(optioned(&pressures, HectoPascal))
        .with_relative_humidity_profile(pressures.iter().map(|&p| some(rh(p))).collect())
}

pub fn approx_equal(val1: f64, val2: f64, eps: f64) -> bool {
    (val1 - val2).abs() < eps
}

/// See what the solver is doing with `RUST_LOG=debug cargo test -- --nocapture`.
pub fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn heights() -> Vec<f64> {
    let num = (TOP / SPACING) as usize;
    (0..=num).map(|i| i as f64 * SPACING).collect()
}

fn optioned<T, F>(vals: &[f64], f: F) -> Vec<Optioned<T>>
where
    T: optional::Noned + Copy,
    F: Fn(f64) -> T,
{
    vals.iter().map(|&v| some(f(v))).collect()
}
