//! Thermodynamic formulas for lifting parcels.
//!
//! All the functions here are stateless. Temperatures may be given in any unit `metfor` can
//! convert to `Kelvin`, pressures are in hPa and mixing ratios are in kg/kg.
use metfor::{Celsius, HectoPascal, Kelvin, Meters, Quantity};

/// Gas constant for dry air, J/(kg K).
pub const RD: f64 = 287.0;
/// Specific heat of dry air at constant pressure, J/(kg K).
pub const CPD: f64 = 1005.0;
/// Ratio of the molecular weight of water to that of dry air.
pub const EPSILON: f64 = 18.01528 / 28.9644;
/// Latent heat of vaporization of water, J/kg.
pub const LV: f64 = 2_501_000.0;
/// Temperature lapse rate of the standard atmosphere, K/m.
pub const STANDARD_LAPSE_RATE: f64 = -6.5e-3;
/// Standard gravity, m/s².
pub const G: f64 = 9.80665;

/// Pressure at sea level in the standard atmosphere.
pub const STANDARD_PRESSURE: HectoPascal = HectoPascal(1013.25);
/// Temperature at sea level in the standard atmosphere.
pub const STANDARD_TEMPERATURE: Kelvin = Kelvin(288.15);

// Saturation vapor pressure over water at 0C, hPa.
const SAT_PRESSURE_0C: f64 = 6.112;

// Feet per meter, the NOAA pressure altitude formula works in feet.
const FEET_PER_METER: f64 = 3.28084;

/// Temperature of a parcel lifted (or lowered) dry adiabatically to `pressure` from a level
/// where it had temperature `t0` at pressure `p0`.
#[inline]
pub fn dry_lapse<T>(pressure: HectoPascal, t0: T, p0: HectoPascal) -> Kelvin
where
    Kelvin: From<T>,
{
    let t0 = Kelvin::from(t0).unpack();

    Kelvin(t0 * (pressure.unpack() / p0.unpack()).powf(RD / CPD))
}

/// Saturation vapor pressure over liquid water, Bolton's approximation.
#[inline]
pub fn saturation_vapor_pressure<T>(temperature: T) -> HectoPascal
where
    Celsius: From<T>,
{
    let t_c = Celsius::from(temperature).unpack();

    HectoPascal(SAT_PRESSURE_0C * (17.67 * t_c / (t_c + 243.5)).exp())
}

/// Mixing ratio (kg/kg) of a gas with a partial pressure of `partial` in air at pressure `total`.
#[inline]
pub fn mixing_ratio(partial: HectoPascal, total: HectoPascal) -> f64 {
    mixing_ratio_for_gas(partial, total, EPSILON)
}

/// Mixing ratio for a gas with the given ratio of its molecular weight to that of dry air.
#[inline]
pub fn mixing_ratio_for_gas(
    partial: HectoPascal,
    total: HectoPascal,
    molecular_weight_ratio: f64,
) -> f64 {
    let (partial, total) = (partial.unpack(), total.unpack());

    molecular_weight_ratio * partial / (total - partial)
}

/// Mixing ratio (kg/kg) of saturated air at the given pressure and temperature.
#[inline]
pub fn saturation_mixing_ratio<T>(pressure: HectoPascal, temperature: T) -> f64
where
    Celsius: From<T>,
{
    mixing_ratio(saturation_vapor_pressure(temperature), pressure)
}

/// Temperature change with pressure (K/hPa) of a saturated parcel in pseudo-adiabatic ascent.
///
/// Condensed water is assumed to drop out of the parcel immediately.
#[inline]
pub fn moist_gradient_t<T>(pressure: HectoPascal, temperature: T) -> f64
where
    Kelvin: From<T>,
{
    let t_k = Kelvin::from(temperature);
    let rs = saturation_mixing_ratio(pressure, t_k);
    let t_k = t_k.unpack();

    let numerator = RD * t_k + LV * rs;
    let denominator = CPD + LV * LV * rs * EPSILON / (RD * t_k * t_k);

    numerator / denominator / pressure.unpack()
}

/// Partial pressure of water vapor in air at `pressure` with the given mixing ratio (kg/kg).
#[inline]
pub fn vapor_pressure(pressure: HectoPascal, mixing_ratio: f64) -> HectoPascal {
    HectoPascal(pressure.unpack() * mixing_ratio / (EPSILON + mixing_ratio))
}

/// Dew point for a given water vapor pressure, the inverse of `saturation_vapor_pressure`.
#[inline]
pub fn dew_point(vapor_pressure: HectoPascal) -> Kelvin {
    let val = (vapor_pressure.unpack() / SAT_PRESSURE_0C).ln();

    Kelvin::from(Celsius(243.5 * val / (17.67 - val)))
}

/// Relative humidity (%) from temperature and dew point, August-Roche-Magnus approximation.
#[inline]
pub fn relative_humidity<T, D>(temperature: T, dew_point: D) -> f64
where
    Celsius: From<T>,
    Celsius: From<D>,
{
    let t_c = Celsius::from(temperature).unpack();
    let dp_c = Celsius::from(dew_point).unpack();

    100.0 * (magnus_exponent(dp_c) - magnus_exponent(t_c)).exp()
}

/// Dew point from temperature and relative humidity (%), inverse of `relative_humidity`.
///
/// Returns `None` unless the relative humidity is positive.
#[inline]
pub fn dew_point_from_rh<T>(temperature: T, rh: f64) -> Option<Kelvin>
where
    Celsius: From<T>,
{
    if !(rh > 0.0) {
        return None;
    }

    let t_c = Celsius::from(temperature).unpack();
    let gamma = (rh / 100.0).ln() + magnus_exponent(t_c);

    Some(Kelvin::from(Celsius(243.04 * gamma / (17.625 - gamma))))
}

#[inline]
fn magnus_exponent(t_c: f64) -> f64 {
    17.625 * t_c / (243.04 + t_c)
}

/// Height of a pressure level above the level where the pressure is `p0`, using the barometric
/// formula for an atmosphere with the standard lapse rate.
#[inline]
pub fn elevation(pressure: HectoPascal, p0: HectoPascal) -> Meters {
    let ratio = pressure.unpack() / p0.unpack();
    let exponent = -STANDARD_LAPSE_RATE * RD / G;

    Meters(STANDARD_TEMPERATURE.unpack() / STANDARD_LAPSE_RATE * (ratio.powf(exponent) - 1.0))
}

/// Height above mean sea level of a pressure level in the standard atmosphere.
#[inline]
pub fn standard_elevation(pressure: HectoPascal) -> Meters {
    elevation(pressure, STANDARD_PRESSURE)
}

/// Pressure altitude with the NOAA formula.
///
/// This is a coarser approximation than `standard_elevation` and is meant for converting display
/// units, the two are not interchangeable.
#[inline]
pub fn pressure_altitude(pressure: HectoPascal) -> Meters {
    let ratio = pressure.unpack() / STANDARD_PRESSURE.unpack();

    Meters(145_366.45 * (1.0 - ratio.powf(0.190_284)) / FEET_PER_METER)
}

/// Pressure at a given pressure altitude, the inverse of `pressure_altitude`.
#[inline]
pub fn pressure_from_altitude(altitude: Meters) -> HectoPascal {
    let feet = altitude.unpack() * FEET_PER_METER;

    HectoPascal(STANDARD_PRESSURE.unpack() * (1.0 - feet / 145_366.45).powf(1.0 / 0.190_284))
}
