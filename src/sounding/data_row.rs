use metfor::{HectoPascal, Kelvin, Meters};
use optional::Optioned;

/// A copy of a row of the sounding data.
#[derive(Clone, Default, Copy, Debug, PartialEq)]
pub struct DataRow {
    /// Pressure in hPa
    pub pressure: Optioned<HectoPascal>,
    /// Geopotential Height in meters
    pub height: Optioned<Meters>,
    /// Temperature in Kelvin
    pub temperature: Optioned<Kelvin>,
    /// Dew point in Kelvin
    pub dew_point: Optioned<Kelvin>,
    /// Relative humidity in percent
    pub relative_humidity: Optioned<f64>,
}
