//! The starting point of a lifted parcel.

use crate::{
    error::{AnalysisError, Result},
    met_formulas::{dew_point_from_rh, mixing_ratio, saturation_vapor_pressure},
    sounding::{DataRow, Sounding},
};
use metfor::{CelsiusDiff, HectoPascal, Kelvin, Quantity};

/// Variables defining the surface parcel that is lifted.
///
/// These are independent of the sounding's own surface row, so a parcel can be started warmer
/// than the observed surface temperature to see how the sounding responds to daytime heating.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceConditions {
    /// Temperature of the parcel
    pub temperature: Kelvin,
    /// Pressure the parcel starts at
    pub pressure: HectoPascal,
    /// Dew point of the parcel
    pub dew_point: Kelvin,
}

impl SurfaceConditions {
    /// Take the surface conditions from the lowest usable row of a sounding, and shift the parcel
    /// temperature by `shift`.
    ///
    /// A row is usable if it has a pressure, a temperature, and either a dew point or a relative
    /// humidity. The dew point is derived from the relative humidity only when it is missing.
    pub fn from_sounding(snd: &Sounding, shift: CelsiusDiff) -> Result<Self> {
        snd.validate()?;

        let surface = snd
            .bottom_up()
            .filter_map(|row| Self::from_row(&row))
            .next()
            .ok_or(AnalysisError::MissingValue)?;

        Ok(surface.with_temperature_shift(shift))
    }

    fn from_row(row: &DataRow) -> Option<Self> {
        let pressure = row.pressure.into_option()?;
        let temperature = row.temperature.into_option()?;
        let dew_point = row.dew_point.into_option().or_else(|| {
            row.relative_humidity
                .into_option()
                .and_then(|rh| dew_point_from_rh(temperature, rh))
        })?;

        Some(SurfaceConditions {
            temperature,
            pressure,
            dew_point,
        })
    }

    /// Get a copy with the parcel temperature shifted, the dew point and pressure are unchanged.
    #[inline]
    pub fn with_temperature_shift(self, shift: CelsiusDiff) -> Self {
        SurfaceConditions {
            temperature: Kelvin(self.temperature.unpack() + shift.unpack()),
            ..self
        }
    }

    /// Get the mixing ratio of the parcel in kg/kg.
    #[inline]
    pub fn mixing_ratio(&self) -> f64 {
        mixing_ratio(saturation_vapor_pressure(self.dew_point), self.pressure)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::utility::test_tools::*;
    use metfor::Celsius;
    use optional::{none, some};

    #[test]
    fn test_from_sounding() {
        let snd = Sounding::new()
            .with_pressure_profile(vec![
                none(),
                some(HectoPascal(1000.0)),
                some(HectoPascal(900.0)),
            ])
            .with_temperature_profile(vec![
                some(Celsius(30.0)),
                some(Celsius(25.0)),
                some(Celsius(18.0)),
            ])
            .with_dew_point_profile(vec![
                some(Celsius(20.0)),
                some(Celsius(15.0)),
                some(Celsius(10.0)),
            ]);

        let sfc = SurfaceConditions::from_sounding(&snd, CelsiusDiff(2.0)).unwrap();
        assert_eq!(sfc.pressure, HectoPascal(1000.0));
        assert!(approx_equal(sfc.temperature.unpack(), 300.15, 1.0e-9));
        assert!(approx_equal(sfc.dew_point.unpack(), 288.15, 1.0e-9));

        let unshifted = sfc.with_temperature_shift(CelsiusDiff(-2.0));
        assert!(approx_equal(unshifted.temperature.unpack(), 298.15, 1.0e-9));
    }

    #[test]
    fn test_from_relative_humidity() {
        let snd = Sounding::new()
            .with_pressure_profile(vec![some(HectoPascal(950.0)), some(HectoPascal(900.0))])
            .with_temperature_profile(vec![some(Celsius(20.0)), some(Celsius(18.0))])
            .with_relative_humidity_profile(vec![some(100.0), some(80.0)]);

        let sfc = SurfaceConditions::from_sounding(&snd, CelsiusDiff(0.0)).unwrap();
        assert!(approx_equal(
            sfc.dew_point.unpack(),
            sfc.temperature.unpack(),
            1.0e-9
        ));

        let snd = Sounding::new()
            .with_pressure_profile(vec![some(HectoPascal(950.0))])
            .with_temperature_profile(vec![some(Celsius(20.0))]);
        assert_eq!(
            SurfaceConditions::from_sounding(&snd, CelsiusDiff(0.0)),
            Err(AnalysisError::MissingValue)
        );
    }

    #[test]
    fn test_mixing_ratio() {
        let sfc = SurfaceConditions {
            temperature: Kelvin(300.0),
            pressure: HectoPascal(1000.0),
            dew_point: Kelvin::from(Celsius(20.0)),
        };

        assert!(approx_equal(sfc.mixing_ratio(), 0.0149, 0.0005));
    }
}
