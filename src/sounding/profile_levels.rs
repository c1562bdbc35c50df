use metfor::{HectoPascal, Kelvin, Meters, Quantity};

/// The cleaned levels of a sounding that a parcel is lifted through.
///
/// Every level has a pressure, height, and temperature, and the levels are ordered from the
/// bottom up with strictly increasing height. Create these with `Sounding::levels`.
#[derive(Clone, Debug, PartialEq)]
pub struct ProfileLevels {
    /// Pressure profile, decreasing.
    pub pressure: Vec<HectoPascal>,
    /// Geopotential height profile, increasing.
    pub height: Vec<Meters>,
    /// Environmental temperature profile.
    pub temperature: Vec<Kelvin>,
}

impl ProfileLevels {
    /// The number of levels.
    #[inline]
    pub fn len(&self) -> usize {
        self.pressure.len()
    }

    /// Whether there are no levels at all.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.pressure.is_empty()
    }

    /// Height of the highest level.
    #[inline]
    pub fn top_height(&self) -> Option<Meters> {
        self.height.last().cloned()
    }

    pub(crate) fn pressure_values(&self) -> Vec<f64> {
        self.pressure.iter().map(|p| p.unpack()).collect()
    }

    pub(crate) fn height_values(&self) -> Vec<f64> {
        self.height.iter().map(|h| h.unpack()).collect()
    }

    pub(crate) fn temperature_values(&self) -> Vec<f64> {
        self.temperature.iter().map(|t| t.unpack()).collect()
    }
}
