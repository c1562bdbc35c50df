//! Data type and methods to store an atmospheric sounding.

use crate::{
    error::{AnalysisError, Result},
    utility::strictly_monotonic,
};
use chrono::NaiveDateTime;
use itertools::izip;
use metfor::{HectoPascal, Kelvin, Meters, Quantity};
use optional::Optioned;

pub use self::{data_row::DataRow, profile_levels::ProfileLevels};

mod data_row;
mod profile_levels;

/// The order the levels of a sounding are stored in.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PressureOrder {
    /// Pressure decreases with index, the first row is the surface.
    Descending,
    /// Pressure increases with index, the last row is the surface.
    Ascending,
}

impl Default for PressureOrder {
    fn default() -> Self {
        PressureOrder::Descending
    }
}

/// All the variables stored in the sounding.
///
/// The upper air profile variables are stored in parallel vectors. If a profile lacks a certain
/// variable, e.g. relative humidity, that whole vector has length 0 instead of being full of
/// missing values.
///
/// Humidity can be supplied as a dew point profile, a relative humidity profile, or both.
#[derive(Clone, Debug, Default)]
pub struct Sounding {
    // Description of the source of the sounding.
    source: Option<String>,

    // Valid time of sounding
    valid_time: Option<NaiveDateTime>,

    // Declared order of the rows
    pressure_order: PressureOrder,

    // Profiles
    pressure: Vec<Optioned<HectoPascal>>,
    height: Vec<Optioned<Meters>>,
    temperature: Vec<Optioned<Kelvin>>,
    dew_point: Vec<Optioned<Kelvin>>,
    relative_humidity: Vec<Optioned<f64>>,
}

macro_rules! make_profile_setter {
    ($(#[$attr:meta])* => $name:tt, $inner_type:tt, $p_var:ident) => {
        $(#[$attr])*
        pub fn $name<T>(self, profile: Vec<Optioned<T>>) -> Self
        where
            T: optional::Noned + Copy,
            $inner_type: From<T>,
        {
            let $p_var = profile.into_iter().map(|v| v.map_t($inner_type::from)).collect();
            Self {$p_var, ..self}
        }
    };
}

impl Sounding {
    /// Create a new sounding with default values. This is a proxy for default with a clearer name.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use sounding_parcel::Sounding;
    ///
    /// let snd = Sounding::new();
    /// println!("{:?}", snd);
    /// ```
    #[inline]
    pub fn new() -> Self {
        Sounding::default()
    }

    /// Add a source description to this sounding.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use sounding_parcel::Sounding;
    ///
    /// let snd = Sounding::new().with_source_description("An empty sounding.".to_owned());
    /// assert_eq!(snd.source_description().unwrap(), "An empty sounding.");
    ///
    /// let snd = snd.with_source_description(None);
    /// assert!(snd.source_description().is_none());
    /// ```
    #[inline]
    pub fn with_source_description<S>(mut self, desc: S) -> Self
    where
        Option<String>: From<S>,
    {
        self.source = Option::from(desc);
        self
    }

    /// Retrieve a source description for this sounding.
    #[inline]
    pub fn source_description(&self) -> Option<&str> {
        self.source.as_ref().map(|s| s.as_ref())
    }

    /// Builder method for the valid time.
    ///
    /// ```
    /// use chrono::NaiveDate;
    /// use sounding_parcel::Sounding;
    ///
    /// let vt = NaiveDate::from_ymd_opt(2017, 4, 1).unwrap().and_hms_opt(12, 0, 0).unwrap();
    /// let snd = Sounding::new().with_valid_time(vt);
    /// assert_eq!(snd.valid_time(), Some(vt));
    ///
    /// let snd = snd.with_valid_time(None);
    /// assert!(snd.valid_time().is_none());
    /// ```
    #[inline]
    pub fn with_valid_time<T>(mut self, valid_time: T) -> Self
    where
        Option<NaiveDateTime>: From<T>,
    {
        self.valid_time = Option::from(valid_time);
        self
    }

    /// Get the valid time of the sounding.
    #[inline]
    pub fn valid_time(&self) -> Option<NaiveDateTime> {
        self.valid_time
    }

    /// Builder method to declare the order of the rows. The default is `Descending`, surface
    /// first.
    #[inline]
    pub fn with_pressure_order(self, pressure_order: PressureOrder) -> Self {
        Self {
            pressure_order,
            ..self
        }
    }

    /// Get the declared order of the rows.
    #[inline]
    pub fn pressure_order(&self) -> PressureOrder {
        self.pressure_order
    }

    make_profile_setter!(
        /// Builder method for the pressure profile.
        ///
        /// # Examples
        /// ```rust
        /// use sounding_parcel::Sounding;
        /// use metfor::HectoPascal;
        /// use optional::{some, Optioned};
        ///
        /// let data = vec![1000.0, 925.0, 850.0, 700.0, 500.0, 300.0, 250.0, 200.0, 150.0, 100.0];
        /// let pressure_data: Vec<Optioned<HectoPascal>> = data.into_iter()
        ///     .map(HectoPascal)
        ///     .map(some)
        ///     .collect();
        ///
        /// let snd = Sounding::new()
        ///     .with_pressure_profile(pressure_data);
        /// assert_eq!(snd.pressure_profile().len(), 10);
        /// ```
        #[inline]
        => with_pressure_profile, HectoPascal, pressure
    );

    /// Get the pressure profile
    ///
    /// Uninitialized profiles just return an empty slice.
    #[inline]
    pub fn pressure_profile(&self) -> &[Optioned<HectoPascal>] {
        &self.pressure
    }

    make_profile_setter!(
        /// Builder method for the geopotential height profile.
        ///
        /// See `with_pressure_profile` for an example of usage, keeping in mind the units type may
        /// be different.
        #[inline]
        => with_height_profile, Meters, height
    );

    /// Get the geopotential height profile.
    #[inline]
    pub fn height_profile(&self) -> &[Optioned<Meters>] {
        &self.height
    }

    make_profile_setter!(
        /// Builder method for the temperature profile. Any temperature unit can be used, it is
        /// stored in Kelvin.
        ///
        /// # Examples
        /// ```rust
        /// use sounding_parcel::Sounding;
        /// use metfor::{Celsius, Quantity};
        /// use optional::some;
        ///
        /// let snd = Sounding::new()
        ///     .with_temperature_profile(vec![some(Celsius(20.0)), some(Celsius(15.0))]);
        ///
        /// let t = snd.temperature_profile()[0].unpack().unpack();
        /// assert!((t - 293.15).abs() < 1.0e-9);
        /// ```
        #[inline]
        => with_temperature_profile, Kelvin, temperature
    );

    /// Get the temperature profile.
    #[inline]
    pub fn temperature_profile(&self) -> &[Optioned<Kelvin>] {
        &self.temperature
    }

    make_profile_setter!(
        /// Builder method for the dew point profile. Any temperature unit can be used, it is stored
        /// in Kelvin.
        #[inline]
        => with_dew_point_profile, Kelvin, dew_point
    );

    /// Get the dew point profile.
    #[inline]
    pub fn dew_point_profile(&self) -> &[Optioned<Kelvin>] {
        &self.dew_point
    }

    /// Builder method for the relative humidity profile, in percent.
    #[inline]
    pub fn with_relative_humidity_profile(self, relative_humidity: Vec<Optioned<f64>>) -> Self {
        Self {
            relative_humidity,
            ..self
        }
    }

    /// Get the relative humidity profile.
    #[inline]
    pub fn relative_humidity_profile(&self) -> &[Optioned<f64>] {
        &self.relative_humidity
    }

    /// Check the sounding is usable for analysis.
    ///
    /// There must be a pressure profile, every other profile that is present must have the same
    /// length, and the pressures that are present must be strictly monotonic in the declared
    /// order.
    pub fn validate(&self) -> Result<()> {
        if self.pressure.is_empty() {
            return Err(AnalysisError::MissingProfile);
        }

        let len = self.pressure.len();
        let lengths = [
            self.height.len(),
            self.temperature.len(),
            self.dew_point.len(),
            self.relative_humidity.len(),
        ];
        if lengths.iter().any(|&l| l != 0 && l != len) {
            return Err(AnalysisError::MismatchedProfileLength);
        }

        let pressures: Vec<f64> = self
            .pressure
            .iter()
            .filter(|p| p.is_some())
            .map(|p| p.unpack().unpack())
            .collect();

        if !strictly_monotonic(pressures.iter().cloned()) {
            return Err(AnalysisError::NonMonotonicPressure);
        }

        if pressures.len() > 1 {
            let descending = pressures[0] > pressures[1];
            if descending != (self.pressure_order == PressureOrder::Descending) {
                return Err(AnalysisError::NonMonotonicPressure);
            }
        }

        Ok(())
    }

    /// Get the levels a parcel can be lifted through, ordered from the bottom up.
    ///
    /// A row is used only if it has a pressure, height, and temperature. Rows missing any of
    /// them are dropped from all the profiles together.
    pub fn levels(&self) -> Result<ProfileLevels> {
        self.validate()?;

        if self.height.is_empty() || self.temperature.is_empty() {
            return Err(AnalysisError::MissingProfile);
        }

        let valid_rows: Vec<usize> = izip!(0.., &self.pressure, &self.height, &self.temperature)
            .filter(|(_, p, h, t)| p.is_some() && h.is_some() && t.is_some())
            .map(|(i, _, _, _)| i)
            .collect();

        if valid_rows.is_empty() {
            return Err(AnalysisError::NoDataProfile);
        }
        if valid_rows.len() < 2 {
            return Err(AnalysisError::NotEnoughData);
        }

        let mut levels = ProfileLevels {
            pressure: valid_rows.iter().map(|&i| self.pressure[i].unpack()).collect(),
            height: valid_rows.iter().map(|&i| self.height[i].unpack()).collect(),
            temperature: valid_rows
                .iter()
                .map(|&i| self.temperature[i].unpack())
                .collect(),
        };

        if self.pressure_order == PressureOrder::Ascending {
            levels.pressure.reverse();
            levels.height.reverse();
            levels.temperature.reverse();
        }

        if levels
            .height
            .windows(2)
            .any(|pair| !(pair[0].unpack() < pair[1].unpack()))
        {
            return Err(AnalysisError::InvalidInput);
        }

        Ok(levels)
    }

    /// Get a row of data values from this sounding.
    ///
    /// Rows are indexed in storage order.
    #[inline]
    pub fn data_row(&self, idx: usize) -> Option<DataRow> {
        macro_rules! copy_to_result {
            ($result:ident, $profile:ident, $idx:ident) => {
                match self.$profile.get($idx) {
                    None => {}
                    Some(opt_val) => $result.$profile = *opt_val,
                }
            };
        }

        if idx >= self.pressure.len() {
            return None;
        }

        let mut result = DataRow::default();

        copy_to_result!(result, pressure, idx);
        copy_to_result!(result, height, idx);
        copy_to_result!(result, temperature, idx);
        copy_to_result!(result, dew_point, idx);
        copy_to_result!(result, relative_humidity, idx);

        Some(result)
    }

    /// Get a bottom up iterator over the data rows, whatever order they are stored in.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use sounding_parcel::{PressureOrder, Sounding};
    /// use metfor::HectoPascal;
    /// use optional::some;
    ///
    /// let snd = Sounding::new()
    ///     .with_pressure_profile(vec![some(HectoPascal(500.0)), some(HectoPascal(1000.0))])
    ///     .with_pressure_order(PressureOrder::Ascending);
    ///
    /// let first = snd.bottom_up().next().unwrap();
    /// assert_eq!(first.pressure.unpack(), HectoPascal(1000.0));
    /// ```
    #[inline]
    pub fn bottom_up<'a>(&'a self) -> impl Iterator<Item = DataRow> + 'a {
        let len = self.pressure.len() as isize;
        let (next_idx, direction) = match self.pressure_order {
            PressureOrder::Descending => (0, 1),
            PressureOrder::Ascending => (len - 1, -1),
        };

        ProfileIterator {
            next_idx,
            direction,
            src: self,
        }
    }
}

struct ProfileIterator<'a> {
    next_idx: isize,
    direction: isize, // +1 for bottom up, -1 for top down
    src: &'a Sounding,
}

impl<'a> Iterator for ProfileIterator<'a> {
    type Item = DataRow;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        if self.next_idx < 0 {
            return None;
        }

        let result = self.src.data_row(self.next_idx as usize);
        self.next_idx += self.direction;
        result
    }
}
