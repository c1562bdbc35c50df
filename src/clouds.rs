//! Rasterize the humidity profile of a sounding into a cloud cover column.
//!
//! Each level's relative humidity is turned into a cloudiness between 0 and 1, with the
//! threshold for cloud rising with altitude. The column of cloudiness values is then upsampled
//! with a bicubic filter to the requested raster size and quantized to 8-bit opacity.
use crate::{
    error::{AnalysisError, Result},
    interpolation::{linear_interpolate, sample_one, Lerp},
    met_formulas::relative_humidity,
    scale::Scale,
    sounding::{DataRow, Sounding},
};
use metfor::{HectoPascal, Quantity};
use tracing::{debug, trace};

use self::{
    kernel::{Grid, KeysCubic},
    lut::BlacknessLut,
};

mod kernel;
mod lut;

// Normalized altitude spans this pressure range.
const ALTITUDE_BOTTOM: f64 = 1050.0;
const ALTITUDE_TOP: f64 = 100.0;
const ALTITUDE_MAX: f64 = 100.0;

// How far outside the lowest and highest levels the clear sky sentinels go, in normalized
// altitude.
const SENTINEL_DEPTH: f64 = 1.0;

const LUT_LEVELS: usize = 160;
const LUT_GAMMA: f64 = 0.6;

// Pixels with a blackness above this are drawn fully transparent.
const ALPHA_THRESHOLD: u8 = 250;

/// Parameters of the relative humidity to cloudiness mapping.
///
/// Cloudiness is `clamp((rh + offset) * scale, 0, 1).powf(power) * factor` with `rh` in percent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CloudinessParams {
    /// Added to the relative humidity, the negative of the humidity where cloud starts.
    pub offset: f64,
    /// Multiplies the shifted humidity, the inverse of the humidity span from clear to overcast.
    pub scale: f64,
    /// Exponent applied to the clamped value.
    pub power: f64,
    /// Maximum cloudiness.
    pub factor: f64,
}

impl CloudinessParams {
    /// Defaults for the bottom of the column.
    pub const LOW: CloudinessParams = CloudinessParams {
        offset: -60.0,
        scale: 1.0 / 30.0,
        power: 1.0,
        factor: 1.0,
    };

    /// Defaults for the top of the column. Cloud needs more humidity and is drawn thinner.
    pub const HIGH: CloudinessParams = CloudinessParams {
        offset: -80.0,
        scale: 1.0 / 20.0,
        power: 1.5,
        factor: 0.7,
    };

    /// Cloudiness for a relative humidity in percent.
    ///
    /// ```
    /// use sounding_parcel::CloudinessParams;
    ///
    /// let params = CloudinessParams::LOW;
    /// assert_eq!(params.cloudiness(50.0), 0.0);
    /// assert_eq!(params.cloudiness(100.0), 1.0);
    /// assert!((params.cloudiness(75.0) - 0.5).abs() < 1.0e-12);
    /// ```
    #[inline]
    pub fn cloudiness(&self, rh: f64) -> f64 {
        let val = ((rh + self.offset) * self.scale).max(0.0).min(1.0);
        val.powf(self.power) * self.factor
    }
}

impl Lerp for CloudinessParams {
    #[inline]
    fn lerp(self, other: Self, frac: f64) -> Self {
        let [offset, scale, power, factor] = [self.offset, self.scale, self.power, self.factor]
            .lerp(
                [other.offset, other.scale, other.power, other.factor],
                frac,
            );

        CloudinessParams {
            offset,
            scale,
            power,
            factor,
        }
    }
}

/// Size of the raster and the cloudiness mapping.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CloudConfig {
    width: usize,
    height: usize,
    low: CloudinessParams,
    high: CloudinessParams,
}

impl Default for CloudConfig {
    fn default() -> Self {
        CloudConfig {
            width: 1,
            height: 200,
            low: CloudinessParams::LOW,
            high: CloudinessParams::HIGH,
        }
    }
}

impl CloudConfig {
    /// Set the raster width in pixels.
    pub fn with_width(self, width: usize) -> Self {
        CloudConfig { width, ..self }
    }

    /// Set the raster height in pixels.
    pub fn with_height(self, height: usize) -> Self {
        CloudConfig { height, ..self }
    }

    /// Set the cloudiness mapping at the bottom of the column.
    pub fn with_low_params(self, low: CloudinessParams) -> Self {
        CloudConfig { low, ..self }
    }

    /// Set the cloudiness mapping at the top of the column.
    pub fn with_high_params(self, high: CloudinessParams) -> Self {
        CloudConfig { high, ..self }
    }

    /// Raster width in pixels.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Raster height in pixels.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Cloudiness mapping at the bottom of the column.
    pub fn low_params(&self) -> CloudinessParams {
        self.low
    }

    /// Cloudiness mapping at the top of the column.
    pub fn high_params(&self) -> CloudinessParams {
        self.high
    }

    /// The cloudiness mapping at a normalized altitude, 0 at the bottom and 100 at the top.
    pub fn params_at(&self, altitude: f64) -> CloudinessParams {
        let altitude = altitude.max(0.0).min(ALTITUDE_MAX);
        linear_interpolate(0.0, self.low, ALTITUDE_MAX, self.high, altitude)
    }
}

/// An 8-bit cloud cover raster, row major with the first row at the top of the atmosphere.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CloudRaster {
    width: usize,
    height: usize,
    opacity: Vec<u8>,
}

impl CloudRaster {
    /// Width in pixels.
    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    /// Height in pixels.
    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    /// Opacity of every pixel, 0 for clear sky and 255 for solid cloud.
    #[inline]
    pub fn opacity(&self) -> &[u8] {
        &self.opacity
    }

    /// Opacity of the pixel at column `x` and row `y`.
    pub fn get(&self, x: usize, y: usize) -> Option<u8> {
        if x >= self.width {
            return None;
        }

        self.opacity.get(y * self.width + x).copied()
    }

    /// One row of the raster.
    pub fn row(&self, y: usize) -> Option<&[u8]> {
        if y >= self.height {
            return None;
        }

        let start = y * self.width;
        Some(&self.opacity[start..(start + self.width)])
    }

    /// The alpha channel for drawing, each pixel either fully transparent or fully opaque.
    pub fn alpha(&self) -> Vec<u8> {
        self.opacity.iter().map(|&op| alpha_for(op)).collect()
    }

    /// Gray pixels for drawing, 4 bytes per pixel with the blackness in the color channels.
    pub fn to_rgba(&self) -> Vec<u8> {
        self.opacity
            .iter()
            .flat_map(|&op| {
                let blackness = 255 - op;
                vec![blackness, blackness, blackness, alpha_for(op)]
            })
            .collect()
    }
}

#[inline]
fn alpha_for(opacity: u8) -> u8 {
    if 255 - opacity > ALPHA_THRESHOLD {
        0
    } else {
        255
    }
}

/// Rasterize the cloud cover implied by the humidity in a sounding.
///
/// # Errors
///
/// Fails if the sounding doesn't validate, see `compute_clouds` for the rest.
pub fn cloud_raster(snd: &Sounding, config: &CloudConfig) -> Result<CloudRaster> {
    snd.validate()?;
    debug!(
        source = snd.source_description(),
        valid_time = ?snd.valid_time(),
        "cloud raster"
    );
    compute_clouds(snd.bottom_up(), config)
}

/// Rasterize the cloud cover implied by the humidity in some levels, in any order.
///
/// Levels need a pressure and either a relative humidity or both a temperature and dew point to
/// be used. Levels above 100 hPa are ignored. The sky is clear below the lowest and above the
/// highest usable level.
///
/// # Errors
///
/// `InvalidInput` if the raster has no pixels, `NotEnoughData` if no level can be used.
pub fn compute_clouds<I>(levels: I, config: &CloudConfig) -> Result<CloudRaster>
where
    I: IntoIterator<Item = DataRow>,
{
    if config.width == 0 || config.height == 0 {
        return Err(AnalysisError::InvalidInput);
    }

    let altitude = Scale::log(&[ALTITUDE_BOTTOM, ALTITUDE_TOP], &[0.0, ALTITUDE_MAX])?;

    let mut column: Vec<(f64, f64)> = levels
        .into_iter()
        .filter_map(|row| {
            let pressure = row.pressure.into_option()?;
            if pressure < HectoPascal(ALTITUDE_TOP) {
                return None;
            }
            let rh = level_humidity(&row)?;

            Some((altitude.forward(pressure.unpack()), rh))
        })
        .collect();

    if column.is_empty() {
        return Err(AnalysisError::NotEnoughData);
    }

    column.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(std::cmp::Ordering::Equal));
    let lowest = column[0].0;
    let highest = column[column.len() - 1].0;
    column.insert(0, (lowest - SENTINEL_DEPTH, 0.0));
    column.push((highest + SENTINEL_DEPTH, 0.0));

    let altitudes: Vec<f64> = column.iter().map(|&(alt, _)| alt).collect();
    let indices: Vec<f64> = (0..column.len()).map(|i| i as f64).collect();
    let grid = Grid {
        width: 1,
        height: column.len(),
        values: column
            .iter()
            .map(|&(alt, rh)| config.params_at(alt).cloudiness(rh))
            .collect(),
    };

    trace!(
        levels = grid.height,
        width = config.width,
        height = config.height,
        "rasterizing clouds"
    );

    let kernel = KeysCubic::default();
    let lut = BlacknessLut::new(LUT_LEVELS, LUT_GAMMA);
    let x_scale = grid.width as f64 / config.width as f64;

    let mut opacity = Vec::with_capacity(config.width * config.height);
    for y in 0..config.height {
        let alt = ALTITUDE_MAX * (1.0 - (y as f64 + 0.5) / config.height as f64);
        let src_y = sample_one(&altitudes, &indices, alt).unwrap_or(0.0);

        for x in 0..config.width {
            let src_x = (x as f64 + 0.5) * x_scale - 0.5;
            let blackness = lut.blackness(grid.sample(&kernel, src_x, src_y));
            opacity.push(255 - blackness);
        }
    }

    Ok(CloudRaster {
        width: config.width,
        height: config.height,
        opacity,
    })
}

fn level_humidity(row: &DataRow) -> Option<f64> {
    row.relative_humidity.into_option().or_else(|| {
        let t = row.temperature.into_option()?;
        let dp = row.dew_point.into_option()?;
        Some(relative_humidity(t, dp))
    })
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::utility::test_tools::*;
    use metfor::{Celsius, Kelvin};
    use optional::{none, some};

    fn row(pressure: f64, rh: f64) -> DataRow {
        DataRow {
            pressure: some(HectoPascal(pressure)),
            relative_humidity: some(rh),
            ..DataRow::default()
        }
    }

    #[test]
    fn test_params_at() {
        let config = CloudConfig::default();

        assert_eq!(config.params_at(0.0), CloudinessParams::LOW);
        assert_eq!(config.params_at(-20.0), CloudinessParams::LOW);

        let high = CloudinessParams::HIGH;
        for &alt in &[100.0, 150.0] {
            let params = config.params_at(alt);
            assert!(approx_equal(params.offset, high.offset, 1.0e-12));
            assert!(approx_equal(params.scale, high.scale, 1.0e-12));
            assert!(approx_equal(params.power, high.power, 1.0e-12));
            assert!(approx_equal(params.factor, high.factor, 1.0e-12));
        }

        let mid = config.params_at(50.0);
        assert!(approx_equal(mid.offset, -70.0, 1.0e-12));
        assert!(approx_equal(mid.factor, 0.85, 1.0e-12));
        assert!(approx_equal(mid.power, 1.25, 1.0e-12));
    }

    #[test]
    fn test_level_humidity() {
        assert_eq!(level_humidity(&row(900.0, 42.0)), Some(42.0));

        let derived = DataRow {
            pressure: some(HectoPascal(900.0)),
            temperature: some(Kelvin::from(Celsius(20.0))),
            dew_point: some(Kelvin::from(Celsius(20.0))),
            ..DataRow::default()
        };
        assert!(approx_equal(level_humidity(&derived).unwrap(), 100.0, 1.0e-9));

        let missing = DataRow {
            pressure: some(HectoPascal(900.0)),
            temperature: some(Kelvin(290.0)),
            dew_point: none(),
            ..DataRow::default()
        };
        assert_eq!(level_humidity(&missing), None);
    }

    #[test]
    fn test_compute_clouds_errors() {
        let levels = vec![row(900.0, 95.0)];

        assert_eq!(
            compute_clouds(levels.clone(), &CloudConfig::default().with_width(0)),
            Err(AnalysisError::InvalidInput)
        );
        assert_eq!(
            compute_clouds(levels, &CloudConfig::default().with_height(0)),
            Err(AnalysisError::InvalidInput)
        );
        assert_eq!(
            compute_clouds(Vec::<DataRow>::new(), &CloudConfig::default()),
            Err(AnalysisError::NotEnoughData)
        );

        // Only levels above 100 hPa
        assert_eq!(
            compute_clouds(vec![row(50.0, 100.0)], &CloudConfig::default()),
            Err(AnalysisError::NotEnoughData)
        );
    }

    #[test]
    fn test_single_moist_level() {
        let levels: Vec<DataRow> = (0..19)
            .map(|i| 1000.0 - 50.0 * i as f64)
            .map(|p| row(p, if p == 700.0 { 100.0 } else { 0.0 }))
            .collect();

        let raster = compute_clouds(levels, &CloudConfig::default()).unwrap();
        assert_eq!(raster.width(), 1);
        assert_eq!(raster.height(), 200);

        let column = raster.opacity();
        let (peak, &max) = column
            .iter()
            .enumerate()
            .max_by_key(|&(_, &op)| op)
            .unwrap();

        assert!((164..=166).contains(&peak));
        assert!(max > 200);

        assert!(column[..peak].windows(2).all(|pair| pair[0] <= pair[1]));
        assert!(column[peak..].windows(2).all(|pair| pair[0] >= pair[1]));
        assert!(column[..=136].iter().all(|&op| op == 0));
        assert!(column[182..].iter().all(|&op| op == 0));
    }

    #[test]
    fn test_clear_above_highest_level() {
        // Saturated at the top of a sounding that stops at 600 hPa.
        let levels: Vec<DataRow> = (0..9)
            .map(|i| 1000.0 - 50.0 * i as f64)
            .map(|p| row(p, if p == 600.0 { 100.0 } else { 0.0 }))
            .collect();

        let raster = compute_clouds(levels, &CloudConfig::default()).unwrap();
        let column = raster.opacity();

        // 600 hPa is about 24% of the way up.
        let (peak, &max) = column
            .iter()
            .enumerate()
            .max_by_key(|&(_, &op)| op)
            .unwrap();
        assert!((148..=154).contains(&peak), "peak at row {}", peak);
        assert!(max > 200);

        // Nothing is known between 600 and 100 hPa.
        assert!(column[..=140].iter().all(|&op| op == 0));
        assert!(column[..peak].windows(2).all(|pair| pair[0] <= pair[1]));
    }

    #[test]
    fn test_raster_accessors() {
        let levels = vec![row(1000.0, 100.0), row(500.0, 100.0), row(200.0, 100.0)];
        let raster = compute_clouds(levels, &CloudConfig::default().with_width(3)).unwrap();

        assert_eq!(raster.opacity().len(), 600);
        assert_eq!(raster.row(0).map(|r| r.len()), Some(3));
        assert_eq!(raster.row(200), None);
        assert_eq!(raster.get(3, 0), None);

        // Columns are identical for a single column of data
        let middle = raster.row(100).unwrap();
        assert!(middle.iter().all(|&op| op == middle[0]));
        assert_eq!(raster.get(1, 100), Some(middle[0]));

        let alpha = raster.alpha();
        let rgba = raster.to_rgba();
        assert_eq!(rgba.len(), 4 * 600);
        for (i, &op) in raster.opacity().iter().enumerate() {
            assert_eq!(rgba[4 * i], 255 - op);
            assert_eq!(rgba[4 * i + 3], alpha[i]);
            assert_eq!(alpha[i] == 0, op < 5);
        }
    }
}
