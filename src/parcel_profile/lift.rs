use super::{CloudTop, ParcelProfile};
use crate::{
    error::{AnalysisError, Result},
    interpolation::sample_one,
    intersection::first_crossing,
    met_formulas::{dew_point, dry_lapse, moist_gradient_t, vapor_pressure},
    parcel::SurfaceConditions,
    scale::Scale,
    sounding::ProfileLevels,
};
use itertools::izip;
use metfor::{HectoPascal, Kelvin, Meters, Quantity};
use tracing::warn;

/// Curves that touch at their start are not considered crossed there if they agree to within
/// this many Kelvin.
pub(super) const CONTACT_TOLERANCE: f64 = 1.0e-6;

/// The environment the parcel is lifted through, with elevation as the vertical coordinate.
pub(super) struct Environment {
    pub heights: Vec<f64>,
    pub temperatures: Vec<f64>,
    pressure_to_height: Scale,
}

impl Environment {
    pub fn new(levels: &ProfileLevels) -> Result<Self> {
        let heights = levels.height_values();
        let pressure_to_height = Scale::log(&levels.pressure_values(), &heights)?;

        Ok(Environment {
            heights,
            temperatures: levels.temperature_values(),
            pressure_to_height,
        })
    }

    #[inline]
    pub fn height_at(&self, pressure: f64) -> f64 {
        self.pressure_to_height.forward(pressure)
    }

    #[inline]
    pub fn pressure_at(&self, height: f64) -> f64 {
        self.pressure_to_height.inverse(height)
    }

    #[inline]
    pub fn temperature_at(&self, height: f64) -> f64 {
        sample_one(&self.heights, &self.temperatures, height).unwrap_or(std::f64::NAN)
    }

    #[inline]
    pub fn top(&self) -> f64 {
        self.heights.last().cloned().unwrap_or(std::f64::NAN)
    }
}

/// The dry part of the ascent, sampled at evenly spaced elevations from the parcel's starting
/// level to the top of the sounding.
pub(super) struct DryAscent {
    pub step: f64,
    pub elevation: Vec<f64>,
    pub pressure: Vec<f64>,
    /// Dry adiabat from the parcel temperature.
    pub dry: Vec<f64>,
    /// Dew point of the parcel, constant mixing ratio.
    pub isohume: Vec<f64>,
    /// Dry adiabat from the environment temperature at the parcel's starting level.
    pub env_dry: Vec<f64>,
}

impl DryAscent {
    /// Dry adiabat through every level of the ascent, starting at `t0` at the parcel pressure.
    pub fn adiabat_from(&self, t0: Kelvin, p0: HectoPascal) -> Vec<f64> {
        self.pressure
            .iter()
            .map(|&p| dry_lapse(HectoPascal(p), t0, p0).unpack())
            .collect()
    }
}

pub(super) fn dry_ascent(
    env: &Environment,
    surface: &SurfaceConditions,
    steps: usize,
) -> Result<DryAscent> {
    if steps == 0 {
        return Err(AnalysisError::InvalidInput);
    }

    let min_el = env.height_at(surface.pressure.unpack());
    let max_el = env.top();
    if !(max_el > min_el) {
        return Err(AnalysisError::NotEnoughData);
    }

    let step = (max_el - min_el) / steps as f64;
    let env_t0 = Kelvin(env.temperature_at(min_el));
    let mw = surface.mixing_ratio();

    let elevation: Vec<f64> = (0..=steps)
        .map(|i| (min_el + i as f64 * step).min(max_el))
        .collect();
    let pressure: Vec<f64> = elevation.iter().map(|&e| env.pressure_at(e)).collect();

    let mut dry = Vec::with_capacity(pressure.len());
    let mut isohume = Vec::with_capacity(pressure.len());
    let mut env_dry = Vec::with_capacity(pressure.len());
    for &p in &pressure {
        let p = HectoPascal(p);
        dry.push(dry_lapse(p, surface.temperature, surface.pressure).unpack());
        isohume.push(dew_point(vapor_pressure(p, mw)).unpack());
        env_dry.push(dry_lapse(p, env_t0, surface.pressure).unpack());
    }

    Ok(DryAscent {
        step,
        elevation,
        pressure,
        dry,
        isohume,
        env_dry,
    })
}

/// A saturated parcel path from a starting elevation up to the top of the sounding.
pub(super) struct MoistAscent {
    pub elevation: Vec<f64>,
    pub pressure: Vec<f64>,
    pub temperature: Vec<f64>,
}

/// Integrate the pseudo-adiabatic lapse rate upward with explicit Euler steps in elevation.
pub(super) fn moist_ascent(
    env: &Environment,
    start_el: f64,
    start_t: f64,
    step: f64,
) -> MoistAscent {
    let max_el = env.top();
    let remaining = (max_el - start_el) / step;
    let num_steps = if remaining.is_finite() && remaining > 0.0 {
        remaining.ceil() as usize
    } else {
        0
    };

    let mut elevation = Vec::with_capacity(num_steps + 1);
    let mut pressure = Vec::with_capacity(num_steps + 1);
    let mut temperature = Vec::with_capacity(num_steps + 1);

    let mut p = env.pressure_at(start_el);
    let mut t = start_t;
    elevation.push(start_el);
    pressure.push(p);
    temperature.push(t);

    for i in 1..=num_steps {
        let e_next = (start_el + i as f64 * step).min(max_el);
        let p_next = env.pressure_at(e_next);

        t += (p_next - p) * moist_gradient_t(HectoPascal(p), Kelvin(t));
        p = p_next;

        elevation.push(e_next);
        pressure.push(p);
        temperature.push(t);
    }

    MoistAscent {
        elevation,
        pressure,
        temperature,
    }
}

/// Find where a saturated ascent comes back into equilibrium with the environment.
///
/// Returns the cloud top along with the moist path cut off there.
pub(super) fn equilibrium(env: &Environment, moist: &MoistAscent) -> (CloudTop, ParcelProfile) {
    if moist.elevation.len() < 2 {
        return (CloudTop::Unbounded, moist_profile(moist, None));
    }

    // Already colder than the environment after one step, take that as the equilibrium rather
    // than looking for a crossing further up. Otherwise search from the first step, the start
    // may sit on the environment curve to within the integration error.
    let first_top = if moist.temperature[1] < env.temperature_at(moist.elevation[1]) {
        Some((moist.elevation[1], moist.temperature[1]))
    } else {
        first_crossing(
            &moist.elevation[1..],
            &moist.temperature[1..],
            &env.heights,
            &env.temperatures,
            CONTACT_TOLERANCE,
        )
    };

    match first_top {
        Some((height, temperature)) => {
            let pressure = env.pressure_at(height);
            let top = CloudTop::Bounded {
                pressure: HectoPascal(pressure),
                height: Meters(height),
            };
            (top, moist_profile(moist, Some((pressure, temperature))))
        }
        None => {
            warn!(
                top = env.top(),
                "saturated parcel still buoyant at the top of the sounding"
            );
            (CloudTop::Unbounded, moist_profile(moist, None))
        }
    }
}

fn moist_profile(moist: &MoistAscent, top: Option<(f64, f64)>) -> ParcelProfile {
    let p_top = top.map(|(p, _)| p).unwrap_or(std::f64::NEG_INFINITY);

    let mut profile: ParcelProfile = izip!(&moist.pressure, &moist.temperature)
        .filter(|(p, _)| **p > p_top)
        .map(|(&p, &t)| (p, t))
        .collect();

    if let Some((p, t)) = top {
        profile.push(HectoPascal(p), Kelvin(t));
    }

    profile
}
