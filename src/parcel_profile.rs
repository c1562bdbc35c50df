//! Lift a parcel through a sounding and find the levels that shape its path.
//!
//! The parcel starts from a set of `SurfaceConditions` and is lifted dry adiabatically while its
//! dew point follows an isohume. Where these meet is the cloud base. Where the dry adiabat meets
//! the environment is the thermal top, and if the cloud base is below that the parcel keeps
//! rising moist adiabatically until it is in equilibrium with the environment again.
//!
//! The same lift from the environment's own surface temperature gives the LCL, and heating the
//! surface until a dry adiabat reaches the isohume without being stopped by an inversion gives
//! the CCL and convective temperature.
use crate::{
    error::{AnalysisError, Result},
    intersection::first_crossing,
    parcel::SurfaceConditions,
    sounding::Sounding,
};
use itertools::izip;
use metfor::{CelsiusDiff, HectoPascal, Kelvin, Meters, Quantity};
use optional::Optioned;
use std::iter::FromIterator;
use strum::IntoEnumIterator;
use strum_macros::{AsRefStr, EnumIter};
use tracing::{debug, warn};

pub use self::convective::Refinement;
use self::{
    convective::{refine_convective_temperature, SearchCurves, SearchLimits},
    lift::{DryAscent, Environment, CONTACT_TOLERANCE},
};

mod convective;
mod lift;

/// The path of a parcel on a skew-T, as parallel pressure and temperature profiles.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParcelProfile {
    /// Pressure profile
    pub pressure: Vec<HectoPascal>,
    /// Parcel temperature profile
    pub temperature: Vec<Kelvin>,
}

impl ParcelProfile {
    /// The number of points in the profile.
    #[inline]
    pub fn len(&self) -> usize {
        self.pressure.len()
    }

    /// Whether there are no points at all.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.pressure.is_empty()
    }

    /// Add a point to the end of the profile.
    #[inline]
    pub fn push(&mut self, pressure: HectoPascal, temperature: Kelvin) {
        self.pressure.push(pressure);
        self.temperature.push(temperature);
    }

    /// Iterate over the `(pressure, temperature)` points in order.
    pub fn iter<'a>(&'a self) -> impl Iterator<Item = (HectoPascal, Kelvin)> + 'a {
        izip!(&self.pressure, &self.temperature).map(|(&p, &t)| (p, t))
    }
}

impl FromIterator<(f64, f64)> for ParcelProfile {
    fn from_iter<I: IntoIterator<Item = (f64, f64)>>(iter: I) -> Self {
        let mut profile = ParcelProfile::default();
        for (p, t) in iter {
            profile.push(HectoPascal(p), Kelvin(t));
        }
        profile
    }
}

/// The named pieces of a parcel trajectory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, AsRefStr)]
#[strum(serialize_all = "snake_case")]
pub enum Segment {
    /// Dry adiabat from the parcel temperature up to the thermal top.
    Dry,
    /// Moist adiabat from the cloud base up to the cloud top.
    Moist,
    /// The parcel dew point from the surface up to the cloud base.
    Isohume,
    /// Surface dew point up to the LCL and back down the dry adiabat to the surface temperature.
    IsohumeToDry,
    /// Surface dew point up to the CCL and back down the dry adiabat to the convective
    /// temperature.
    IsohumeToTemp,
    /// Moist adiabat from the CCL up to the convective cloud top.
    MoistFromCcl,
}

/// Where a moist ascent stops.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CloudTop {
    /// The parcel came back into equilibrium with the environment at this level.
    Bounded {
        /// Pressure at the cloud top.
        pressure: HectoPascal,
        /// Height of the cloud top.
        height: Meters,
    },
    /// The parcel was still warmer than the environment at the top of the sounding.
    Unbounded,
}

impl CloudTop {
    /// Pressure at the cloud top, if it is in the sounding.
    #[inline]
    pub fn pressure(&self) -> Option<HectoPascal> {
        match *self {
            CloudTop::Bounded { pressure, .. } => Some(pressure),
            CloudTop::Unbounded => None,
        }
    }

    /// Height of the cloud top, if it is in the sounding.
    #[inline]
    pub fn height(&self) -> Option<Meters> {
        match *self {
            CloudTop::Bounded { height, .. } => Some(height),
            CloudTop::Unbounded => None,
        }
    }

    /// Whether the cloud top was found in the sounding.
    #[inline]
    pub fn is_bounded(&self) -> bool {
        self.pressure().is_some()
    }
}

/// Settings for `parcel_trajectory`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrajectoryConfig {
    steps: usize,
    max_tcon_iterations: usize,
    tcon_step: CelsiusDiff,
}

impl Default for TrajectoryConfig {
    fn default() -> Self {
        TrajectoryConfig {
            steps: 200,
            max_tcon_iterations: 200,
            tcon_step: CelsiusDiff(0.5),
        }
    }
}

impl TrajectoryConfig {
    /// Set the number of elevation steps between the parcel's starting level and the top of the
    /// sounding.
    #[inline]
    pub fn with_steps(self, steps: usize) -> Self {
        Self { steps, ..self }
    }

    /// Number of elevation steps between the parcel's starting level and the top of the sounding.
    #[inline]
    pub fn steps(&self) -> usize {
        self.steps
    }

    /// Set the most trial adiabats the convective temperature search may use.
    #[inline]
    pub fn with_max_tcon_iterations(self, max_tcon_iterations: usize) -> Self {
        Self {
            max_tcon_iterations,
            ..self
        }
    }

    /// The most trial adiabats the convective temperature search may use.
    #[inline]
    pub fn max_tcon_iterations(&self) -> usize {
        self.max_tcon_iterations
    }

    /// Set how much warmer each trial convective temperature is than the last.
    #[inline]
    pub fn with_tcon_step(self, tcon_step: CelsiusDiff) -> Self {
        Self { tcon_step, ..self }
    }

    /// How much warmer each trial convective temperature is than the last.
    #[inline]
    pub fn tcon_step(&self) -> CelsiusDiff {
        self.tcon_step
    }
}

/// The path of a lifted parcel and the levels found along the way.
///
/// Everything is optional. A value is only present if the condition it describes happens in the
/// sounding, e.g. a stable sounding has no thermal top.
#[derive(Debug, Clone)]
pub struct ParcelTrajectory {
    surface: SurfaceConditions,

    // Segments
    dry: Option<ParcelProfile>,
    moist: Option<ParcelProfile>,
    isohume: Option<ParcelProfile>,
    isohume_to_dry: Option<ParcelProfile>,
    isohume_to_temp: Option<ParcelProfile>,
    moist_from_ccl: Option<ParcelProfile>,

    // Levels
    lcl_height: Optioned<Meters>,
    lcl_pressure: Optioned<HectoPascal>,
    lcl_temperature: Optioned<Kelvin>,
    ccl_height: Optioned<Meters>,
    ccl_pressure: Optioned<HectoPascal>,
    ccl_temperature: Optioned<Kelvin>,
    convective_temperature: Optioned<Kelvin>,
    cloud_base_height: Optioned<Meters>,
    cloud_base_pressure: Optioned<HectoPascal>,
    thermal_top_height: Optioned<Meters>,
    thermal_top_pressure: Optioned<HectoPascal>,
    cloud_top: Option<CloudTop>,
    convective_cloud_top: Option<CloudTop>,
    convective_search: Option<Refinement>,
}

impl ParcelTrajectory {
    /// The conditions the parcel was lifted from.
    #[inline]
    pub fn surface(&self) -> &SurfaceConditions {
        &self.surface
    }

    /// Get a segment of the trajectory.
    pub fn segment(&self, segment: Segment) -> Option<&ParcelProfile> {
        use Segment::*;

        match segment {
            Dry => self.dry.as_ref(),
            Moist => self.moist.as_ref(),
            Isohume => self.isohume.as_ref(),
            IsohumeToDry => self.isohume_to_dry.as_ref(),
            IsohumeToTemp => self.isohume_to_temp.as_ref(),
            MoistFromCcl => self.moist_from_ccl.as_ref(),
        }
    }

    /// Iterate over the segments that are present.
    pub fn segments<'a>(&'a self) -> impl Iterator<Item = (Segment, &'a ParcelProfile)> + 'a {
        Segment::iter().filter_map(move |seg| self.segment(seg).map(|profile| (seg, profile)))
    }

    /// Height of the lifting condensation level.
    #[inline]
    pub fn lcl_height(&self) -> Optioned<Meters> {
        self.lcl_height
    }

    /// Pressure at the lifting condensation level.
    #[inline]
    pub fn lcl_pressure(&self) -> Optioned<HectoPascal> {
        self.lcl_pressure
    }

    /// Temperature at the lifting condensation level.
    #[inline]
    pub fn lcl_temperature(&self) -> Optioned<Kelvin> {
        self.lcl_temperature
    }

    /// Height of the convective condensation level.
    #[inline]
    pub fn ccl_height(&self) -> Optioned<Meters> {
        self.ccl_height
    }

    /// Pressure at the convective condensation level.
    #[inline]
    pub fn ccl_pressure(&self) -> Optioned<HectoPascal> {
        self.ccl_pressure
    }

    /// Temperature at the convective condensation level.
    #[inline]
    pub fn ccl_temperature(&self) -> Optioned<Kelvin> {
        self.ccl_temperature
    }

    /// The surface temperature needed for convection to start on its own.
    #[inline]
    pub fn convective_temperature(&self) -> Optioned<Kelvin> {
        self.convective_temperature
    }

    /// Height of the cloud base, only present if the parcel forms a cloud.
    #[inline]
    pub fn cloud_base_height(&self) -> Optioned<Meters> {
        self.cloud_base_height
    }

    /// Pressure at the cloud base, only present if the parcel forms a cloud.
    #[inline]
    pub fn cloud_base_pressure(&self) -> Optioned<HectoPascal> {
        self.cloud_base_pressure
    }

    /// Height of the top of the dry thermal, or of the cloud base if it is lower.
    #[inline]
    pub fn thermal_top_height(&self) -> Optioned<Meters> {
        self.thermal_top_height
    }

    /// Pressure at the top of the dry thermal, or at the cloud base if it is lower.
    #[inline]
    pub fn thermal_top_pressure(&self) -> Optioned<HectoPascal> {
        self.thermal_top_pressure
    }

    /// Top of the cloud formed by the parcel.
    #[inline]
    pub fn cloud_top(&self) -> Option<CloudTop> {
        self.cloud_top
    }

    /// Top of the cloud formed by convection from the CCL.
    #[inline]
    pub fn convective_cloud_top(&self) -> Option<CloudTop> {
        self.convective_cloud_top
    }

    /// How the convective temperature search went, if there was a CCL to start it from.
    #[inline]
    pub fn convective_search(&self) -> Option<Refinement> {
        self.convective_search
    }
}

/// Lift a parcel from `surface` through the sounding.
///
/// The sounding needs pressure, height, and temperature profiles, its humidity is not used. The
/// surface pressure must be within the sounding.
pub fn parcel_trajectory(
    snd: &Sounding,
    surface: SurfaceConditions,
    config: &TrajectoryConfig,
) -> Result<ParcelTrajectory> {
    let levels = snd.levels()?;
    let surface = check_surface(surface)?;
    let env = Environment::new(&levels)?;
    let ascent = lift::dry_ascent(&env, &surface, config.steps)?;

    debug!(
        source = snd.source_description(),
        valid_time = ?snd.valid_time(),
        steps = config.steps,
        step = ascent.step,
        top = env.top(),
        "lifting parcel"
    );

    //
    // The parcel itself
    //
    let cloud_base = first_crossing(
        &ascent.elevation,
        &ascent.dry,
        &ascent.elevation,
        &ascent.isohume,
        CONTACT_TOLERANCE,
    )
    .map(|(height, t)| Level::at(&env, height, t));

    let thermal_top = first_crossing(
        &ascent.elevation,
        &ascent.dry,
        &env.heights,
        &env.temperatures,
        CONTACT_TOLERANCE,
    )
    .map(|(height, t)| Level::at(&env, height, t));

    // A cloud forms if the parcel saturates before it runs out of buoyancy.
    let convection = match (cloud_base, thermal_top) {
        (Some(base), Some(top)) if base.height < top.height => Some(base),
        _ => None,
    };

    let (thermal_top, cloud_top, moist, isohume) = match convection {
        Some(base) => {
            let moist = lift::moist_ascent(&env, base.height, base.temperature, ascent.step);
            let (cloud_top, moist) = lift::equilibrium(&env, &moist);
            debug!(base = base.height, top = ?cloud_top, "parcel forms a cloud");

            let isohume = truncate(&ascent.pressure, &ascent.isohume, &base);
            (Some(base), Some(cloud_top), Some(moist), Some(isohume))
        }
        None => (thermal_top, None, None, None),
    };

    let dry = match thermal_top {
        Some(top) => truncate(&ascent.pressure, &ascent.dry, &top),
        None => izip!(&ascent.pressure, &ascent.dry)
            .map(|(&p, &t)| (p, t))
            .collect(),
    };

    //
    // The environment's surface air
    //
    let lcl = first_crossing(
        &ascent.elevation,
        &ascent.env_dry,
        &ascent.elevation,
        &ascent.isohume,
        CONTACT_TOLERANCE,
    )
    .map(|(height, t)| Level::at(&env, height, t));

    let isohume_to_dry =
        lcl.map(|lcl| splice(&ascent.pressure, &ascent.isohume, &lcl, &ascent.env_dry));

    let convective = convective_analysis(&env, &ascent, &surface, config);

    Ok(ParcelTrajectory {
        surface,

        dry: Some(dry),
        moist,
        isohume,
        isohume_to_dry,
        isohume_to_temp: convective.isohume_to_temp,
        moist_from_ccl: convective.moist_from_ccl,

        lcl_height: lcl.map(|lvl| Meters(lvl.height)).into(),
        lcl_pressure: lcl.map(|lvl| HectoPascal(lvl.pressure)).into(),
        lcl_temperature: lcl.map(|lvl| Kelvin(lvl.temperature)).into(),
        ccl_height: convective.ccl.map(|lvl| Meters(lvl.height)).into(),
        ccl_pressure: convective.ccl.map(|lvl| HectoPascal(lvl.pressure)).into(),
        ccl_temperature: convective.ccl.map(|lvl| Kelvin(lvl.temperature)).into(),
        convective_temperature: convective.tcon.into(),
        cloud_base_height: convection.map(|lvl| Meters(lvl.height)).into(),
        cloud_base_pressure: convection.map(|lvl| HectoPascal(lvl.pressure)).into(),
        thermal_top_height: thermal_top.map(|lvl| Meters(lvl.height)).into(),
        thermal_top_pressure: thermal_top.map(|lvl| HectoPascal(lvl.pressure)).into(),
        cloud_top,
        convective_cloud_top: convective.cloud_top,
        convective_search: convective.search,
    })
}

// Surface values must be physical, and a dew point above the temperature is taken as saturated.
fn check_surface(surface: SurfaceConditions) -> Result<SurfaceConditions> {
    let SurfaceConditions {
        temperature,
        pressure,
        dew_point,
    } = surface;

    let valid = |val: f64| val.is_finite() && val > 0.0;
    if !valid(temperature.unpack()) || !valid(pressure.unpack()) || !valid(dew_point.unpack()) {
        return Err(AnalysisError::InvalidInput);
    }

    if dew_point > temperature {
        debug!("surface dew point above the temperature, lifting a saturated parcel");
        return Ok(SurfaceConditions {
            dew_point: temperature,
            ..surface
        });
    }

    Ok(surface)
}

// A level found along the ascent.
#[derive(Debug, Clone, Copy)]
struct Level {
    height: f64,
    pressure: f64,
    temperature: f64,
}

impl Level {
    fn at(env: &Environment, height: f64, temperature: f64) -> Self {
        Level {
            height,
            pressure: env.pressure_at(height),
            temperature,
        }
    }
}

// The part of a curve below a level, ending at the level.
fn truncate(pressure: &[f64], temperature: &[f64], level: &Level) -> ParcelProfile {
    let mut profile: ParcelProfile = izip!(pressure, temperature)
        .filter(|(p, _)| **p > level.pressure)
        .map(|(&p, &t)| (p, t))
        .collect();

    profile.push(HectoPascal(level.pressure), Kelvin(level.temperature));
    profile
}

// Up one curve to a level, then back down another.
fn splice(pressure: &[f64], up: &[f64], level: &Level, down: &[f64]) -> ParcelProfile {
    let mut profile = truncate(pressure, up, level);

    izip!(pressure, down)
        .filter(|(p, _)| **p > level.pressure)
        .rev()
        .for_each(|(&p, &t)| profile.push(HectoPascal(p), Kelvin(t)));

    profile
}

#[derive(Default)]
struct ConvectiveAnalysis {
    ccl: Option<Level>,
    tcon: Option<Kelvin>,
    isohume_to_temp: Option<ParcelProfile>,
    moist_from_ccl: Option<ParcelProfile>,
    cloud_top: Option<CloudTop>,
    search: Option<Refinement>,
}

fn convective_analysis(
    env: &Environment,
    ascent: &DryAscent,
    surface: &SurfaceConditions,
    config: &TrajectoryConfig,
) -> ConvectiveAnalysis {
    let first_guess = match first_crossing(
        &ascent.elevation,
        &ascent.isohume,
        &env.heights,
        &env.temperatures,
        CONTACT_TOLERANCE,
    ) {
        Some(ccl) => ccl,
        None => {
            debug!("isohume never meets the environment, no CCL");
            return ConvectiveAnalysis::default();
        }
    };

    let curves = SearchCurves {
        elevation: &ascent.elevation,
        pressure: &ascent.pressure,
        isohume: &ascent.isohume,
        env_height: &env.heights,
        env_temperature: &env.temperatures,
    };
    let limits = SearchLimits {
        tcon_step: config.tcon_step.unpack(),
        max_iterations: config.max_tcon_iterations,
        elevation_tolerance: ascent.step,
    };

    let search = refine_convective_temperature(&curves, surface.pressure, first_guess, &limits);

    match search {
        Refinement::Converged {
            tcon,
            ccl_height,
            ccl_temperature,
            iterations,
        } => {
            debug!(tcon = tcon.unpack(), iterations, "convective temperature found");

            let ccl = Level::at(env, ccl_height.unpack(), ccl_temperature.unpack());
            let trial = ascent.adiabat_from(tcon, surface.pressure);
            let isohume_to_temp = splice(&ascent.pressure, &ascent.isohume, &ccl, &trial);

            let moist = lift::moist_ascent(env, ccl.height, ccl.temperature, ascent.step);
            let (cloud_top, moist_from_ccl) = lift::equilibrium(env, &moist);

            ConvectiveAnalysis {
                ccl: Some(ccl),
                tcon: Some(tcon),
                isohume_to_temp: Some(isohume_to_temp),
                moist_from_ccl: Some(moist_from_ccl),
                cloud_top: Some(cloud_top),
                search: Some(search),
            }
        }
        Refinement::NotConverged { tcon, iterations } => {
            warn!(
                last_tcon = tcon.unpack(),
                iterations, "convective temperature search did not converge"
            );

            ConvectiveAnalysis {
                search: Some(search),
                ..ConvectiveAnalysis::default()
            }
        }
    }
}
