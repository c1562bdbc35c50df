#![warn(missing_docs)]
//! Lift air parcels through an atmospheric sounding and rasterize the cloud cover it implies.
//!
//! The parcel analysis follows a surface parcel up a dry adiabat and finds where it saturates,
//! where it stops being buoyant, and how far a cloud that forms would grow. It also locates the
//! lifting condensation level, the convective condensation level, and the convective temperature
//! for the sounding's surface air. Every result that may not exist, such as an LCL in a
//! sounding too dry to have one, is optional rather than a magic number.
//!
//! The curves and levels are returned with pressure and temperature. Placing them on a skew-T
//! diagram is left to the caller.
//!
//! ```
//! use metfor::{CelsiusDiff, HectoPascal, Kelvin, Meters};
//! use optional::some;
//! use sounding_parcel::{parcel_trajectory, Sounding, SurfaceConditions, TrajectoryConfig};
//!
//! let heights: Vec<f64> = (0..=10).map(|i| i as f64 * 500.0).collect();
//! let snd = Sounding::new()
//!     .with_pressure_profile(
//!         heights
//!             .iter()
//!             .map(|&h| some(HectoPascal(1000.0 * (-h / 8000.0).exp())))
//!             .collect(),
//!     )
//!     .with_height_profile(heights.iter().map(|&h| some(Meters(h))).collect())
//!     .with_temperature_profile(
//!         heights
//!             .iter()
//!             .map(|&h| some(Kelvin(298.0 - 0.0065 * h)))
//!             .collect(),
//!     )
//!     .with_dew_point_profile(
//!         heights
//!             .iter()
//!             .map(|&h| some(Kelvin(293.0 - 0.002 * h)))
//!             .collect(),
//!     );
//!
//! let surface = SurfaceConditions::from_sounding(&snd, CelsiusDiff(0.0)).unwrap();
//! let trajectory = parcel_trajectory(&snd, surface, &TrajectoryConfig::default()).unwrap();
//!
//! assert!(trajectory.lcl_height().is_some());
//! ```

//
// API
//
pub use crate::{
    clouds::{cloud_raster, compute_clouds, CloudConfig, CloudRaster, CloudinessParams},
    error::{AnalysisError, Result},
    interpolation::{linear_interpolate, sample_at, Lerp},
    intersection::{first_crossing, first_intersection},
    parcel::SurfaceConditions,
    parcel_profile::{
        parcel_trajectory, CloudTop, ParcelProfile, ParcelTrajectory, Refinement, Segment,
        TrajectoryConfig,
    },
    scale::{Scale, ScaleKind},
    sounding::{DataRow, PressureOrder, ProfileLevels, Sounding},
};

pub mod met_formulas;

//
// Internal use only
//
mod clouds;
mod error;
mod interpolation;
mod intersection;
mod parcel;
mod parcel_profile;
mod scale;
mod sounding;
mod utility;
