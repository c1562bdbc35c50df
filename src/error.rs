//! Error types for the sounding-parcel crate.
use std::{error::Error, fmt::Display};

/// Error type for the crate.
///
/// Only caller contract violations are errors. Physical conditions that simply do not occur for a
/// given sounding (no LCL, no thermal top, ...) are reported as `None` values in the results.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum AnalysisError {
    /// A profile that is required for this analysis is missing.
    MissingProfile,
    /// The parallel profiles in a sounding do not all have the same length.
    MismatchedProfileLength,
    /// The pressure profile is not strictly monotonic in the declared order.
    NonMonotonicPressure,
    /// A value (surface value, index, location, etc) that is required is not available.
    MissingValue,
    /// Not enough data available for analysis.
    NotEnoughData,
    /// There is no data available that meets the requirements.
    NoDataProfile,
    /// Bad or invalid input.
    InvalidInput,
}

impl Display for AnalysisError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        use AnalysisError::*;

        match self {
            MissingProfile => write!(f, "missing profile required for the analysis"),
            MismatchedProfileLength => write!(f, "profiles in the sounding differ in length"),
            NonMonotonicPressure => write!(f, "pressure profile is not strictly monotonic"),
            MissingValue => write!(f, "missing value required for analysis"),
            NotEnoughData => write!(f, "not enough data available for analysis"),
            NoDataProfile => write!(f, "profile is full of missing values, cannot do analysis"),
            InvalidInput => write!(f, "invalid input"),
        }
    }
}

impl Error for AnalysisError {}

/// Shorthand for results.
pub type Result<T> = std::result::Result<T, AnalysisError>;
