//! Invertible mappings between coordinates, built on curve resampling.
use crate::{
    error::{AnalysisError, Result},
    interpolation::sample_one,
    utility::strictly_monotonic,
};

/// How the domain of a `Scale` is treated before it is mapped to the range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScaleKind {
    /// Domain values are used as they are.
    Linear,
    /// Domain values are mapped through the natural logarithm first, as for pressure.
    Log,
}

/// A piecewise-linear, invertible mapping from a domain to a range.
///
/// The mapping is defined by pairs of matching domain and range values, for instance the pressure
/// and height of each level in a sounding. Both sequences must be strictly monotonic.
#[derive(Debug, Clone, PartialEq)]
pub struct Scale {
    kind: ScaleKind,
    // Already log transformed for ScaleKind::Log
    domain: Vec<f64>,
    range: Vec<f64>,
}

impl Scale {
    /// Build a linear scale.
    pub fn linear(domain: &[f64], range: &[f64]) -> Result<Self> {
        Self::new(ScaleKind::Linear, domain, range)
    }

    /// Build a logarithmic scale, all domain values must be positive.
    pub fn log(domain: &[f64], range: &[f64]) -> Result<Self> {
        Self::new(ScaleKind::Log, domain, range)
    }

    /// Build a scale of the given kind.
    pub fn new(kind: ScaleKind, domain: &[f64], range: &[f64]) -> Result<Self> {
        if domain.len() != range.len() {
            return Err(AnalysisError::MismatchedProfileLength);
        }
        if domain.len() < 2 {
            return Err(AnalysisError::NotEnoughData);
        }
        if domain.iter().chain(range.iter()).any(|v| !v.is_finite()) {
            return Err(AnalysisError::InvalidInput);
        }
        if !strictly_monotonic(domain.iter().cloned()) || !strictly_monotonic(range.iter().cloned())
        {
            return Err(AnalysisError::InvalidInput);
        }

        let domain = match kind {
            ScaleKind::Linear => domain.to_vec(),
            ScaleKind::Log => {
                if domain.iter().any(|&v| v <= 0.0) {
                    return Err(AnalysisError::InvalidInput);
                }
                domain.iter().map(|v| v.ln()).collect()
            }
        };

        Ok(Scale {
            kind,
            domain,
            range: range.to_vec(),
        })
    }

    /// The kind of scale.
    #[inline]
    pub fn kind(&self) -> ScaleKind {
        self.kind
    }

    /// Map a domain value into the range.
    #[inline]
    pub fn forward(&self, value: f64) -> f64 {
        let value = match self.kind {
            ScaleKind::Linear => value,
            ScaleKind::Log => value.ln(),
        };

        // Construction guarantees at least two points
        sample_one(&self.domain, &self.range, value).unwrap_or(std::f64::NAN)
    }

    /// Map a range value back into the domain.
    #[inline]
    pub fn inverse(&self, value: f64) -> f64 {
        let value = sample_one(&self.range, &self.domain, value).unwrap_or(std::f64::NAN);

        match self.kind {
            ScaleKind::Linear => value,
            ScaleKind::Log => value.exp(),
        }
    }
}
