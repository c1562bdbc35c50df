//! Linear interpolation and resampling of piecewise-linear curves.
//!
//! A curve is a pair of parallel slices `(xs, ys)` that is linear between consecutive samples.
//! The `xs` must be monotonic, ascending or descending.

/// A value that can be blended linearly.
///
/// Implemented for scalars and for fixed length groups of scalars, which are blended
/// elementwise. The latter is handy for interpolating several coordinates that share the same
/// abscissa in one pass.
pub trait Lerp: Copy {
    /// Move from `self` toward `other` by `frac`, where 0 gives `self` and 1 gives `other`.
    fn lerp(self, other: Self, frac: f64) -> Self;
}

impl Lerp for f64 {
    #[inline]
    fn lerp(self, other: Self, frac: f64) -> Self {
        self + (other - self) * frac
    }
}

impl<const N: usize> Lerp for [f64; N] {
    #[inline]
    fn lerp(self, other: Self, frac: f64) -> Self {
        let mut blended = self;
        blended
            .iter_mut()
            .zip(other.iter())
            .for_each(|(val, tgt)| *val += (tgt - *val) * frac);
        blended
    }
}

/// Interpolate between the points `(x1, y1)` and `(x2, y2)` at `x`.
///
/// If `x1 == x2` there is no line to follow, so `y1` is returned.
#[inline]
#[allow(clippy::float_cmp)]
pub fn linear_interpolate<Y: Lerp>(x1: f64, y1: Y, x2: f64, y2: Y, x: f64) -> Y {
    if x1 == x2 {
        return y1;
    }

    y1.lerp(y2, (x - x1) / (x2 - x1))
}

/// Resample the curve `(xs, ys)` at every value in `targets`.
///
/// The direction of `xs` is taken from its first two elements. Each target is interpolated on the
/// segment that brackets it. Targets past either end of the curve are assigned to the boundary
/// segment and pinned to its end point, so the curve is never extended beyond its samples.
///
/// A curve with a single sample is constant, an empty curve yields an empty result.
pub fn sample_at<Y: Lerp>(xs: &[f64], ys: &[Y], targets: &[f64]) -> Vec<Y> {
    debug_assert_eq!(xs.len(), ys.len());

    targets
        .iter()
        .filter_map(|&target| sample_one(xs, ys, target))
        .collect()
}

/// Resample the curve `(xs, ys)` at a single value, see `sample_at`.
///
/// Returns `None` only for an empty curve.
pub fn sample_one<Y: Lerp>(xs: &[f64], ys: &[Y], target: f64) -> Option<Y> {
    let len = xs.len().min(ys.len());
    match len {
        0 => return None,
        1 => return Some(ys[0]),
        _ => {}
    }

    let descending = xs[0] > xs[1];

    // Index of the upper end of the bracketing segment
    let idx = xs[..len]
        .iter()
        .position(|&x| if descending { x <= target } else { x >= target })
        .unwrap_or(len - 1)
        .max(1);

    let (x0, x1) = (xs[idx - 1], xs[idx]);
    let pinned = target.max(x0.min(x1)).min(x0.max(x1));

    Some(linear_interpolate(x0, ys[idx - 1], x1, ys[idx], pinned))
}
