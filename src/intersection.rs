//! Find where two piecewise-linear curves meet.
use crate::interpolation::sample_at;
use itertools::{izip, Itertools};
use std::cmp::Ordering;

/// Find the first intersection of two curves, scanning in the direction of increasing x.
///
/// Both `x1s` and `x2s` must be ascending. Only the range of x covered by both curves is searched;
/// if they do not overlap there is no intersection. Within that range both curves are resampled
/// onto the union of their x values, and the first sample where they are equal, or the first
/// segment where they swap sides, gives the intersection point `(x, y)`.
pub fn first_intersection(
    x1s: &[f64],
    y1s: &[f64],
    x2s: &[f64],
    y2s: &[f64],
) -> Option<(f64, f64)> {
    let samples = common_samples(x1s, y1s, x2s, y2s)?;
    scan_for_intersection(&samples)
}

/// Find the first place two curves cross after they part from a common starting point.
///
/// This is `first_intersection`, except that any leading samples where the curves agree to within
/// `contact_tolerance` are skipped. Two curves that start from the same point, like the
/// temperature and dew point of a saturated parcel, only count as crossing if they meet again
/// further along.
pub fn first_crossing(
    x1s: &[f64],
    y1s: &[f64],
    x2s: &[f64],
    y2s: &[f64],
    contact_tolerance: f64,
) -> Option<(f64, f64)> {
    let samples = common_samples(x1s, y1s, x2s, y2s)?;

    let start = samples
        .iter()
        .position(|&(_, y1, y2)| (y2 - y1).abs() > contact_tolerance)?;

    scan_for_intersection(&samples[start..])
}

// Resample both curves on the sorted union of their x values where they overlap.
fn common_samples(
    x1s: &[f64],
    y1s: &[f64],
    x2s: &[f64],
    y2s: &[f64],
) -> Option<Vec<(f64, f64, f64)>> {
    debug_assert_eq!(x1s.len(), y1s.len());
    debug_assert_eq!(x2s.len(), y2s.len());

    let min_x = x1s.first()?.max(*x2s.first()?);
    let max_x = x1s.last()?.min(*x2s.last()?);

    // Also catches NaN bounds
    if !(min_x <= max_x) {
        return None;
    }

    let mut xs: Vec<f64> = x1s
        .iter()
        .chain(x2s.iter())
        .cloned()
        .filter(|&x| x >= min_x && x <= max_x)
        .collect();
    xs.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));
    xs.dedup();

    let iy1s = sample_at(x1s, y1s, &xs);
    let iy2s = sample_at(x2s, y2s, &xs);

    Some(izip!(xs, iy1s, iy2s).collect())
}

#[allow(clippy::float_cmp)]
fn scan_for_intersection(samples: &[(f64, f64, f64)]) -> Option<(f64, f64)> {
    let &(x0, y1_0, y2_0) = samples.first()?;
    if y1_0 == y2_0 {
        return Some((x0, y1_0));
    }

    samples
        .iter()
        .tuple_windows::<(_, _)>()
        .find_map(|(&(xa, y1a, y2a), &(xb, y1b, y2b))| {
            if y1b == y2b {
                return Some((xb, y1b));
            }

            if (y2a - y1a).signum() == (y2b - y1b).signum() {
                return None;
            }

            // Both curves are straight on this segment, solve dx·slope1 + y1a = dx·slope2 + y2a
            let run = xb - xa;
            let slope1 = (y1b - y1a) / run;
            let slope2 = (y2b - y2a) / run;
            let dx = (y2a - y1a) / (slope1 - slope2);

            Some((xa + dx, y1a + dx * slope1))
        })
}
