//! Small helpers shared by the analysis modules.

/// Check that a sequence is strictly monotonic, either increasing or decreasing.
///
/// The direction is taken from the first two values. Sequences shorter than two values are
/// trivially monotonic. Any NaN breaks monotonicity.
pub(crate) fn strictly_monotonic(vals: impl IntoIterator<Item = f64>) -> bool {
    let mut iter = vals.into_iter();

    let mut prev = match iter.next() {
        Some(val) => val,
        None => return true,
    };

    let mut increasing: Option<bool> = None;
    for val in iter {
        let step_up = match val.partial_cmp(&prev) {
            Some(std::cmp::Ordering::Greater) => true,
            Some(std::cmp::Ordering::Less) => false,
            _ => return false,
        };

        match increasing {
            None => increasing = Some(step_up),
            Some(dir) if dir != step_up => return false,
            _ => {}
        }

        prev = val;
    }

    true
}


#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_strictly_monotonic() {
        assert!(strictly_monotonic(vec![]));
        assert!(strictly_monotonic(vec![1.0]));
        assert!(strictly_monotonic(vec![1000.0, 925.0, 850.0]));
        assert!(strictly_monotonic(vec![100.0, 200.0, 300.0]));

        assert!(!strictly_monotonic(vec![1000.0, 925.0, 950.0]));
        assert!(!strictly_monotonic(vec![1000.0, 1000.0, 950.0]));
        assert!(!strictly_monotonic(vec![1000.0, std::f64::NAN, 950.0]));
    }
}
