//! Resampling kernels for upsampling the cloudiness grid.

/// A separable resampling filter.
pub(crate) trait FilterKernel {
    /// Distance from the center beyond which the weight is zero.
    fn radius(&self) -> f64;
    /// Weight of a sample at distance `x` from the point being resampled.
    fn weight(&self, x: f64) -> f64;
}

/// Keys' cubic convolution kernel, radius 2.
///
/// With `a = -0.5` this is the Catmull-Rom spline. It passes through the samples and its weights
/// always sum to one.
#[derive(Debug, Clone, Copy)]
pub(crate) struct KeysCubic {
    a: f64,
}

impl Default for KeysCubic {
    fn default() -> Self {
        KeysCubic { a: -0.5 }
    }
}

impl FilterKernel for KeysCubic {
    #[inline]
    fn radius(&self) -> f64 {
        2.0
    }

    #[inline]
    fn weight(&self, x: f64) -> f64 {
        let a = self.a;
        let x = x.abs();

        if x <= 1.0 {
            ((a + 2.0) * x - (a + 3.0)) * x * x + 1.0
        } else if x < 2.0 {
            ((a * x - 5.0 * a) * x + 8.0 * a) * x - 4.0 * a
        } else {
            0.0
        }
    }
}

/// A row major grid of samples.
#[derive(Debug, Clone)]
pub(crate) struct Grid {
    pub width: usize,
    pub height: usize,
    pub values: Vec<f64>,
}

impl Grid {
    /// Resample the grid at a fractional position with a 2-D stencil of the kernel. Sample
    /// indices past the edges are clamped to the edge.
    pub fn sample<K: FilterKernel>(&self, kernel: &K, x: f64, y: f64) -> f64 {
        debug_assert_eq!(self.values.len(), self.width * self.height);
        if self.values.is_empty() {
            return 0.0;
        }

        let taps = kernel.radius().ceil() as isize;
        let (x0, y0) = (x.floor() as isize, y.floor() as isize);
        let clamp = |idx: isize, len: usize| idx.max(0).min(len as isize - 1) as usize;

        let mut sum = 0.0;
        for j in (y0 - taps + 1)..=(y0 + taps) {
            let wy = kernel.weight(y - j as f64);
            if wy == 0.0 {
                continue;
            }
            let row = clamp(j, self.height) * self.width;

            for i in (x0 - taps + 1)..=(x0 + taps) {
                let wx = kernel.weight(x - i as f64);
                sum += wx * wy * self.values[row + clamp(i, self.width)];
            }
        }

        sum
    }
}
