//! Lookup table from cloudiness to how dark a pixel is drawn.

/// Maps a cloudiness in `[0, 1]` to a blackness byte, 255 for clear sky down to 0 for solid
/// cloud.
///
/// Cloudiness is first quantized to a byte. The table then applies a gamma curve and snaps the
/// result onto a fixed number of levels, so gradients are drawn as a staircase.
#[derive(Clone)]
pub(crate) struct BlacknessLut {
    table: [u8; 256],
}

impl BlacknessLut {
    pub fn new(levels: usize, gamma: f64) -> Self {
        let steps = levels.max(2) as f64 - 1.0;
        let mut table = [0u8; 256];

        for (i, entry) in table.iter_mut().enumerate() {
            let cloudiness = (i as f64 / 255.0).powf(gamma);
            let level = (cloudiness * steps).round() / steps;
            *entry = (255.0 * (1.0 - level)).round() as u8;
        }

        BlacknessLut { table }
    }

    #[inline]
    pub fn blackness(&self, cloudiness: f64) -> u8 {
        // NaN maps to clear sky
        let cloudiness = if cloudiness.is_nan() {
            0.0
        } else {
            cloudiness.max(0.0).min(1.0)
        };

        self.table[(cloudiness * 255.0).round() as usize]
    }
}
