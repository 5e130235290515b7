//! Synthetic scene

use splat_core::contribution::{Contribution, ContributionBuffer};
use splat_core::film::FilmConfig;
use splat_core::pbrt::*;
use splat_core::renderer::ContributionSource;
use splat_core::rng::RNG;
use splat_core::spectrum::XYZColor;

/// A procedural image: a horizontal color gradient with a bright disk in the middle, over a
/// tilted depth plane. One task renders one jittered sample for every pixel of a row.
pub struct GradientSource {
    /// Image width used to normalize positions.
    x_resolution: Float,

    /// Image height used to normalize positions.
    y_resolution: Float,

    /// First pixel column inside the crop window.
    x_start: usize,

    /// Number of pixel columns inside the crop window.
    x_count: usize,

    /// First pixel row inside the crop window.
    y_start: usize,

    /// Number of pixel rows inside the crop window.
    y_count: usize,

    /// Number of buffer groups.
    buffer_groups: usize,

    /// Number of buffers per group.
    buffers_per_group: usize,
}

impl GradientSource {
    /// Create a new `GradientSource` covering a film's crop window.
    ///
    /// * `config` - Film configuration.
    pub fn new(config: &FilmConfig) -> Self {
        let (x_start, x_count) = config.x_pixels();
        let (y_start, y_count) = config.y_pixels();
        Self {
            x_resolution: config.x_resolution as Float,
            y_resolution: config.y_resolution as Float,
            x_start,
            x_count,
            y_start,
            y_count,
            buffer_groups: config.buffer_groups,
            buffers_per_group: config.buffers_per_group,
        }
    }

    /// Returns the number of tasks needed for a number of samples per pixel.
    ///
    /// * `spp` - Samples per pixel.
    pub fn task_count(&self, spp: u32) -> usize {
        spp as usize * self.y_count
    }

    /// Returns the radiance and depth seen at an image position.
    ///
    /// * `x` - Image position in x-direction.
    /// * `y` - Image position in y-direction.
    pub fn shade(&self, x: Float, y: Float) -> (XYZColor, Float) {
        let u = x / self.x_resolution;
        let v = y / self.y_resolution;

        let background = XYZColor::from_rgb(&[u, 0.5 * (1.0 - v), 1.0 - u]);
        let (du, dv) = (u - 0.5, v - 0.5);
        let color = if du * du + dv * dv < 0.04 {
            background + XYZColor::splat(4.0)
        } else {
            background
        };

        (color, 1.0 + u + 2.0 * v)
    }
}

impl ContributionSource for GradientSource {
    fn sample(&self, task: usize, rng: &mut RNG, contribs: &ContributionBuffer) {
        let pass = task / self.y_count;
        let row = self.y_start + task % self.y_count;
        let buffer_group = (pass % self.buffer_groups) as u16;

        for column in 0..self.x_count {
            let x = (self.x_start + column) as Float + rng.uniform_float();
            let y = row as Float + rng.uniform_float();
            let (color, depth) = self.shade(x, y);
            let buffer = ((column + pass) % self.buffers_per_group) as u16;

            let contrib = Contribution::new(x, y, color, 1.0, depth, 0.0, buffer, buffer_group);
            contribs.add(&contrib, 1.0);
        }

        contribs.add_sample_count(self.x_count as Float);
    }
}
