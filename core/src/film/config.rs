//! Film configuration

use crate::pbrt::*;

/// Parameters for a `TiledFilm`.
#[derive(Clone, Debug, PartialEq)]
pub struct FilmConfig {
    /// Horizontal image resolution in pixels.
    pub x_resolution: usize,

    /// Vertical image resolution in pixels.
    pub y_resolution: usize,

    /// Crop window in normalized image coordinates: `[x_min, x_max, y_min, y_max]`.
    pub crop_window: [Float; 4],

    /// Requested number of tiles. 0 requests twice the thread count; a negative value `-k` requests
    /// `k` times the thread count.
    pub tile_count: i32,

    /// Number of rendering threads used to resolve a relative tile count.
    pub thread_count: usize,

    /// Number of buffer groups.
    pub buffer_groups: usize,

    /// Number of buffers in every buffer group.
    pub buffers_per_group: usize,

    /// Samples per pixel after which rendering should stop. 0 disables the limit.
    pub halt_spp: u32,

    /// Multiply sample colors by their alpha.
    pub premultiply_alpha: bool,

    /// Accumulate sample depths.
    pub use_zbuffer: bool,
}

impl Default for FilmConfig {
    fn default() -> Self {
        Self {
            x_resolution: 640,
            y_resolution: 480,
            crop_window: [0.0, 1.0, 0.0, 1.0],
            tile_count: 0,
            thread_count: 1,
            buffer_groups: 1,
            buffers_per_group: 1,
            halt_spp: 0,
            premultiply_alpha: false,
            use_zbuffer: false,
        }
    }
}

impl FilmConfig {
    /// Returns a configuration with the given resolution and defaults otherwise.
    ///
    /// * `x_resolution` - Horizontal image resolution in pixels.
    /// * `y_resolution` - Vertical image resolution in pixels.
    pub fn with_resolution(x_resolution: usize, y_resolution: usize) -> Self {
        Self {
            x_resolution,
            y_resolution,
            ..Default::default()
        }
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), String> {
        if self.x_resolution == 0 || self.y_resolution == 0 {
            return Err(format!(
                "Invalid film resolution {}x{}.",
                self.x_resolution, self.y_resolution
            ));
        }

        let [x0, x1, y0, y1] = self.crop_window;
        let in_range = |v: Float| (0.0..=1.0).contains(&v);
        if !(in_range(x0) && in_range(x1) && in_range(y0) && in_range(y1)) || x0 > x1 || y0 > y1 {
            return Err(format!(
                "Invalid crop window [{}, {}, {}, {}].",
                x0, x1, y0, y1
            ));
        }

        if self.thread_count == 0 {
            return Err("Film thread count must be at least 1.".to_string());
        }
        if self.buffer_groups == 0 || self.buffer_groups > u16::MAX as usize + 1 {
            return Err(format!("Invalid buffer group count {}.", self.buffer_groups));
        }
        if self.buffers_per_group == 0 || self.buffers_per_group > u16::MAX as usize + 1 {
            return Err(format!(
                "Invalid buffers per group {}.",
                self.buffers_per_group
            ));
        }
        Ok(())
    }

    /// Returns the requested tile count resolved against the thread count.
    pub fn requested_tile_count(&self) -> usize {
        match self.tile_count {
            n if n > 0 => n as usize,
            0 => 2 * self.thread_count,
            n => n.unsigned_abs() as usize * self.thread_count,
        }
    }

    /// Returns the first pixel column and the number of columns inside the crop window.
    pub fn x_pixels(&self) -> (usize, usize) {
        Self::pixel_range(self.x_resolution, self.crop_window[0], self.crop_window[1])
    }

    /// Returns the first pixel row and the number of rows inside the crop window.
    pub fn y_pixels(&self) -> (usize, usize) {
        Self::pixel_range(self.y_resolution, self.crop_window[2], self.crop_window[3])
    }

    /// Converts a normalized crop range into a pixel start and count. At least one pixel is covered.
    fn pixel_range(resolution: usize, c0: Float, c1: Float) -> (usize, usize) {
        let start = (resolution as Float * c0).ceil() as usize;
        let end = (resolution as Float * c1).ceil() as usize;
        (start, max(1, end.saturating_sub(start)))
    }
}
