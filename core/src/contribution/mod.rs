//! Contributions
//!
//! Rendering threads deposit per-sample contributions through a thread owned `ContributionBuffer`.
//! Contributions are staged in fixed size `Buffer`s, one per (tile, buffer group), and full buffers
//! are handed to the shared `ContributionPool`, which elects a single thread per tile to splat them
//! into the `Film` while the other threads keep rendering into fresh buffers.

mod buffer;
mod config;
mod contribution_buffer;
mod lock;
mod pool;

use crate::pbrt::*;
use crate::spectrum::*;

// Re-export.
pub use buffer::*;
pub use config::*;
pub use contribution_buffer::*;
pub use lock::*;
pub use pool::*;

/// Weight stored in `Contribution::variance` to mark a contribution as rejected.
pub const REJECTED_WEIGHT: Float = -1.0;

/// One pixel sample contribution destined for the film.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
#[repr(C)]
pub struct Contribution {
    /// Sub-pixel sample position in x-direction.
    pub image_x: Float,

    /// Sub-pixel sample position in y-direction.
    pub image_y: Float,

    /// Radiance value.
    pub color: XYZColor,

    /// Alpha.
    pub alpha: Float,

    /// Depth of the first visible surface.
    pub zdepth: Float,

    /// Holds the sample weight once the contribution is added to a buffer. A negative value marks
    /// the contribution as rejected; the film skips it.
    pub variance: Float,

    /// Index of the destination buffer within the buffer group.
    pub buffer: u16,

    /// Index of the destination buffer group.
    pub buffer_group: u16,
}

impl Contribution {
    /// Create a new `Contribution`.
    ///
    /// * `image_x`      - Sub-pixel sample position in x-direction.
    /// * `image_y`      - Sub-pixel sample position in y-direction.
    /// * `color`        - Radiance value.
    /// * `alpha`        - Alpha.
    /// * `zdepth`       - Depth.
    /// * `variance`     - Initial variance/weight.
    /// * `buffer`       - Index of the destination buffer.
    /// * `buffer_group` - Index of the destination buffer group.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        image_x: Float,
        image_y: Float,
        color: XYZColor,
        alpha: Float,
        zdepth: Float,
        variance: Float,
        buffer: u16,
        buffer_group: u16,
    ) -> Self {
        Self {
            image_x,
            image_y,
            color,
            alpha,
            zdepth,
            variance,
            buffer,
            buffer_group,
        }
    }

    /// Returns the weight stored with the contribution.
    pub fn weight(&self) -> Float {
        self.variance
    }

    /// Returns `true` if the contribution was rejected.
    pub fn is_rejected(&self) -> bool {
        !(self.variance >= 0.0)
    }

    /// Marks the contribution as rejected.
    pub fn reject(&mut self) {
        self.variance = REJECTED_WEIGHT;
    }
}

#[cfg(test)]
pub(crate) mod test_film;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reject_marks_with_sentinel() {
        let mut c = Contribution::new(1.0, 2.0, XYZColor::splat(1.0), 1.0, 0.0, 0.5, 0, 0);
        assert!(!c.is_rejected());
        assert_eq!(c.weight(), 0.5);

        c.reject();
        assert!(c.is_rejected());
        assert_eq!(c.weight(), REJECTED_WEIGHT);
    }

    #[test]
    fn nan_weight_is_rejected() {
        let c = Contribution {
            variance: Float::NAN,
            ..Default::default()
        };
        assert!(c.is_rejected());
    }
}
